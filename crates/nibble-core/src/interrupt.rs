//! Fixed-priority interrupt controller.

use std::fmt;

/// Interrupt sources in descending priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InterruptSource {
    /// One-second tick.
    SecondTimer,
    /// LCD refresh request.
    RedrawScreen,
    /// SET button press.
    SetButton,
    /// MODE button press.
    ModeButton,
    /// TRANSMIT button press.
    TransmitButton,
    /// SELECT button press.
    SelectButton,
}

impl InterruptSource {
    /// Every source, highest priority first.
    pub const ALL: [Self; 6] = [
        Self::SecondTimer,
        Self::RedrawScreen,
        Self::SetButton,
        Self::ModeButton,
        Self::TransmitButton,
        Self::SelectButton,
    ];

    /// Bit of this source in the pending mask.
    #[must_use]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// CALL opcode synthesized when the source is dispatched.
    #[must_use]
    pub const fn vector(self) -> u16 {
        match self {
            Self::SecondTimer => 0xAC01,
            Self::RedrawScreen => 0xAC0D,
            Self::SetButton => 0xAC08,
            Self::ModeButton => 0xAC05,
            Self::TransmitButton => 0xAC06,
            Self::SelectButton => 0xAC07,
        }
    }

    /// Entry address of the service routine the vector calls.
    #[must_use]
    pub const fn routine_address(self) -> u16 {
        (self.vector() & 0x0FFF) << 1
    }

    /// Upper-case source name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SecondTimer => "SECOND_TIMER",
            Self::RedrawScreen => "REDRAW_SCREEN",
            Self::SetButton => "SET_BUTTON",
            Self::ModeButton => "MODE_BUTTON",
            Self::TransmitButton => "TRANSMIT_BUTTON",
            Self::SelectButton => "SELECT_BUTTON",
        }
    }
}

impl fmt::Display for InterruptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pending-source mask plus the single in-service latch.
///
/// There is no nesting: while a routine is in service, raised sources stay
/// pending until the routine returns through `HLT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InterruptController {
    pending: u8,
    servicing: bool,
}

impl InterruptController {
    /// Marks `source` pending. Raising an already pending source is a no-op.
    pub const fn raise(&mut self, source: InterruptSource) {
        self.pending |= source.bit();
    }

    /// Raw pending mask.
    #[must_use]
    pub const fn pending(&self) -> u8 {
        self.pending
    }

    /// Returns `true` when `source` is waiting for dispatch.
    #[must_use]
    pub const fn is_pending(&self, source: InterruptSource) -> bool {
        self.pending & source.bit() != 0
    }

    /// Returns `true` while a service routine is running.
    #[must_use]
    pub const fn is_servicing(&self) -> bool {
        self.servicing
    }

    /// Picks the source to dispatch before the next fetch.
    ///
    /// Returns `None` while servicing or when nothing is pending. Otherwise
    /// the highest-priority pending bit is cleared and the controller enters
    /// service.
    pub fn poll(&mut self) -> Option<InterruptSource> {
        if self.servicing || self.pending == 0 {
            return None;
        }
        let source = InterruptSource::ALL
            .into_iter()
            .find(|source| self.is_pending(*source))?;
        self.pending &= !source.bit();
        self.servicing = true;
        Some(source)
    }

    /// Leaves service. Returns whether a routine was in service.
    pub const fn finish(&mut self) -> bool {
        let was_servicing = self.servicing;
        self.servicing = false;
        was_servicing
    }
}
