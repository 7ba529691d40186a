//! Flag update behaviors for the different instruction classes.

use crate::state::ControlRegisters;

/// Describes how `F` should be updated after an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// No change to `F`.
    #[default]
    None,
    /// Update Carry only; Zero keeps its previous value.
    Carry(bool),
    /// Update both Carry and Zero.
    CarryZero {
        /// Carry/borrow flag.
        carry: bool,
        /// Zero flag.
        zero: bool,
    },
}

impl FlagsUpdate {
    /// Writes the update into the control registers.
    pub const fn apply(self, control: &mut ControlRegisters) {
        match self {
            Self::None => {}
            Self::Carry(carry) => control.set_carry(carry),
            Self::CarryZero { carry, zero } => {
                control.set_carry(carry);
                control.set_zero(zero);
            }
        }
    }
}
