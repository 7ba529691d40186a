use thiserror::Error;

/// Fault classes used to group failures by the layer that raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// A memory or IO bus access could not be served.
    Bus,
    /// The decoder found no classification for an opcode.
    Decode,
    /// Debugger/tooling input was rejected by the introspection layer.
    Introspection,
}

/// Every failure the core can report.
///
/// All variants are caller errors (bad configuration, bad program, bad
/// debugger input). None are transient, so the core never retries and an
/// instruction that fails part way keeps whatever side effects it had
/// already committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// No device on the bus claims the address.
    #[error("no device mapped at address {addr:#06X}")]
    UnmappedAddress {
        /// Address that missed every device.
        addr: u32,
    },
    /// A nibble-granular device was asked to store a value above 15.
    #[error("value {value:#X} does not fit the 4-bit cell at {addr:#06X}")]
    OutOfRangeValue {
        /// Target address of the rejected store.
        addr: u32,
        /// Rejected value.
        value: u8,
    },
    /// The device serving the address does not allow reads.
    #[error("device at {addr:#06X} is not readable")]
    ReadDenied {
        /// Address of the rejected read.
        addr: u32,
    },
    /// The device serving the address does not allow writes.
    #[error("device at {addr:#06X} is not writable")]
    WriteDenied {
        /// Address of the rejected write.
        addr: u32,
    },
    /// The opcode matched no entry of the classification table.
    #[error("illegal opcode {0:#06X}")]
    IllegalOpcode(u16),
    /// The register name is not part of the introspection namespace.
    #[error("illegal register name {0:?}")]
    IllegalRegisterName(String),
    /// The value is outside the legal input range of the named register.
    #[error("illegal value {value} for register {name}")]
    IllegalRegisterValue {
        /// Register the write targeted.
        name: String,
        /// Rejected input value.
        value: i32,
    },
}

impl Fault {
    /// Returns the fault class for this fault.
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::UnmappedAddress { .. }
            | Self::OutOfRangeValue { .. }
            | Self::ReadDenied { .. }
            | Self::WriteDenied { .. } => FaultClass::Bus,
            Self::IllegalOpcode(_) => FaultClass::Decode,
            Self::IllegalRegisterName(_) | Self::IllegalRegisterValue { .. } => {
                FaultClass::Introspection
            }
        }
    }

    /// Returns the raw opcode carried by [`Fault::IllegalOpcode`].
    #[must_use]
    pub const fn opcode(&self) -> Option<u16> {
        match self {
            Self::IllegalOpcode(op) => Some(*op),
            _ => None,
        }
    }
}
