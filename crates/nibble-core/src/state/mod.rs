//! Register file and control register state.

/// Banked nibble registers and the control register block.
pub mod registers;

pub use registers::{
    Bank, ControlRegisters, RegIndex, RegisterFile, BANK_COUNT, BANK_SIZE, FLAG_CARRY, FLAG_ZERO,
    NIBBLE_MASK, RESET_PC, RESET_SP,
};
