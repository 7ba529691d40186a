//! Core emulator for a 4-bit BCD calculator-watch microcontroller.

/// Addressable devices, buses and the stock address layout.
pub mod memory;
pub use memory::{
    Addressable, AddressRange, Bus, BusConfig, ByteMemory, DeviceConfig, DeviceKind, Endianness,
    NibbleMemory, IO_PORT_ADDRESS, IO_PORT_DATA, PROGRAM_BASE, PROGRAM_END, SYSTEM_ROM_END,
    SYSTEM_ROM_START,
};

/// IO bus peripherals.
pub mod peripherals;
pub use peripherals::PortLatch;

/// Host-facing machine configuration and CPU instance.
pub mod api;
pub use api::{Cpu, MachineConfig, RunOutcome};

/// Banked register file and control registers.
pub mod state;
pub use state::{
    Bank, ControlRegisters, RegIndex, RegisterFile, FLAG_CARRY, FLAG_ZERO, RESET_PC, RESET_SP,
};

/// Fixed-priority interrupt controller.
pub mod interrupt;
pub use interrupt::{InterruptController, InterruptSource};

/// Ordered opcode classification table.
pub mod encoding;
pub use encoding::{classify, OpcodeForm, OperandShape, OPCODE_TABLE};

/// Opcode field extraction.
pub mod decoder;
pub use decoder::{DecodedInstruction, Decoder, PROGRAM_SPACE_BASE};

/// Fault taxonomy shared by every layer.
pub mod fault;
pub use fault::{Fault, FaultClass};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    commit, execute_instruction, step, ExecuteState, FlagsUpdate, NibbleOp, CLEAR_BANK_ROUTINE,
    INSTRUCTION_BYTES, TRAP_STREAM_END, TRAP_STREAM_START,
};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble, disassemble_window, DisassemblyRow};

/// Named-register access for debuggers.
pub mod introspect;
pub use introspect::{register_names, register_size, RegisterName};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
