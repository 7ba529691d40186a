//! Host-facing machine configuration and the CPU instance that owns all state.

use crate::execute;
use crate::interrupt::{InterruptController, InterruptSource};
use crate::memory::{Bus, BusConfig};
use crate::state::{Bank, ControlRegisters, RegIndex, RegisterFile, RESET_PC, RESET_SP};
use crate::Fault;

/// Top-level configuration for a machine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MachineConfig {
    /// Program counter loaded on reset.
    pub reset_pc: u16,
    /// Stack pointer loaded on reset.
    pub reset_sp: u16,
    /// Memory bus layout.
    pub memory: BusConfig,
    /// IO bus layout.
    pub io: BusConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            reset_pc: RESET_PC,
            reset_sp: RESET_SP,
            memory: BusConfig::memory(),
            io: BusConfig::io(),
        }
    }
}

/// Aggregated result of [`Cpu::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Steps that completed without a fault.
    pub steps: u32,
    /// Fault that stopped the run early, if any.
    pub fault: Option<Fault>,
}

/// One emulated microcontroller.
///
/// The CPU exclusively owns the register file, the control registers, the
/// interrupt controller and both buses. It is single-threaded: hosts raise
/// interrupts between steps from one thread.
#[derive(Debug)]
pub struct Cpu {
    pub(crate) registers: RegisterFile,
    pub(crate) control: ControlRegisters,
    pub(crate) interrupts: InterruptController,
    pub(crate) memory: Bus,
    pub(crate) io: Bus,
    reset_pc: u16,
    reset_sp: u16,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(&MachineConfig::default())
    }
}

impl Cpu {
    /// Builds a CPU with buses instantiated from `config`.
    #[must_use]
    pub fn new(config: &MachineConfig) -> Self {
        let mut cpu = Self::with_buses(config.memory.build("memory"), config.io.build("io"));
        cpu.reset_pc = config.reset_pc;
        cpu.reset_sp = config.reset_sp;
        cpu.reset();
        cpu
    }

    /// Builds a CPU around caller-assembled buses, using the stock reset vector.
    #[must_use]
    pub fn with_buses(memory: Bus, io: Bus) -> Self {
        Self {
            registers: RegisterFile::default(),
            control: ControlRegisters::default(),
            interrupts: InterruptController::default(),
            memory,
            io,
            reset_pc: RESET_PC,
            reset_sp: RESET_SP,
        }
    }

    /// Clears registers and interrupt state and reloads PC/SP. Bus contents
    /// are kept.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::default();
        self.control = ControlRegisters {
            pc: self.reset_pc,
            sp: self.reset_sp,
            ..ControlRegisters::default()
        };
        self.interrupts = InterruptController::default();
    }

    /// Copies a raw program image into memory starting at `base`.
    ///
    /// # Errors
    ///
    /// Propagates the first bus fault; bytes before it stay loaded.
    pub fn load_image(&mut self, base: u16, image: &[u8]) -> Result<(), Fault> {
        self.memory.load(u32::from(base), image)
    }

    /// Executes one instruction (or one interrupt entry) and returns the
    /// number of bytes it occupied.
    ///
    /// # Errors
    ///
    /// Any bus or decode fault. Side effects committed before the fault are
    /// kept.
    pub fn step(&mut self) -> Result<u8, Fault> {
        execute::step(self)
    }

    /// Steps up to `max_steps` times, stopping at the first fault.
    pub fn run(&mut self, max_steps: u32) -> RunOutcome {
        let mut steps = 0;
        while steps < max_steps {
            if let Err(fault) = self.step() {
                log::debug!("run stopped after {steps} steps: {fault}");
                return RunOutcome {
                    steps,
                    fault: Some(fault),
                };
            }
            steps += 1;
        }
        RunOutcome { steps, fault: None }
    }

    /// Marks an interrupt source pending.
    pub const fn raise(&mut self, source: InterruptSource) {
        self.interrupts.raise(source);
    }

    /// Interrupt controller state.
    #[must_use]
    pub const fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    /// Banked register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Mutable banked register file.
    pub const fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Control registers.
    #[must_use]
    pub const fn control(&self) -> &ControlRegisters {
        &self.control
    }

    /// Mutable control registers.
    pub const fn control_mut(&mut self) -> &mut ControlRegisters {
        &mut self.control
    }

    /// Memory bus.
    #[must_use]
    pub const fn memory(&self) -> &Bus {
        &self.memory
    }

    /// Mutable memory bus.
    pub const fn memory_mut(&mut self) -> &mut Bus {
        &mut self.memory
    }

    /// IO bus.
    #[must_use]
    pub const fn io(&self) -> &Bus {
        &self.io
    }

    /// Mutable IO bus.
    pub const fn io_mut(&mut self) -> &mut Bus {
        &mut self.io
    }

    /// Register `index` of the current bank.
    #[must_use]
    pub const fn reg(&self, index: RegIndex) -> u8 {
        self.registers.get(self.control.current_bank, index)
    }

    /// Writes register `index` of the current bank, masking to a nibble.
    pub const fn set_reg(&mut self, index: RegIndex, value: u8) {
        self.registers.set(self.control.current_bank, index, value);
    }

    pub(crate) const fn reg_in(&self, bank: Bank, index: RegIndex) -> u8 {
        self.registers.get(bank, index)
    }

    pub(crate) const fn set_reg_in(&mut self, bank: Bank, index: RegIndex, value: u8) {
        self.registers.set(bank, index, value);
    }
}
