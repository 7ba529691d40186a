//! Instruction execution pipeline.
//!
//! A step polls the interrupt controller, fetches and decodes one opcode,
//! runs its handler, then commits flags and the next PC. Handlers write
//! registers and buses directly, so an instruction that faults part way keeps
//! the effects it already made.

mod alu;
mod arith;
mod control;
mod flags;
mod moves;
mod transfer;
mod window;

pub use alu::NibbleOp;
pub use control::{CLEAR_BANK_ROUTINE, TRAP_STREAM_END, TRAP_STREAM_START};
pub use flags::FlagsUpdate;
pub use window::{pack, unpack, Window};

use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::OpcodeForm;
use crate::{Cpu, Fault};

/// Bytes occupied by every instruction.
pub const INSTRUCTION_BYTES: u8 = 2;

/// Side effects a handler leaves for the commit phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteState {
    /// Flag update to apply.
    pub flags: FlagsUpdate,
    /// PC after commit: `PC + 2` unless a control-flow handler overwrote it.
    pub next_pc: u16,
}

impl ExecuteState {
    /// State for an instruction at `pc` that falls through.
    #[must_use]
    pub const fn fall_through(pc: u16) -> Self {
        Self {
            flags: FlagsUpdate::None,
            next_pc: pc.wrapping_add(INSTRUCTION_BYTES as u16),
        }
    }
}

/// Reads the big-endian instruction word at `pc`.
///
/// # Errors
///
/// Propagates memory bus faults for either byte.
pub fn fetch(cpu: &Cpu, pc: u16) -> Result<u16, Fault> {
    let high = cpu.memory.read8(u32::from(pc))?;
    let low = cpu.memory.read8(u32::from(pc.wrapping_add(1)))?;
    Ok(u16::from_be_bytes([high, low]))
}

/// Runs one step: an interrupt entry if one dispatches, otherwise the
/// instruction at PC.
///
/// # Errors
///
/// Bus and decode faults from the fetched instruction.
pub fn step(cpu: &mut Cpu) -> Result<u8, Fault> {
    if let Some(source) = cpu.interrupts.poll() {
        log::debug!(
            "dispatching {source} from {:#06X} to {:#06X}",
            cpu.control.pc,
            source.routine_address()
        );
        let vector = Decoder::decode(source.vector())?;
        let resume = cpu.control.pc;
        let mut exec = ExecuteState::fall_through(resume);
        control::call(cpu, vector.target12(), resume, &mut exec)?;
        commit(cpu, exec);
        return Ok(INSTRUCTION_BYTES);
    }

    let pc = cpu.control.pc;
    let opcode = fetch(cpu, pc)?;
    let inst = Decoder::decode(opcode)?;
    log::trace!("{pc:#06X}: {opcode:04X} {}", inst.form.mnemonic());
    let exec = execute_instruction(cpu, inst)?;
    commit(cpu, exec);
    Ok(INSTRUCTION_BYTES)
}

/// Runs the handler for `inst` against the current PC without committing.
///
/// # Errors
///
/// Bus faults raised by the handler.
pub fn execute_instruction(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<ExecuteState, Fault> {
    let mut exec = ExecuteState::fall_through(cpu.control.pc);

    match inst.form {
        OpcodeForm::Nop => {}
        OpcodeForm::Ret => control::ret(cpu, &mut exec)?,
        OpcodeForm::Hlt => control::hlt(cpu, &mut exec)?,
        OpcodeForm::Add => arith::scalar(cpu, inst, NibbleOp::Add, &mut exec),
        OpcodeForm::Adb => arith::scalar(cpu, inst, NibbleOp::AddBcd, &mut exec),
        OpcodeForm::Sub => arith::scalar(cpu, inst, NibbleOp::Sub, &mut exec),
        OpcodeForm::Sbb => arith::scalar(cpu, inst, NibbleOp::SubBcd, &mut exec),
        OpcodeForm::Adm => arith::windowed(cpu, inst, NibbleOp::Add, &mut exec),
        OpcodeForm::Adbm => arith::windowed(cpu, inst, NibbleOp::AddBcd, &mut exec),
        OpcodeForm::Sbm => arith::windowed(cpu, inst, NibbleOp::Sub, &mut exec),
        OpcodeForm::Sbbm => arith::windowed(cpu, inst, NibbleOp::SubBcd, &mut exec),
        OpcodeForm::Cmp => {
            let operand = cpu.reg(inst.s());
            arith::compare(cpu, inst, operand, &mut exec);
        }
        OpcodeForm::Cpi => arith::compare(cpu, inst, inst.imm4(), &mut exec),
        OpcodeForm::Cpm => arith::compare_window(cpu, inst, &mut exec),
        OpcodeForm::Adi => arith::immediate(cpu, inst, NibbleOp::Add, &mut exec),
        OpcodeForm::Adbi => arith::immediate(cpu, inst, NibbleOp::AddBcd, &mut exec),
        OpcodeForm::Sbi => arith::immediate(cpu, inst, NibbleOp::Sub, &mut exec),
        OpcodeForm::Sbbi => arith::immediate(cpu, inst, NibbleOp::SubBcd, &mut exec),
        OpcodeForm::Andi => arith::bitwise(cpu, inst, |r, i| r & i),
        OpcodeForm::Ori => arith::bitwise(cpu, inst, |r, i| r | i),
        OpcodeForm::Xori => arith::bitwise(cpu, inst, |r, i| r ^ i),
        OpcodeForm::Inc => arith::ripple(cpu, inst, NibbleOp::Add, &mut exec),
        OpcodeForm::Incb => arith::ripple(cpu, inst, NibbleOp::AddBcd, &mut exec),
        OpcodeForm::Dec => arith::ripple(cpu, inst, NibbleOp::Sub, &mut exec),
        OpcodeForm::Decb => arith::ripple(cpu, inst, NibbleOp::SubBcd, &mut exec),
        OpcodeForm::Mov => moves::mov(cpu, inst),
        OpcodeForm::Movm => moves::mov_window(cpu, inst),
        OpcodeForm::Ldi => moves::load_immediate(cpu, inst),
        OpcodeForm::Lcrb | OpcodeForm::Larb => moves::select_bank(cpu, inst),
        OpcodeForm::Rshm => moves::shift_up(cpu, inst),
        OpcodeForm::Lshm => moves::shift_down(cpu, inst),
        OpcodeForm::Clrm => moves::clear_window(cpu, inst),
        OpcodeForm::Mvac | OpcodeForm::Mvca => moves::cross_bank(cpu, inst),
        OpcodeForm::Mvacm | OpcodeForm::Mvcam => moves::cross_bank_window(cpu, inst),
        OpcodeForm::Cpfjr
        | OpcodeForm::Ijmr
        | OpcodeForm::Cpjr
        | OpcodeForm::Btjr => control::relative_jump(cpu, inst, &mut exec),
        OpcodeForm::Call => {
            let resume = exec.next_pc;
            control::call(cpu, inst.target12(), resume, &mut exec)?;
        }
        OpcodeForm::Jmp => exec.next_pc = inst.target12(),
        OpcodeForm::Jz | OpcodeForm::Jnz | OpcodeForm::Jc | OpcodeForm::Jnc => {
            control::conditional_jump(cpu, inst, &mut exec);
        }
        OpcodeForm::Psam | OpcodeForm::Stsm => transfer::store_window(cpu, inst)?,
        OpcodeForm::Plam | OpcodeForm::Ldsm => transfer::load_window(cpu, inst)?,
        OpcodeForm::Stlm => transfer::output_window(cpu, inst)?,
        OpcodeForm::Stl => transfer::output_pair(cpu, inst)?,
        OpcodeForm::Psai => transfer::set_source_address(cpu, inst),
        OpcodeForm::Plai => transfer::set_lcd_address(cpu, inst)?,
        OpcodeForm::Stli => transfer::output_immediate(cpu, inst)?,
        OpcodeForm::In => transfer::input_pair(cpu, inst)?,
    }

    Ok(exec)
}

/// Applies the flag update and the next PC.
pub const fn commit(cpu: &mut Cpu, exec: ExecuteState) {
    exec.flags.apply(&mut cpu.control);
    cpu.control.pc = exec.next_pc;
}
