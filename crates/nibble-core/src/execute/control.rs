//! Calls, returns, ROM-routine interception and jumps.

use super::ExecuteState;
use crate::decoder::{sign_extend, DecodedInstruction};
use crate::encoding::OpcodeForm;
use crate::memory::IO_PORT_DATA;
use crate::{Cpu, Fault};

/// Lowest CALL target that is intercepted as a display streaming routine.
pub const TRAP_STREAM_START: u16 = 0x178C;
/// End of the streaming routine block; a trap at `t` streams
/// `(TRAP_STREAM_END - t) / 2` bytes.
pub const TRAP_STREAM_END: u16 = 0x17A0;
/// CALL target intercepted as "clear the current bank".
pub const CLEAR_BANK_ROUTINE: u16 = 0x11E4;

/// Number of bytes a CALL to `target` streams, or `None` when the target is
/// not a streaming routine.
#[must_use]
pub fn trap_stream_len(target: u16) -> Option<u16> {
    if (TRAP_STREAM_START..TRAP_STREAM_END).contains(&target) && target % 2 == 0 {
        Some((TRAP_STREAM_END - target) / 2)
    } else {
        None
    }
}

fn push_word(cpu: &mut Cpu, value: u16) -> Result<(), Fault> {
    let sp = cpu.control.sp.wrapping_sub(2);
    cpu.control.sp = sp;
    let [low, high] = value.to_le_bytes();
    cpu.memory.write8(u32::from(sp), low)?;
    cpu.memory.write8(u32::from(sp.wrapping_add(1)), high)
}

fn pop_word(cpu: &mut Cpu) -> Result<u16, Fault> {
    let sp = cpu.control.sp;
    let low = cpu.memory.read8(u32::from(sp))?;
    let high = cpu.memory.read8(u32::from(sp.wrapping_add(1)))?;
    cpu.control.sp = sp.wrapping_add(2);
    Ok(u16::from_le_bytes([low, high]))
}

/// `CALL`, also used for interrupt entry with `resume` set to the
/// interrupted PC.
///
/// # Errors
///
/// Bus faults from the stack push or the streamed bytes.
pub fn call(
    cpu: &mut Cpu,
    target: u16,
    resume: u16,
    exec: &mut ExecuteState,
) -> Result<(), Fault> {
    if let Some(count) = trap_stream_len(target) {
        log::debug!(
            "intercepted {target:#06X}: streaming {count} bytes from {:#06X}",
            cpu.control.sa
        );
        for _ in 0..count {
            let byte = cpu.memory.read8(u32::from(cpu.control.sa))?;
            cpu.io.write8(IO_PORT_DATA, byte)?;
            cpu.control.sa = cpu.control.sa.wrapping_add(1);
        }
        exec.next_pc = resume;
        return Ok(());
    }

    if target == CLEAR_BANK_ROUTINE {
        log::debug!(
            "intercepted {target:#06X}: clearing bank {}",
            cpu.control.current_bank.letter()
        );
        cpu.registers.clear_bank(cpu.control.current_bank);
        exec.next_pc = resume;
        return Ok(());
    }

    push_word(cpu, resume)?;
    exec.next_pc = target;
    Ok(())
}

/// `RET`: pops the little-endian return address.
///
/// # Errors
///
/// Bus faults from the stack read.
pub fn ret(cpu: &mut Cpu, exec: &mut ExecuteState) -> Result<(), Fault> {
    exec.next_pc = pop_word(cpu)?;
    Ok(())
}

/// `HLT`: returns from the routine in service, otherwise falls through.
///
/// # Errors
///
/// Bus faults from the stack read.
pub fn hlt(cpu: &mut Cpu, exec: &mut ExecuteState) -> Result<(), Fault> {
    if cpu.interrupts.finish() {
        ret(cpu, exec)?;
        log::debug!("interrupt service finished, resuming at {:#06X}", exec.next_pc);
    }
    Ok(())
}

/// `CPFJR`/`IJMR`/`CPJR`/`BTJR`: jumps relative to `PC + 2`, counted in
/// instruction words.
pub fn relative_jump(cpu: &Cpu, inst: DecodedInstruction, exec: &mut ExecuteState) {
    let value = cpu.reg(inst.d());
    let offset = match inst.form {
        OpcodeForm::Cpfjr => (value == 0x0F).then_some(inst.offset5()),
        OpcodeForm::Ijmr => Some(sign_extend(value, 4)),
        OpcodeForm::Cpjr => ((value != 0) == inst.jumps_on_nonzero()).then_some(inst.offset5()),
        OpcodeForm::Btjr => (value & (1 << inst.bit_index()) != 0).then_some(inst.offset5()),
        _ => None,
    };
    if let Some(words) = offset {
        exec.next_pc = exec.next_pc.wrapping_add_signed(i16::from(words) * 2);
    }
}

/// `JZ`/`JNZ`/`JC`/`JNC` into program space.
pub fn conditional_jump(cpu: &Cpu, inst: DecodedInstruction, exec: &mut ExecuteState) {
    let control = &cpu.control;
    let taken = match inst.form {
        OpcodeForm::Jz => control.zero(),
        OpcodeForm::Jnz => !control.zero(),
        OpcodeForm::Jc => control.carry(),
        OpcodeForm::Jnc => !control.carry(),
        _ => false,
    };
    if taken {
        exec.next_pc = inst.target10();
    }
}
