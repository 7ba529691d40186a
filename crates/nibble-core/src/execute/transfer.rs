//! Memory and IO transfers through the SA/LA address registers.

use super::{pack, unpack, Window};
use crate::decoder::{DecodedInstruction, PROGRAM_SPACE_BASE};
use crate::encoding::OpcodeForm;
use crate::memory::{IO_PORT_ADDRESS, IO_PORT_DATA};
use crate::{Cpu, Fault};

fn window_bytes(cpu: &Cpu, window: Window) -> Vec<u8> {
    let nibbles: Vec<u8> = window.ascending().rev().map(|r| cpu.reg(r)).collect();
    pack(&nibbles)
}

const fn advances_sa(form: OpcodeForm) -> bool {
    matches!(form, OpcodeForm::Psam | OpcodeForm::Plam)
}

/// `PSAM`/`STSM`: packs the destination window into memory at SA.
///
/// # Errors
///
/// Bus faults; bytes stored before the fault stay stored.
pub fn store_window(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<(), Fault> {
    let window = Window::destination(inst);
    let sa = cpu.control.sa;
    for (offset, byte) in (0u16..).zip(window_bytes(cpu, window)) {
        cpu.memory.write8(u32::from(sa.wrapping_add(offset)), byte)?;
    }
    if advances_sa(inst.form) {
        cpu.control.sa = sa.wrapping_add(u16::from(window.byte_len()));
    }
    Ok(())
}

/// `PLAM`/`LDSM`: unpacks memory at SA into the destination window.
///
/// # Errors
///
/// Bus faults; registers are only written once every byte was read.
pub fn load_window(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<(), Fault> {
    let window = Window::destination(inst);
    let sa = cpu.control.sa;
    let bytes = (0..u16::from(window.byte_len()))
        .map(|offset| cpu.memory.read8(u32::from(sa.wrapping_add(offset))))
        .collect::<Result<Vec<u8>, Fault>>()?;
    let nibbles = unpack(&bytes, usize::from(window.len));
    for (index, nibble) in window.ascending().rev().zip(nibbles) {
        cpu.set_reg(index, nibble);
    }
    if advances_sa(inst.form) {
        cpu.control.sa = sa.wrapping_add(u16::from(window.byte_len()));
    }
    Ok(())
}

/// `STLM`: streams the packed destination window to the data port.
///
/// # Errors
///
/// IO bus faults.
pub fn output_window(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<(), Fault> {
    for byte in window_bytes(cpu, Window::destination(inst)) {
        cpu.io.write8(IO_PORT_DATA, byte)?;
    }
    Ok(())
}

/// `STL`: writes `r[d] << 4 | r[s]` to the data port.
///
/// # Errors
///
/// IO bus faults.
pub fn output_pair(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<(), Fault> {
    let byte = (cpu.reg(inst.d()) << 4) | cpu.reg(inst.s());
    cpu.io.write8(IO_PORT_DATA, byte)
}

/// `PSAI`: points SA into program space.
pub fn set_source_address(cpu: &mut Cpu, inst: DecodedInstruction) {
    cpu.control.sa = PROGRAM_SPACE_BASE + inst.imm10();
}

/// `PLAI`: loads LA and mirrors its low byte to the address port.
///
/// # Errors
///
/// IO bus faults. LA keeps the new value either way.
pub fn set_lcd_address(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<(), Fault> {
    cpu.control.la = inst.imm10();
    let [low, _] = cpu.control.la.to_le_bytes();
    cpu.io.write8(IO_PORT_ADDRESS, low)
}

/// `STLI`.
///
/// # Errors
///
/// IO bus faults.
pub fn output_immediate(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<(), Fault> {
    cpu.io.write8(IO_PORT_DATA, inst.imm8())
}

/// `IN`: splits the data port byte into `r[d]` (high) and `r[s]` (low).
///
/// # Errors
///
/// IO bus faults.
pub fn input_pair(cpu: &mut Cpu, inst: DecodedInstruction) -> Result<(), Fault> {
    let byte = cpu.io.read8(IO_PORT_DATA)?;
    cpu.set_reg(inst.d(), byte >> 4);
    cpu.set_reg(inst.s(), byte & 0x0F);
    Ok(())
}
