//! Instruction disassembly.
//!
//! Formatting goes through [`Decoder`] and the field accessors of
//! [`DecodedInstruction`], so the text always reflects what the executor
//! would do with the same word.

use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::OperandShape;
use crate::execute::{fetch, INSTRUCTION_BYTES};
use crate::Cpu;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address of the instruction word.
    pub addr_start: u16,
    /// Length in bytes; always 2.
    pub len_bytes: u8,
    /// Raw instruction word.
    pub raw_word: u16,
    /// The instruction mnemonic (e.g. "ADBM", "CALL"), or `.word`.
    pub mnemonic: String,
    /// The formatted operands (e.g. "R2, R13" or "0x1810").
    pub operands: String,
    /// Whether the word matched no classification.
    pub is_illegal: bool,
}

impl DisassemblyRow {
    /// Disassembles `raw_word` as if it were fetched from `addr_start`.
    #[must_use]
    pub fn new(addr_start: u16, raw_word: u16) -> Self {
        let (mnemonic, operands, is_illegal) = match Decoder::decode(raw_word) {
            Ok(inst) => (inst.form.mnemonic().to_string(), format_operands(inst), false),
            Err(_) => (".word".to_string(), format!("0x{raw_word:04X}"), true),
        };
        Self {
            addr_start,
            len_bytes: INSTRUCTION_BYTES,
            raw_word,
            mnemonic,
            operands,
            is_illegal,
        }
    }

    /// Mnemonic and operands joined into one line.
    #[must_use]
    pub fn text(&self) -> String {
        if self.operands.is_empty() {
            self.mnemonic.clone()
        } else {
            format!("{} {}", self.mnemonic, self.operands)
        }
    }
}

/// Disassembles one opcode. Illegal words render as `.word 0xXXXX`.
#[must_use]
pub fn disassemble(opcode: u16) -> String {
    DisassemblyRow::new(0, opcode).text()
}

/// Disassembles `before` instructions ahead of `center_pc`, the instruction
/// at `center_pc` and `after` instructions following it.
///
/// Instructions are fixed-width, so the window is a plain run of words.
/// Rows whose fetch faults (unmapped or unreadable memory) are omitted.
#[must_use]
pub fn disassemble_window(
    cpu: &Cpu,
    center_pc: u16,
    before: u16,
    after: u16,
) -> Vec<DisassemblyRow> {
    let step = u16::from(INSTRUCTION_BYTES);
    let first = center_pc.wrapping_sub(before.wrapping_mul(step));
    (0..=u32::from(before) + u32::from(after))
        .filter_map(|i| {
            let offset = u16::try_from(i).ok()?.wrapping_mul(step);
            let addr = first.wrapping_add(offset);
            fetch(cpu, addr).ok().map(|word| DisassemblyRow::new(addr, word))
        })
        .collect()
}

fn reg(index: u8) -> String {
    format!("R{index}")
}

fn format_operands(inst: DecodedInstruction) -> String {
    let d = reg(inst.d().get());
    match inst.form.shape() {
        OperandShape::None => String::new(),
        OperandShape::Pair | OperandShape::Window => format!("{d}, {}", reg(inst.s().get())),
        OperandShape::RegImm => format!("{d}, #0x{:X}", inst.imm4()),
        OperandShape::Bank => format!("#{}", inst.bank_bits()),
        OperandShape::IncWindow => format!("{}..{d}", reg(inst.inc_low().get())),
        OperandShape::RegOffset => format!("{d}, {:+}", inst.offset5()),
        OperandShape::Reg => d,
        OperandShape::BitRegOffset => format!("{}, {d}, {:+}", inst.bit_index(), inst.offset5()),
        OperandShape::Target12 => format!("0x{:04X}", inst.target12()),
        OperandShape::Target10 => format!("0x{:04X}", inst.target10()),
        OperandShape::Imm10 => format!("#0x{:03X}", inst.imm10()),
        OperandShape::Imm8 => format!("#0x{:02X}", inst.imm8()),
    }
}
