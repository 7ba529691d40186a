//! Instruction decoder.
//!
//! Decoding is a pure function of the 16-bit opcode: classification through
//! [`OPCODE_TABLE`](crate::encoding::OPCODE_TABLE) plus field extraction
//! helpers shared by the executor and the disassembler.

use crate::encoding::{classify, OpcodeForm};
use crate::state::RegIndex;
use crate::Fault;

/// Base of the program space targeted by the conditional jumps and `PSAI`.
pub const PROGRAM_SPACE_BASE: u16 = 0x1800;

/// Classified opcode with field accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Raw opcode.
    pub raw: u16,
    /// Instruction form.
    pub form: OpcodeForm,
}

#[allow(clippy::cast_possible_truncation)]
impl DecodedInstruction {
    /// Destination register field, bits 9..5.
    #[must_use]
    pub const fn d(self) -> RegIndex {
        RegIndex::new((self.raw >> 5) as u8)
    }

    /// Source register field, bits 4..0.
    #[must_use]
    pub const fn s(self) -> RegIndex {
        RegIndex::new(self.raw as u8)
    }

    /// 4-bit immediate, bits 4..1.
    #[must_use]
    pub const fn imm4(self) -> u8 {
        ((self.raw >> 1) & 0x0F) as u8
    }

    /// Window extent `k = (s - d) mod 8`; a window spans `k + 1` registers.
    #[must_use]
    pub const fn window_extent(self) -> u8 {
        self.s().get().wrapping_sub(self.d().get()) & 0x07
    }

    /// Lowest register of the INC-family window.
    #[must_use]
    pub const fn inc_low(self) -> RegIndex {
        RegIndex::new((self.d().get() & 0x18) | (self.raw as u8 & 0x07))
    }

    /// Number of registers in the INC-family window.
    #[must_use]
    pub const fn inc_len(self) -> u8 {
        (self.d().get().wrapping_sub(self.inc_low().get()) & 0x07) + 1
    }

    /// Register `i` of the INC-family window, counted from its low end.
    ///
    /// The window stays inside the aligned group of eight holding `d`, so it
    /// always ends at `d`.
    #[must_use]
    pub const fn inc_register(self, i: u8) -> RegIndex {
        let group = self.d().get() & 0x18;
        RegIndex::new(group | (self.inc_low().get().wrapping_add(i) & 0x07))
    }

    /// Bank number carried by `LCRB`/`LARB`.
    #[must_use]
    pub const fn bank_bits(self) -> u8 {
        (self.raw & 0x03) as u8
    }

    /// Signed 5-bit word offset held in the `s` field.
    #[must_use]
    pub const fn offset5(self) -> i8 {
        sign_extend(self.raw as u8 & 0x1F, 5)
    }

    /// Bit index tested by `BTJR`, bits 11..10.
    #[must_use]
    pub const fn bit_index(self) -> u8 {
        ((self.raw >> 10) & 0x03) as u8
    }

    /// `CPJR` condition bit: `true` jumps when the register is non-zero.
    #[must_use]
    pub const fn jumps_on_nonzero(self) -> bool {
        self.raw & 0x0400 != 0
    }

    /// Absolute byte target of `CALL`/`JMP`.
    #[must_use]
    pub const fn target12(self) -> u16 {
        (self.raw & 0x0FFF) << 1
    }

    /// Program-space byte target of the conditional jumps.
    #[must_use]
    pub const fn target10(self) -> u16 {
        PROGRAM_SPACE_BASE + ((self.raw & 0x03FF) << 1)
    }

    /// 10-bit immediate of `PSAI`/`PLAI`.
    #[must_use]
    pub const fn imm10(self) -> u16 {
        self.raw & 0x03FF
    }

    /// 8-bit immediate of `STLI`.
    #[must_use]
    pub const fn imm8(self) -> u8 {
        self.raw as u8
    }
}

/// Sign-extends the low `bits` bits of `value`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn sign_extend(value: u8, bits: u32) -> i8 {
    let shift = 8 - bits;
    ((value << shift) as i8) >> shift
}

/// Stateless decoder front end.
pub struct Decoder;

impl Decoder {
    /// Classifies `opcode`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::IllegalOpcode`] when no table entry matches.
    pub fn decode(opcode: u16) -> Result<DecodedInstruction, Fault> {
        classify(opcode)
            .map(|form| DecodedInstruction { raw: opcode, form })
            .ok_or(Fault::IllegalOpcode(opcode))
    }
}

#[cfg(test)]
mod tests {
    use super::{sign_extend, Decoder};
    use crate::encoding::OpcodeForm;
    use crate::Fault;

    #[test]
    fn register_fields_split_at_bit_five() {
        // ADD R3, R5
        let inst = Decoder::decode(0x0400 | (3 << 5) | 5).expect("legal");
        assert_eq!(inst.form, OpcodeForm::Add);
        assert_eq!(inst.d().get(), 3);
        assert_eq!(inst.s().get(), 5);
        assert_eq!(inst.window_extent(), 2);
    }

    #[test]
    fn window_extent_wraps_modulo_eight() {
        // d = 30, s = 1 -> k = 3, window 30, 31, 0, 1
        let inst = Decoder::decode(0x1400 | (30 << 5) | 1).expect("legal");
        assert_eq!(inst.window_extent(), 3);
        // d = 5, s = 4 -> k = 7
        let inst = Decoder::decode(0x1400 | (5 << 5) | 4).expect("legal");
        assert_eq!(inst.window_extent(), 7);
    }

    #[test]
    fn inc_window_is_taken_from_the_low_three_bits() {
        // d = 13, low bits 3 -> low = 8 | 3 = 11, three registers
        let inst = Decoder::decode(0x5C00 | (13 << 5) | 3).expect("legal");
        assert_eq!(inst.form, OpcodeForm::Inc);
        assert_eq!(inst.inc_low().get(), 11);
        assert_eq!(inst.inc_len(), 3);

        // low above d wraps inside the group of eight: 14, 15, 8, 9
        let inst = Decoder::decode(0x5C00 | (9 << 5) | 6).expect("legal");
        assert_eq!(inst.inc_low().get(), 14);
        assert_eq!(inst.inc_len(), 4);
        let window: Vec<u8> = (0..4).map(|i| inst.inc_register(i).get()).collect();
        assert_eq!(window, vec![14, 15, 8, 9]);
    }

    #[test]
    fn immediates_and_targets() {
        let ldi = Decoder::decode(0x3800 | (2 << 5) | (9 << 1)).expect("legal");
        assert_eq!(ldi.imm4(), 9);

        let call = Decoder::decode(0xAC08).expect("legal");
        assert_eq!(call.target12(), 0x1810);

        let jz = Decoder::decode(0xC000 | 0x0010).expect("legal");
        assert_eq!(jz.target10(), 0x1820);

        let psai = Decoder::decode(0xE800 | 0x03FF).expect("legal");
        assert_eq!(psai.imm10(), 0x03FF);

        let btjr = Decoder::decode(0x9C00 | (4 << 5) | 0x1F).expect("legal");
        assert_eq!(btjr.bit_index(), 3);
        assert_eq!(btjr.offset5(), -1);

        let cpjr = Decoder::decode(0x8C00).expect("legal");
        assert!(cpjr.jumps_on_nonzero());
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0x0F, 5), 15);
        assert_eq!(sign_extend(0x10, 5), -16);
        assert_eq!(sign_extend(0x08, 4), -8);
        assert_eq!(sign_extend(0x07, 4), 7);
    }

    #[test]
    fn illegal_opcode_carries_the_raw_word() {
        assert_eq!(Decoder::decode(0x3D00), Err(Fault::IllegalOpcode(0x3D00)));
        assert_eq!(Decoder::decode(0xFFFF), Err(Fault::IllegalOpcode(0xFFFF)));
    }
}
