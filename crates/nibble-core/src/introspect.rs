//! Named-register access and address-based disassembly for debuggers.
//!
//! Banked cells are named `R<bank letter><index>` (`RA0` .. `RD31`); the
//! control registers are `PC`, `F`, `CB`, `AB`, `SA` and `SP`. Names are
//! case-sensitive. Unlike the instruction paths, writes through this layer
//! are range-checked and rejected instead of masked.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::decoder::Decoder;
use crate::disasm::DisassemblyRow;
use crate::execute::fetch;
use crate::state::{Bank, RegIndex, BANK_SIZE};
use crate::{Cpu, Fault};

/// A register addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterName {
    /// One 4-bit cell of a bank.
    Banked {
        /// Bank holding the cell.
        bank: Bank,
        /// Cell index inside the bank.
        index: RegIndex,
    },
    /// Program counter.
    Pc,
    /// Flags.
    Flags,
    /// Current bank selector.
    CurrentBank,
    /// Additional bank selector.
    AdditionalBank,
    /// Source address register.
    Sa,
    /// Stack pointer.
    Sp,
}

impl RegisterName {
    /// Control registers in display order.
    pub const SCALARS: [Self; 6] = [
        Self::Pc,
        Self::Flags,
        Self::CurrentBank,
        Self::AdditionalBank,
        Self::Sa,
        Self::Sp,
    ];

    /// Width in bits reported to tooling: 16 for `PC` and `SA`, 4 for the
    /// rest.
    #[must_use]
    pub const fn size_bits(self) -> u8 {
        match self {
            Self::Pc | Self::Sa => 16,
            _ => 4,
        }
    }

    /// Values [`Cpu::set_register_value`] accepts.
    ///
    /// Banked cells accept `-8..=15`, then keep the low four bits.
    #[must_use]
    pub const fn accepted_range(self) -> RangeInclusive<i32> {
        match self {
            Self::Banked { .. } => -8..=15,
            Self::Pc | Self::Sa | Self::Sp => 0..=0xFFFF,
            Self::Flags => 0..=0xFF,
            Self::CurrentBank | Self::AdditionalBank => 0..=3,
        }
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Banked { bank, index } => write!(f, "R{}{}", bank.letter(), index.get()),
            Self::Pc => f.write_str("PC"),
            Self::Flags => f.write_str("F"),
            Self::CurrentBank => f.write_str("CB"),
            Self::AdditionalBank => f.write_str("AB"),
            Self::Sa => f.write_str("SA"),
            Self::Sp => f.write_str("SP"),
        }
    }
}

fn parse_index(digits: &str) -> Option<RegIndex> {
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let index: usize = digits.parse().ok()?;
    let index = u8::try_from(index).ok().filter(|_| index < BANK_SIZE)?;
    Some(RegIndex::new(index))
}

impl FromStr for RegisterName {
    type Err = Fault;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let scalar = match name {
            "PC" => Some(Self::Pc),
            "F" => Some(Self::Flags),
            "CB" => Some(Self::CurrentBank),
            "AB" => Some(Self::AdditionalBank),
            "SA" => Some(Self::Sa),
            "SP" => Some(Self::Sp),
            _ => None,
        };
        if let Some(register) = scalar {
            return Ok(register);
        }

        let mut chars = name.chars();
        let banked = match (chars.next(), chars.next()) {
            (Some('R'), Some(letter)) => Bank::from_letter(letter)
                .zip(parse_index(chars.as_str()))
                .map(|(bank, index)| Self::Banked { bank, index }),
            _ => None,
        };
        banked.ok_or_else(|| Fault::IllegalRegisterName(name.to_string()))
    }
}

/// Every register name: banks `A`..`D` cell by cell, then the control
/// registers.
#[must_use]
pub fn register_names() -> impl Iterator<Item = RegisterName> {
    Bank::ALL
        .into_iter()
        .flat_map(|bank| {
            (0..BANK_SIZE)
                .filter_map(|i| u8::try_from(i).ok())
                .map(move |i| RegisterName::Banked {
                    bank,
                    index: RegIndex::new(i),
                })
        })
        .chain(RegisterName::SCALARS)
}

/// Bit width of the named register.
///
/// # Errors
///
/// [`Fault::IllegalRegisterName`] for unknown names.
pub fn register_size(name: &str) -> Result<u8, Fault> {
    Ok(name.parse::<RegisterName>()?.size_bits())
}

impl Cpu {
    /// Reads a register by name.
    ///
    /// # Errors
    ///
    /// [`Fault::IllegalRegisterName`] for unknown names.
    pub fn register_value(&self, name: &str) -> Result<u16, Fault> {
        Ok(self.read_register(name.parse()?))
    }

    /// Reads a parsed register.
    #[must_use]
    pub fn read_register(&self, register: RegisterName) -> u16 {
        let control = &self.control;
        match register {
            RegisterName::Banked { bank, index } => u16::from(self.registers.get(bank, index)),
            RegisterName::Pc => control.pc,
            RegisterName::Flags => u16::from(control.flags),
            RegisterName::CurrentBank => u16::from(control.current_bank.get()),
            RegisterName::AdditionalBank => u16::from(control.additional_bank.get()),
            RegisterName::Sa => control.sa,
            RegisterName::Sp => control.sp,
        }
    }

    /// Writes a register by name after checking the value against
    /// [`RegisterName::accepted_range`].
    ///
    /// # Errors
    ///
    /// [`Fault::IllegalRegisterName`] for unknown names and
    /// [`Fault::IllegalRegisterValue`] for out-of-range values. A rejected
    /// write changes nothing.
    pub fn set_register_value(&mut self, name: &str, value: i32) -> Result<(), Fault> {
        let register: RegisterName = name.parse()?;
        let rejected = || Fault::IllegalRegisterValue {
            name: name.to_string(),
            value,
        };
        if !register.accepted_range().contains(&value) {
            return Err(rejected());
        }
        let word = u16::try_from(value & 0xFFFF).map_err(|_| rejected())?;
        let [low, _] = word.to_le_bytes();

        let control = &mut self.control;
        match register {
            RegisterName::Banked { bank, index } => self.registers.set(bank, index, low),
            RegisterName::Pc => control.pc = word,
            RegisterName::Flags => control.flags = low,
            RegisterName::CurrentBank => control.current_bank = Bank::new(low),
            RegisterName::AdditionalBank => control.additional_bank = Bank::new(low),
            RegisterName::Sa => control.sa = word,
            RegisterName::Sp => control.sp = word,
        }
        Ok(())
    }

    /// Disassembles the word at `address`, fetched and classified exactly as
    /// the executor does. Returns the text and the instruction length.
    ///
    /// # Errors
    ///
    /// Bus faults from the fetch and [`Fault::IllegalOpcode`] for a word no
    /// table entry matches.
    pub fn decode(&self, address: u16) -> Result<(String, u8), Fault> {
        let word = fetch(self, address)?;
        Decoder::decode(word)?;
        let row = DisassemblyRow::new(address, word);
        Ok((row.text(), row.len_bytes))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{register_names, register_size, RegisterName};
    use crate::memory::Bus;
    use crate::state::{Bank, RegIndex};
    use crate::{Cpu, Fault};

    #[test]
    fn banked_round_trip() {
        let mut cpu = Cpu::default();
        cpu.set_register_value("RB7", 9).expect("in range");
        assert_eq!(cpu.register_value("RB7"), Ok(9));
        assert_eq!(cpu.registers().get(Bank::new(1), RegIndex::new(7)), 9);
        assert_eq!(
            cpu.set_register_value("RB7", 16),
            Err(Fault::IllegalRegisterValue {
                name: "RB7".to_string(),
                value: 16
            })
        );
        assert_eq!(cpu.register_value("RB7"), Ok(9), "rejected writes change nothing");
    }

    #[test]
    fn banked_writes_accept_down_to_minus_eight() {
        let mut cpu = Cpu::default();
        cpu.set_register_value("RD31", -8).expect("lower bound");
        assert_eq!(cpu.register_value("RD31"), Ok(8));
        cpu.set_register_value("RD31", -1).expect("in range");
        assert_eq!(cpu.register_value("RD31"), Ok(0xF));
        assert!(cpu.set_register_value("RD31", -9).is_err());
    }

    #[rstest]
    #[case("PC", 0xFFFF, true)]
    #[case("PC", 0x1_0000, false)]
    #[case("SP", -1, false)]
    #[case("SA", 0x1900, true)]
    #[case("F", 0xFF, true)]
    #[case("F", 0x100, false)]
    #[case("CB", 3, true)]
    #[case("AB", 4, false)]
    fn scalar_ranges(#[case] name: &str, #[case] value: i32, #[case] accepted: bool) {
        let mut cpu = Cpu::default();
        let result = cpu.set_register_value(name, value);
        assert_eq!(result.is_ok(), accepted, "{name} = {value}");
        if accepted {
            assert_eq!(cpu.register_value(name).map(i32::from), Ok(value));
        }
    }

    #[test]
    fn bank_selectors_drive_the_instruction_view() {
        let mut cpu = Cpu::default();
        cpu.set_register_value("RC4", 0xA).expect("in range");
        cpu.set_register_value("CB", 2).expect("in range");
        assert_eq!(cpu.reg(RegIndex::new(4)), 0xA);
    }

    #[rstest]
    #[case("RE1")]
    #[case("ra1")]
    #[case("RA32")]
    #[case("RA")]
    #[case("RA01")]
    #[case("RA+1")]
    #[case("pc")]
    #[case("LA")]
    #[case("")]
    fn illegal_names(#[case] name: &str) {
        assert_eq!(
            Cpu::default().register_value(name),
            Err(Fault::IllegalRegisterName(name.to_string()))
        );
    }

    #[test]
    fn sizes_follow_register_class() {
        assert_eq!(register_size("PC"), Ok(16));
        assert_eq!(register_size("SA"), Ok(16));
        assert_eq!(register_size("SP"), Ok(4));
        assert_eq!(register_size("RA0"), Ok(4));
        assert!(register_size("XX").is_err());
    }

    #[test]
    fn names_enumerate_every_register_and_parse_back() {
        let names: Vec<RegisterName> = register_names().collect();
        assert_eq!(names.len(), 4 * 32 + 6);
        for name in names {
            assert_eq!(name.to_string().parse::<RegisterName>(), Ok(name));
        }
    }

    #[test]
    fn decode_fetches_through_the_memory_bus() {
        let mut cpu = Cpu::default();
        cpu.load_image(0x1800, &[0xAC, 0x08, 0x3D, 0x00]).expect("ram");
        assert_eq!(cpu.decode(0x1800), Ok(("CALL 0x1810".to_string(), 2)));
        assert_eq!(cpu.decode(0x1802), Err(Fault::IllegalOpcode(0x3D00)));

        let cpu = Cpu::with_buses(Bus::new("memory"), Bus::new("io"));
        assert_eq!(cpu.decode(0x1800), Err(Fault::UnmappedAddress { addr: 0x1800 }));
    }
}
