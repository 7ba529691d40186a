/// Number of register banks.
pub const BANK_COUNT: usize = 4;
/// Number of nibble registers in each bank.
pub const BANK_SIZE: usize = 32;
/// Mask applied to every stored register cell.
pub const NIBBLE_MASK: u8 = 0x0F;
/// `F` bit for a zero result.
pub const FLAG_ZERO: u8 = 1 << 0;
/// `F` bit for carry/borrow.
pub const FLAG_CARRY: u8 = 1 << 1;
/// Program counter after reset.
pub const RESET_PC: u16 = 0x1800;
/// Stack pointer after reset.
pub const RESET_SP: u16 = 0x2000;

/// Register bank selector (`A`..`D`), masked to two bits on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Bank(u8);

impl Bank {
    /// Banks in index order.
    pub const ALL: [Self; BANK_COUNT] = [Self(0), Self(1), Self(2), Self(3)];

    /// Creates a bank selector from the low two bits of `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value & 0x03)
    }

    /// Returns the bank number (`0..=3`).
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Letter used in register names.
    #[must_use]
    pub const fn letter(self) -> char {
        match self.0 {
            0 => 'A',
            1 => 'B',
            2 => 'C',
            _ => 'D',
        }
    }

    /// Parses a bank letter.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Self(0)),
            'B' => Some(Self(1)),
            'C' => Some(Self(2)),
            'D' => Some(Self(3)),
            _ => None,
        }
    }

    const fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Register index within a bank, masked to five bits on construction.
///
/// Arithmetic on indices wraps modulo [`BANK_SIZE`], which is how windows
/// running past `31` continue at `0` of the same bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegIndex(u8);

impl RegIndex {
    /// Creates an index from the low five bits of `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value & 0x1F)
    }

    /// Returns the index (`0..=31`).
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Index `n` registers above this one, wrapping within the bank.
    #[must_use]
    pub const fn wrapping_add(self, n: u8) -> Self {
        Self::new(self.0.wrapping_add(n))
    }

    /// Index `n` registers below this one, wrapping within the bank.
    #[must_use]
    pub const fn wrapping_sub(self, n: u8) -> Self {
        Self::new(self.0.wrapping_sub(n))
    }

    const fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Four banks of 32 nibble registers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    banks: [[u8; BANK_SIZE]; BANK_COUNT],
}

impl RegisterFile {
    /// Reads one register.
    #[must_use]
    pub const fn get(&self, bank: Bank, index: RegIndex) -> u8 {
        self.banks[bank.slot()][index.slot()]
    }

    /// Writes one register, keeping only the low four bits of `value`.
    pub const fn set(&mut self, bank: Bank, index: RegIndex, value: u8) {
        self.banks[bank.slot()][index.slot()] = value & NIBBLE_MASK;
    }

    /// Zeroes all registers of `bank`.
    pub const fn clear_bank(&mut self, bank: Bank) {
        self.banks[bank.slot()] = [0; BANK_SIZE];
    }

    /// All registers of `bank` in index order.
    #[must_use]
    pub const fn bank(&self, bank: Bank) -> &[u8; BANK_SIZE] {
        &self.banks[bank.slot()]
    }
}

/// Non-banked control registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControlRegisters {
    /// Program counter.
    pub pc: u16,
    /// Stack pointer; grows downward in steps of two.
    pub sp: u16,
    /// Source address register used by the memory transfer forms.
    pub sa: u16,
    /// LCD address register.
    pub la: u16,
    /// Flags byte (`FLAG_ZERO`, `FLAG_CARRY`).
    pub flags: u8,
    /// Bank addressed by `d`/`s` register fields.
    pub current_bank: Bank,
    /// Bank used by the cross-bank move forms.
    pub additional_bank: Bank,
}

impl Default for ControlRegisters {
    fn default() -> Self {
        Self {
            pc: RESET_PC,
            sp: RESET_SP,
            sa: 0,
            la: 0,
            flags: 0,
            current_bank: Bank::default(),
            additional_bank: Bank::default(),
        }
    }
}

impl ControlRegisters {
    /// Returns the Zero flag.
    #[must_use]
    pub const fn zero(&self) -> bool {
        self.flags & FLAG_ZERO != 0
    }

    /// Returns the Carry flag.
    #[must_use]
    pub const fn carry(&self) -> bool {
        self.flags & FLAG_CARRY != 0
    }

    /// Sets or clears the Zero flag.
    pub const fn set_zero(&mut self, value: bool) {
        self.set_flag(FLAG_ZERO, value);
    }

    /// Sets or clears the Carry flag.
    pub const fn set_carry(&mut self, value: bool) {
        self.set_flag(FLAG_CARRY, value);
    }

    const fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }
}
