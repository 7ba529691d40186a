/// Every instruction form of the ISA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum OpcodeForm {
    Nop,
    Ret,
    Hlt,
    Add,
    Adb,
    Sub,
    Sbb,
    Adm,
    Adbm,
    Sbm,
    Sbbm,
    Cmp,
    Cpm,
    Mov,
    Movm,
    Cpi,
    Ldi,
    Lcrb,
    Larb,
    Adi,
    Adbi,
    Sbi,
    Sbbi,
    Andi,
    Ori,
    Xori,
    Inc,
    Incb,
    Dec,
    Decb,
    Rshm,
    Lshm,
    Clrm,
    Mvac,
    Mvacm,
    Mvca,
    Mvcam,
    Cpfjr,
    Ijmr,
    Cpjr,
    Btjr,
    Call,
    Jmp,
    Jz,
    Jnz,
    Jc,
    Jnc,
    Psam,
    Plam,
    Ldsm,
    Stsm,
    Stlm,
    Stl,
    Psai,
    Plai,
    Stli,
    In,
}

/// How an instruction's operand bits are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandShape {
    /// No operands.
    None,
    /// Register pair `d, s`.
    Pair,
    /// Register window selected by `d, s`.
    Window,
    /// Register `d` and a 4-bit immediate.
    RegImm,
    /// 2-bit bank number.
    Bank,
    /// INC-family window ending at `d`.
    IncWindow,
    /// Register `d` and a 5-bit signed word offset in `s`.
    RegOffset,
    /// Register `d` alone.
    Reg,
    /// Bit index, register `d` and a 5-bit offset.
    BitRegOffset,
    /// 12-bit word target.
    Target12,
    /// 10-bit word target inside program space.
    Target10,
    /// 10-bit immediate.
    Imm10,
    /// 8-bit immediate.
    Imm8,
}

impl OpcodeForm {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Ret => "RET",
            Self::Hlt => "HLT",
            Self::Add => "ADD",
            Self::Adb => "ADB",
            Self::Sub => "SUB",
            Self::Sbb => "SBB",
            Self::Adm => "ADM",
            Self::Adbm => "ADBM",
            Self::Sbm => "SBM",
            Self::Sbbm => "SBBM",
            Self::Cmp => "CMP",
            Self::Cpm => "CPM",
            Self::Mov => "MOV",
            Self::Movm => "MOVM",
            Self::Cpi => "CPI",
            Self::Ldi => "LDI",
            Self::Lcrb => "LCRB",
            Self::Larb => "LARB",
            Self::Adi => "ADI",
            Self::Adbi => "ADBI",
            Self::Sbi => "SBI",
            Self::Sbbi => "SBBI",
            Self::Andi => "ANDI",
            Self::Ori => "ORI",
            Self::Xori => "XORI",
            Self::Inc => "INC",
            Self::Incb => "INCB",
            Self::Dec => "DEC",
            Self::Decb => "DECB",
            Self::Rshm => "RSHM",
            Self::Lshm => "LSHM",
            Self::Clrm => "CLRM",
            Self::Mvac => "MVAC",
            Self::Mvacm => "MVACM",
            Self::Mvca => "MVCA",
            Self::Mvcam => "MVCAM",
            Self::Cpfjr => "CPFJR",
            Self::Ijmr => "IJMR",
            Self::Cpjr => "CPJR",
            Self::Btjr => "BTJR",
            Self::Call => "CALL",
            Self::Jmp => "JMP",
            Self::Jz => "JZ",
            Self::Jnz => "JNZ",
            Self::Jc => "JC",
            Self::Jnc => "JNC",
            Self::Psam => "PSAM",
            Self::Plam => "PLAM",
            Self::Ldsm => "LDSM",
            Self::Stsm => "STSM",
            Self::Stlm => "STLM",
            Self::Stl => "STL",
            Self::Psai => "PSAI",
            Self::Plai => "PLAI",
            Self::Stli => "STLI",
            Self::In => "IN",
        }
    }

    /// Operand layout used by the disassembler.
    #[must_use]
    pub const fn shape(self) -> OperandShape {
        match self {
            Self::Nop | Self::Ret | Self::Hlt => OperandShape::None,
            Self::Add
            | Self::Adb
            | Self::Sub
            | Self::Sbb
            | Self::Cmp
            | Self::Mov
            | Self::Mvac
            | Self::Mvca
            | Self::Stl
            | Self::In => OperandShape::Pair,
            Self::Adm
            | Self::Adbm
            | Self::Sbm
            | Self::Sbbm
            | Self::Cpm
            | Self::Movm
            | Self::Rshm
            | Self::Lshm
            | Self::Clrm
            | Self::Mvacm
            | Self::Mvcam
            | Self::Psam
            | Self::Plam
            | Self::Ldsm
            | Self::Stsm
            | Self::Stlm => OperandShape::Window,
            Self::Cpi
            | Self::Ldi
            | Self::Adi
            | Self::Adbi
            | Self::Sbi
            | Self::Sbbi
            | Self::Andi
            | Self::Ori
            | Self::Xori => OperandShape::RegImm,
            Self::Lcrb | Self::Larb => OperandShape::Bank,
            Self::Inc | Self::Incb | Self::Dec | Self::Decb => OperandShape::IncWindow,
            Self::Cpfjr | Self::Cpjr => OperandShape::RegOffset,
            Self::Ijmr => OperandShape::Reg,
            Self::Btjr => OperandShape::BitRegOffset,
            Self::Call | Self::Jmp => OperandShape::Target12,
            Self::Jz | Self::Jnz | Self::Jc | Self::Jnc => OperandShape::Target10,
            Self::Psai | Self::Plai => OperandShape::Imm10,
            Self::Stli => OperandShape::Imm8,
        }
    }
}

/// Ordered `(mask, value, form)` classification table.
///
/// The first entry with `opcode & mask == value` wins. Opcodes matching no
/// entry are illegal.
pub const OPCODE_TABLE: &[(u16, u16, OpcodeForm)] = &[
    (0xFFFF, 0x0000, OpcodeForm::Nop),
    (0xFFFF, 0x0001, OpcodeForm::Ret),
    (0xFFFF, 0x0002, OpcodeForm::Hlt),
    (0xFC00, 0x0400, OpcodeForm::Add),
    (0xFC00, 0x0800, OpcodeForm::Adb),
    (0xFC00, 0x0C00, OpcodeForm::Sub),
    (0xFC00, 0x1000, OpcodeForm::Sbb),
    (0xFC00, 0x1400, OpcodeForm::Adm),
    (0xFC00, 0x1800, OpcodeForm::Adbm),
    (0xFC00, 0x1C00, OpcodeForm::Sbm),
    (0xFC00, 0x2000, OpcodeForm::Sbbm),
    (0xFC00, 0x2400, OpcodeForm::Cmp),
    (0xFC00, 0x2800, OpcodeForm::Cpm),
    (0xFC00, 0x2C00, OpcodeForm::Mov),
    (0xFC00, 0x3000, OpcodeForm::Movm),
    (0xFC00, 0x3400, OpcodeForm::Cpi),
    (0xFC00, 0x3800, OpcodeForm::Ldi),
    (0xFFFC, 0x3C00, OpcodeForm::Lcrb),
    (0xFFFC, 0x3E00, OpcodeForm::Larb),
    (0xFC00, 0x4000, OpcodeForm::Adi),
    (0xFC00, 0x4400, OpcodeForm::Adbi),
    (0xFC00, 0x4800, OpcodeForm::Sbi),
    (0xFC00, 0x4C00, OpcodeForm::Sbbi),
    (0xFC00, 0x5000, OpcodeForm::Andi),
    (0xFC00, 0x5400, OpcodeForm::Ori),
    (0xFC00, 0x5800, OpcodeForm::Xori),
    (0xFC18, 0x5C00, OpcodeForm::Inc),
    (0xFC18, 0x5C08, OpcodeForm::Incb),
    (0xFC18, 0x5C10, OpcodeForm::Dec),
    (0xFC18, 0x5C18, OpcodeForm::Decb),
    (0xFC00, 0x6000, OpcodeForm::Rshm),
    (0xFC00, 0x6400, OpcodeForm::Lshm),
    (0xFC00, 0x6800, OpcodeForm::Clrm),
    (0xFC00, 0x6C00, OpcodeForm::Mvac),
    (0xFC00, 0x7000, OpcodeForm::Mvacm),
    (0xFC00, 0x7400, OpcodeForm::Mvca),
    (0xFC00, 0x7800, OpcodeForm::Mvcam),
    (0xFC00, 0x8000, OpcodeForm::Cpfjr),
    (0xFC00, 0x8400, OpcodeForm::Ijmr),
    (0xF800, 0x8800, OpcodeForm::Cpjr),
    (0xF000, 0x9000, OpcodeForm::Btjr),
    (0xF000, 0xA000, OpcodeForm::Call),
    (0xF000, 0xB000, OpcodeForm::Jmp),
    (0xFC00, 0xC000, OpcodeForm::Jz),
    (0xFC00, 0xC400, OpcodeForm::Jnz),
    (0xFC00, 0xC800, OpcodeForm::Jc),
    (0xFC00, 0xCC00, OpcodeForm::Jnc),
    (0xFC00, 0xD000, OpcodeForm::Psam),
    (0xFC00, 0xD400, OpcodeForm::Plam),
    (0xFC00, 0xD800, OpcodeForm::Ldsm),
    (0xFC00, 0xDC00, OpcodeForm::Stsm),
    (0xFC00, 0xE000, OpcodeForm::Stlm),
    (0xFC00, 0xE400, OpcodeForm::Stl),
    (0xFC00, 0xE800, OpcodeForm::Psai),
    (0xFC00, 0xEC00, OpcodeForm::Plai),
    (0xFF00, 0xF000, OpcodeForm::Stli),
    (0xFC00, 0xF400, OpcodeForm::In),
];

/// Returns the form of `opcode`, or `None` when it is illegal.
#[must_use]
pub fn classify(opcode: u16) -> Option<OpcodeForm> {
    OPCODE_TABLE
        .iter()
        .find_map(|&(mask, value, form)| (opcode & mask == value).then_some(form))
}
