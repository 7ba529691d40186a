//! Arithmetic, compare and bitwise handlers.

use super::{ExecuteState, FlagsUpdate, NibbleOp, Window};
use crate::decoder::DecodedInstruction;
use crate::state::RegIndex;
use crate::Cpu;

/// Subtract forms report Zero; add forms leave it alone.
const fn scalar_flags(op: NibbleOp, carry: bool, digit: u8) -> FlagsUpdate {
    match op {
        NibbleOp::Add | NibbleOp::AddBcd => FlagsUpdate::Carry(carry),
        NibbleOp::Sub | NibbleOp::SubBcd => FlagsUpdate::CarryZero {
            carry,
            zero: digit == 0,
        },
    }
}

fn apply_to_destination(cpu: &mut Cpu, d: RegIndex, operand: u8, op: NibbleOp) -> FlagsUpdate {
    let (digit, carry) = op.apply(cpu.reg(d), operand, false);
    cpu.set_reg(d, digit);
    scalar_flags(op, carry, digit)
}

/// `ADD`/`ADB`/`SUB`/`SBB`: `r[d] ← r[d] ± r[s]`.
pub fn scalar(cpu: &mut Cpu, inst: DecodedInstruction, op: NibbleOp, exec: &mut ExecuteState) {
    let operand = cpu.reg(inst.s());
    exec.flags = apply_to_destination(cpu, inst.d(), operand, op);
}

/// `ADI`/`ADBI`/`SBI`/`SBBI`: `r[d] ← r[d] ± imm4`.
pub fn immediate(cpu: &mut Cpu, inst: DecodedInstruction, op: NibbleOp, exec: &mut ExecuteState) {
    exec.flags = apply_to_destination(cpu, inst.d(), inst.imm4(), op);
}

/// Ripples `op` over `len` registers from low to high and returns the final
/// carry. Zero is not reported.
fn ripple_over(
    cpu: &mut Cpu,
    len: u8,
    dst: impl Fn(u8) -> RegIndex,
    operand: impl Fn(&Cpu, u8) -> u8,
    op: NibbleOp,
    carry_in: bool,
) -> bool {
    let mut carry = carry_in;
    for i in 0..len {
        let (digit, out) = op.apply(cpu.reg(dst(i)), operand(cpu, i), carry);
        cpu.set_reg(dst(i), digit);
        carry = out;
    }
    carry
}

/// `ADM`/`ADBM`/`SBM`/`SBBM`: destination window `±=` source window.
pub fn windowed(cpu: &mut Cpu, inst: DecodedInstruction, op: NibbleOp, exec: &mut ExecuteState) {
    let dst = Window::destination(inst);
    let src = Window::source(inst);
    let carry = ripple_over(cpu, dst.len, |i| dst.at(i), |cpu, i| cpu.reg(src.at(i)), op, false);
    exec.flags = FlagsUpdate::Carry(carry);
}

/// `INC`/`INCB`/`DEC`/`DECB`: `±1` rippled across the INC window.
pub fn ripple(cpu: &mut Cpu, inst: DecodedInstruction, op: NibbleOp, exec: &mut ExecuteState) {
    let carry = ripple_over(cpu, inst.inc_len(), |i| inst.inc_register(i), |_, _| 0, op, true);
    exec.flags = FlagsUpdate::Carry(carry);
}

/// `CMP`/`CPI`: Zero on equality, Carry when `r[d]` is below `operand`.
pub fn compare(cpu: &Cpu, inst: DecodedInstruction, operand: u8, exec: &mut ExecuteState) {
    let value = cpu.reg(inst.d());
    exec.flags = FlagsUpdate::CarryZero {
        carry: value < operand,
        zero: value == operand,
    };
}

/// `CPM`: compares the windows from the high end down, stopping at the
/// first unequal pair.
pub fn compare_window(cpu: &Cpu, inst: DecodedInstruction, exec: &mut ExecuteState) {
    let dst = Window::destination(inst);
    let src = Window::source(inst);
    exec.flags = (0..dst.len)
        .rev()
        .map(|i| (cpu.reg(dst.at(i)), cpu.reg(src.at(i))))
        .find(|(a, b)| a != b)
        .map_or(
            FlagsUpdate::CarryZero {
                carry: false,
                zero: true,
            },
            |(a, b)| FlagsUpdate::CarryZero {
                carry: a < b,
                zero: false,
            },
        );
}

/// `ANDI`/`ORI`/`XORI`; flags are untouched.
pub fn bitwise(cpu: &mut Cpu, inst: DecodedInstruction, op: impl Fn(u8, u8) -> u8) {
    let d = inst.d();
    let value = op(cpu.reg(d), inst.imm4());
    cpu.set_reg(d, value);
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::decoder::Decoder;
    use crate::execute::{execute_instruction, FlagsUpdate};
    use crate::state::RegIndex;
    use crate::Cpu;

    fn set(cpu: &mut Cpu, regs: &[(u8, u8)]) {
        for &(index, value) in regs {
            cpu.set_reg(RegIndex::new(index), value);
        }
    }

    fn reg(cpu: &Cpu, index: u8) -> u8 {
        cpu.reg(RegIndex::new(index))
    }

    fn exec(cpu: &mut Cpu, opcode: u16) -> FlagsUpdate {
        let inst = Decoder::decode(opcode).expect("legal opcode");
        execute_instruction(cpu, inst).expect("no fault").flags
    }

    const fn pair(base: u16, d: u16, s: u16) -> u16 {
        base | (d << 5) | s
    }

    #[test]
    fn decimal_add_of_nine_and_five() {
        let mut cpu = Cpu::default();
        set(&mut cpu, &[(0, 9), (1, 5)]);
        assert_eq!(exec(&mut cpu, pair(0x0800, 0, 1)), FlagsUpdate::Carry(true));
        assert_eq!(reg(&cpu, 0), 4);
    }

    #[rstest]
    #[case::add_keeps_zero(0x0400, 8, 8, 0, FlagsUpdate::Carry(true))]
    #[case::sub_sets_zero(0x0C00, 8, 8, 0, FlagsUpdate::CarryZero { carry: false, zero: true })]
    #[case::sub_borrows(0x0C00, 2, 3, 0xF, FlagsUpdate::CarryZero { carry: true, zero: false })]
    #[case::decimal_sub_borrows(0x1000, 2, 3, 9, FlagsUpdate::CarryZero { carry: true, zero: false })]
    fn scalar_forms(
        #[case] base: u16,
        #[case] a: u8,
        #[case] b: u8,
        #[case] result: u8,
        #[case] flags: FlagsUpdate,
    ) {
        let mut cpu = Cpu::default();
        set(&mut cpu, &[(4, a), (9, b)]);
        assert_eq!(exec(&mut cpu, pair(base, 4, 9)), flags);
        assert_eq!(reg(&cpu, 4), result);
        assert_eq!(reg(&cpu, 9), b);
    }

    #[test]
    fn immediate_forms_take_bits_four_to_one() {
        let mut cpu = Cpu::default();
        set(&mut cpu, &[(3, 7)]);
        // ADBI R3, #5
        assert_eq!(exec(&mut cpu, 0x4400 | (3 << 5) | (5 << 1)), FlagsUpdate::Carry(true));
        assert_eq!(reg(&cpu, 3), 2);
        // SBI R3, #2
        assert_eq!(
            exec(&mut cpu, 0x4800 | (3 << 5) | (2 << 1)),
            FlagsUpdate::CarryZero {
                carry: false,
                zero: true
            }
        );
        assert_eq!(reg(&cpu, 3), 0);
    }

    #[test]
    fn windowed_decimal_add_ripples_low_to_high() {
        let mut cpu = Cpu::default();
        // destination R2..R5 = 0999 (R2 least significant), source R10..R13 = 0001
        set(&mut cpu, &[(2, 9), (3, 9), (4, 9), (5, 0), (10, 1)]);
        // ADBM d = 2, s = 13: k = 3
        assert_eq!(exec(&mut cpu, pair(0x1800, 2, 13)), FlagsUpdate::Carry(false));
        assert_eq!([reg(&cpu, 2), reg(&cpu, 3), reg(&cpu, 4), reg(&cpu, 5)], [0, 0, 0, 1]);
    }

    #[test]
    fn windowed_subtract_reports_the_final_borrow() {
        let mut cpu = Cpu::default();
        set(&mut cpu, &[(8, 1)]);
        // SBM d = 0, s = 9: k = 1, destination R0..R1 = 00, source R8..R9 = 01
        assert_eq!(exec(&mut cpu, pair(0x1C00, 0, 9)), FlagsUpdate::Carry(true));
        assert_eq!([reg(&cpu, 0), reg(&cpu, 1)], [0xF, 0xF]);
    }

    #[test]
    fn increment_ripples_through_the_window() {
        let mut cpu = Cpu::default();
        set(&mut cpu, &[(8, 9), (9, 9), (10, 3)]);
        // INCB d = 10, low bits 0: window R8..R10
        assert_eq!(exec(&mut cpu, 0x5C08 | (10 << 5)), FlagsUpdate::Carry(false));
        assert_eq!([reg(&cpu, 8), reg(&cpu, 9), reg(&cpu, 10)], [0, 0, 4]);

        // DEC of an all-zero window borrows out of the top
        let mut cpu = Cpu::default();
        assert_eq!(exec(&mut cpu, 0x5C10 | (1 << 5)), FlagsUpdate::Carry(true));
        assert_eq!([reg(&cpu, 0), reg(&cpu, 1)], [0xF, 0xF]);
    }

    #[test]
    fn compare_forms() {
        let mut cpu = Cpu::default();
        set(&mut cpu, &[(1, 3), (2, 5)]);
        assert_eq!(
            exec(&mut cpu, pair(0x2400, 1, 2)),
            FlagsUpdate::CarryZero {
                carry: true,
                zero: false
            }
        );
        assert_eq!(
            exec(&mut cpu, 0x3400 | (1 << 5) | (3 << 1)),
            FlagsUpdate::CarryZero {
                carry: false,
                zero: true
            }
        );
        assert_eq!(reg(&cpu, 1), 3, "compare does not write");
    }

    #[test]
    fn windowed_compare_short_circuits_from_the_top() {
        let mut cpu = Cpu::default();
        // destination R0..R2 = [9, 1, 4], source R8..R10 = [0, 2, 4]
        set(&mut cpu, &[(0, 9), (1, 1), (2, 4), (8, 0), (9, 2), (10, 4)]);
        assert_eq!(
            exec(&mut cpu, pair(0x2800, 0, 10)),
            FlagsUpdate::CarryZero {
                carry: true,
                zero: false
            }
        );

        set(&mut cpu, &[(1, 2), (0, 0)]);
        assert_eq!(
            exec(&mut cpu, pair(0x2800, 0, 10)),
            FlagsUpdate::CarryZero {
                carry: false,
                zero: true
            }
        );
    }

    #[test]
    fn bitwise_immediates() {
        let mut cpu = Cpu::default();
        set(&mut cpu, &[(6, 0b1010)]);
        assert_eq!(exec(&mut cpu, 0x5000 | (6 << 5) | (0b0110 << 1)), FlagsUpdate::None);
        assert_eq!(reg(&cpu, 6), 0b0010);
        exec(&mut cpu, 0x5400 | (6 << 5) | (0b1000 << 1));
        assert_eq!(reg(&cpu, 6), 0b1010);
        exec(&mut cpu, 0x5800 | (6 << 5) | (0b1111 << 1));
        assert_eq!(reg(&cpu, 6), 0b0101);
    }
}
