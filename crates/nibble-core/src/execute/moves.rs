//! Register moves, shifts, bank selection and cross-bank copies.

use super::Window;
use crate::decoder::DecodedInstruction;
use crate::encoding::OpcodeForm;
use crate::state::Bank;
use crate::Cpu;

/// `MOV`: `r[d] ← r[s]`.
pub fn mov(cpu: &mut Cpu, inst: DecodedInstruction) {
    let value = cpu.reg(inst.s());
    cpu.set_reg(inst.d(), value);
}

/// `MOVM`: `r[d + i] ← r[s - k - i]` for `i` in `0..=k`.
///
/// The source runs downward from `s - k` while the destination runs upward
/// from `d`, one register at a time, so a source register overwritten by an
/// earlier copy is read back with its new value. The cross-bank window forms
/// keep matching indices instead.
pub fn mov_window(cpu: &mut Cpu, inst: DecodedInstruction) {
    let dst = Window::destination(inst);
    let from = inst.s().wrapping_sub(inst.window_extent());
    for i in 0..dst.len {
        let value = cpu.reg(from.wrapping_sub(i));
        cpu.set_reg(dst.at(i), value);
    }
}

/// `LDI`: `r[d] ← imm4`.
pub fn load_immediate(cpu: &mut Cpu, inst: DecodedInstruction) {
    cpu.set_reg(inst.d(), inst.imm4());
}

/// `LCRB`/`LARB`.
pub fn select_bank(cpu: &mut Cpu, inst: DecodedInstruction) {
    let bank = Bank::new(inst.bank_bits());
    if inst.form == OpcodeForm::Lcrb {
        cpu.control.current_bank = bank;
    } else {
        cpu.control.additional_bank = bank;
    }
}

/// `RSHM`: every register takes its lower neighbour's value; `r[d]` becomes 0.
pub fn shift_up(cpu: &mut Cpu, inst: DecodedInstruction) {
    let window = Window::destination(inst);
    for i in (1..window.len).rev() {
        let value = cpu.reg(window.at(i - 1));
        cpu.set_reg(window.at(i), value);
    }
    cpu.set_reg(window.start, 0);
}

/// `LSHM`: every register takes its upper neighbour's value; the top becomes 0.
pub fn shift_down(cpu: &mut Cpu, inst: DecodedInstruction) {
    let window = Window::destination(inst);
    for i in 1..window.len {
        let value = cpu.reg(window.at(i));
        cpu.set_reg(window.at(i - 1), value);
    }
    cpu.set_reg(window.top(), 0);
}

/// `CLRM`.
pub fn clear_window(cpu: &mut Cpu, inst: DecodedInstruction) {
    for index in Window::destination(inst).ascending() {
        cpu.set_reg(index, 0);
    }
}

const fn banks(cpu: &Cpu, form: OpcodeForm) -> (Bank, Bank) {
    let current = cpu.control.current_bank;
    let additional = cpu.control.additional_bank;
    match form {
        OpcodeForm::Mvac | OpcodeForm::Mvacm => (current, additional),
        _ => (additional, current),
    }
}

/// `MVAC`/`MVCA`: single register between the current and additional banks.
pub fn cross_bank(cpu: &mut Cpu, inst: DecodedInstruction) {
    let (to, from) = banks(cpu, inst.form);
    let value = cpu.reg_in(from, inst.s());
    cpu.set_reg_in(to, inst.d(), value);
}

/// `MVACM`/`MVCAM`: the destination window, same indices in both banks.
pub fn cross_bank_window(cpu: &mut Cpu, inst: DecodedInstruction) {
    let (to, from) = banks(cpu, inst.form);
    for index in Window::destination(inst).ascending() {
        let value = cpu.reg_in(from, index);
        cpu.set_reg_in(to, index, value);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::decoder::Decoder;
    use crate::execute::{execute_instruction, FlagsUpdate};
    use crate::state::{Bank, RegIndex};
    use crate::Cpu;

    fn exec(cpu: &mut Cpu, opcode: u16) {
        let inst = Decoder::decode(opcode).expect("legal opcode");
        let state = execute_instruction(cpu, inst).expect("no fault");
        assert_eq!(state.flags, FlagsUpdate::None, "moves never touch flags");
    }

    fn load(cpu: &mut Cpu, values: &[u8]) {
        for (i, value) in (0u8..).zip(values) {
            cpu.set_reg(RegIndex::new(i), *value);
        }
    }

    fn regs(cpu: &Cpu, count: u8) -> Vec<u8> {
        (0..count).map(|i| cpu.reg(RegIndex::new(i))).collect()
    }

    const fn pair(base: u16, d: u16, s: u16) -> u16 {
        base | (d << 5) | s
    }

    #[test]
    fn mov_and_ldi() {
        let mut cpu = Cpu::default();
        load(&mut cpu, &[0, 0, 0, 0xC]);
        exec(&mut cpu, pair(0x2C00, 1, 3));
        exec(&mut cpu, 0x3800 | (2 << 5) | (5 << 1));
        assert_eq!(regs(&cpu, 4), vec![0, 0xC, 5, 0xC]);
    }

    #[test]
    fn movm_walks_the_source_downward() {
        let mut cpu = Cpu::default();
        let identity: Vec<u8> = (0..16).collect();
        load(&mut cpu, &identity);
        // d = 0, s = 10: k = 2, R0 <- R8, R1 <- R7, R2 <- R6
        exec(&mut cpu, pair(0x3000, 0, 10));
        assert_eq!(regs(&cpu, 3), vec![8, 7, 6]);
        assert_eq!(cpu.reg(RegIndex::new(10)), 10);
    }

    #[test]
    fn movm_reads_registers_it_already_wrote() {
        let mut cpu = Cpu::default();
        load(&mut cpu, &[7, 8, 9]);
        // d = 1, s = 2: k = 1, R1 <- R1, R2 <- R0
        exec(&mut cpu, pair(0x3000, 1, 2));
        assert_eq!(regs(&cpu, 3), vec![7, 8, 7]);

        // d = 2, s = 4: k = 2, R2 <- R2, R3 <- R1, R4 <- R0
        load(&mut cpu, &[1, 2, 3, 4, 5]);
        exec(&mut cpu, pair(0x3000, 2, 4));
        assert_eq!(regs(&cpu, 5), vec![1, 2, 3, 2, 1]);
    }

    #[test]
    fn movm_source_wraps_below_r0() {
        let mut cpu = Cpu::default();
        load(&mut cpu, &[3]);
        cpu.set_reg(RegIndex::new(31), 0xB);
        // d = 0, s = 1: k = 1, R0 <- R0, R1 <- R31
        exec(&mut cpu, pair(0x3000, 0, 1));
        assert_eq!(regs(&cpu, 2), vec![3, 0xB]);
    }

    #[rstest]
    #[case::right_shift(0x6000, vec![0, 1, 2, 3, 9])]
    #[case::left_shift(0x6400, vec![2, 3, 4, 0, 9])]
    #[case::clear(0x6800, vec![0, 0, 0, 0, 9])]
    fn window_shifts(#[case] base: u16, #[case] expected: Vec<u8>) {
        let mut cpu = Cpu::default();
        load(&mut cpu, &[1, 2, 3, 4, 9]);
        // d = 0, s = 3: R0..R3
        exec(&mut cpu, pair(base, 0, 3));
        assert_eq!(regs(&cpu, 5), expected);
    }

    #[rstest]
    #[case::right_shift(0x6000, [0, 1, 2, 3])]
    #[case::left_shift(0x6400, [2, 3, 4, 0])]
    fn window_shifts_wrap_past_r31(#[case] base: u16, #[case] expected: [u8; 4]) {
        let mut cpu = Cpu::default();
        let window = [30, 31, 0, 1].map(RegIndex::new);
        for (index, value) in window.into_iter().zip(1..) {
            cpu.set_reg(index, value);
        }
        cpu.set_reg(RegIndex::new(2), 9);
        // d = 30, s = 1: k = 3, R30 R31 R0 R1
        exec(&mut cpu, pair(base, 30, 1));
        assert_eq!(window.map(|index| cpu.reg(index)), expected);
        assert_eq!(cpu.reg(RegIndex::new(2)), 9);
    }

    #[test]
    fn bank_selection_masks_to_two_bits() {
        let mut cpu = Cpu::default();
        exec(&mut cpu, 0x3C02);
        exec(&mut cpu, 0x3E03);
        assert_eq!(cpu.control().current_bank, Bank::new(2));
        assert_eq!(cpu.control().additional_bank, Bank::new(3));

        cpu.set_reg(RegIndex::new(0), 6);
        assert_eq!(cpu.registers().get(Bank::new(2), RegIndex::new(0)), 6);
    }

    #[test]
    fn cross_bank_moves() {
        let mut cpu = Cpu::default();
        exec(&mut cpu, 0x3E01);
        let additional = Bank::new(1);
        cpu.registers_mut().set(additional, RegIndex::new(7), 0xA);
        cpu.set_reg(RegIndex::new(4), 0x3);

        // MVAC R2, R7: current[2] <- additional[7]
        exec(&mut cpu, pair(0x6C00, 2, 7));
        assert_eq!(cpu.reg(RegIndex::new(2)), 0xA);
        // MVCA R9, R4: additional[9] <- current[4]
        exec(&mut cpu, pair(0x7400, 9, 4));
        assert_eq!(cpu.registers().get(additional, RegIndex::new(9)), 0x3);
    }

    #[test]
    fn cross_bank_window_moves_keep_indices() {
        let mut cpu = Cpu::default();
        exec(&mut cpu, 0x3E02);
        let additional = Bank::new(2);
        for i in 4..7 {
            cpu.registers_mut().set(additional, RegIndex::new(i), i);
        }
        // MVACM d = 4, s = 6: current[4..=6] <- additional[4..=6]
        exec(&mut cpu, pair(0x7000, 4, 6));
        assert_eq!(
            (4..7).map(|i| cpu.reg(RegIndex::new(i))).collect::<Vec<_>>(),
            vec![4, 5, 6]
        );

        load(&mut cpu, &[1, 1]);
        // MVCAM d = 0, s = 1: additional[0..=1] <- current[0..=1]
        exec(&mut cpu, pair(0x7800, 0, 1));
        assert_eq!(cpu.registers().get(additional, RegIndex::new(1)), 1);
        assert_eq!(cpu.registers().get(additional, RegIndex::new(2)), 0);
    }
}
