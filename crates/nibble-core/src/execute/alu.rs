//! Single-nibble arithmetic shared by the scalar, immediate and windowed forms.

/// Nibble operation applied per register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NibbleOp {
    /// Binary add.
    Add,
    /// Add with decimal correction.
    AddBcd,
    /// Binary subtract.
    Sub,
    /// Subtract with decimal correction.
    SubBcd,
}

impl NibbleOp {
    /// Computes `a ± b ± carry_in`.
    ///
    /// The intermediate is an unmasked `u8` (subtraction wraps). Decimal
    /// forms add or subtract 6 when it exceeds 9. Carry/borrow is bit 4 of
    /// the corrected intermediate; the returned digit is its low nibble.
    #[must_use]
    pub const fn apply(self, a: u8, b: u8, carry_in: bool) -> (u8, bool) {
        let carry = carry_in as u8;
        let raw = match self {
            Self::Add | Self::AddBcd => a.wrapping_add(b).wrapping_add(carry),
            Self::Sub | Self::SubBcd => a.wrapping_sub(b).wrapping_sub(carry),
        };
        let corrected = match self {
            Self::AddBcd if raw > 9 => raw.wrapping_add(6),
            Self::SubBcd if raw > 9 => raw.wrapping_sub(6),
            _ => raw,
        };
        (corrected & 0x0F, corrected & 0x10 != 0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::NibbleOp;

    #[rstest]
    #[case::nine_plus_five(NibbleOp::AddBcd, 9, 5, false, 4, true)]
    #[case::five_plus_four(NibbleOp::AddBcd, 5, 4, false, 9, false)]
    #[case::nine_plus_nine_plus_one(NibbleOp::AddBcd, 9, 9, true, 9, true)]
    #[case::binary_overflow(NibbleOp::Add, 0xF, 0x1, false, 0x0, true)]
    #[case::binary_no_carry(NibbleOp::Add, 0x7, 0x8, false, 0xF, false)]
    #[case::borrow(NibbleOp::Sub, 3, 5, false, 0xE, true)]
    #[case::borrow_in(NibbleOp::Sub, 0, 0, true, 0xF, true)]
    #[case::decimal_borrow(NibbleOp::SubBcd, 3, 5, false, 8, true)]
    #[case::decimal_zero_minus_one(NibbleOp::SubBcd, 0, 0, true, 9, true)]
    #[case::decimal_plain(NibbleOp::SubBcd, 7, 2, false, 5, false)]
    fn nibble_arithmetic(
        #[case] op: NibbleOp,
        #[case] a: u8,
        #[case] b: u8,
        #[case] carry_in: bool,
        #[case] digit: u8,
        #[case] carry: bool,
    ) {
        assert_eq!(op.apply(a, b, carry_in), (digit, carry));
    }

    proptest! {
        #[test]
        fn decimal_add_corrects_sums_above_nine(a in 0_u8..=9, b in 0_u8..=9) {
            let sum = a + b;
            let (digit, carry) = NibbleOp::AddBcd.apply(a, b, false);
            if sum > 9 {
                prop_assert_eq!(digit, (sum + 6) & 0x0F);
                prop_assert_eq!(carry, sum + 6 > 15);
            } else {
                prop_assert_eq!(digit, sum);
                prop_assert!(!carry);
            }
        }

        #[test]
        fn decimal_digits_stay_decimal(a in 0_u8..=9, b in 0_u8..=9, c in any::<bool>()) {
            let (sum, _) = NibbleOp::AddBcd.apply(a, b, c);
            let (diff, _) = NibbleOp::SubBcd.apply(a, b, c);
            prop_assert!(sum <= 9);
            prop_assert!(diff <= 9);
        }

        #[test]
        fn binary_forms_are_modular(a in 0_u8..=15, b in 0_u8..=15, c in any::<bool>()) {
            let carry = u8::from(c);
            let (sum, out) = NibbleOp::Add.apply(a, b, c);
            prop_assert_eq!(u16::from(sum) + 16 * u16::from(out), u16::from(a + b + carry));
            let (diff, borrow) = NibbleOp::Sub.apply(a, b, c);
            prop_assert_eq!(diff, a.wrapping_sub(b).wrapping_sub(carry) & 0x0F);
            prop_assert_eq!(borrow, a < b + carry);
        }
    }
}
