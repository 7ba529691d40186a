//! Register windows and their byte packing for memory/IO transfers.

use crate::decoder::DecodedInstruction;
use crate::state::RegIndex;

/// Run of consecutive registers, wrapping modulo 32 inside a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    /// Lowest register.
    pub start: RegIndex,
    /// Number of registers, `1..=8`.
    pub len: u8,
}

impl Window {
    /// Destination window `d ..= d + k`.
    #[must_use]
    pub const fn destination(inst: DecodedInstruction) -> Self {
        Self {
            start: inst.d(),
            len: inst.window_extent() + 1,
        }
    }

    /// Source window `s - k ..= s`.
    #[must_use]
    pub const fn source(inst: DecodedInstruction) -> Self {
        let k = inst.window_extent();
        Self {
            start: inst.s().wrapping_sub(k),
            len: k + 1,
        }
    }

    /// Register `i` counted from the low end.
    #[must_use]
    pub const fn at(self, i: u8) -> RegIndex {
        self.start.wrapping_add(i)
    }

    /// Highest register.
    #[must_use]
    pub const fn top(self) -> RegIndex {
        self.at(self.len - 1)
    }

    /// Registers from low to high.
    pub fn ascending(self) -> impl DoubleEndedIterator<Item = RegIndex> {
        (0..self.len).map(move |i| self.at(i))
    }

    /// Bytes needed to carry the window, two registers per byte.
    #[must_use]
    pub const fn byte_len(self) -> u8 {
        self.len.div_ceil(2)
    }
}

/// Packs nibbles, listed top register first, into bytes (first nibble high).
/// An odd count leaves the last low nibble zero.
#[must_use]
pub fn pack(nibbles: &[u8]) -> Vec<u8> {
    nibbles
        .chunks(2)
        .map(|pair| {
            let high = pair[0] & 0x0F;
            let low = pair.get(1).map_or(0, |n| n & 0x0F);
            (high << 4) | low
        })
        .collect()
}

/// Splits bytes into `count` nibbles, high nibble first; surplus nibbles are
/// dropped.
#[must_use]
pub fn unpack(bytes: &[u8], count: usize) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0F])
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{pack, unpack, Window};
    use crate::decoder::Decoder;

    fn adm(d: u16, s: u16) -> Window {
        Window::destination(Decoder::decode(0x1400 | (d << 5) | s).expect("ADM is legal"))
    }

    #[rstest]
    #[case(2, 5, 2, 4)]
    #[case(0, 0, 0, 1)]
    #[case(4, 3, 4, 8)]
    #[case(30, 1, 30, 4)]
    #[case(10, 18, 10, 1)]
    fn destination_window_size(
        #[case] d: u16,
        #[case] s: u16,
        #[case] start: u8,
        #[case] len: u8,
    ) {
        let window = adm(d, s);
        assert_eq!(window.start.get(), start);
        assert_eq!(window.len, len);
    }

    #[test]
    fn windows_wrap_inside_the_bank() {
        let window = adm(30, 1);
        let indices: Vec<u8> = window.ascending().map(|r| r.get()).collect();
        assert_eq!(indices, vec![30, 31, 0, 1]);
        assert_eq!(window.top().get(), 1);

        let inst = Decoder::decode(0x1400 | (30 << 5) | 1).expect("legal");
        let source: Vec<u8> = Window::source(inst).ascending().map(|r| r.get()).collect();
        assert_eq!(source, vec![30, 31, 0, 1]);

        let inst = Decoder::decode(0x1400 | (2 << 5) | 13).expect("legal");
        let source: Vec<u8> = Window::source(inst).ascending().map(|r| r.get()).collect();
        assert_eq!(source, vec![10, 11, 12, 13]);
    }

    #[test]
    fn odd_windows_pad_the_last_low_nibble() {
        assert_eq!(pack(&[0x1, 0x2, 0x3]), vec![0x12, 0x30]);
        assert_eq!(pack(&[0xA, 0xB]), vec![0xAB]);
        assert_eq!(unpack(&[0x12, 0x3F], 3), vec![0x1, 0x2, 0x3]);
        assert_eq!(adm(0, 2).byte_len(), 2);
        assert_eq!(adm(0, 3).byte_len(), 2);
        assert_eq!(adm(0, 7).byte_len(), 4);
    }
}
