//! Multi-byte access composition in a device's declared byte order.

use crate::Fault;

/// Byte order a device uses to compose multi-byte accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Endianness {
    /// Least-significant byte at the lowest address.
    #[default]
    Little,
    /// Most-significant byte at the lowest address.
    Big,
}

/// Width of a composed access in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccessWidth {
    /// Single byte.
    Byte = 1,
    /// 16-bit word.
    Half = 2,
    /// 32-bit word.
    Word = 4,
    /// 64-bit word.
    Double = 8,
}

impl AccessWidth {
    /// Returns the access width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self as u32
    }
}

/// Returns the address of byte `index` of an access starting at `addr`.
///
/// # Errors
///
/// Returns [`Fault::UnmappedAddress`] when the byte lies past the end of the
/// 32-bit address domain.
pub fn byte_address(addr: u32, index: u32) -> Result<u32, Fault> {
    addr.checked_add(index)
        .ok_or(Fault::UnmappedAddress { addr: u32::MAX })
}

/// Composes an access of `width` bytes by calling `read8` for each byte.
///
/// # Errors
///
/// Propagates the first error returned by `read8`.
pub fn compose<F>(
    addr: u32,
    width: AccessWidth,
    order: Endianness,
    mut read8: F,
) -> Result<u64, Fault>
where
    F: FnMut(u32) -> Result<u8, Fault>,
{
    let mut value = 0_u64;
    for index in 0..width.bytes() {
        let byte = u64::from(read8(byte_address(addr, index)?)?);
        let shift = match order {
            Endianness::Little => index * 8,
            Endianness::Big => (width.bytes() - 1 - index) * 8,
        };
        value |= byte << shift;
    }
    Ok(value)
}

/// Splits `value` into `width` bytes and stores them with `write8`.
///
/// # Errors
///
/// Propagates the first error returned by `write8`; earlier bytes stay
/// written.
pub fn decompose<F>(
    addr: u32,
    width: AccessWidth,
    order: Endianness,
    value: u64,
    mut write8: F,
) -> Result<(), Fault>
where
    F: FnMut(u32, u8) -> Result<(), Fault>,
{
    for index in 0..width.bytes() {
        let shift = match order {
            Endianness::Little => index * 8,
            Endianness::Big => (width.bytes() - 1 - index) * 8,
        };
        #[allow(clippy::cast_possible_truncation)]
        let byte = (value >> shift) as u8;
        write8(byte_address(addr, index)?, byte)?;
    }
    Ok(())
}
