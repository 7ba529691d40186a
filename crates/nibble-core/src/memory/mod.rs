//! Addressable devices and the buses that chain them.

/// Multi-byte access composition helpers.
pub mod access;
/// Ordered device bus with first-match resolution.
pub mod bus;
/// Byte and nibble memory devices.
pub mod device;
/// Bus configuration and the stock watch address layout.
pub mod map;

pub use access::{AccessWidth, Endianness};
pub use bus::Bus;
pub use device::{ByteMemory, NibbleMemory};
pub use map::{
    BusConfig, DeviceConfig, DeviceKind, IO_PORT_ADDRESS, IO_PORT_DATA, PROGRAM_BASE,
    PROGRAM_END, SYSTEM_ROM_END, SYSTEM_ROM_START,
};

use crate::Fault;

/// Half-open address range `[low, high)` claimed by a device.
///
/// The bounds are always ordered: every constructor, deserialization
/// included, goes through [`AddressRange::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(from = "RangeBounds"))]
pub struct AddressRange {
    low: u32,
    high: u32,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RangeBounds {
    low: u32,
    high: u32,
}

#[cfg(feature = "serde")]
impl From<RangeBounds> for AddressRange {
    fn from(bounds: RangeBounds) -> Self {
        Self::new(bounds.low, bounds.high)
    }
}

impl AddressRange {
    /// Creates a range, swapping the bounds when given in reverse.
    #[must_use]
    pub const fn new(low: u32, high: u32) -> Self {
        if low <= high {
            Self { low, high }
        } else {
            Self {
                low: high,
                high: low,
            }
        }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn low(self) -> u32 {
        self.low
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn high(self) -> u32 {
        self.high
    }

    /// Returns `true` when `low <= addr < high`.
    #[must_use]
    pub const fn contains(self, addr: u32) -> bool {
        self.low <= addr && addr < self.high
    }

    /// Number of addresses covered.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.high - self.low
    }

    /// Returns `true` for an empty range.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.high == self.low
    }
}

/// Any object exposing a sub-range of a byte address space.
///
/// Implementors provide the range, the capability flags and single-byte
/// access; multi-byte accesses are composed from single bytes in the
/// device's declared [`Endianness`]. Reads take `&self` so disassembly and
/// introspection can inspect memory without mutating it.
pub trait Addressable {
    /// Address range claimed by this device.
    fn range(&self) -> AddressRange;

    /// Returns `true` when the device may read.
    fn is_readable(&self) -> bool;

    /// Returns `true` when the device may be written by the program.
    fn is_writable(&self) -> bool;

    /// Byte order used for multi-byte accesses.
    fn endianness(&self) -> Endianness;

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnmappedAddress`] when `addr` is outside the device.
    fn read8(&self, addr: u32) -> Result<u8, Fault>;

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnmappedAddress`] when `addr` is outside the device
    /// and device-specific value faults otherwise.
    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Fault>;

    /// Host-side store used by program loaders; ignores the writable flag.
    ///
    /// # Errors
    ///
    /// Same as [`Addressable::write8`].
    fn load8(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        self.write8(addr, value)
    }

    /// Bytes the program wrote to `addr`, oldest first, for devices that
    /// record their output. Plain memory returns `None`.
    fn captured(&self, addr: u32) -> Option<&[u8]> {
        let _ = addr;
        None
    }

    /// Returns `true` when `addr` falls in [`Addressable::range`].
    fn contains(&self, addr: u32) -> bool {
        self.range().contains(addr)
    }

    /// Returns `true` for little-endian devices.
    fn is_little_endian(&self) -> bool {
        self.endianness() == Endianness::Little
    }

    /// Reads a 16-bit value in device byte order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte read.
    #[allow(clippy::cast_possible_truncation)]
    fn read16(&self, addr: u32) -> Result<u16, Fault> {
        access::compose(addr, AccessWidth::Half, self.endianness(), |a| self.read8(a))
            .map(|v| v as u16)
    }

    /// Reads a 32-bit value in device byte order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte read.
    #[allow(clippy::cast_possible_truncation)]
    fn read32(&self, addr: u32) -> Result<u32, Fault> {
        access::compose(addr, AccessWidth::Word, self.endianness(), |a| self.read8(a))
            .map(|v| v as u32)
    }

    /// Reads a 64-bit value in device byte order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte read.
    fn read64(&self, addr: u32) -> Result<u64, Fault> {
        access::compose(addr, AccessWidth::Double, self.endianness(), |a| {
            self.read8(a)
        })
    }

    /// Writes a 16-bit value in device byte order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte write.
    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Fault> {
        let order = self.endianness();
        access::decompose(addr, AccessWidth::Half, order, u64::from(value), |a, v| {
            self.write8(a, v)
        })
    }

    /// Writes a 32-bit value in device byte order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte write.
    fn write32(&mut self, addr: u32, value: u32) -> Result<(), Fault> {
        let order = self.endianness();
        access::decompose(addr, AccessWidth::Word, order, u64::from(value), |a, v| {
            self.write8(a, v)
        })
    }

    /// Writes a 64-bit value in device byte order.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte write.
    fn write64(&mut self, addr: u32, value: u64) -> Result<(), Fault> {
        let order = self.endianness();
        access::decompose(addr, AccessWidth::Double, order, value, |a, v| {
            self.write8(a, v)
        })
    }
}
