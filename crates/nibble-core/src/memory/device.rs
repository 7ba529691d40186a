use crate::memory::{AddressRange, Addressable, Endianness};
use crate::Fault;

/// General byte-addressed store serving RAM or ROM depending on its flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteMemory {
    range: AddressRange,
    readable: bool,
    writable: bool,
    endianness: Endianness,
    cells: Box<[u8]>,
}

impl ByteMemory {
    /// Creates zero-filled readable and writable memory covering `range`.
    #[must_use]
    pub fn ram(range: AddressRange) -> Self {
        Self::new(range, true, true, Endianness::Little)
    }

    /// Creates zero-filled read-only memory covering `range`.
    ///
    /// Contents are populated with [`Addressable::load8`] before execution.
    #[must_use]
    pub fn rom(range: AddressRange) -> Self {
        Self::new(range, true, false, Endianness::Little)
    }

    /// Creates zero-filled memory with explicit capability flags.
    #[must_use]
    pub fn new(range: AddressRange, readable: bool, writable: bool, endianness: Endianness) -> Self {
        Self {
            range,
            readable,
            writable,
            endianness,
            cells: vec![0; range.len() as usize].into_boxed_slice(),
        }
    }

    /// Raw contents, indexed from the range's low address.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    fn offset(&self, addr: u32) -> Result<usize, Fault> {
        if self.range.contains(addr) {
            Ok((addr - self.range.low()) as usize)
        } else {
            Err(Fault::UnmappedAddress { addr })
        }
    }

    fn store(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        let offset = self.offset(addr)?;
        self.cells[offset] = value;
        Ok(())
    }
}

impl Addressable for ByteMemory {
    fn range(&self) -> AddressRange {
        self.range
    }

    fn is_readable(&self) -> bool {
        self.readable
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn read8(&self, addr: u32) -> Result<u8, Fault> {
        let offset = self.offset(addr)?;
        Ok(self.cells[offset])
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        self.store(addr, value)
    }

    fn load8(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        self.store(addr, value)
    }
}

/// Memory whose cells hold a single nibble each.
///
/// Stores above `0x0F` are rejected with [`Fault::OutOfRangeValue`] rather
/// than masked; a multi-byte write stops at the first rejected byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NibbleMemory {
    range: AddressRange,
    endianness: Endianness,
    cells: Box<[u8]>,
}

impl NibbleMemory {
    /// Largest value a cell accepts.
    pub const MAX_VALUE: u8 = 0x0F;

    /// Creates zero-filled little-endian nibble memory covering `range`.
    #[must_use]
    pub fn new(range: AddressRange) -> Self {
        Self::with_endianness(range, Endianness::Little)
    }

    /// Creates zero-filled nibble memory with an explicit byte order.
    #[must_use]
    pub fn with_endianness(range: AddressRange, endianness: Endianness) -> Self {
        Self {
            range,
            endianness,
            cells: vec![0; range.len() as usize].into_boxed_slice(),
        }
    }
}

impl Addressable for NibbleMemory {
    fn range(&self) -> AddressRange {
        self.range
    }

    fn is_readable(&self) -> bool {
        true
    }

    fn is_writable(&self) -> bool {
        true
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn read8(&self, addr: u32) -> Result<u8, Fault> {
        if !self.range.contains(addr) {
            return Err(Fault::UnmappedAddress { addr });
        }
        Ok(self.cells[(addr - self.range.low()) as usize])
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        if !self.range.contains(addr) {
            return Err(Fault::UnmappedAddress { addr });
        }
        if value > Self::MAX_VALUE {
            return Err(Fault::OutOfRangeValue { addr, value });
        }
        self.cells[(addr - self.range.low()) as usize] = value;
        Ok(())
    }
}
