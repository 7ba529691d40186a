use std::fmt;

use crate::memory::Addressable;
use crate::Fault;

/// Ordered chain of devices sharing one address space.
///
/// An access is served by the first registered device whose
/// [`Addressable::contains`] holds for the address, even when later devices
/// overlap it. The core keeps one bus for memory and a separate one for IO
/// ports.
pub struct Bus {
    name: &'static str,
    devices: Vec<Box<dyn Addressable>>,
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranges: Vec<_> = self.devices.iter().map(|device| device.range()).collect();
        f.debug_struct("Bus")
            .field("name", &self.name)
            .field("devices", &ranges)
            .finish()
    }
}

impl Bus {
    /// Creates an empty bus.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            devices: Vec::new(),
        }
    }

    /// Bus label used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Appends a device; it loses overlaps against every earlier device.
    pub fn attach(&mut self, device: Box<dyn Addressable>) {
        log::debug!(
            "{} bus: attached device {:#06X}..{:#06X}",
            self.name,
            device.range().low(),
            device.range().high()
        );
        self.devices.push(device);
    }

    /// Removes and returns the device registered at `index`.
    pub fn detach(&mut self, index: usize) -> Option<Box<dyn Addressable>> {
        (index < self.devices.len()).then(|| self.devices.remove(index))
    }

    /// Removes every device.
    pub fn clear(&mut self) {
        self.devices.clear();
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` when no devices are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns the registration index of the device serving `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnmappedAddress`] when no device contains `addr`.
    pub fn resolve(&self, addr: u32) -> Result<usize, Fault> {
        self.devices
            .iter()
            .position(|device| device.contains(addr))
            .ok_or(Fault::UnmappedAddress { addr })
    }

    /// Output recorded by the device serving `addr`, if it records any.
    #[must_use]
    pub fn captured(&self, addr: u32) -> Option<&[u8]> {
        let index = self.resolve(addr).ok()?;
        self.devices[index].captured(addr)
    }

    fn readable(&self, addr: u32) -> Result<&dyn Addressable, Fault> {
        let device = self.devices[self.resolve(addr)?].as_ref();
        if device.is_readable() {
            Ok(device)
        } else {
            Err(Fault::ReadDenied { addr })
        }
    }

    fn writable(&mut self, addr: u32) -> Result<&mut dyn Addressable, Fault> {
        let index = self.resolve(addr)?;
        let device = self.devices[index].as_mut();
        if device.is_writable() {
            Ok(device)
        } else {
            Err(Fault::WriteDenied { addr })
        }
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::ReadDenied`] or a device fault.
    pub fn read8(&self, addr: u32) -> Result<u8, Fault> {
        self.readable(addr)?.read8(addr)
    }

    /// Reads a 16-bit value in the serving device's byte order.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::ReadDenied`] or a device fault.
    pub fn read16(&self, addr: u32) -> Result<u16, Fault> {
        self.readable(addr)?.read16(addr)
    }

    /// Reads a 32-bit value in the serving device's byte order.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::ReadDenied`] or a device fault.
    pub fn read32(&self, addr: u32) -> Result<u32, Fault> {
        self.readable(addr)?.read32(addr)
    }

    /// Reads a 64-bit value in the serving device's byte order.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::ReadDenied`] or a device fault.
    pub fn read64(&self, addr: u32) -> Result<u64, Fault> {
        self.readable(addr)?.read64(addr)
    }

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::WriteDenied`] or a device fault.
    pub fn write8(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        self.writable(addr)?.write8(addr, value)
    }

    /// Writes a 16-bit value in the serving device's byte order.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::WriteDenied`] or a device fault.
    pub fn write16(&mut self, addr: u32, value: u16) -> Result<(), Fault> {
        self.writable(addr)?.write16(addr, value)
    }

    /// Writes a 32-bit value in the serving device's byte order.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::WriteDenied`] or a device fault.
    pub fn write32(&mut self, addr: u32, value: u32) -> Result<(), Fault> {
        self.writable(addr)?.write32(addr, value)
    }

    /// Writes a 64-bit value in the serving device's byte order.
    ///
    /// # Errors
    ///
    /// [`Fault::UnmappedAddress`], [`Fault::WriteDenied`] or a device fault.
    pub fn write64(&mut self, addr: u32, value: u64) -> Result<(), Fault> {
        self.writable(addr)?.write64(addr, value)
    }

    /// Copies `bytes` to consecutive addresses starting at `base`, bypassing
    /// the writable flag so read-only images can be populated.
    ///
    /// Each byte is resolved on its own, so an image may span devices.
    ///
    /// # Errors
    ///
    /// Returns the first fault; bytes before it stay loaded.
    pub fn load(&mut self, base: u32, bytes: &[u8]) -> Result<(), Fault> {
        for (addr, byte) in (base..).zip(bytes.iter().copied()) {
            let index = self.resolve(addr)?;
            self.devices[index].load8(addr, byte)?;
        }
        log::debug!(
            "{} bus: loaded {} bytes at {:#06X}",
            self.name,
            bytes.len(),
            base
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Bus;
    use crate::memory::{AddressRange, Addressable, ByteMemory, Endianness, NibbleMemory};
    use crate::Fault;

    fn filled(range: AddressRange, value: u8) -> ByteMemory {
        let mut mem = ByteMemory::ram(range);
        for addr in range.low()..range.high() {
            mem.load8(addr, value).expect("in range");
        }
        mem
    }

    #[test]
    fn first_registered_device_wins_overlaps() {
        let shared = AddressRange::new(0x00, 0x10);
        let mut bus = Bus::new("memory");
        bus.attach(Box::new(filled(shared, 0xAA)));
        bus.attach(Box::new(filled(shared, 0xBB)));

        assert_eq!(bus.resolve(0x04), Ok(0));
        assert_eq!(bus.read8(0x04), Ok(0xAA));

        let removed = bus.detach(0).expect("device A registered");
        assert_eq!(removed.range(), shared);
        assert_eq!(bus.read8(0x04), Ok(0xBB));
    }

    #[test]
    fn reregistration_order_decides_resolution() {
        let shared = AddressRange::new(0x00, 0x10);
        let mut bus = Bus::new("memory");
        bus.attach(Box::new(filled(shared, 0xAA)));
        bus.attach(Box::new(filled(shared, 0xBB)));
        bus.clear();
        bus.attach(Box::new(filled(shared, 0xBB)));
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.read8(0x0F), Ok(0xBB));
    }

    #[test]
    fn non_overlapping_devices_are_chained() {
        let mut bus = Bus::new("memory");
        bus.attach(Box::new(filled(AddressRange::new(0, 4), 1)));
        bus.attach(Box::new(filled(AddressRange::new(4, 8), 2)));
        assert_eq!(bus.read8(3), Ok(1));
        assert_eq!(bus.read8(4), Ok(2));
        assert_eq!(bus.resolve(7), Ok(1));
    }

    #[test]
    fn unmapped_address_propagates() {
        let mut bus = Bus::new("io");
        assert_eq!(bus.read8(0), Err(Fault::UnmappedAddress { addr: 0 }));
        bus.attach(Box::new(ByteMemory::ram(AddressRange::new(0, 2))));
        assert_eq!(
            bus.write8(2, 0),
            Err(Fault::UnmappedAddress { addr: 2 })
        );
    }

    #[test]
    fn capability_flags_are_enforced_without_fallthrough() {
        let range = AddressRange::new(0, 4);
        let mut bus = Bus::new("memory");
        bus.attach(Box::new(ByteMemory::rom(range)));
        bus.attach(Box::new(ByteMemory::ram(range)));
        assert_eq!(bus.write8(1, 7), Err(Fault::WriteDenied { addr: 1 }));

        let mut bus = Bus::new("io");
        bus.attach(Box::new(ByteMemory::new(
            range,
            false,
            true,
            Endianness::Little,
        )));
        assert_eq!(bus.read8(1), Err(Fault::ReadDenied { addr: 1 }));
        assert_eq!(bus.write8(1, 7), Ok(()));
    }

    #[test]
    fn load_populates_read_only_devices() {
        let mut bus = Bus::new("memory");
        bus.attach(Box::new(ByteMemory::rom(AddressRange::new(0, 2))));
        bus.attach(Box::new(ByteMemory::ram(AddressRange::new(2, 4))));
        bus.load(0, &[1, 2, 3, 4]).expect("fits both devices");
        assert_eq!(bus.read16(0), Ok(0x0201));
        assert_eq!(bus.read16(2), Ok(0x0403));
        assert_eq!(
            bus.read32(0),
            Err(Fault::UnmappedAddress { addr: 2 }),
            "a composed access is served by a single device"
        );
    }

    #[test]
    fn nibble_device_faults_surface_through_the_bus() {
        let mut bus = Bus::new("memory");
        bus.attach(Box::new(NibbleMemory::new(AddressRange::new(0, 4))));
        assert_eq!(
            bus.write8(0, 0x1F),
            Err(Fault::OutOfRangeValue { addr: 0, value: 0x1F })
        );
        assert_eq!(bus.write16(0, 0x0F0F), Ok(()));
        assert_eq!(bus.read16(0), Ok(0x0F0F));
    }
}
