//! Bus configuration and the stock watch address layout.

use crate::memory::{AddressRange, Addressable, Bus, ByteMemory, Endianness, NibbleMemory};
use crate::peripherals::PortLatch;

/// Inclusive start address of the system ROM holding the built-in routines.
pub const SYSTEM_ROM_START: u32 = 0x0000;
/// Exclusive end address of the system ROM.
pub const SYSTEM_ROM_END: u32 = 0x1800;
/// Address where user programs are loaded and where execution resets to.
pub const PROGRAM_BASE: u32 = 0x1800;
/// Exclusive end of the 16-bit program/data space.
pub const PROGRAM_END: u32 = 0x1_0000;
/// IO port receiving the LCD address byte.
pub const IO_PORT_ADDRESS: u32 = 0;
/// IO port carrying LCD data and the host input byte.
pub const IO_PORT_DATA: u32 = 1;

const _: () = assert!(SYSTEM_ROM_END == PROGRAM_BASE, "program space follows the ROM");
const _: () = assert!(IO_PORT_DATA == IO_PORT_ADDRESS + 1, "ports are adjacent");

/// Kind of device a [`DeviceConfig`] instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceKind {
    /// Readable and writable [`ByteMemory`].
    Ram,
    /// Read-only [`ByteMemory`], populated through host loads.
    Rom,
    /// [`NibbleMemory`] rejecting values above 15.
    Nibble,
    /// [`PortLatch`] recording output bytes per port.
    PortLatch,
}

/// One device entry of a bus layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DeviceConfig {
    /// Device kind.
    pub kind: DeviceKind,
    /// Inclusive lower address.
    pub low: u32,
    /// Exclusive upper address.
    pub high: u32,
    /// Byte order for multi-byte accesses.
    #[cfg_attr(feature = "serde", serde(default))]
    pub endianness: Endianness,
}

impl DeviceConfig {
    /// Creates a little-endian device entry.
    #[must_use]
    pub const fn new(kind: DeviceKind, low: u32, high: u32) -> Self {
        Self {
            kind,
            low,
            high,
            endianness: Endianness::Little,
        }
    }

    /// Address range the device will claim.
    #[must_use]
    pub const fn range(&self) -> AddressRange {
        AddressRange::new(self.low, self.high)
    }

    /// Instantiates the configured device.
    #[must_use]
    pub fn build(&self) -> Box<dyn Addressable> {
        let range = self.range();
        match self.kind {
            DeviceKind::Ram => Box::new(ByteMemory::new(range, true, true, self.endianness)),
            DeviceKind::Rom => Box::new(ByteMemory::new(range, true, false, self.endianness)),
            DeviceKind::Nibble => Box::new(NibbleMemory::with_endianness(range, self.endianness)),
            DeviceKind::PortLatch => Box::new(PortLatch::new(range)),
        }
    }
}

/// Ordered device list; earlier entries win overlapping addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusConfig {
    /// Devices in registration order.
    pub devices: Vec<DeviceConfig>,
}

impl BusConfig {
    /// Stock memory layout: system ROM below [`PROGRAM_BASE`], RAM above.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            devices: vec![
                DeviceConfig::new(DeviceKind::Rom, SYSTEM_ROM_START, SYSTEM_ROM_END),
                DeviceConfig::new(DeviceKind::Ram, PROGRAM_BASE, PROGRAM_END),
            ],
        }
    }

    /// Stock IO layout: one latch serving both LCD ports.
    #[must_use]
    pub fn io() -> Self {
        Self {
            devices: vec![DeviceConfig::new(
                DeviceKind::PortLatch,
                IO_PORT_ADDRESS,
                IO_PORT_DATA + 1,
            )],
        }
    }

    /// Builds a bus with every configured device attached in order.
    #[must_use]
    pub fn build(&self, name: &'static str) -> Bus {
        let mut bus = Bus::new(name);
        for device in &self.devices {
            bus.attach(device.build());
        }
        bus
    }
}
