//! IO port latch standing in for the LCD controller.
//!
//! Each port in the latch's range keeps the most recent bytes the program
//! wrote to it, up to a capture limit, and a single input byte the host can
//! program through [`Addressable::load8`]. Program reads return that input
//! byte. Older output is dropped once a port exceeds its limit, so a program
//! streaming to the display indefinitely runs in bounded memory.

use crate::memory::{AddressRange, Addressable, Endianness};
use crate::Fault;

/// Bytes each port keeps by default.
pub const DEFAULT_CAPTURE_LIMIT: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Port {
    input: u8,
    written: Vec<u8>,
}

impl Port {
    /// Appends `value`; storage is compacted back to `limit` bytes once it
    /// reaches twice that.
    fn record(&mut self, value: u8, limit: usize) {
        self.written.push(value);
        if self.written.len() >= limit.saturating_mul(2).max(1) {
            let excess = self.written.len().saturating_sub(limit);
            self.written.drain(..excess);
        }
    }

    fn recent(&self, limit: usize) -> &[u8] {
        let skip = self.written.len().saturating_sub(limit);
        &self.written[skip..]
    }
}

/// Byte-wide IO device with per-port output capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortLatch {
    range: AddressRange,
    ports: Vec<Port>,
    capture_limit: usize,
}

impl PortLatch {
    /// Creates a latch serving every port in `range`, keeping
    /// [`DEFAULT_CAPTURE_LIMIT`] bytes of output per port.
    #[must_use]
    pub fn new(range: AddressRange) -> Self {
        Self::with_capture_limit(range, DEFAULT_CAPTURE_LIMIT)
    }

    /// Creates a latch keeping the last `limit` bytes written to each port.
    #[must_use]
    pub fn with_capture_limit(range: AddressRange, limit: usize) -> Self {
        Self {
            range,
            ports: vec![Port::default(); range.len() as usize],
            capture_limit: limit,
        }
    }

    /// Bytes of output each port keeps.
    #[must_use]
    pub const fn capture_limit(&self) -> usize {
        self.capture_limit
    }

    /// Sets the byte the program reads back from `port`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnmappedAddress`] for a port outside the latch.
    pub fn set_input(&mut self, port: u32, value: u8) -> Result<(), Fault> {
        self.port_mut(port)?.input = value;
        Ok(())
    }

    /// The most recent bytes written to `port`, oldest first, at most
    /// [`PortLatch::capture_limit`] of them.
    #[must_use]
    pub fn written(&self, port: u32) -> &[u8] {
        self.port(port)
            .map(|p| p.recent(self.capture_limit))
            .unwrap_or_default()
    }

    /// Drops every captured byte; input bytes are kept.
    pub fn clear_output(&mut self) {
        for port in &mut self.ports {
            port.written.clear();
        }
    }

    fn port(&self, addr: u32) -> Result<&Port, Fault> {
        if !self.range.contains(addr) {
            return Err(Fault::UnmappedAddress { addr });
        }
        Ok(&self.ports[(addr - self.range.low()) as usize])
    }

    fn port_mut(&mut self, addr: u32) -> Result<&mut Port, Fault> {
        if !self.range.contains(addr) {
            return Err(Fault::UnmappedAddress { addr });
        }
        Ok(&mut self.ports[(addr - self.range.low()) as usize])
    }
}

impl Addressable for PortLatch {
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
        Endianness::Little
    }

    fn read8(&self, addr: u32) -> Result<u8, Fault> {
        self.port(addr).map(|p| p.input)
    }

    fn write8(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        log::trace!("io port {addr}: {value:#04X}");
        let limit = self.capture_limit;
        self.port_mut(addr)?.record(value, limit);
        Ok(())
    }

    fn load8(&mut self, addr: u32, value: u8) -> Result<(), Fault> {
        self.set_input(addr, value)
    }

    fn captured(&self, addr: u32) -> Option<&[u8]> {
        self.port(addr).ok().map(|p| p.recent(self.capture_limit))
    }
}
