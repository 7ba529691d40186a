//! IO bus peripherals.

/// Per-port output latch used for the LCD ports.
pub mod port_latch;

pub use port_latch::{PortLatch, DEFAULT_CAPTURE_LIMIT};
