//! Driver for an RFID gate reader module speaking a small framed protocol
//! over a half-duplex serial link.
//!
//! The driver exchanges fixed-format packets with the device, detects and
//! recovers from corrupted transmissions, notices spontaneous device
//! resets, and escalates unrecoverable link failures to the caller.
//!
//! # Features
//!
//! - `serial` - Serial port transport using the serialport crate
//!
//! # Example
//!
//! ```ignore
//! use gatereader::{Led, Reader, Tone};
//!
//! let mut reader = Reader::open("/dev/ttyUSB0")?;
//! reader.set_leds(Led::mask(&[Led::Green]))?;
//! reader.beep(&[Tone::new(880, 150)], false)?;
//! let tag = reader.rfid_send(&[0x26, 0x00])?;
//! ```

mod packet;
mod reader;
mod transport;
mod types;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use reader::Reader;
pub use transport::Transport;
pub use types::{Error, Led, PacketId, Tone};

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
