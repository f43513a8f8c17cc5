//! Serial port transport using the serialport crate

use crate::reader::Reader;
use crate::transport::Transport;
use crate::types::Error;
use std::io::{Read, Write};
use std::time::{Duration, Instant};

/// Blocking serial link to the reader, opened with the module's fixed
/// line parameters.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    pub const BAUDRATE: u32 = 19_200;
    pub const DATA_BITS: serialport::DataBits = serialport::DataBits::Eight;
    pub const PARITY: serialport::Parity = serialport::Parity::Even;
    pub const STOP_BITS: serialport::StopBits = serialport::StopBits::One;
    pub const RX_TIMEOUT: Duration = Duration::from_millis(500);

    pub fn new(port_name: &str) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, Self::BAUDRATE)
            .data_bits(Self::DATA_BITS)
            .parity(Self::PARITY)
            .stop_bits(Self::STOP_BITS)
            .timeout(Self::RX_TIMEOUT)
            .open()?;

        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    type Error = std::io::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // The port returns whatever is buffered as soon as anything arrives;
        // keep reading until the frame is complete or the timeout window
        // elapses, reporting a short count on timeout.
        let deadline = Instant::now() + Self::RX_TIMEOUT;
        let mut filled = 0;
        while filled < buf.len() {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        Ok(filled)
    }

    fn bytes_waiting(&mut self) -> Result<usize, Self::Error> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(std::io::Error::other)
    }
}

impl Reader<SerialTransport> {
    /// Open the named serial port with the module's line parameters and
    /// wrap it in a [`Reader`].
    pub fn open(port_name: &str) -> Result<Self, Error> {
        let transport =
            SerialTransport::new(port_name).map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self::new(transport))
    }
}
