/// Trait for the byte-level link to the reader.
/// Implement this trait for different backends (serial port, in-memory
/// test doubles, etc.)
pub trait Transport {
    /// Error type for transport operations
    type Error: std::fmt::Debug;

    /// Write all bytes to the transport before returning
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read up to `buf.len()` bytes, blocking at most the configured
    /// receive timeout. Returns the number of bytes read; fewer than
    /// requested means the timeout expired.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Number of bytes buffered for read but not yet consumed, without
    /// blocking or consuming them
    fn bytes_waiting(&mut self) -> Result<usize, Self::Error>;
}
