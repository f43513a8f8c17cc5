//! Types shared across the gate reader driver

/// Packet identifiers of the reader's wire protocol.
///
/// Every identifier is a single byte on the wire. The firmware-upgrade
/// identifiers are part of the protocol but the driver issues no commands
/// for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketId {
    InvalidPacket = 0x00,
    AnswerToReset = 0x01,
    ContinueBoot = 0x02,
    FirmwareUpgrade = 0x03,
    FwUpgradeReady = 0x04,
    FwWrite = 0x05,
    FwWriteAck = 0x06,
    FwUpdateFinish = 0x07,
    GetStatus = 0x08,
    SetLed = 0x09,
    Ack = 0x0A,
    Beep = 0x0B,
    RfidSend = 0x0C,
    RfidSendComplete = 0x0D,
    RxError = 0xFF,
}

impl TryFrom<u8> for PacketId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            0x00 => Self::InvalidPacket,
            0x01 => Self::AnswerToReset,
            0x02 => Self::ContinueBoot,
            0x03 => Self::FirmwareUpgrade,
            0x04 => Self::FwUpgradeReady,
            0x05 => Self::FwWrite,
            0x06 => Self::FwWriteAck,
            0x07 => Self::FwUpdateFinish,
            0x08 => Self::GetStatus,
            0x09 => Self::SetLed,
            0x0A => Self::Ack,
            0x0B => Self::Beep,
            0x0C => Self::RfidSend,
            0x0D => Self::RfidSendComplete,
            0xFF => Self::RxError,
            other => return Err(other),
        })
    }
}

/// Indicator LEDs on the reader front panel, by bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Led {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Led {
    /// Single-LED bitmask for this LED.
    pub fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Combine several LEDs into the bitmask `set_leds` expects.
    pub fn mask(leds: &[Led]) -> u8 {
        leds.iter().fold(0, |mask, led| mask | led.bit())
    }
}

/// One entry of a beep sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    /// Tone frequency in Hz.
    pub frequency: u16,
    /// Tone duration in milliseconds.
    pub duration_ms: u16,
}

impl Tone {
    pub fn new(frequency: u16, duration_ms: u16) -> Self {
        Self {
            frequency,
            duration_ms,
        }
    }
}

/// Errors that can occur while driving the reader.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A command argument is outside its documented bounds. Raised before
    /// any byte is sent; retrying with the same arguments cannot succeed.
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// The device reset on its own and announced it with an unsolicited
    /// notification. The in-progress command was abandoned; the caller must
    /// reinitialize its session state before issuing further commands.
    #[error("Device reset detected")]
    DeviceReset,

    /// Unrecoverable protocol violation or exhausted retry budget. The link
    /// is unusable until the caller performs a hard or logical device reset.
    #[error("Reader fault: {0}")]
    ReaderFault(String),

    /// The underlying transport failed (serial port error, I/O error, ...).
    #[error("Transport error: {0}")]
    Transport(String),
}
