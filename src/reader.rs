use log::{debug, error, warn};

use crate::packet::{self, CorruptedPacket, Packet, RESPONSE_ATR, TRANSMIT_OVERHEAD};
use crate::transport::Transport;
use crate::types::{Error, PacketId, Tone};

/// Wire length of the unsolicited notification the device emits after a
/// spontaneous reset. Matching on this exact buffered-byte count is a
/// heuristic, not a protocol guarantee: any other unsolicited 5-byte
/// sequence would be misread as a reset.
const RESET_NOTIFICATION_LEN: usize = 5;

/// Transmissions of the original packet before giving up.
const TX_ATTEMPTS: usize = 2;

/// RX_ERROR retransmissions per failed receive before retrying the
/// original packet.
const RX_ERROR_ATTEMPTS: usize = 2;

const LED_MASK_BITS: u8 = 0b0000_0111;
const MAX_TONES: usize = 8;
const MAX_RFID_PAYLOAD: usize = 128;

/// Driver for the gate reader module.
///
/// Owns its transport for the lifetime of the instance. Every command
/// blocks until it reaches a terminal outcome; callers must serialize
/// command invocations themselves.
pub struct Reader<T: Transport> {
    transport: T,
}

impl<T: Transport> Reader<T> {
    /// Create a new reader instance over the given transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Switch the front panel LEDs according to `mask` (see [`crate::Led`]).
    ///
    /// Bits outside the three defined LED positions are rejected.
    pub fn set_leds(&mut self, mask: u8) -> Result<(), Error> {
        if mask & !LED_MASK_BITS != 0 {
            return Err(Error::Validation(format!(
                "LED mask {mask:#04x} sets bits outside the three defined LEDs"
            )));
        }

        self.check_reset()?;
        let response = self.transceive(PacketId::SetLed, &[mask], RESPONSE_ATR)?;
        Self::expect_ack(&response)
    }

    /// Play a sequence of up to 8 tones, optionally repeating it until the
    /// next beep command.
    pub fn beep(&mut self, tones: &[Tone], repeat: bool) -> Result<(), Error> {
        if tones.len() > MAX_TONES {
            return Err(Error::Validation(format!(
                "Beep sequence has {} tones (maximum {MAX_TONES})",
                tones.len()
            )));
        }

        self.check_reset()?;
        let mut payload = Vec::with_capacity(tones.len() * 4 + 1);
        for tone in tones {
            payload.extend_from_slice(&tone.frequency.to_le_bytes());
            payload.extend_from_slice(&tone.duration_ms.to_le_bytes());
        }
        payload.push(repeat as u8);

        let response = self.transceive(PacketId::Beep, &payload, RESPONSE_ATR)?;
        Self::expect_ack(&response)
    }

    /// Forward a raw RFID payload of up to 128 bytes to the tag interface
    /// and return the tag data the device reports back.
    pub fn rfid_send(&mut self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        if payload.len() > MAX_RFID_PAYLOAD {
            return Err(Error::Validation(format!(
                "RFID payload is {} bytes (maximum {MAX_RFID_PAYLOAD})",
                payload.len()
            )));
        }

        self.check_reset()?;
        let response = self.transceive(
            PacketId::RfidSend,
            payload,
            payload.len() + TRANSMIT_OVERHEAD,
        )?;
        match response.packet_id() {
            Some(PacketId::RfidSendComplete) => Ok(response.payload),
            _ => {
                error!("unexpected response {:#04x} to RFID_SEND", response.id);
                Err(Error::ReaderFault(format!(
                    "unexpected response {:#04x} to RFID_SEND",
                    response.id
                )))
            }
        }
    }

    fn expect_ack(response: &Packet) -> Result<(), Error> {
        match response.packet_id() {
            Some(PacketId::Ack) => Ok(()),
            _ => {
                error!("expected ACK, device answered {:#04x}", response.id);
                Err(Error::ReaderFault(format!(
                    "expected ACK, device answered {:#04x}",
                    response.id
                )))
            }
        }
    }

    /// Detect an unsolicited reset notification before starting a
    /// transaction.
    ///
    /// Exactly [`RESET_NOTIFICATION_LEN`] buffered bytes with no request
    /// outstanding is how the device announces that it rebooted. The
    /// notification is drained so the next transaction starts on a clean
    /// line; a drain that times out despite the reported count means the
    /// link itself is inconsistent.
    fn check_reset(&mut self) -> Result<(), Error> {
        let waiting = self
            .transport
            .bytes_waiting()
            .map_err(|e| Error::Transport(format!("{e:?}")))?;
        if waiting != RESET_NOTIFICATION_LEN {
            return Ok(());
        }

        let mut buf = [0u8; RESET_NOTIFICATION_LEN];
        let drained = self
            .transport
            .read(&mut buf)
            .map_err(|e| Error::Transport(format!("{e:?}")))?;
        if drained < RESET_NOTIFICATION_LEN {
            error!(
                "reset notification drain got {drained} of {RESET_NOTIFICATION_LEN} bytes before timing out"
            );
            return Err(Error::ReaderFault(
                "reset notification reported as buffered but could not be drained".into(),
            ));
        }

        warn!("device reset detected, drained notification {buf:02X?}");
        Err(Error::DeviceReset)
    }

    /// Exchange one packet with the device, retrying on corruption.
    ///
    /// The outer loop retransmits the original packet when the device
    /// explicitly rejects it with RX_ERROR. The inner loop answers a
    /// garbled or missing response by transmitting an RX_ERROR of our own,
    /// asking the device to resend its reply. The two loops are not
    /// interchangeable retries: a device that answers our RX_ERROR with
    /// another RX_ERROR has violated the protocol and the fault is
    /// terminal, while exhausting both loops means the device is
    /// unresponsive and needs a reset.
    fn transceive(
        &mut self,
        id: PacketId,
        payload: &[u8],
        expected_len: usize,
    ) -> Result<Packet, Error> {
        for attempt in 1..=TX_ATTEMPTS {
            self.transmit(id, payload)?;

            match self.receive(expected_len)? {
                Ok(response) if response.packet_id() == Some(PacketId::RxError) => {
                    // The device could not make sense of our transmission;
                    // send the same packet again.
                    warn!("device rejected {id:?} (attempt {attempt}/{TX_ATTEMPTS})");
                    continue;
                }
                Ok(response) => return Ok(response),
                Err(CorruptedPacket) => {
                    for _ in 0..RX_ERROR_ATTEMPTS {
                        self.transmit(PacketId::RxError, &[])?;
                        match self.receive(expected_len)? {
                            Ok(response) if response.packet_id() == Some(PacketId::RxError) => {
                                error!("device answered our RX_ERROR with RX_ERROR");
                                return Err(Error::ReaderFault(
                                    "device answered an error signal with an error signal".into(),
                                ));
                            }
                            Ok(response) => return Ok(response),
                            Err(CorruptedPacket) => {
                                warn!("response to RX_ERROR was garbled or missing");
                            }
                        }
                    }
                    // No decodable reply to our error signals either;
                    // start over with the original packet.
                }
            }
        }

        error!("no usable response to {id:?} after {TX_ATTEMPTS} transmissions");
        Err(Error::ReaderFault(
            "retry budget exhausted, device needs a hard or logical reset".into(),
        ))
    }

    fn transmit(&mut self, id: PacketId, payload: &[u8]) -> Result<(), Error> {
        let frame = packet::encode(id, payload);
        debug!("tx {frame:02X?}");
        self.transport
            .write(&frame)
            .map_err(|e| Error::Transport(format!("{e:?}")))
    }

    /// Read one fixed-length response frame. The inner result is the decode
    /// outcome: a short read (timeout) counts as a corrupted frame and
    /// feeds the retry machinery, while transport failures are fatal.
    fn receive(&mut self, expected_len: usize) -> Result<Result<Packet, CorruptedPacket>, Error> {
        let mut buf = vec![0u8; expected_len];
        let received = self
            .transport
            .read(&mut buf)
            .map_err(|e| Error::Transport(format!("{e:?}")))?;
        if received < expected_len {
            warn!("response timed out after {received} of {expected_len} bytes");
            return Ok(Err(CorruptedPacket));
        }

        debug!("rx {buf:02X?}");
        Ok(packet::decode(&buf))
    }
}
