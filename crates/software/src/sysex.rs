//! Encodes and decodes the control messages exchanged with the organ-sound engine.
//!
//! Every message is a MIDI System Exclusive message whose payload is plain ASCII: a fixed 16-byte tag followed by
//! the event code and the value, each written as four lowercase hexadecimal digits. For example, selecting
//! temperament 1 produces the payload `JOHANNUSANTONIJN00020001`.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use wmidi::{MidiMessage, U7};

/// Identifies our messages among whatever else travels over the same MIDI connection.
pub const TAG: &[u8; 16] = b"JOHANNUSANTONIJN";

/// Length of a complete payload: the tag plus two groups of four hex digits.
const PAYLOAD_LEN: usize = TAG.len() + 8;

/// The kinds of control event understood by the engine, each with its 16-bit wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToPrimitive, FromPrimitive)]
pub enum SysexEvent {
    /// Transposition in semitones.
    Transpose = 0x01,
    /// Index of the selected temperament.
    Temperament = 0x02,
    /// Fine tuning.
    Tuning = 0x03,
    /// Index of the selected instrument; the engine reloads and answers with [`SysexEvent::EngineReady`].
    Instrument = 0x04,
    /// Metronome tempo in beats per minute.
    MetronomeBpm = 0x05,
    /// Beats per measure of the metronome.
    MetronomeMeasure = 0x06,
    /// Sent by the engine once it is able to take commands.
    EngineReady = 0x100,
    /// Master gain.
    Gain = 0x101,
    /// Polyphony limit.
    Polyphony = 0x102,
    /// Starts recording the engine's audio output.
    StartRecording = 0x141,
    /// Stops recording the engine's audio output.
    StopRecording = 0x142,
    /// Starts the metronome.
    StartMetronome = 0x143,
    /// Stops the metronome.
    StopMetronome = 0x144,
}

impl SysexEvent {
    /// Returns the 16-bit code identifying this event on the wire.
    pub fn code(self) -> u16 {
        self.to_u16().expect("event codes should fit in 16 bits")
    }

    /// Builds the ASCII payload carried inside the System Exclusive envelope.
    ///
    /// Negative values are written as their 16-bit two's complement, so `-1` becomes `ffff`.
    pub fn payload(self, value: i16) -> Vec<u8> {
        let mut payload = Vec::with_capacity(PAYLOAD_LEN);
        payload.extend_from_slice(TAG);
        payload.extend_from_slice(format!("{:04x}{:04x}", self.code(), value as u16).as_bytes());
        payload
    }

    /// Builds the complete message, System Exclusive start and end bytes included.
    pub fn message(self, value: i16) -> Vec<u8> {
        // the payload is ASCII, so every byte is already a valid 7-bit data byte
        let data: Vec<U7> = self
            .payload(value)
            .into_iter()
            .map(U7::from_u8_lossy)
            .collect();
        MidiMessage::SysEx(&data).to_vec()
    }
}

/// Extracts the event and value from a complete message.
///
/// Returns `None` for anything that isn't one of our control messages: other MIDI traffic, a foreign System
/// Exclusive message, a malformed payload, or an unknown event code.
pub fn decode(message: &[u8]) -> Option<(SysexEvent, i16)> {
    let payload = sysex_payload(message)?;
    let digits = payload.strip_prefix(TAG.as_slice())?;
    if digits.len() != 8 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let digits = core::str::from_utf8(digits).ok()?;
    let code = u16::from_str_radix(&digits[..4], 16).ok()?;
    let value = u16::from_str_radix(&digits[4..], 16).ok()?;
    Some((SysexEvent::from_u16(code)?, value as i16))
}

/// Determines whether a message received from the engine is the "ready" handshake.
///
/// The comparison is made on the raw payload bytes, so the match must be exact.
pub fn is_ready(message: &[u8]) -> bool {
    sysex_payload(message).is_some_and(|payload| payload == SysexEvent::EngineReady.payload(0))
}

fn sysex_payload(message: &[u8]) -> Option<&[u8]> {
    match MidiMessage::from_bytes(message) {
        Ok(MidiMessage::SysEx(data)) => Some(U7::data_to_bytes(data)),
        _ => None,
    }
}
