use std::error::Error;
use std::fmt;

/// Custom error type for MIDI operations
#[derive(Debug)]
pub enum MidiError {
    /// Error when sending a MIDI message
    SendError(String),
    /// Error when opening a MIDI port
    ConnectionError(String),
    /// No output port matched the requested name
    DeviceNotFound(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::DeviceNotFound(name) => write!(f, "MIDI output device not found: {}", name),
        }
    }
}

impl Error for MidiError {}

/// The single-byte system real-time messages this clock emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// 24 per quarter note while running
    TimingClock,
    /// Keepalive sent by the surrounding system
    ActiveSensing,
}

impl MidiMessage {
    pub const fn status_byte(self) -> u8 {
        match self {
            MidiMessage::TimingClock => 0xF8,
            MidiMessage::ActiveSensing => 0xFE,
        }
    }

    pub fn from_status_byte(byte: u8) -> Option<Self> {
        match byte {
            0xF8 => Some(MidiMessage::TimingClock),
            0xFE => Some(MidiMessage::ActiveSensing),
            _ => None,
        }
    }
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Trait defining the interface for MIDI output implementations
pub trait MidiEngine: Send {
    /// Sends a MIDI message to the device
    fn send(&mut self, msg: MidiMessage) -> Result<()>;
}
