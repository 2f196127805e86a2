//! MIDI output for tempoclock
//!
//! This module covers the transport side of the clock:
//! - The system real-time messages the clock emits (0xF8 timing clock, 0xFE active sensing)
//! - A bounded transmit buffer the compare-match handler can write without blocking
//! - A writer thread draining that buffer into a MIDI device
//!
//! The main components are:
//! - [`MidiEngine`] trait for sending MIDI messages
//! - [`MidirEngine`] for real MIDI device communication
//! - [`MockMidiEngine`] for testing
//! - [`MidiTx`] / [`MidiRx`] for the transmit buffer
//!
mod engine;
pub mod midir_engine;
pub mod mock_engine;
mod tx;

// Re-export main types from engine
pub use engine::{MidiEngine, MidiError, MidiMessage, Result};

// Re-export concrete implementations
pub use midir_engine::MidirEngine;
pub use mock_engine::MockMidiEngine;

pub use tx::{spawn_writer, tx_buffer, MidiRx, MidiTx};

// Set default engine type
pub type DefaultMidiEngine = MidirEngine;
