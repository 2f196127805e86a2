use crate::midi::{MidiEngine, MidiError, MidiMessage, Result};
use std::sync::{Arc, Mutex};

/// Records everything sent to it.
#[derive(Debug, Clone, Default)]
pub struct MockMidiEngine {
    sent: Arc<Mutex<Vec<MidiMessage>>>,
    fail_sends: bool,
}

impl MockMidiEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose every send fails.
    pub fn failing() -> Self {
        MockMidiEngine {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<MidiMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl MidiEngine for MockMidiEngine {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        if self.fail_sends {
            return Err(MidiError::SendError("mock device unplugged".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(msg);
        }
        Ok(())
    }
}
