use super::{MidiEngine, MidiMessage};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use log::{error, info};
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Sending half of the MIDI transmit buffer.
///
/// [`send`](MidiTx::send) never blocks or allocates, so it is safe to call
/// from the compare-match handler. A full buffer drops the message and bumps
/// the overrun counter.
#[derive(Debug, Clone)]
pub struct MidiTx {
    tx: Sender<MidiMessage>,
    overruns: Arc<AtomicU32>,
}

/// Receiving half of the MIDI transmit buffer.
#[derive(Debug)]
pub struct MidiRx {
    rx: Receiver<MidiMessage>,
}

/// Creates a bounded transmit buffer holding up to `capacity` messages.
pub fn tx_buffer(capacity: usize) -> (MidiTx, MidiRx) {
    let (tx, rx) = channel::bounded(capacity.max(1));
    (
        MidiTx {
            tx,
            overruns: Arc::new(AtomicU32::new(0)),
        },
        MidiRx { rx },
    )
}

impl MidiTx {
    /// Queues `msg`. Returns false when it had to be dropped.
    pub fn send(&self, msg: MidiMessage) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.overruns.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Messages dropped because the buffer was full or closed.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl MidiRx {
    /// Waits for the next message; `None` once every sender is gone.
    pub fn recv(&self) -> Option<MidiMessage> {
        self.rx.recv().ok()
    }

    /// Messages already queued, without waiting.
    pub fn drain(&self) -> Vec<MidiMessage> {
        self.rx.try_iter().collect()
    }
}

/// Drains the transmit buffer into `engine` until all senders are dropped.
pub fn spawn_writer<E>(rx: MidiRx, mut engine: E) -> io::Result<JoinHandle<()>>
where
    E: MidiEngine + 'static,
{
    thread::Builder::new()
        .name("midi-writer".to_string())
        .spawn(move || {
            info!("MIDI writer thread started");
            while let Some(msg) = rx.recv() {
                if let Err(e) = engine.send(msg) {
                    error!("Failed to send {:?}: {}", msg, e);
                }
            }
            info!("MIDI writer thread stopping");
        })
}
