//! Active sensing keepalive
//!
//! Sends 0xFE at a fixed cadence whether or not the clock is running, so a
//! receiver can tell the connection is alive.

use crate::midi::{MidiMessage, MidiTx};
use log::{debug, info};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub struct Keepalive {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Keepalive {
    pub fn start(tx: MidiTx, interval: Duration) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();

        let handle = thread::Builder::new()
            .name("keepalive".to_string())
            .spawn(move || {
                info!("Keepalive every {:?}", interval);
                let mut next = Instant::now();
                while thread_running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    if now < next {
                        thread::sleep((next - now).min(Duration::from_millis(10)));
                        continue;
                    }
                    if !tx.send(MidiMessage::ActiveSensing) {
                        debug!("Keepalive dropped, MIDI buffer full");
                    }
                    next += interval;
                }
            })?;

        Ok(Keepalive {
            running,
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Keepalive {
    fn drop(&mut self) {
        self.stop();
    }
}
