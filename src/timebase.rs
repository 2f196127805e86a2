//! Host timebase
//!
//! Stands in for the counter hardware of a [`SimulatedTimer`]: a thread that
//! raises the compare-match interrupt at the period the registers describe.
//! Deadlines advance by whole periods from the last counter reset so ticks do
//! not drift. A new compare value takes effect from the next period, which
//! keeps a retune from producing a truncated tick.

use crate::peripherals::Peripherals;
use crate::timer::SimulatedTimer;
use log::{info, warn};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a stopped timer is polled for a restart.
const IDLE_POLL: Duration = Duration::from_millis(1);
/// Longest single sleep, so stop and shutdown are noticed promptly.
const MAX_SLEEP: Duration = Duration::from_millis(5);
/// Periods of lag tolerated before deadlines are resynchronised.
pub const MAX_LAG_PERIODS: u32 = 4;

pub struct Timebase {
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Timebase {
    pub fn spawn(peripherals: Arc<Peripherals<SimulatedTimer>>) -> io::Result<Self> {
        let alive = Arc::new(AtomicBool::new(true));
        let thread_alive = alive.clone();
        let handle = thread::Builder::new()
            .name("timebase".to_string())
            .spawn(move || run(&peripherals, &thread_alive))?;

        Ok(Timebase {
            alive,
            handle: Some(handle),
        })
    }

    pub fn shutdown(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Timebase {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(peripherals: &Peripherals<SimulatedTimer>, alive: &AtomicBool) {
    info!("Timebase thread started");
    let mut armed_from: Option<Instant> = None;
    let mut deadline = Instant::now();

    while alive.load(Ordering::SeqCst) {
        let (period, reset_at) =
            peripherals.with_timer(|timer| (timer.period(), timer.counter_reset_at()));
        let (period, reset_at) = match (period, reset_at) {
            (Some(period), Some(reset_at)) => (period, reset_at),
            _ => {
                armed_from = None;
                thread::sleep(IDLE_POLL);
                continue;
            }
        };

        if armed_from != Some(reset_at) {
            armed_from = Some(reset_at);
            deadline = reset_at + period;
        }

        let now = Instant::now();
        if now < deadline {
            thread::sleep((deadline - now).min(MAX_SLEEP));
            continue;
        }

        peripherals.on_compare_match_since(reset_at);

        let period = peripherals
            .with_timer(|timer| timer.period())
            .unwrap_or(period);
        deadline += period;

        let now = Instant::now();
        if now > deadline + period * MAX_LAG_PERIODS {
            warn!(
                "Timebase fell {:?} behind, resynchronising",
                now.duration_since(deadline)
            );
            deadline = now + period;
        }
    }
    info!("Timebase thread stopping");
}
