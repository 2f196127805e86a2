//! Digital output lines

use std::ops::Not;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// A push-pull output pin. Writes must be bounded and non-blocking since they
/// happen from the compare-match handler.
pub trait OutputPin: Send {
    fn set_level(&mut self, level: Level);
}

#[derive(Debug, Default)]
struct PinState {
    high: AtomicBool,
    rising_edges: AtomicU32,
    falling_edges: AtomicU32,
}

/// Host stand-in for a GPIO line.
#[derive(Debug)]
pub struct SimPin {
    id: u8,
    state: Arc<PinState>,
}

/// Read side of a [`SimPin`], usable from any thread.
#[derive(Debug, Clone)]
pub struct PinProbe {
    id: u8,
    state: Arc<PinState>,
}

impl SimPin {
    pub fn new(id: u8) -> (SimPin, PinProbe) {
        let state = Arc::new(PinState::default());
        (
            SimPin {
                id,
                state: state.clone(),
            },
            PinProbe { id, state },
        )
    }

    pub fn id(&self) -> u8 {
        self.id
    }
}

impl OutputPin for SimPin {
    fn set_level(&mut self, level: Level) {
        let high = level == Level::High;
        let was_high = self.state.high.swap(high, Ordering::SeqCst);
        match (was_high, high) {
            (false, true) => {
                self.state.rising_edges.fetch_add(1, Ordering::SeqCst);
            }
            (true, false) => {
                self.state.falling_edges.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

impl PinProbe {
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn level(&self) -> Level {
        if self.state.high.load(Ordering::SeqCst) {
            Level::High
        } else {
            Level::Low
        }
    }

    pub fn rising_edges(&self) -> u32 {
        self.state.rising_edges.load(Ordering::SeqCst)
    }

    pub fn falling_edges(&self) -> u32 {
        self.state.falling_edges.load(Ordering::SeqCst)
    }

    /// Total level changes seen on the line.
    pub fn edges(&self) -> u32 {
        self.rising_edges() + self.falling_edges()
    }
}
