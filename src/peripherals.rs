//! The owned hardware handle
//!
//! Everything touched by both foreground code and the compare-match handler
//! lives here: the timer registers and the fan-out state, each behind an
//! [`IsrMutex`] guarded by the one [`Interrupts`] gate.

use crate::fanout::FanOut;
use crate::interrupt::{CriticalSection, Interrupts, IsrMutex};
use crate::timer::{SimulatedTimer, TimerRegisters};
use std::time::Instant;

pub struct Peripherals<T = SimulatedTimer> {
    interrupts: Interrupts,
    timer: IsrMutex<T>,
    fanout: IsrMutex<FanOut>,
}

impl<T: TimerRegisters> Peripherals<T> {
    pub fn new(timer: T, fanout: FanOut) -> Self {
        Peripherals {
            interrupts: Interrupts::new(),
            timer: IsrMutex::new(timer),
            fanout: IsrMutex::new(fanout),
        }
    }

    pub fn interrupts(&self) -> &Interrupts {
        &self.interrupts
    }

    pub(crate) fn timer(&self) -> &IsrMutex<T> {
        &self.timer
    }

    pub(crate) fn fanout(&self) -> &IsrMutex<FanOut> {
        &self.fanout
    }

    /// Compare-match interrupt vector.
    ///
    /// Runs with interrupts disabled, like a hardware ISR. Returns whether a
    /// base-tick was serviced; a match arriving after the clock was stopped
    /// or with the interrupt masked is ignored.
    pub fn on_compare_match(&self) -> bool {
        self.interrupts.free(|cs| self.service_compare_match(cs))
    }

    fn service_compare_match(&self, cs: &CriticalSection<'_>) -> bool {
        let armed = {
            let timer = self.timer.borrow(cs);
            timer.is_counting() && timer.compare_interrupt_enabled()
        };
        if armed {
            self.fanout.borrow(cs).on_base_tick();
        }
        armed
    }

    /// Read-only look at the timer registers.
    pub fn with_timer<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.interrupts.free(|cs| f(&self.timer.borrow(cs)))
    }

    /// Read-only look at the fan-out state.
    pub fn with_fanout<R>(&self, f: impl FnOnce(&FanOut) -> R) -> R {
        self.interrupts.free(|cs| f(&self.fanout.borrow(cs)))
    }
}

impl Peripherals<SimulatedTimer> {
    /// Compare match belonging to the counting run that began at `reset_at`.
    /// If the counter has been restarted since, the match is stale and is
    /// dropped; the new run's first tick is a full period after its reset.
    pub fn on_compare_match_since(&self, reset_at: Instant) -> bool {
        self.interrupts.free(|cs| {
            let current = self.timer.borrow(cs).counter_reset_at();
            if current != Some(reset_at) {
                return false;
            }
            self.service_compare_match(cs)
        })
    }
}
