//! The hardware timebase
//!
//! [`TimerRegisters`] is the board seam: a 16-bit counter with a compare
//! register, a selectable clock prescaler and a clear-on-compare mode.
//! [`TimerController`] is the only code that writes it, and every register
//! sequence it issues runs inside one critical section.

mod simulated;

pub use simulated::SimulatedTimer;

use crate::config::TIMER_PRESCALER;
use crate::peripherals::Peripherals;
use crate::tempo::Tempo;
use log::{debug, info};
use std::sync::Arc;

/// Counter clock source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSelect {
    Stopped,
    Direct,
    Prescale8,
    Prescale64,
    Prescale256,
    Prescale1024,
}

impl ClockSelect {
    pub const fn divisor(self) -> Option<u32> {
        match self {
            ClockSelect::Stopped => None,
            ClockSelect::Direct => Some(1),
            ClockSelect::Prescale8 => Some(8),
            ClockSelect::Prescale64 => Some(64),
            ClockSelect::Prescale256 => Some(256),
            ClockSelect::Prescale1024 => Some(1024),
        }
    }
}

/// Clock source selected while the engine runs.
pub const RUNNING_CLOCK: ClockSelect = ClockSelect::Prescale64;

const _: () = assert!(
    matches!(RUNNING_CLOCK.divisor(), Some(TIMER_PRESCALER)),
    "RUNNING_CLOCK does not match TIMER_PRESCALER"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformMode {
    /// Free-running up to 0xFFFF.
    Normal,
    /// Counts up to the compare value, then resets to zero.
    ClearOnCompare,
}

/// Register-level access to a compare-match timer.
pub trait TimerRegisters: Send {
    fn power_up(&mut self);
    fn set_waveform(&mut self, mode: WaveformMode);
    fn waveform(&self) -> WaveformMode;
    fn enable_compare_interrupt(&mut self);
    fn compare_interrupt_enabled(&self) -> bool;
    fn write_compare(&mut self, value: u16);
    fn compare(&self) -> u16;
    fn reset_counter(&mut self);
    fn select_clock(&mut self, clock: ClockSelect);
    fn clock(&self) -> ClockSelect;

    fn is_counting(&self) -> bool {
        self.clock() != ClockSelect::Stopped
    }
}

pub struct TimerController<T: TimerRegisters> {
    peripherals: Arc<Peripherals<T>>,
}

impl<T: TimerRegisters> TimerController<T> {
    pub fn new(peripherals: Arc<Peripherals<T>>) -> Self {
        TimerController { peripherals }
    }

    /// One-time setup: clear-on-compare mode with the compare interrupt on.
    pub fn configure(&self) {
        self.peripherals.interrupts().free(|cs| {
            let mut timer = self.peripherals.timer().borrow(cs);
            timer.power_up();
            timer.set_waveform(WaveformMode::ClearOnCompare);
            timer.enable_compare_interrupt();
        });
        info!("Timebase configured for clear-on-compare");
    }

    /// Loads the compare value for `tempo`. The counter keeps running.
    pub fn set_bpm(&self, tempo: Tempo) -> u16 {
        let compare = tempo.compare_value();
        self.peripherals.interrupts().free(|cs| {
            self.peripherals.timer().borrow(cs).write_compare(compare);
        });
        debug!("Compare register set to {} for {}", compare, tempo);
        compare
    }

    /// Restarts the counter from zero. No effect while already counting.
    pub fn start(&self) {
        let started = self.peripherals.interrupts().free(|cs| {
            let mut timer = self.peripherals.timer().borrow(cs);
            if timer.is_counting() {
                return false;
            }
            timer.reset_counter();
            timer.select_clock(RUNNING_CLOCK);
            true
        });
        if started {
            debug!("Timebase started");
        }
    }

    pub fn stop(&self) {
        let stopped = self.peripherals.interrupts().free(|cs| {
            let mut timer = self.peripherals.timer().borrow(cs);
            if !timer.is_counting() {
                return false;
            }
            timer.select_clock(ClockSelect::Stopped);
            true
        });
        if stopped {
            debug!("Timebase stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.peripherals.with_timer(|timer| timer.is_counting())
    }

    pub fn compare_value(&self) -> u16 {
        self.peripherals.with_timer(|timer| timer.compare())
    }
}
