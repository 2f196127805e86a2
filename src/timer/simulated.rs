use super::{ClockSelect, TimerRegisters, WaveformMode};
use crate::config::TIMER_CLOCK_HZ;
use std::time::{Duration, Instant};

/// Register model of a 16-bit compare-match timer for host builds.
///
/// The counter itself is not simulated clock by clock; the
/// [`Timebase`](crate::timebase::Timebase) thread derives compare-match times
/// from [`period`](SimulatedTimer::period) and the last counter reset.
#[derive(Debug)]
pub struct SimulatedTimer {
    powered: bool,
    waveform: WaveformMode,
    compare_interrupt: bool,
    compare: u16,
    clock: ClockSelect,
    counter_reset_at: Option<Instant>,
    counter_resets: u32,
}

impl Default for SimulatedTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTimer {
    /// Power-on state: unpowered, normal mode, no clock.
    pub fn new() -> Self {
        SimulatedTimer {
            powered: false,
            waveform: WaveformMode::Normal,
            compare_interrupt: false,
            compare: 0,
            clock: ClockSelect::Stopped,
            counter_reset_at: None,
            counter_resets: 0,
        }
    }

    /// Time between compare matches, or `None` while not counting.
    pub fn period(&self) -> Option<Duration> {
        if !self.powered {
            return None;
        }
        let divisor = u64::from(self.clock.divisor()?);
        let counts = match self.waveform {
            WaveformMode::ClearOnCompare => u64::from(self.compare) + 1,
            WaveformMode::Normal => 1 << 16,
        };
        Some(Duration::from_nanos(
            counts * divisor * 1_000_000_000 / u64::from(TIMER_CLOCK_HZ),
        ))
    }

    /// When the counter last restarted from zero.
    pub fn counter_reset_at(&self) -> Option<Instant> {
        self.counter_reset_at
    }

    pub fn counter_resets(&self) -> u32 {
        self.counter_resets
    }
}

impl TimerRegisters for SimulatedTimer {
    fn power_up(&mut self) {
        self.powered = true;
    }

    fn set_waveform(&mut self, mode: WaveformMode) {
        self.waveform = mode;
    }

    fn waveform(&self) -> WaveformMode {
        self.waveform
    }

    fn enable_compare_interrupt(&mut self) {
        self.compare_interrupt = true;
    }

    fn compare_interrupt_enabled(&self) -> bool {
        self.compare_interrupt
    }

    fn write_compare(&mut self, value: u16) {
        self.compare = value;
    }

    fn compare(&self) -> u16 {
        self.compare
    }

    fn reset_counter(&mut self) {
        self.counter_reset_at = Some(Instant::now());
        self.counter_resets = self.counter_resets.wrapping_add(1);
    }

    fn select_clock(&mut self, clock: ClockSelect) {
        self.clock = clock;
    }

    fn clock(&self) -> ClockSelect {
        self.clock
    }

    fn is_counting(&self) -> bool {
        self.powered && self.clock != ClockSelect::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_period_until_powered_and_clocked() {
        let mut timer = SimulatedTimer::new();
        assert_eq!(timer.period(), None);

        timer.select_clock(ClockSelect::Prescale64);
        assert_eq!(timer.period(), None);

        timer.power_up();
        assert!(timer.period().is_some());
    }

    #[test]
    fn test_clear_on_compare_period() {
        let mut timer = SimulatedTimer::new();
        timer.power_up();
        timer.set_waveform(WaveformMode::ClearOnCompare);
        timer.select_clock(ClockSelect::Prescale64);
        timer.write_compare(2499);

        // 2500 counts of 4 us
        assert_eq!(timer.period(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_normal_mode_wraps_at_16_bits() {
        let mut timer = SimulatedTimer::new();
        timer.power_up();
        timer.select_clock(ClockSelect::Direct);

        assert_eq!(timer.period(), Some(Duration::from_nanos(4_096_000)));
    }
}
