//! Tempo and the tempo-to-period conversion
//!
//! The timebase counter runs from [`TIMER_CLOCK_HZ`] through a fixed
//! [`TIMER_PRESCALER`] and fires once per base-tick, 24 times per quarter note.

use crate::config::{
    DEFAULT_BPM, MAX_BPM, MIN_BPM, PULSES_PER_QUARTER_NOTE, TIMER_CLOCK_HZ, TIMER_PRESCALER,
};
use log::debug;
use std::fmt;
use std::time::Duration;

const COUNTS_PER_MINUTE: u32 = TIMER_CLOCK_HZ / TIMER_PRESCALER * 60;

/// Counter clocks per base-tick at `bpm`, rounded to nearest.
const fn counts_per_tick(bpm: u8) -> u32 {
    let ticks_per_minute = bpm as u32 * PULSES_PER_QUARTER_NOTE;
    (COUNTS_PER_MINUTE + ticks_per_minute / 2) / ticks_per_minute
}

// The slowest tempo must still fit the 16-bit compare register.
const _: () = assert!(
    counts_per_tick(MIN_BPM) - 1 <= u16::MAX as u32,
    "timer prescaler too small for MIN_BPM"
);
const _: () = assert!(counts_per_tick(MAX_BPM) > 1, "timer prescaler too large for MAX_BPM");

/// Compare register value for `bpm`.
///
/// In clear-on-compare mode the counter spends `compare + 1` clocks per
/// period, so the result is the rounded count minus one. `bpm` must be
/// non-zero; callers pass a validated [`Tempo`].
pub const fn compare_value_for(bpm: u8) -> u16 {
    (counts_per_tick(bpm) - 1) as u16
}

/// Base-tick frequency a tempo asks for.
pub fn ideal_tick_hz(bpm: u8) -> f64 {
    f64::from(bpm) / 60.0 * f64::from(PULSES_PER_QUARTER_NOTE)
}

/// Base-tick frequency the counter actually produces for `compare`.
pub fn realized_tick_hz(compare: u16) -> f64 {
    f64::from(TIMER_CLOCK_HZ) / f64::from(TIMER_PRESCALER) / (f64::from(compare) + 1.0)
}

/// Time between compare matches for `compare`.
pub fn tick_interval(compare: u16) -> Duration {
    let counts = u64::from(compare) + 1;
    let nanos = counts * u64::from(TIMER_PRESCALER) * 1_000_000_000 / u64::from(TIMER_CLOCK_HZ);
    Duration::from_nanos(nanos)
}

/// Beats per minute, always within `[MIN_BPM, MAX_BPM]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo(u8);

impl Tempo {
    pub const MIN: Tempo = Tempo(MIN_BPM);
    pub const MAX: Tempo = Tempo(MAX_BPM);

    /// Accepts only in-range tempos.
    pub fn new(bpm: u16) -> Option<Self> {
        if (u16::from(MIN_BPM)..=u16::from(MAX_BPM)).contains(&bpm) {
            Some(Tempo(bpm as u8))
        } else {
            None
        }
    }

    /// Clamps a request to the nearest boundary.
    pub fn clamped(bpm: u16) -> Self {
        let clamped = bpm.clamp(u16::from(MIN_BPM), u16::from(MAX_BPM));
        if clamped != bpm {
            debug!("Requested tempo {} clamped to {}", bpm, clamped);
        }
        Tempo(clamped as u8)
    }

    /// Moves by `delta` BPM, stopping at the range ends.
    pub fn offset(self, delta: i32) -> Self {
        let target = i32::from(self.0)
            .saturating_add(delta)
            .clamp(i32::from(MIN_BPM), i32::from(MAX_BPM));
        Tempo(target as u8)
    }

    pub fn bpm(self) -> u8 {
        self.0
    }

    pub fn compare_value(self) -> u16 {
        compare_value_for(self.0)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo(DEFAULT_BPM)
    }
}

impl From<Tempo> for u8 {
    fn from(tempo: Tempo) -> Self {
        tempo.0
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}
