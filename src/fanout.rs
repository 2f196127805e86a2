//! Clock-division fan-out
//!
//! Runs once per base-tick from the compare-match handler. Every line toggles
//! each `period` base-ticks, starting with a toggle on tick 0, and every tick
//! sends one MIDI timing clock. The order within a tick is fixed:
//! DOUBLE, UNITY, HALF, QUARTER, then the MIDI pulse.

use crate::config::{board, PULSES_PER_QUARTER_NOTE};
use crate::gpio::{Level, OutputPin, PinProbe, SimPin};
use crate::midi::{MidiMessage, MidiTx};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Division {
    Double,
    Unity,
    Half,
    Quarter,
}

impl Division {
    /// Handler evaluation order.
    pub const ALL: [Division; 4] = [
        Division::Double,
        Division::Unity,
        Division::Half,
        Division::Quarter,
    ];

    /// Base-ticks between toggles.
    pub const fn period(self) -> u16 {
        let ppqn = PULSES_PER_QUARTER_NOTE as u16;
        match self {
            Division::Double => ppqn / 2,
            Division::Unity => ppqn,
            Division::Half => 2 * ppqn,
            Division::Quarter => 4 * ppqn,
        }
    }

    pub const fn pin(self) -> u8 {
        match self {
            Division::Double => board::CLOCK_2X_PIN,
            Division::Unity => board::CLOCK_1X_PIN,
            Division::Half => board::CLOCK_HALF_PIN,
            Division::Quarter => board::CLOCK_QUARTER_PIN,
        }
    }

    const fn index(self) -> usize {
        match self {
            Division::Double => 0,
            Division::Unity => 1,
            Division::Half => 2,
            Division::Quarter => 3,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Division::Double => "2x",
            Division::Unity => "1x",
            Division::Half => "1/2",
            Division::Quarter => "1/4",
        };
        f.write_str(name)
    }
}

struct ClockLine {
    division: Division,
    /// Base-ticks into the current toggle period.
    phase: u16,
    level: Level,
    pin: Box<dyn OutputPin>,
}

impl ClockLine {
    fn new(division: Division, pin: Box<dyn OutputPin>) -> Self {
        ClockLine {
            division,
            phase: 0,
            level: Level::Low,
            pin,
        }
    }

    fn advance(&mut self) {
        if self.phase == 0 {
            self.drive(!self.level);
        }
        self.phase += 1;
        if self.phase == self.division.period() {
            self.phase = 0;
        }
    }

    fn drive(&mut self, level: Level) {
        self.level = level;
        self.pin.set_level(level);
    }
}

/// Read side of the four simulated clock outputs.
#[derive(Debug, Clone)]
pub struct ClockProbes {
    probes: [PinProbe; 4],
}

impl ClockProbes {
    pub fn get(&self, division: Division) -> &PinProbe {
        &self.probes[division.index()]
    }
}

/// Per-tick state owned by the compare-match handler.
pub struct FanOut {
    lines: [ClockLine; 4],
    midi: MidiTx,
    ticks: u32,
}

impl FanOut {
    /// `pins` are in [`Division::ALL`] order.
    pub fn new(pins: [Box<dyn OutputPin>; 4], midi: MidiTx) -> Self {
        let [double, unity, half, quarter] = pins;
        FanOut {
            lines: [
                ClockLine::new(Division::Double, double),
                ClockLine::new(Division::Unity, unity),
                ClockLine::new(Division::Half, half),
                ClockLine::new(Division::Quarter, quarter),
            ],
            midi,
            ticks: 0,
        }
    }

    /// A fan-out driving simulated pins at the board's clock pin numbers.
    pub fn simulated(midi: MidiTx) -> (FanOut, ClockProbes) {
        let (double, double_probe) = SimPin::new(Division::Double.pin());
        let (unity, unity_probe) = SimPin::new(Division::Unity.pin());
        let (half, half_probe) = SimPin::new(Division::Half.pin());
        let (quarter, quarter_probe) = SimPin::new(Division::Quarter.pin());
        let fanout = FanOut::new(
            [
                Box::new(double),
                Box::new(unity),
                Box::new(half),
                Box::new(quarter),
            ],
            midi,
        );
        let probes = ClockProbes {
            probes: [double_probe, unity_probe, half_probe, quarter_probe],
        };
        (fanout, probes)
    }

    /// One base-tick. Bounded, never blocks, never allocates.
    pub fn on_base_tick(&mut self) {
        for line in self.lines.iter_mut() {
            line.advance();
        }
        self.midi.send(MidiMessage::TimingClock);
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Back to the start-of-bar phase: every counter at zero, so the next
    /// tick toggles all four lines together. Levels are not touched; nothing
    /// changes on the outputs before that tick.
    pub(crate) fn realign(&mut self) {
        for line in self.lines.iter_mut() {
            line.phase = 0;
        }
        self.ticks = 0;
    }

    pub(crate) fn drive_all(&mut self, level: Level) {
        for line in self.lines.iter_mut() {
            line.drive(level);
        }
    }

    pub fn level(&self, division: Division) -> Level {
        self.lines[division.index()].level
    }

    pub fn phase(&self, division: Division) -> u16 {
        self.lines[division.index()].phase
    }

    /// Base-ticks since the clock last started.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn midi_overruns(&self) -> u32 {
        self.midi.overruns()
    }
}
