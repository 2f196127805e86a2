//! tempoclock: a MIDI clock generator
//!
//! A single compare-match timebase fires 24 times per quarter note. Each firing
//! sends a MIDI timing clock and advances four phase-locked clock outputs at
//! double, unity, half and quarter rate.

pub mod cli;
pub mod config;
pub mod control;
pub mod engine;
pub mod fanout;
pub mod gpio;
pub mod interrupt;
pub mod keepalive;
pub mod logging;
pub mod midi;
pub mod peripherals;
pub mod storage;
pub mod tempo;
pub mod timebase;
pub mod timer;
pub mod ui;

pub use cli::{validate_device, Args};
pub use engine::{ClockEngine, EngineState, EngineStatus, IdlePolicy, SharedEngine};
pub use fanout::{ClockProbes, Division, FanOut};
pub use peripherals::Peripherals;
pub use tempo::{compare_value_for, Tempo};
pub use timebase::Timebase;
pub use timer::{SimulatedTimer, TimerController};

use std::sync::{Arc, Mutex};

/// Everything a running clock needs, wired together for the simulated board.
pub struct ClockRig {
    pub engine: SharedEngine,
    pub probes: ClockProbes,
    pub timebase: Timebase,
}

/// Builds simulated peripherals sending MIDI into `tx`, an engine over them
/// and the timebase thread that drives them.
pub fn create_clock_rig(tx: midi::MidiTx, idle: IdlePolicy) -> std::io::Result<ClockRig> {
    let (fanout, probes) = FanOut::simulated(tx);
    let peripherals = Arc::new(Peripherals::new(SimulatedTimer::new(), fanout));
    let engine = ClockEngine::new(peripherals.clone(), idle);
    let timebase = Timebase::spawn(peripherals)?;

    Ok(ClockRig {
        engine: Arc::new(Mutex::new(engine)),
        probes,
        timebase,
    })
}
