//! Clock engine facade
//!
//! The Stopped/Running state machine the button, encoder and storage
//! collaborators drive. All timer access goes through [`TimerController`];
//! the fan-out is only ever realigned here, on entry to Running.

use crate::fanout::Division;
use crate::gpio::Level;
use crate::peripherals::Peripherals;
use crate::tempo::Tempo;
use crate::timer::{SimulatedTimer, TimerController, TimerRegisters};
use log::{debug, info};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
}

/// What the clock outputs do when the engine stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdlePolicy {
    /// Leave every line at its last driven level.
    #[default]
    HoldLast,
    /// Force every line low.
    DriveLow,
}

/// Snapshot for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    pub state: EngineState,
    pub tempo: Tempo,
    pub compare_value: u16,
    pub ticks: u32,
    pub levels: [Level; 4],
    pub midi_overruns: u32,
}

pub struct ClockEngine<T: TimerRegisters = SimulatedTimer> {
    peripherals: Arc<Peripherals<T>>,
    timer: TimerController<T>,
    state: EngineState,
    tempo: Tempo,
    idle: IdlePolicy,
}

pub type SharedEngine = Arc<Mutex<ClockEngine>>;

impl<T: TimerRegisters> ClockEngine<T> {
    /// Configures the timebase and loads the default tempo. Starts Stopped.
    pub fn new(peripherals: Arc<Peripherals<T>>, idle: IdlePolicy) -> Self {
        let timer = TimerController::new(peripherals.clone());
        timer.configure();
        let tempo = Tempo::default();
        timer.set_bpm(tempo);
        info!("Clock engine ready at {}, idle policy {:?}", tempo, idle);

        ClockEngine {
            peripherals,
            timer,
            state: EngineState::Stopped,
            tempo,
            idle,
        }
    }

    /// Starts from a realigned start-of-bar phase. While already running this
    /// only retunes.
    pub fn start(&mut self, bpm: u16) -> Tempo {
        if self.state == EngineState::Running {
            debug!("Start requested while running; retuning instead");
            return self.retune(bpm);
        }

        let tempo = Tempo::clamped(bpm);
        self.tempo = tempo;
        self.timer.set_bpm(tempo);
        self.peripherals
            .interrupts()
            .free(|cs| self.peripherals.fanout().borrow(cs).realign());
        self.timer.start();
        self.state = EngineState::Running;
        info!("Clock started at {}", tempo);
        tempo
    }

    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }

        self.timer.stop();
        if self.idle == IdlePolicy::DriveLow {
            self.peripherals
                .interrupts()
                .free(|cs| self.peripherals.fanout().borrow(cs).drive_all(Level::Low));
        }
        self.state = EngineState::Stopped;
        info!("Clock stopped");
    }

    /// Changes the tempo without touching phases or the running counter.
    pub fn retune(&mut self, bpm: u16) -> Tempo {
        let tempo = Tempo::clamped(bpm);
        if tempo != self.tempo {
            self.tempo = tempo;
            self.timer.set_bpm(tempo);
            info!("Tempo changed to {}", tempo);
        }
        tempo
    }

    /// Encoder step.
    pub fn nudge(&mut self, delta: i32) -> Tempo {
        let target = self.tempo.offset(delta);
        self.retune(u16::from(target.bpm()))
    }

    /// Button press: start at the current tempo, or stop.
    pub fn toggle(&mut self) -> EngineState {
        match self.state {
            EngineState::Stopped => {
                self.start(u16::from(self.tempo.bpm()));
            }
            EngineState::Running => self.stop(),
        }
        self.state
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn bpm(&self) -> u8 {
        self.tempo.bpm()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn idle_policy(&self) -> IdlePolicy {
        self.idle
    }

    pub fn compare_value(&self) -> u16 {
        self.timer.compare_value()
    }

    pub fn peripherals(&self) -> &Arc<Peripherals<T>> {
        &self.peripherals
    }

    pub fn status(&self) -> EngineStatus {
        let (ticks, levels, midi_overruns) = self.peripherals.with_fanout(|fanout| {
            (
                fanout.ticks(),
                Division::ALL.map(|division| fanout.level(division)),
                fanout.midi_overruns(),
            )
        });
        EngineStatus {
            state: self.state,
            tempo: self.tempo,
            compare_value: self.compare_value(),
            ticks,
            levels,
            midi_overruns,
        }
    }
}
