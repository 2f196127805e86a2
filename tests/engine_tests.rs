use std::sync::Arc;
use tempoclock::fanout::{ClockProbes, Division, FanOut};
use tempoclock::gpio::Level;
use tempoclock::midi::{self, MidiMessage, MidiRx};
use tempoclock::tempo::compare_value_for;
use tempoclock::{ClockEngine, EngineState, IdlePolicy, Peripherals, SimulatedTimer, Tempo};

fn engine(idle: IdlePolicy) -> (ClockEngine, ClockProbes, MidiRx) {
    let (tx, rx) = midi::tx_buffer(1024);
    let (fanout, probes) = FanOut::simulated(tx);
    let peripherals = Arc::new(Peripherals::new(SimulatedTimer::new(), fanout));
    (ClockEngine::new(peripherals, idle), probes, rx)
}

/// Raises `n` compare-match interrupts, returning how many were serviced.
fn fire(engine: &ClockEngine, n: u32) -> u32 {
    (0..n)
        .filter(|_| engine.peripherals().on_compare_match())
        .count() as u32
}

fn phase(engine: &ClockEngine, division: Division) -> u16 {
    engine
        .peripherals()
        .with_fanout(|fanout| fanout.phase(division))
}

#[test]
fn test_new_engine_is_stopped_at_default_tempo() {
    let (engine, _probes, _rx) = engine(IdlePolicy::HoldLast);

    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.bpm(), 120);
    assert_eq!(engine.compare_value(), compare_value_for(120));
}

#[test]
fn test_no_ticks_while_stopped() {
    let (engine, probes, rx) = engine(IdlePolicy::HoldLast);

    assert_eq!(fire(&engine, 10), 0);
    assert!(rx.drain().is_empty());
    assert_eq!(probes.get(Division::Double).edges(), 0);
}

#[test]
fn test_start_at_120_runs_all_divisions() {
    let (mut engine, probes, rx) = engine(IdlePolicy::HoldLast);
    let tempo = engine.start(120);

    assert_eq!(tempo, Tempo::default());
    assert_eq!(engine.state(), EngineState::Running);
    assert_eq!(engine.compare_value(), compare_value_for(120));

    assert_eq!(fire(&engine, 96), 96);
    assert_eq!(probes.get(Division::Double).edges(), 8);
    assert_eq!(probes.get(Division::Unity).edges(), 4);
    assert_eq!(probes.get(Division::Half).edges(), 2);
    assert_eq!(probes.get(Division::Quarter).edges(), 1);
    for division in Division::ALL {
        assert_eq!(phase(&engine, division), 0);
    }

    let sent = rx.drain();
    assert_eq!(sent.len(), 96);
    assert!(sent.iter().all(|msg| *msg == MidiMessage::TimingClock));
}

#[test]
fn test_restart_realigns_phases() {
    let (mut engine, probes, rx) = engine(IdlePolicy::HoldLast);
    engine.start(120);
    fire(&engine, 30);
    engine.stop();
    rx.drain();

    // Held levels after 30 ticks: 2x toggled 3 times, 1x twice, the rest once
    let held = [Level::High, Level::Low, Level::High, Level::High];
    let edges = Division::ALL.map(|division| probes.get(division).edges());

    engine.start(140);
    assert_eq!(engine.bpm(), 140);
    for (i, division) in Division::ALL.into_iter().enumerate() {
        assert_eq!(phase(&engine, division), 0);
        // Starting does not move any output before tick 0
        assert_eq!(probes.get(division).level(), held[i]);
        assert_eq!(probes.get(division).edges(), edges[i]);
    }

    // Tick 0 of the new run toggles every line at once
    fire(&engine, 1);
    for (i, division) in Division::ALL.into_iter().enumerate() {
        assert_eq!(probes.get(division).level(), !held[i]);
        assert_eq!(probes.get(division).edges(), edges[i] + 1);
    }

    // The double-rate line next toggles exactly on tick 12, not earlier
    fire(&engine, 11);
    assert_eq!(probes.get(Division::Double).level(), Level::Low);
    fire(&engine, 1);
    assert_eq!(probes.get(Division::Double).level(), Level::High);
    assert_eq!(rx.drain().len(), 13);
}

#[test]
fn test_restart_after_drive_low_rises_on_tick_zero() {
    let (mut engine, probes, _rx) = engine(IdlePolicy::DriveLow);
    engine.start(120);
    fire(&engine, 30);
    engine.stop();

    engine.start(120);
    for division in Division::ALL {
        assert_eq!(probes.get(division).level(), Level::Low);
    }
    let rising = Division::ALL.map(|division| probes.get(division).rising_edges());

    fire(&engine, 1);
    for (i, division) in Division::ALL.into_iter().enumerate() {
        assert_eq!(probes.get(division).level(), Level::High);
        assert_eq!(probes.get(division).rising_edges(), rising[i] + 1);
    }
}

#[test]
fn test_retune_keeps_phase() {
    let (mut engine, probes, _rx) = engine(IdlePolicy::HoldLast);
    engine.start(120);
    fire(&engine, 30);
    assert_eq!(phase(&engine, Division::Unity), 6);
    let unity_edges = probes.get(Division::Unity).edges();

    let tempo = engine.retune(200);
    assert_eq!(tempo.bpm(), 200);
    assert_eq!(engine.state(), EngineState::Running);
    assert_eq!(engine.compare_value(), compare_value_for(200));
    assert_eq!(phase(&engine, Division::Unity), 6);

    // Ticks 30..=47 complete the current period, tick 48 toggles
    fire(&engine, 18);
    assert_eq!(probes.get(Division::Unity).edges(), unity_edges);
    fire(&engine, 1);
    assert_eq!(probes.get(Division::Unity).edges(), unity_edges + 1);
}

#[test]
fn test_start_while_running_only_retunes() {
    let (mut engine, _probes, _rx) = engine(IdlePolicy::HoldLast);
    engine.start(120);
    fire(&engine, 5);

    engine.start(90);
    assert_eq!(engine.bpm(), 90);
    assert_eq!(phase(&engine, Division::Double), 5);
    assert_eq!(
        engine.peripherals().with_fanout(|fanout| fanout.ticks()),
        5
    );
}

#[test]
fn test_facade_clamps_requests() {
    let (mut engine, _probes, _rx) = engine(IdlePolicy::HoldLast);

    assert_eq!(engine.start(29).bpm(), 30);
    assert_eq!(engine.compare_value(), compare_value_for(30));

    assert_eq!(engine.retune(251).bpm(), 250);
    assert_eq!(engine.compare_value(), compare_value_for(250));
}

#[test]
fn test_stop_holds_levels_by_default() {
    let (mut engine, probes, _rx) = engine(IdlePolicy::HoldLast);
    engine.start(120);
    fire(&engine, 1);
    engine.stop();

    assert_eq!(engine.state(), EngineState::Stopped);
    for division in Division::ALL {
        assert_eq!(probes.get(division).level(), Level::High);
    }
    assert_eq!(fire(&engine, 5), 0);
}

#[test]
fn test_stop_drives_low_when_configured() {
    let (mut engine, probes, rx) = engine(IdlePolicy::DriveLow);
    engine.start(120);
    fire(&engine, 1);
    engine.stop();

    for division in Division::ALL {
        assert_eq!(probes.get(division).level(), Level::Low);
    }
    rx.drain();
    assert_eq!(fire(&engine, 5), 0);
    assert!(rx.drain().is_empty());
}

#[test]
fn test_stop_is_idempotent() {
    let (mut engine, _probes, _rx) = engine(IdlePolicy::HoldLast);
    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);

    engine.start(120);
    engine.stop();
    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[test]
fn test_toggle_and_nudge() {
    let (mut engine, _probes, _rx) = engine(IdlePolicy::HoldLast);
    engine.retune(100);

    assert_eq!(engine.toggle(), EngineState::Running);
    assert_eq!(engine.bpm(), 100);
    assert_eq!(engine.nudge(5).bpm(), 105);
    assert_eq!(engine.nudge(-500).bpm(), 30);
    assert_eq!(engine.toggle(), EngineState::Stopped);
}

#[test]
fn test_status_snapshot() {
    let (mut engine, _probes, _rx) = engine(IdlePolicy::HoldLast);
    engine.start(120);
    fire(&engine, 13);

    let status = engine.status();
    assert_eq!(status.state, EngineState::Running);
    assert_eq!(status.tempo.bpm(), 120);
    assert_eq!(status.compare_value, compare_value_for(120));
    assert_eq!(status.ticks, 13);
    // Double-rate line has toggled twice (ticks 0 and 12), others once
    assert_eq!(
        status.levels,
        [Level::Low, Level::High, Level::High, Level::High]
    );
    assert_eq!(status.midi_overruns, 0);
}
