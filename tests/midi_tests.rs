use std::error::Error;
use std::thread;
use std::time::Duration;
use tempoclock::keepalive::Keepalive;
use tempoclock::midi::{self, MidiEngine, MidiError, MidiMessage, MockMidiEngine};

#[test]
fn test_status_bytes() {
    assert_eq!(MidiMessage::TimingClock.status_byte(), 0xF8);
    assert_eq!(MidiMessage::ActiveSensing.status_byte(), 0xFE);
    assert_eq!(
        MidiMessage::from_status_byte(0xF8),
        Some(MidiMessage::TimingClock)
    );
    assert_eq!(
        MidiMessage::from_status_byte(0xFE),
        Some(MidiMessage::ActiveSensing)
    );
    // Start/stop and channel messages are not produced by this clock
    assert_eq!(MidiMessage::from_status_byte(0xFA), None);
    assert_eq!(MidiMessage::from_status_byte(0x90), None);
}

#[test]
fn test_midi_error_display() {
    let send_error = MidiError::SendError("Failed to send".to_string());
    let conn_error = MidiError::ConnectionError("Failed to connect".to_string());
    let missing = MidiError::DeviceNotFound("Synth".to_string());

    assert_eq!(send_error.to_string(), "MIDI send error: Failed to send");
    assert_eq!(
        conn_error.to_string(),
        "MIDI connection error: Failed to connect"
    );
    assert_eq!(missing.to_string(), "MIDI output device not found: Synth");
    let _: &dyn Error = &missing;
}

#[test]
fn test_tx_buffer_counts_overruns() {
    let (tx, rx) = midi::tx_buffer(2);

    assert!(tx.send(MidiMessage::TimingClock));
    assert!(tx.send(MidiMessage::TimingClock));
    assert!(!tx.send(MidiMessage::ActiveSensing));
    assert_eq!(tx.overruns(), 1);

    assert_eq!(rx.drain().len(), 2);
    assert!(tx.send(MidiMessage::ActiveSensing));
}

#[test]
fn test_writer_forwards_in_order_until_senders_drop() {
    let (tx, rx) = midi::tx_buffer(16);
    let engine = MockMidiEngine::new();
    let handle = midi::spawn_writer(rx, engine.clone()).unwrap();

    tx.send(MidiMessage::TimingClock);
    tx.send(MidiMessage::ActiveSensing);
    tx.send(MidiMessage::TimingClock);
    drop(tx);
    handle.join().unwrap();

    assert_eq!(
        engine.sent(),
        vec![
            MidiMessage::TimingClock,
            MidiMessage::ActiveSensing,
            MidiMessage::TimingClock
        ]
    );
}

#[test]
fn test_writer_survives_send_errors() {
    let (tx, rx) = midi::tx_buffer(16);
    let handle = midi::spawn_writer(rx, MockMidiEngine::failing()).unwrap();

    for _ in 0..5 {
        tx.send(MidiMessage::TimingClock);
    }
    drop(tx);
    assert!(handle.join().is_ok());
}

#[test]
fn test_failing_mock_reports_send_error() {
    let mut engine = MockMidiEngine::failing();
    match engine.send(MidiMessage::TimingClock) {
        Err(MidiError::SendError(_)) => {}
        other => panic!("expected send error, got {:?}", other),
    }
}

#[test]
fn test_keepalive_sends_active_sensing() {
    let (tx, rx) = midi::tx_buffer(64);
    let mut keepalive = Keepalive::start(tx, Duration::from_millis(20)).unwrap();

    thread::sleep(Duration::from_millis(110));
    keepalive.stop();

    let sent = rx.drain();
    assert!(
        (3..=8).contains(&sent.len()),
        "expected about 6 keepalives, got {}",
        sent.len()
    );
    assert!(sent.iter().all(|msg| *msg == MidiMessage::ActiveSensing));
}
