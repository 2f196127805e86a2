use tempoclock::config::{DEFAULT_BPM, MAX_BPM, MIN_BPM};
use tempoclock::storage::{self, MemoryStore};
use tempoclock::tempo::{compare_value_for, ideal_tick_hz, realized_tick_hz, tick_interval, Tempo};

#[test]
fn test_compare_value_never_increases_with_tempo() {
    for bpm in MIN_BPM..MAX_BPM {
        assert!(
            compare_value_for(bpm + 1) <= compare_value_for(bpm),
            "compare value rose between {} and {} BPM",
            bpm,
            bpm + 1
        );
    }
}

#[test]
fn test_realized_tick_rate_within_a_tenth_of_a_percent() {
    for bpm in MIN_BPM..=MAX_BPM {
        let ideal = ideal_tick_hz(bpm);
        let realized = realized_tick_hz(compare_value_for(bpm));
        let error = (realized - ideal).abs() / ideal;
        assert!(
            error < 0.001,
            "{} BPM: ideal {} Hz, realized {} Hz, error {:.5}%",
            bpm,
            ideal,
            realized,
            error * 100.0
        );
    }
}

#[test]
fn test_tick_interval_matches_realized_rate() {
    for bpm in [MIN_BPM, DEFAULT_BPM, MAX_BPM] {
        let compare = compare_value_for(bpm);
        let from_interval = 1.0 / tick_interval(compare).as_secs_f64();
        assert!((from_interval - realized_tick_hz(compare)).abs() < 1e-6);
    }
}

#[test]
fn test_out_of_range_requests_clamp() {
    assert_eq!(Tempo::clamped(29).bpm(), 30);
    assert_eq!(Tempo::clamped(0).bpm(), 30);
    assert_eq!(Tempo::clamped(251).bpm(), 250);
    assert_eq!(Tempo::clamped(u16::MAX).bpm(), 250);
    assert_eq!(Tempo::clamped(120).bpm(), 120);
}

#[test]
fn test_extreme_offsets_clamp_without_overflow() {
    assert_eq!(Tempo::MAX.offset(i32::MAX), Tempo::MAX);
    assert_eq!(Tempo::MIN.offset(i32::MIN), Tempo::MIN);
    assert_eq!(Tempo::MIN.offset(i32::MAX), Tempo::MAX);
    assert_eq!(Tempo::MAX.offset(i32::MIN), Tempo::MIN);
}

#[test]
fn test_new_rejects_out_of_range() {
    assert_eq!(Tempo::new(29), None);
    assert_eq!(Tempo::new(251), None);
    assert_eq!(Tempo::new(30), Some(Tempo::MIN));
    assert_eq!(Tempo::new(250), Some(Tempo::MAX));
}

#[test]
fn test_default_tempo_matches_explicit_request() {
    let cold_start = storage::initial_tempo(&mut MemoryStore::new());
    assert_eq!(cold_start, Tempo::default());
    assert_eq!(cold_start.compare_value(), compare_value_for(120));
    assert_eq!(Tempo::clamped(120).compare_value(), cold_start.compare_value());
}

#[test]
fn test_display() {
    assert_eq!(Tempo::clamped(128).to_string(), "128 BPM");
}
