// config.rs

use config::{ConfigError, Environment, File};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::cli::Args;

pub const MIN_BPM: u8 = 30;
pub const MAX_BPM: u8 = 250;
pub const DEFAULT_BPM: u8 = 120;

/// MIDI standard PPQ (Pulses Per Quarter Note)
pub const PULSES_PER_QUARTER_NOTE: u32 = 24;

/// Input clock of the timebase counter.
pub const TIMER_CLOCK_HZ: u32 = 16_000_000;
/// Counter prescaler used while running. Must match `timer::RUNNING_CLOCK`.
pub const TIMER_PRESCALER: u32 = 64;

pub const EEPROM_SIZE: usize = 1024;
pub const EEPROM_BPM_ADDR: usize = 0x0F;

pub const DEFAULT_KEEPALIVE_MS: u64 = 250;
pub const DEFAULT_TX_CAPACITY: usize = 64;

/// Board pin assignments.
///
/// Board v1 has the encoder on plain GPIO pins without external interrupt
/// capability; v2 swaps the MIDI serial and encoder pins around.
pub mod board {
    #[cfg(not(any(feature = "board-rev-1", feature = "board-rev-2")))]
    compile_error!("Please select board revision feature `board-rev-1` or `board-rev-2`");

    #[cfg(feature = "board-rev-1")]
    mod rev {
        pub const REVISION: u8 = 1;
        pub const ENC_A_PIN: u8 = 8;
        pub const ENC_B_PIN: u8 = 9;
        pub const MIDI_OUT_PIN: u8 = 3;
    }

    #[cfg(all(feature = "board-rev-2", not(feature = "board-rev-1")))]
    mod rev {
        pub const REVISION: u8 = 2;
        pub const ENC_A_PIN: u8 = 2;
        pub const ENC_B_PIN: u8 = 3;
        pub const MIDI_OUT_PIN: u8 = 9;
    }

    pub use rev::*;

    pub const MIDI_IN_PIN: u8 = MIDI_OUT_PIN - 1;
    pub const BUTTON_PIN: u8 = 10;
    pub const CLOCK_2X_PIN: u8 = 4;
    pub const CLOCK_1X_PIN: u8 = 5;
    pub const CLOCK_HALF_PIN: u8 = 6;
    pub const CLOCK_QUARTER_PIN: u8 = 7;
}

/// Runtime settings, layered from defaults, an optional settings file,
/// `TEMPOCLOCK_*` environment variables and finally command line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bpm: Option<u16>,
    pub midi_output: Option<String>,
    pub eeprom: PathBuf,
    pub idle_low: bool,
    pub keepalive_ms: u64,
    pub tx_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bpm: None,
            midi_output: None,
            eeprom: default_eeprom_path(),
            idle_low: false,
            keepalive_ms: DEFAULT_KEEPALIVE_MS,
            tx_capacity: DEFAULT_TX_CAPACITY,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = config::Config::builder()
            .set_default("idle_low", defaults.idle_low)?
            .set_default("keepalive_ms", defaults.keepalive_ms as i64)?
            .set_default("tx_capacity", defaults.tx_capacity as i64)?;

        if let Some(path) = path {
            info!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        let raw = builder
            .add_source(Environment::with_prefix("TEMPOCLOCK"))
            .build()?;

        let bpm = match raw.get_int("bpm") {
            Ok(value) => Some(u16::try_from(value.max(0)).unwrap_or(u16::MAX)),
            Err(ConfigError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        let midi_output = optional_string(&raw, "midi_output")?;
        let eeprom = optional_string(&raw, "eeprom")?
            .map(PathBuf::from)
            .unwrap_or(defaults.eeprom);

        let settings = Settings {
            bpm,
            midi_output,
            eeprom,
            idle_low: raw.get_bool("idle_low")?,
            keepalive_ms: raw.get_int("keepalive_ms")?.max(1) as u64,
            tx_capacity: raw.get_int("tx_capacity")?.max(1) as usize,
        };
        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    /// Command line flags win over file and environment values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(bpm) = args.bpm {
            self.bpm = Some(bpm);
        }
        if let Some(device) = &args.midi_output {
            self.midi_output = Some(device.clone());
        }
        if let Some(path) = &args.eeprom {
            self.eeprom = path.clone();
        }
        if args.idle_low {
            self.idle_low = true;
        }
    }
}

fn optional_string(raw: &config::Config, key: &str) -> Result<Option<String>, ConfigError> {
    match raw.get_string(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn default_eeprom_path() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("tempoclock")
            .join("eeprom.bin"),
        Err(_) => PathBuf::from("tempoclock-eeprom.bin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_pins_follow_midi_out() {
        assert_eq!(board::MIDI_IN_PIN, board::MIDI_OUT_PIN - 1);
        assert_ne!(board::ENC_A_PIN, board::ENC_B_PIN);
    }

    #[test]
    fn test_cli_flags_override_settings() {
        use clap::Parser;

        let mut settings = Settings {
            bpm: Some(90),
            ..Settings::default()
        };
        let args = Args::parse_from(["tempoclock", "--bpm", "140", "--idle-low"]);
        settings.apply_args(&args);

        assert_eq!(settings.bpm, Some(140));
        assert!(settings.idle_low);
        assert_eq!(settings.midi_output, None);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.keepalive_ms, DEFAULT_KEEPALIVE_MS);
        assert_eq!(settings.tx_capacity, DEFAULT_TX_CAPACITY);
    }
}
