use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI output devices
    #[arg(long)]
    pub device_list: bool,

    /// Send the clock to this MIDI output device (substring match)
    #[arg(long)]
    pub midi_output: Option<String>,

    /// Start at this tempo instead of the stored one
    #[arg(short, long)]
    pub bpm: Option<u16>,

    /// Settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// EEPROM image holding the stored tempo
    #[arg(long)]
    pub eeprom: Option<PathBuf>,

    /// Drive the clock outputs low when stopped
    #[arg(long)]
    pub idle_low: bool,

    /// Do not start the clock on launch
    #[arg(long)]
    pub paused: bool,

    /// Show a live status display instead of the command prompt
    #[arg(long)]
    pub monitor: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available MIDI outputs:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
