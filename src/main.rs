use clap::Parser;
use simplelog::LevelFilter;
use std::error::Error;
use std::time::Duration;
use std::{process, thread};
use tempoclock::{
    cli::{validate_device, Args},
    config::Settings,
    control::{self, Controller},
    create_clock_rig,
    keepalive::Keepalive,
    logging,
    midi::{self, DefaultMidiEngine},
    storage::{self, EepromFile},
    ui, IdlePolicy, Tempo,
};

fn main() {
    let args = Args::parse();
    initialize_logging(&args);

    if args.device_list {
        list_available_devices(&DefaultMidiEngine::list_devices());
        return;
    }

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn initialize_logging(args: &Args) {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = logging::init_logger(level) {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Application starting");
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI output devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply_args(args);

    if let Some(device_name) = &settings.midi_output {
        validate_device(device_name, &DefaultMidiEngine::list_devices())?;
    }

    let (tx, rx) = midi::tx_buffer(settings.tx_capacity);
    let midi_engine = DefaultMidiEngine::new(settings.midi_output.as_deref())?;
    midi::spawn_writer(rx, midi_engine)?;

    let idle = if settings.idle_low {
        IdlePolicy::DriveLow
    } else {
        IdlePolicy::HoldLast
    };
    let mut rig = create_clock_rig(tx.clone(), idle)?;
    let mut keepalive = Keepalive::start(tx, Duration::from_millis(settings.keepalive_ms))?;

    let mut store = EepromFile::new(settings.eeprom.clone());
    let tempo = match settings.bpm {
        Some(bpm) => Tempo::clamped(bpm),
        None => storage::initial_tempo(&mut store),
    };

    {
        let mut engine = rig.engine.lock().map_err(|_| "clock engine lock poisoned")?;
        if args.paused {
            engine.retune(u16::from(tempo.bpm()));
        } else {
            engine.start(u16::from(tempo.bpm()));
        }
    }

    if args.monitor {
        ui::run_status_display(rig.engine.clone())?;
        log::info!("Monitoring. Press Ctrl+C to exit...");
        println!("\nPress Ctrl+C to exit...");
        loop {
            thread::sleep(Duration::from_secs(1));
        }
    }

    let mut controller = Controller::new(rig.engine.clone(), &mut store);
    control::run_prompt(&mut controller)?;

    if let Ok(mut engine) = rig.engine.lock() {
        engine.stop();
    }
    keepalive.stop();
    rig.timebase.shutdown();
    log::info!("Application exiting");
    Ok(())
}
