//! Terminal status display
//!
//! Beat and bar progress plus a transport line, drawn with indicatif from
//! periodic engine snapshots. Used in `--monitor` mode.

mod progress;

pub use progress::{
    create_bar_progress, create_beat_progress, create_transport_spinner, format_levels,
    position_in_bar, BEATS_PER_BAR,
};

use crate::engine::SharedEngine;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use log::{debug, warn};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const REFRESH: Duration = Duration::from_millis(50);

pub struct StatusDisplay {
    #[allow(dead_code)]
    multi_progress: MultiProgress,
    beat_pb: ProgressBar,
    bar_pb: ProgressBar,
    transport_pb: ProgressBar,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());
        let beat_pb = multi_progress.add(create_beat_progress());
        let bar_pb = multi_progress.add(create_bar_progress());
        let transport_pb = multi_progress.add(create_transport_spinner());

        StatusDisplay {
            multi_progress,
            beat_pb,
            bar_pb,
            transport_pb,
        }
    }

    pub fn refresh(&self, engine: &SharedEngine) {
        let status = match engine.lock() {
            Ok(engine) => engine.status(),
            Err(_) => {
                warn!("Clock engine lock poisoned, status not refreshed");
                return;
            }
        };

        let (tick, beat) = position_in_bar(status.ticks);
        self.beat_pb.set_position(u64::from(tick));
        self.bar_pb.set_position(u64::from(beat + 1));
        self.transport_pb.set_message(format!(
            "{:?} | {} | compare {} | ticks {} | {} | overruns {}",
            status.state,
            status.tempo,
            status.compare_value,
            status.ticks,
            format_levels(&status.levels),
            status.midi_overruns
        ));
        self.transport_pb.tick();
    }
}

/// Redraws the status display until the process exits.
pub fn run_status_display(engine: SharedEngine) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("status-display".to_string())
        .spawn(move || {
            debug!("Status display started");
            let display = StatusDisplay::new();
            loop {
                display.refresh(&engine);
                thread::sleep(REFRESH);
            }
        })
}
