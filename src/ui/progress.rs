use crate::config::PULSES_PER_QUARTER_NOTE;
use crate::fanout::Division;
use crate::gpio::Level;
use indicatif::{ProgressBar, ProgressStyle};

/// Beats shown per bar, matching the quarter-rate output's whole period.
pub const BEATS_PER_BAR: u32 = 4;

fn style(template: &str, chars: Option<&str>) -> ProgressStyle {
    let base = if chars.is_some() {
        ProgressStyle::default_bar()
    } else {
        ProgressStyle::default_spinner()
    };
    let styled = base.clone().template(template).unwrap_or(base);
    match chars {
        Some(chars) => styled.progress_chars(chars),
        None => styled,
    }
}

pub fn create_beat_progress() -> ProgressBar {
    let pb = ProgressBar::new(u64::from(PULSES_PER_QUARTER_NOTE));
    pb.set_style(style(
        "{prefix:.bold} [{bar:40.cyan}] {pos}/{len}",
        Some("⣀⣤⣦⣶⣷⣿ "),
    ));
    pb.set_prefix("Beat");
    pb
}

pub fn create_bar_progress() -> ProgressBar {
    let pb = ProgressBar::new(u64::from(BEATS_PER_BAR));
    pb.set_style(style(
        "{prefix:.bold} [{bar:20.white/black}] {pos}/{len}",
        Some("█▊ "),
    ));
    pb.set_prefix("Bar");
    pb
}

pub fn create_transport_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(style("{prefix:.bold.dim} {spinner} {wide_msg}", None));
    pb.set_prefix("Transport");
    pb
}

/// Tick within the current beat and beat within the current bar.
pub fn position_in_bar(ticks: u32) -> (u32, u32) {
    let tick = ticks % PULSES_PER_QUARTER_NOTE;
    let beat = (ticks / PULSES_PER_QUARTER_NOTE) % BEATS_PER_BAR;
    (tick, beat)
}

/// Output levels as a compact row, e.g. `2x:# 1x:_ 1/2:_ 1/4:#`.
pub fn format_levels(levels: &[Level; 4]) -> String {
    Division::ALL
        .iter()
        .zip(levels.iter())
        .map(|(division, level)| {
            let mark = match level {
                Level::High => '#',
                Level::Low => '_',
            };
            format!("{}:{}", division, mark)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
