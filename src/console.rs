use crate::models::{Outcome, RunSummary};
use chrono::{DateTime, Local};
use crossterm::style::{style, Stylize};
use std::io::{self, Write};
use std::time::Duration;

const WIDTH: usize = 60;

pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 || (hours == 0 && mins == 0) {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}

pub fn timestamp(now: DateTime<Local>) -> String {
    format!("[{}]", now.format("%H:%M:%S"))
}

pub fn heavy_rule() -> String {
    "=".repeat(WIDTH)
}

pub fn rule() -> String {
    "-".repeat(WIDTH)
}

pub fn banner(out: &mut dyn Write, title: &str, lines: &[String]) -> io::Result<()> {
    writeln!(out, "{}", heavy_rule())?;
    writeln!(out, "{}", style(title).cyan().bold())?;
    writeln!(out, "{}", heavy_rule())?;
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    writeln!(out)?;
    writeln!(out, "Monitoring started. Press Ctrl+C to stop.")?;
    writeln!(out, "Move mouse to a corner to trigger fail-safe abort.")?;
    writeln!(out, "{}", rule())
}

pub fn inactive_line(now: DateTime<Local>, idle: Duration, action: &str) -> String {
    format!(
        "{} {} for {}s - Performing {}...",
        timestamp(now),
        "INACTIVE".yellow().bold(),
        idle.as_secs(),
        action
    )
}

pub fn action_done_line(now: DateTime<Local>, total: u64) -> String {
    format!(
        "{} {} Action completed (total actions: {})",
        timestamp(now),
        "✓".green(),
        total
    )
}

pub fn active_line(
    now: DateTime<Local>,
    idle: Duration,
    pointer: Option<(i32, i32)>,
    remaining: Duration,
) -> String {
    let pointer = match pointer {
        Some((x, y)) => format!("({}, {})", x, y),
        None => "(?, ?)".to_string(),
    };
    format!(
        "{} {} - Idle: {}s - Mouse: {} - Timeout in {}s",
        timestamp(now),
        "Active".green(),
        idle.as_secs(),
        pointer,
        remaining.as_secs()
    )
}

pub fn off_hours_line(now: DateTime<Local>, idle: Duration) -> String {
    format!(
        "{} {} - Idle: {}s - No action taken",
        timestamp(now),
        "Outside work hours".dark_grey(),
        idle.as_secs()
    )
}

pub fn process_line(now: DateTime<Local>, name: &str, running: bool) -> String {
    let state = if running {
        "running".green().bold()
    } else {
        "not running".red().bold()
    };
    format!("{} Process '{}' is {}", timestamp(now), name, state)
}

pub fn summary(out: &mut dyn Write, summary: &RunSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule())?;
    if summary.outcome == Outcome::FailSafe {
        writeln!(
            out,
            "{} Fail-safe triggered (mouse moved to corner)",
            "⚠".yellow().bold()
        )?;
    }
    writeln!(
        out,
        "✓ Monitoring stopped. Total actions performed: {}",
        summary.actions
    )?;
    writeln!(out, "{}", heavy_rule())
}
