use crate::actions::Actuator;
use crate::input::{InputInjector, Key, MouseButton};
use anyhow::Result;
use std::io::Write;
use std::thread;
use std::time::Duration;

const STEP_MOTION: Duration = Duration::from_millis(500);
const STEP_TYPING_INTERVAL: Duration = Duration::from_millis(100);

/// One step of a `sequence` command, written as `kind[:argument]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Move { x: i32, y: i32 },
    Click,
    Type(String),
    Press(Key),
    Wait(Duration),
    Unknown(String),
}

pub fn parse_step(raw: &str) -> Step {
    let unknown = || Step::Unknown(raw.to_string());
    let (kind, arg) = match raw.split_once(':') {
        Some((kind, arg)) => (kind.trim().to_lowercase(), Some(arg)),
        None => (raw.trim().to_lowercase(), None),
    };

    match (kind.as_str(), arg) {
        ("move", Some(arg)) => {
            let coords: Vec<&str> = arg.split(',').map(str::trim).collect();
            match coords.as_slice() {
                [x, y] => match (x.parse(), y.parse()) {
                    (Ok(x), Ok(y)) => Step::Move { x, y },
                    _ => unknown(),
                },
                _ => unknown(),
            }
        }
        ("click", _) => Step::Click,
        ("type", Some(text)) if !text.is_empty() => Step::Type(text.to_string()),
        ("press", Some(key)) => key.parse().map(Step::Press).unwrap_or_else(|_| unknown()),
        ("wait", Some(secs)) => match secs.trim().parse::<f64>() {
            Ok(secs) => Duration::try_from_secs_f64(secs)
                .map(Step::Wait)
                .unwrap_or_else(|_| unknown()),
            Err(_) => unknown(),
        },
        _ => unknown(),
    }
}

/// Runs each step in order with `delay` between steps. Unknown steps are
/// reported and skipped.
pub fn run_sequence<I: InputInjector>(
    actuator: &mut Actuator<I>,
    steps: &[String],
    delay: Duration,
    out: &mut dyn Write,
) -> Result<()> {
    let total = steps.len();
    writeln!(
        out,
        "Executing {} commands with {}s delay between each",
        total,
        delay.as_secs_f64()
    )?;

    for (i, raw) in steps.iter().enumerate() {
        writeln!(out, "\n[{}/{}] Executing: {}", i + 1, total, raw)?;

        match parse_step(raw) {
            Step::Move { x, y } => {
                actuator.move_to(x, y, STEP_MOTION)?;
                writeln!(out, "  ✓ Moved to ({}, {})", x, y)?;
            }
            Step::Click => {
                actuator.click(None, 1, MouseButton::Left)?;
                writeln!(out, "  ✓ Clicked")?;
            }
            Step::Type(text) => {
                actuator.type_text(&text, STEP_TYPING_INTERVAL)?;
                writeln!(out, "  ✓ Typed: {}", text)?;
            }
            Step::Press(key) => {
                actuator.press(key, 1)?;
                let name = raw.split_once(':').map_or(raw.as_str(), |(_, k)| k);
                writeln!(out, "  ✓ Pressed: {}", name)?;
            }
            Step::Wait(wait) => {
                thread::sleep(wait);
                writeln!(out, "  ✓ Waited {}s", wait.as_secs_f64())?;
            }
            Step::Unknown(cmd) => {
                tracing::warn!(step = %cmd, "Skipping unknown sequence step");
                writeln!(out, "  ✗ Unknown command: {}", cmd)?;
            }
        }

        if i + 1 < total && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    writeln!(out, "\n✓ Sequence completed successfully")?;
    Ok(())
}
