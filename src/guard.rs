use crate::console;
use crate::input::InputInjector;
use crate::models::{Outcome, RunSummary};
use crate::monitor::Monitor;
use crate::process::{ProcessSource, ProcessWatch};
use crate::shutdown::Pause;
use crate::system::IdleSource;
use anyhow::Result;
use chrono::Local;
use std::io::Write;
use std::time::Duration;

/// Runs the inactivity monitor only while the watched process is running.
///
/// Presence is re-checked every `process_interval` and activity every
/// `check_interval`; waits are cut short so neither schedule drifts. While
/// the process was absent at the last check the loop waits a full
/// `process_interval` and sends no input.
pub fn run_guard<S, I, P>(
    monitor: &mut Monitor<S, I>,
    watch: &mut ProcessWatch<P>,
    process_interval: Duration,
    pause: &dyn Pause,
    out: &mut dyn Write,
) -> Result<RunSummary>
where
    S: IdleSource,
    I: InputInjector,
    P: ProcessSource,
{
    let check_interval = monitor.settings().check_interval;
    let mut present: Option<bool> = None;
    let mut since_check = Duration::ZERO;
    let mut since_tick = Duration::ZERO;

    loop {
        if present.is_none() || since_check >= process_interval {
            let running = watch.is_running();
            if present != Some(running) {
                writeln!(
                    out,
                    "{}",
                    console::process_line(Local::now(), watch.target(), running)
                )?;
                since_tick = Duration::ZERO;
                if running {
                    tracing::info!(process = %watch.target(), "Target process found, monitoring activity");
                } else {
                    tracing::info!(process = %watch.target(), "Target process absent, pausing activity checks");
                }
            }
            present = Some(running);
            since_check = Duration::ZERO;
        }

        let running = present == Some(true);
        let wait = if running {
            check_interval
                .saturating_sub(since_tick)
                .min(process_interval.saturating_sub(since_check))
        } else {
            process_interval
        };
        if !pause.pause(wait) {
            return Ok(monitor.summary(Outcome::Interrupted));
        }
        since_check += wait;
        since_tick += wait;

        if running && since_tick >= check_interval {
            since_tick = Duration::ZERO;
            if let Some(outcome) = monitor.guarded_tick(out)? {
                return Ok(monitor.summary(outcome));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::fake::RecordingInjector;
    use crate::models::ActionKind;
    use crate::monitor::tests::settings;
    use crate::process::fake::ScriptedProcesses;
    use crate::shutdown::fake::ScriptedPause;
    use crate::system::fake::ScriptedIdle;

    #[test]
    fn test_guard_only_checks_activity_while_process_runs() -> Result<()> {
        let mut monitor = Monitor::new(
            settings(300, ActionKind::Press),
            ScriptedIdle::secs(&[0, 400, 0, 999]),
            RecordingInjector::at(500, 500),
        );
        let mut watch = ProcessWatch::new(
            "TMetric",
            ScriptedProcesses::new(&[&["init"], &["init", "TMetric.exe"], &["init"]]),
        );
        let pause = ScriptedPause::ticks(6);
        let mut out = Vec::new();

        let summary = run_guard(
            &mut monitor,
            &mut watch,
            Duration::from_secs(30),
            &pause,
            &mut out,
        )?;

        assert_eq!(summary.outcome, Outcome::Interrupted);
        assert_eq!(summary.actions, 1);

        let secs: Vec<u64> = pause.waits.borrow().iter().map(|w| w.as_secs()).collect();
        assert_eq!(secs, vec![30, 10, 10, 10, 30, 30, 30]);

        let text = String::from_utf8(out)?;
        let process_lines: Vec<&str> = text.lines().filter(|l| l.contains("Process")).collect();
        assert_eq!(process_lines.len(), 3);
        assert!(process_lines[0].contains("not running"));
        assert!(!process_lines[1].contains("not running"));
        assert!(process_lines[2].contains("not running"));

        Ok(())
    }

    #[test]
    fn test_guard_keeps_both_schedules_when_intervals_do_not_divide() -> Result<()> {
        let mut s = settings(300, ActionKind::Press);
        s.check_interval = Duration::from_secs(50);
        let mut monitor = Monitor::new(
            s,
            ScriptedIdle::secs(&[0, 0, 0]),
            RecordingInjector::at(500, 500),
        );
        let mut watch = ProcessWatch::new("TMetric", ScriptedProcesses::new(&[&["TMetric"]]));
        let pause = ScriptedPause::ticks(5);
        let mut out = Vec::new();

        run_guard(
            &mut monitor,
            &mut watch,
            Duration::from_secs(60),
            &pause,
            &mut out,
        )?;

        // Activity at 50, 100, 150s; presence at 0, 60, 120s
        let secs: Vec<u64> = pause.waits.borrow().iter().map(|w| w.as_secs()).collect();
        assert_eq!(secs, vec![50, 10, 40, 20, 30, 30]);
        assert_eq!(watch.source().calls, 3);
        let text = String::from_utf8(out)?;
        assert_eq!(text.lines().filter(|l| l.contains("Timeout in")).count(), 3);

        Ok(())
    }

    #[test]
    fn test_guard_never_acts_without_process() -> Result<()> {
        let mut monitor = Monitor::new(
            settings(1, ActionKind::Jiggle),
            ScriptedIdle::secs(&[600, 600, 600]),
            RecordingInjector::at(500, 500),
        );
        let mut watch = ProcessWatch::new("TMetric", ScriptedProcesses::new(&[&["tmetric-helper"]]));
        let pause = ScriptedPause::ticks(3);
        let mut out = Vec::new();

        let summary = run_guard(
            &mut monitor,
            &mut watch,
            Duration::from_secs(60),
            &pause,
            &mut out,
        )?;

        assert_eq!(summary.actions, 0);
        assert_eq!(monitor.actions(), 0);

        Ok(())
    }

    #[test]
    fn test_guard_stops_on_failsafe() -> Result<()> {
        let mut monitor = Monitor::new(
            settings(60, ActionKind::Move),
            ScriptedIdle::secs(&[120]),
            RecordingInjector::at(1919, 0),
        );
        let mut watch = ProcessWatch::new("tmetric", ScriptedProcesses::new(&[&["TMetric"]]));
        let pause = ScriptedPause::ticks(5);
        let mut out = Vec::new();

        let summary = run_guard(
            &mut monitor,
            &mut watch,
            Duration::from_secs(60),
            &pause,
            &mut out,
        )?;

        assert_eq!(summary.outcome, Outcome::FailSafe);
        assert_eq!(pause.waits.borrow().len(), 1);

        Ok(())
    }
}
