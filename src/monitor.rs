use crate::actions::Actuator;
use crate::console;
use crate::input::{InputError, InputInjector};
use crate::models::{ActionKind, Outcome, RunSummary};
use crate::schedule::WorkHours;
use crate::shutdown::Pause;
use crate::system::IdleSource;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::Write;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub timeout: Duration,
    pub action: ActionKind,
    pub check_interval: Duration,
    /// Duration of each pointer movement within an action
    pub motion: Duration,
    pub work_hours: Option<WorkHours>,
}

/// What a single tick observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Acted { idle: Duration },
    Active { idle: Duration, remaining: Duration },
    OffHours { idle: Duration },
}

pub fn should_act(idle: Duration, timeout: Duration) -> bool {
    idle >= timeout
}

fn is_failsafe(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::FailSafe { .. })
    )
}

pub struct Monitor<S, I> {
    settings: MonitorSettings,
    idle: S,
    actuator: Actuator<I>,
    actions: u64,
}

impl<S: IdleSource, I: InputInjector> Monitor<S, I> {
    pub fn new(settings: MonitorSettings, idle: S, injector: I) -> Self {
        Self {
            settings,
            idle,
            actuator: Actuator::new(injector),
            actions: 0,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    #[cfg(test)]
    pub fn actions(&self) -> u64 {
        self.actions
    }

    pub fn summary(&self, outcome: Outcome) -> RunSummary {
        RunSummary {
            actions: self.actions,
            outcome,
        }
    }

    pub fn tick(&mut self, now: DateTime<Local>, out: &mut dyn Write) -> Result<Tick> {
        let idle = self.idle.idle_time();

        if let Some(hours) = &self.settings.work_hours {
            if !hours.contains(now.naive_local()) {
                writeln!(out, "{}", console::off_hours_line(now, idle))?;
                return Ok(Tick::OffHours { idle });
            }
        }

        if should_act(idle, self.settings.timeout) {
            let action = self.settings.action;
            writeln!(out, "{}", console::inactive_line(now, idle, &action.to_string()))?;
            self.actuator.perform(action, self.settings.motion)?;
            self.actions += 1;
            tracing::info!(%action, idle_secs = idle.as_secs(), total = self.actions, "Simulated activity");
            writeln!(out, "{}", console::action_done_line(now, self.actions))?;
            return Ok(Tick::Acted { idle });
        }

        let remaining = self.settings.timeout.saturating_sub(idle);
        let pointer = self.actuator.position().ok();
        writeln!(
            out,
            "{}",
            console::active_line(now, idle, pointer, remaining)
        )?;
        Ok(Tick::Active { idle, remaining })
    }

    /// Ticks at the current time. A fail-safe abort is returned as an
    /// outcome, every other failure as an error.
    pub fn guarded_tick(&mut self, out: &mut dyn Write) -> Result<Option<Outcome>> {
        match self.tick(Local::now(), out) {
            Ok(tick) => {
                match tick {
                    Tick::Acted { idle } => {
                        tracing::debug!(idle_secs = idle.as_secs(), "Threshold reached")
                    }
                    Tick::Active { idle, remaining } => tracing::trace!(
                        idle_secs = idle.as_secs(),
                        remaining_secs = remaining.as_secs(),
                        "Below threshold"
                    ),
                    Tick::OffHours { idle } => {
                        tracing::trace!(idle_secs = idle.as_secs(), "Outside work hours")
                    }
                }
                Ok(None)
            }
            Err(err) if is_failsafe(&err) => {
                tracing::warn!(error = %err, "Stopping on fail-safe");
                Ok(Some(Outcome::FailSafe))
            }
            Err(err) => Err(err),
        }
    }

    pub fn run(&mut self, pause: &dyn Pause, out: &mut dyn Write) -> Result<RunSummary> {
        loop {
            if !pause.pause(self.settings.check_interval) {
                return Ok(self.summary(Outcome::Interrupted));
            }
            if let Some(outcome) = self.guarded_tick(out)? {
                return Ok(self.summary(outcome));
            }
        }
    }
}
