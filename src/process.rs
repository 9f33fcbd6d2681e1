use crate::console;
use crate::shutdown::Pause;
use anyhow::Result;
use chrono::Local;
use std::io::Write;
use std::time::Duration;
use sysinfo::System;

const EXE_SUFFIX: &str = ".exe";

/// Lists the names of currently running processes.
pub trait ProcessSource {
    fn process_names(&mut self) -> Vec<String>;
}

pub struct SystemProcesses {
    sys: System,
}

impl Default for SystemProcesses {
    fn default() -> Self {
        Self { sys: System::new() }
    }
}

impl ProcessSource for SystemProcesses {
    fn process_names(&mut self) -> Vec<String> {
        // Processes that vanish or deny access are simply left out of the listing
        self.sys.refresh_processes();
        self.sys
            .processes()
            .values()
            .map(|p| p.name().to_string())
            .collect()
    }
}

fn strip_exe(name: &str) -> &str {
    let split = name.len().saturating_sub(EXE_SUFFIX.len());
    match name.get(split..) {
        Some(tail) if split > 0 && tail.eq_ignore_ascii_case(EXE_SUFFIX) => &name[..split],
        _ => name,
    }
}

/// Case-insensitive exact comparison, ignoring a trailing `.exe` on either
/// side. Substrings never match.
pub fn matches_process_name(candidate: &str, target: &str) -> bool {
    let candidate = strip_exe(candidate.trim()).to_lowercase();
    let target = strip_exe(target.trim()).to_lowercase();
    !target.is_empty() && candidate == target
}

pub struct ProcessWatch<S> {
    target: String,
    source: S,
}

impl<S: ProcessSource> ProcessWatch<S> {
    pub fn new(target: impl Into<String>, source: S) -> Self {
        Self {
            target: target.into(),
            source,
        }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_running(&mut self) -> bool {
        let target = &self.target;
        let running = self
            .source
            .process_names()
            .iter()
            .any(|name| matches_process_name(name, target));
        tracing::debug!(process = %target, running, "Checked process presence");
        running
    }

    /// Polls until interrupted, printing a line whenever presence changes.
    pub fn watch(
        &mut self,
        interval: Duration,
        pause: &dyn Pause,
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut last: Option<bool> = None;
        loop {
            let running = self.is_running();
            if last != Some(running) {
                writeln!(out, "{}", console::process_line(Local::now(), &self.target, running))?;
                last = Some(running);
            }
            if !pause.pause(interval) {
                return Ok(());
            }
        }
    }
}
