use anyhow::Result;
use std::time::Duration;

/// Source of "time since the last real user input".
pub trait IdleSource {
    fn idle_time(&mut self) -> Duration;
}

/// Reads idle time from the operating system.
///
/// Failures are treated as zero idle time so a broken reading never
/// triggers synthetic input.
pub struct SystemIdle;

impl IdleSource for SystemIdle {
    fn idle_time(&mut self) -> Duration {
        match read_idle_seconds() {
            Ok(secs) => secs_to_duration(secs),
            Err(err) => {
                tracing::debug!(error = %err, "Could not read system idle time");
                Duration::ZERO
            }
        }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if !secs.is_finite() {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

#[cfg(target_os = "macos")]
fn read_idle_seconds() -> Result<f64> {
    #[link(name = "CoreGraphics", kind = "framework")]
    extern "C" {
        fn CGEventSourceSecondsSinceLastEventType(state: i32, event_type: u32) -> f64;
    }
    // kCGEventSourceStateCombinedSessionState = 0
    // kCGAnyInputEventType = u32::MAX
    Ok(unsafe { CGEventSourceSecondsSinceLastEventType(0, u32::MAX) })
}

#[cfg(target_os = "windows")]
fn read_idle_seconds() -> Result<f64> {
    use windows::Win32::System::SystemInformation::GetTickCount;
    use windows::Win32::UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO};

    let mut info = LASTINPUTINFO {
        cbSize: std::mem::size_of::<LASTINPUTINFO>() as u32,
        dwTime: 0,
    };
    let ok = unsafe { GetLastInputInfo(&mut info) };
    if !ok.as_bool() {
        anyhow::bail!("GetLastInputInfo failed");
    }
    // Tick count wraps after ~49 days
    let now = unsafe { GetTickCount() };
    Ok(now.wrapping_sub(info.dwTime) as f64 / 1000.0)
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn read_idle_seconds() -> Result<f64> {
    use anyhow::Context;
    use std::process::Command;

    let output = Command::new("xprintidle")
        .output()
        .context("xprintidle is not available")?;
    if !output.status.success() {
        anyhow::bail!("xprintidle exited with {}", output.status);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_xprintidle(&stdout)
        .ok_or_else(|| anyhow::anyhow!("Unexpected xprintidle output: {:?}", stdout.trim()))
}

/// xprintidle prints the idle time in milliseconds.
#[cfg_attr(any(target_os = "macos", target_os = "windows"), allow(dead_code))]
fn parse_xprintidle(output: &str) -> Option<f64> {
    output
        .trim()
        .parse::<u64>()
        .ok()
        .map(|ms| ms as f64 / 1000.0)
}
