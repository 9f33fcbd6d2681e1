mod actions;
mod config;
mod console;
mod guard;
mod input;
mod models;
mod monitor;
mod process;
mod schedule;
mod sequence;
mod shutdown;
mod system;

use actions::Actuator;
use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use input::{EnigoInjector, Key, MouseButton};
use models::ActionKind;
use monitor::{Monitor, MonitorSettings};
use process::{ProcessWatch, SystemProcesses};
use schedule::WorkHours;
use shutdown::Shutdown;
use std::io;
use std::thread;
use std::time::Duration;
use system::SystemIdle;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tmetric-helper", version)]
#[command(about = "TMetric Helper - Automate mouse movements and keyboard typing", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor for inactivity and perform actions to keep the system active
    KeepActive {
        #[command(flatten)]
        monitor: MonitorArgs,
    },
    /// Check whether a process is running, once or continuously
    WatchProcess {
        /// Process name, matched case-insensitively (".exe" optional)
        name: String,
        /// Keep polling and report every change
        #[arg(short, long)]
        watch: bool,
        /// Seconds between checks when watching (e.g. 10, 30s)
        #[arg(short = 'i', long, value_parser = parse_positive_duration)]
        interval: Option<Duration>,
    },
    /// Keep active only while the given process is running
    Guard {
        /// Process name; falls back to `process_name` in the config file
        name: Option<String>,
        #[command(flatten)]
        monitor: MonitorArgs,
        /// Seconds between process presence checks (e.g. 60, 2m)
        #[arg(short = 'p', long, value_parser = parse_positive_duration)]
        process_interval: Option<Duration>,
    },
    /// Move mouse to coordinates (X, Y)
    #[command(allow_negative_numbers = true)]
    Move {
        x: i32,
        y: i32,
        /// Duration of movement in seconds
        #[arg(short, long, default_value = "1", value_parser = parse_duration_arg)]
        duration: Duration,
    },
    /// Type TEXT automatically
    TypeText {
        text: String,
        /// Interval between keystrokes in seconds
        #[arg(short, long, default_value = "0.1", value_parser = parse_duration_arg)]
        interval: Duration,
        /// Delay before typing starts in seconds
        #[arg(short, long, default_value = "0", value_parser = parse_duration_arg)]
        delay: Duration,
    },
    /// Click at specified coordinates or current position
    #[command(allow_negative_numbers = true)]
    ClickAt {
        /// X coordinate to click
        #[arg(long, requires = "y")]
        x: Option<i32>,
        /// Y coordinate to click
        #[arg(long, requires = "x")]
        y: Option<i32>,
        /// Number of clicks
        #[arg(short, long, default_value_t = 1)]
        clicks: u32,
        #[arg(short, long, value_enum, default_value_t = MouseButton::Left)]
        button: MouseButton,
    },
    /// Press a keyboard KEY
    Press {
        key: String,
        /// Number of times to press the key
        #[arg(short, long, default_value_t = 1)]
        presses: u32,
    },
    /// Get current mouse position
    Position,
    /// Execute a SEQUENCE of commands, e.g. "move:100,200" "click" "type:hello"
    Sequence {
        #[arg(required = true)]
        commands: Vec<String>,
        /// Delay between commands in seconds
        #[arg(short, long, default_value = "1", value_parser = parse_duration_arg)]
        delay: Duration,
    },
}

#[derive(clap::Args, Debug, Default)]
struct MonitorArgs {
    /// Inactivity before acting (e.g. 300, 5m). Default: 300s
    #[arg(short = 't', long, value_parser = parse_positive_duration)]
    inactivity_timeout: Option<Duration>,
    /// Action to perform: move (small movement), jiggle (wiggle mouse), press (shift key)
    #[arg(short, long, value_enum)]
    action: Option<ActionKind>,
    /// Time between activity checks (e.g. 10, 30s). Default: 10s
    #[arg(short = 'i', long, value_parser = parse_positive_duration)]
    check_interval: Option<Duration>,
    /// Only act Monday to Friday within the configured work hours
    #[arg(long)]
    work_hours_only: bool,
}

/// Bare numbers are seconds, anything else goes through humantime ("5m", "1m 30s").
fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration: {}", e));
    }
    humantime::parse_duration(value).map_err(|e| e.to_string())
}

fn parse_positive_duration(value: &str) -> Result<Duration, String> {
    let duration = parse_duration_arg(value)?;
    if duration.is_zero() {
        return Err("must be greater than zero".to_string());
    }
    Ok(duration)
}

fn monitor_settings(config: &Config, args: &MonitorArgs) -> Result<MonitorSettings> {
    config.validate()?;
    let work_hours = if args.work_hours_only {
        Some(WorkHours::parse(&config.work_start, &config.work_end)?)
    } else {
        None
    };

    Ok(MonitorSettings {
        timeout: args
            .inactivity_timeout
            .unwrap_or(Duration::from_secs(config.inactivity_timeout_secs)),
        action: args.action.unwrap_or(config.action),
        check_interval: args
            .check_interval
            .unwrap_or(Duration::from_secs(config.check_interval_secs)),
        motion: Duration::from_millis(config.motion_ms),
        work_hours,
    })
}

/// Resolves the guard's target name and process interval on top of the
/// monitor settings. The process interval may not undercut the check interval.
fn guard_settings(
    config: &Config,
    name: Option<String>,
    args: &MonitorArgs,
    process_interval: Option<Duration>,
) -> Result<(String, MonitorSettings, Duration)> {
    let name = name.or_else(|| config.process_name.clone()).ok_or_else(|| {
        anyhow::anyhow!("No process name given and none set in the config file")
    })?;
    let settings = monitor_settings(config, args)?;
    let process_interval =
        process_interval.unwrap_or(Duration::from_secs(config.process_interval_secs));
    if process_interval < settings.check_interval {
        anyhow::bail!(
            "Process interval ({}) must not be shorter than the check interval ({})",
            console::format_duration(process_interval),
            console::format_duration(settings.check_interval)
        );
    }
    Ok((name, settings, process_interval))
}

fn settings_lines(settings: &MonitorSettings) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Inactivity timeout: {}s ({})",
            settings.timeout.as_secs(),
            console::format_duration(settings.timeout)
        ),
        format!("Action on inactivity: {}", settings.action),
        format!(
            "Check interval: {}",
            console::format_duration(settings.check_interval)
        ),
        "Monitoring: Mouse movement AND keyboard activity".to_string(),
    ];
    if let Some(hours) = &settings.work_hours {
        lines.push(format!(
            "Work hours only: {}-{} (Mon-Fri)",
            hours.start.format("%H:%M"),
            hours.end.format("%H:%M")
        ));
    }
    lines
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "tmetric_helper=warn",
        1 => "tmetric_helper=info",
        _ => "tmetric_helper=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = config::load_config()?;
    let mut out = io::stdout();

    match cli.command {
        Commands::KeepActive { monitor } => {
            let settings = monitor_settings(&config, &monitor)?;
            let shutdown = Shutdown::install()?;
            let injector = EnigoInjector::new()?;

            console::banner(
                &mut out,
                "TMetric Helper - Keep Active Monitor",
                &settings_lines(&settings),
            )?;

            let mut monitor = Monitor::new(settings, SystemIdle, injector);
            let summary = monitor.run(&shutdown, &mut out)?;
            console::summary(&mut out, &summary)?;
        }
        Commands::WatchProcess {
            name,
            watch,
            interval,
        } => {
            let mut process_watch = ProcessWatch::new(name, SystemProcesses::default());
            if watch {
                let interval =
                    interval.unwrap_or(Duration::from_secs(config.check_interval_secs));
                let shutdown = Shutdown::install()?;
                process_watch.watch(interval, &shutdown, &mut out)?;
            } else {
                let running = process_watch.is_running();
                println!(
                    "{}",
                    console::process_line(chrono::Local::now(), process_watch.target(), running)
                );
            }
        }
        Commands::Guard {
            name,
            monitor,
            process_interval,
        } => {
            let (name, settings, process_interval) =
                guard_settings(&config, name, &monitor, process_interval)?;
            let shutdown = Shutdown::install()?;
            let injector = EnigoInjector::new()?;

            let mut lines = settings_lines(&settings);
            lines.push(format!("Target process: {}", name));
            lines.push(format!(
                "Process check interval: {}",
                console::format_duration(process_interval)
            ));
            console::banner(&mut out, "TMetric Helper - Process Guard", &lines)?;

            let mut process_watch = ProcessWatch::new(name, SystemProcesses::default());
            let mut monitor = Monitor::new(settings, SystemIdle, injector);
            let summary = guard::run_guard(
                &mut monitor,
                &mut process_watch,
                process_interval,
                &shutdown,
                &mut out,
            )?;
            console::summary(&mut out, &summary)?;
        }
        Commands::Move { x, y, duration } => {
            let mut actuator = Actuator::new(EnigoInjector::new()?);
            println!("Moving mouse to ({}, {}) over {}s", x, y, duration.as_secs_f64());
            actuator.move_to(x, y, duration)?;
            println!("✓ Mouse moved successfully");
        }
        Commands::TypeText {
            text,
            interval,
            delay,
        } => {
            let mut actuator = Actuator::new(EnigoInjector::new()?);
            if !delay.is_zero() {
                println!("Waiting {}s before typing...", delay.as_secs_f64());
                thread::sleep(delay);
            }
            println!("Typing: {}", text);
            actuator.type_text(&text, interval)?;
            println!("✓ Text typed successfully");
        }
        Commands::ClickAt {
            x,
            y,
            clicks,
            button,
        } => {
            let mut actuator = Actuator::new(EnigoInjector::new()?);
            let at = x.zip(y);
            match at {
                Some((x, y)) => println!(
                    "Clicking at ({}, {}) {} time(s) with {} button",
                    x, y, clicks, button
                ),
                None => {
                    let (px, py) = actuator.position()?;
                    println!(
                        "Clicking at current position ({}, {}) {} time(s) with {} button",
                        px, py, clicks, button
                    );
                }
            }
            actuator.click(at, clicks, button)?;
            println!("✓ Click completed successfully");
        }
        Commands::Press { key, presses } => {
            let parsed: Key = key.parse()?;
            let mut actuator = Actuator::new(EnigoInjector::new()?);
            println!("Pressing '{}' {} time(s)", key, presses);
            actuator.press(parsed, presses)?;
            println!("✓ Key press completed successfully");
        }
        Commands::Position => {
            let mut actuator = Actuator::new(EnigoInjector::new()?);
            let (x, y) = actuator.position()?;
            println!("Current mouse position: X={}, Y={}", x, y);
        }
        Commands::Sequence { commands, delay } => {
            let mut actuator = Actuator::new(EnigoInjector::new()?);
            sequence::run_sequence(&mut actuator, &commands, delay, &mut out)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_duration_arg() {
        assert_eq!(parse_duration_arg("300"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration_arg("0.1"), Ok(Duration::from_millis(100)));
        assert_eq!(parse_duration_arg("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration_arg("1m 30s"), Ok(Duration::from_secs(90)));
        assert!(parse_duration_arg("-1").is_err());
        assert!(parse_duration_arg("soon").is_err());
        assert!(parse_positive_duration("0").is_err());
        assert!(parse_positive_duration("0s").is_err());
    }

    #[test]
    fn test_keep_active_flags() {
        let cli = Cli::try_parse_from([
            "tmetric-helper",
            "keep-active",
            "-t",
            "2m",
            "-a",
            "jiggle",
            "-i",
            "5",
        ])
        .unwrap();
        let Commands::KeepActive { monitor } = cli.command else {
            panic!("expected keep-active");
        };
        let settings = monitor_settings(&Config::default(), &monitor).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(120));
        assert_eq!(settings.action, ActionKind::Jiggle);
        assert_eq!(settings.check_interval, Duration::from_secs(5));
        assert!(settings.work_hours.is_none());
    }

    #[test]
    fn test_settings_fall_back_to_config() {
        let config = Config {
            inactivity_timeout_secs: 600,
            action: ActionKind::Press,
            check_interval_secs: 20,
            ..Config::default()
        };
        let args = MonitorArgs {
            work_hours_only: true,
            ..MonitorArgs::default()
        };

        let settings = monitor_settings(&config, &args).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(600));
        assert_eq!(settings.action, ActionKind::Press);
        assert_eq!(settings.check_interval, Duration::from_secs(20));
        assert_eq!(settings.motion, Duration::from_millis(100));
        assert_eq!(settings.work_hours, Some(WorkHours::default()));
    }

    #[test]
    fn test_guard_settings_need_a_process_name() {
        let args = MonitorArgs::default();
        assert!(guard_settings(&Config::default(), None, &args, None).is_err());

        let config = Config {
            process_name: Some("TMetric Desktop".to_string()),
            ..Config::default()
        };
        let (name, _, interval) = guard_settings(&config, None, &args, None).unwrap();
        assert_eq!(name, "TMetric Desktop");
        assert_eq!(interval, Duration::from_secs(60));

        let (name, _, _) =
            guard_settings(&config, Some("TMetric".to_string()), &args, None).unwrap();
        assert_eq!(name, "TMetric");
    }

    #[test]
    fn test_guard_rejects_process_interval_below_check_interval() {
        let config = Config::default();
        let args = MonitorArgs {
            check_interval: Some(Duration::from_secs(10)),
            ..MonitorArgs::default()
        };
        let name = || Some("TMetric".to_string());

        let err = guard_settings(&config, name(), &args, Some(Duration::from_secs(5)))
            .unwrap_err();
        assert!(err.to_string().contains("must not be shorter"));

        let (_, settings, interval) =
            guard_settings(&config, name(), &args, Some(Duration::from_secs(10))).unwrap();
        assert_eq!(interval, settings.check_interval);

        let config = Config {
            process_interval_secs: 5,
            ..Config::default()
        };
        assert!(guard_settings(&config, name(), &args, None).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["tmetric-helper", "keep-active", "-t", "0"]).is_err());
    }

    #[test]
    fn test_click_at_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["tmetric-helper", "click-at", "--x", "10"]).is_err());
        assert!(Cli::try_parse_from(["tmetric-helper", "click-at", "--x", "10", "--y", "-20"]).is_ok());
    }

    #[test]
    fn test_guard_and_sequence_parse() {
        let cli = Cli::try_parse_from([
            "tmetric-helper",
            "guard",
            "TMetric",
            "-p",
            "2m",
            "--work-hours-only",
        ])
        .unwrap();
        let Commands::Guard {
            name,
            monitor,
            process_interval,
        } = cli.command
        else {
            panic!("expected guard");
        };
        assert_eq!(name.as_deref(), Some("TMetric"));
        assert!(monitor.work_hours_only);
        assert_eq!(process_interval, Some(Duration::from_secs(120)));

        assert!(Cli::try_parse_from(["tmetric-helper", "sequence"]).is_err());
        assert!(Cli::try_parse_from(["tmetric-helper", "sequence", "click", "wait:1"]).is_ok());
    }
}
