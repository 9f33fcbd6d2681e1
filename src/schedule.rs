use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};

/// Daily window in which keep-alive actions are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkHours {
    pub start: NaiveTime,
    /// Exclusive
    pub end: NaiveTime,
    pub weekdays_only: bool,
}

impl Default for WorkHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            weekdays_only: true,
        }
    }
}

impl WorkHours {
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_hhmm(start)?;
        let end = parse_hhmm(end)?;
        if end <= start {
            anyhow::bail!("Work hours end ({}) must be after start ({})", end, start);
        }
        Ok(Self {
            start,
            end,
            weekdays_only: true,
        })
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        if self.weekdays_only && matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let time = at.time();
        time >= self.start && time < self.end
    }
}

fn parse_hhmm(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_default_work_hours() {
        let hours = WorkHours::default();
        // 2026-01-19 is a Monday
        let cases = [
            (19, 9, 0, true),
            (19, 12, 0, true),
            (19, 17, 59, true),
            (19, 18, 0, false),
            (19, 8, 59, false),
            (19, 3, 0, false),
            (19, 21, 0, false),
            (20, 10, 0, true),
            (21, 14, 30, true),
            (22, 16, 0, true),
            (23, 11, 0, true),
            (24, 10, 0, false),
            (25, 14, 0, false),
            (24, 3, 0, false),
            (25, 20, 0, false),
        ];

        for (day, hour, minute, expected) in cases {
            assert_eq!(
                hours.contains(at(day, hour, minute)),
                expected,
                "2026-01-{} {:02}:{:02}",
                day,
                hour,
                minute
            );
        }
    }

    #[test]
    fn test_parse_custom_window() {
        let hours = WorkHours::parse("08:30", "16:00").unwrap();
        assert!(hours.contains(at(19, 8, 30)));
        assert!(!hours.contains(at(19, 8, 29)));
        assert!(!hours.contains(at(19, 16, 0)));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(WorkHours::parse("9am", "18:00").is_err());
        assert!(WorkHours::parse("18:00", "09:00").is_err());
    }
}
