// File: ./src/model/display.rs
use crate::model::item::Task;
use chrono::{Duration, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

struct SummaryPatterns {
    trailing_time: Regex,
    trailing_clock: Regex,
    hashtag: Regex,
    time_range: Regex,
    single_time: Regex,
    line_break: Regex,
}

static PATTERNS: Lazy<SummaryPatterns> = Lazy::new(|| {
    let compile = |pattern: &str| Regex::new(pattern).expect("valid regex");
    SummaryPatterns {
        trailing_time: compile(r",?\s*\d{1,2}:\d{2}(:\d{2})?\s*$"),
        trailing_clock: compile(r"\s*,\s*\d{1,2}:\d{2}$"),
        hashtag: compile(r"#\w+"),
        time_range: compile(
            r"(?i)\b(\d{1,2}:\d{2}(?::\d{2})?\s*(?:[ap]m)?)\s*-\s*(\d{1,2}:\d{2}(?::\d{2})?\s*(?:[ap]m)?)",
        ),
        single_time: compile(r"(?i)\b(\d{1,2}:\d{2}(?::\d{2})?\s*(?:[ap]m)?)"),
        line_break: compile(r"\r\n|\r|\n"),
    }
});

/// Start and end of an inline time mentioned in a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryTimes {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SummaryTimes {
    /// `HHmmss`
    pub fn start_hms(&self) -> String {
        self.start.format("%H%M%S").to_string()
    }

    /// `HHmmss`
    pub fn end_hms(&self) -> String {
        self.end.format("%H%M%S").to_string()
    }
}

pub trait TaskDisplay {
    /// Summary as written to a `SUMMARY` property, TEXT-escaped.
    fn get_summary(&self, hashtags_to_remove: &[String]) -> String;
    /// Same text as `get_summary` before escaping; line breaks are `\n`.
    fn summary_text(&self, hashtags_to_remove: &[String]) -> String;
    fn get_time_from_summary(&self) -> Option<SummaryTimes>;
}

impl Task {
    /// Hashtags and a trailing clock time removed, trimmed.
    fn display_text(&self, hashtags_to_remove: &[String]) -> String {
        let mut summary = self.summary.clone();

        for hashtag in hashtags_to_remove.iter().filter(|h| !h.is_empty()) {
            summary = summary.replace(hashtag.as_str(), "");
        }
        summary = PATTERNS.hashtag.replace_all(&summary, "").into_owned();

        let trimmed = summary.trim();
        PATTERNS
            .trailing_time
            .replace(trimmed, "")
            .trim()
            .to_string()
    }
}

impl TaskDisplay for Task {
    fn get_summary(&self, hashtags_to_remove: &[String]) -> String {
        format!(
            "{} {}",
            self.status.emoji(),
            escape_text(&self.display_text(hashtags_to_remove))
        )
    }

    fn summary_text(&self, hashtags_to_remove: &[String]) -> String {
        format!(
            "{} {}",
            self.status.emoji(),
            normalize_line_breaks(&self.display_text(hashtags_to_remove))
        )
    }

    fn get_time_from_summary(&self) -> Option<SummaryTimes> {
        let (start, end) = if let Some(caps) = PATTERNS.time_range.captures(&self.summary) {
            (to_24_hour(&caps[1])?, to_24_hour(&caps[2])?)
        } else {
            let caps = PATTERNS.single_time.captures(&self.summary)?;
            let start = to_24_hour(&caps[1])?;
            (start, start)
        };

        // Wraps past midnight; the date is not advanced.
        let end = if start == end {
            start + Duration::minutes(30)
        } else {
            end
        };

        Some(SummaryTimes { start, end })
    }
}

/// Escapes a value for the iCalendar TEXT type.
pub fn escape_text(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,");
    PATTERNS.line_break.replace_all(&escaped, "\\n").into_owned()
}

/// Rewrites every `\r\n` or lone `\r` as `\n`.
pub fn normalize_line_breaks(raw: &str) -> String {
    PATTERNS.line_break.replace_all(raw, "\n").into_owned()
}

/// Drops a trailing `, HH:MM` still left on a summary.
pub fn strip_trailing_clock(text: &str) -> String {
    PATTERNS.trailing_clock.replace(text, "").into_owned()
}

/// `"2:30 pm"` -> 14:30:00. Out-of-range values yield `None`.
fn to_24_hour(text: &str) -> Option<NaiveTime> {
    let lower = text.trim().to_lowercase();
    let (clock, meridiem) = if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim(), Some('p'))
    } else if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim(), Some('a'))
    } else {
        (lower.as_str(), None)
    };

    let mut parts = clock
        .split(':')
        .map(|part| part.trim().parse::<u32>().unwrap_or(0));
    let mut hours = parts.next().unwrap_or(0);
    let minutes = parts.next().unwrap_or(0);
    let seconds = parts.next().unwrap_or(0);

    match meridiem {
        Some('p') if hours != 12 => hours += 12,
        Some('a') if hours == 12 => hours = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hours, minutes, seconds)
}
