// File: ./src/model/item.rs
use crate::model::format::format_pattern;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    /// Glyph shown in front of every exported summary.
    pub fn emoji(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "🔲",
            TaskStatus::InProgress => "⏳",
            TaskStatus::Done => "✅",
            TaskStatus::Cancelled => "🚫",
        }
    }

    /// Maps the character between the checkbox brackets (`- [x]`).
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "/" => TaskStatus::InProgress,
            "x" | "X" => TaskStatus::Done,
            "-" => TaskStatus::Cancelled,
            _ => TaskStatus::ToDo,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TaskDateName {
    Start,
    Scheduled,
    Due,
    Done,
    TimeStart,
    TimeEnd,
}

// --- DATE TYPES ---

/// A calendar date with an optional wall-clock time.
///
/// `Specific` values are local time as written in the note; nothing is
/// converted until the value is formatted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DateType {
    AllDay(NaiveDate),
    Specific(NaiveDateTime),
}

impl DateType {
    pub fn date_naive(&self) -> NaiveDate {
        match self {
            DateType::AllDay(d) => *d,
            DateType::Specific(dt) => dt.date(),
        }
    }

    pub fn has_time(&self) -> bool {
        matches!(self, DateType::Specific(_))
    }

    /// AllDay -> midnight. Specific -> exact wall-clock time.
    pub fn to_naive(&self) -> NaiveDateTime {
        match self {
            DateType::AllDay(d) => d.and_time(NaiveTime::MIN),
            DateType::Specific(dt) => *dt,
        }
    }

    /// Formats the value with a moment-style pattern.
    ///
    /// With `local_to_utc` set, timed values are read as local time and
    /// shifted to UTC first. All-day values are never shifted.
    pub fn format(&self, pattern: &str, local_to_utc: bool) -> String {
        match self {
            DateType::Specific(dt) if local_to_utc => {
                format_pattern(&local_to_utc_naive(dt), pattern)
            }
            _ => format_pattern(&self.to_naive(), pattern),
        }
    }
}

/// Reads `value` as local wall-clock time and returns the matching UTC instant.
/// Times skipped by a DST jump are returned unchanged.
pub fn local_to_utc_naive(value: &NaiveDateTime) -> NaiveDateTime {
    Local
        .from_local_datetime(value)
        .earliest()
        .map(|dt| dt.naive_utc())
        .unwrap_or(*value)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TaskDate {
    pub name: TaskDateName,
    pub date: DateType,
}

impl TaskDate {
    pub fn new(name: TaskDateName, date: DateType) -> Self {
        Self { name, date }
    }
}

/// One checkbox line from a note.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Task {
    pub status: TaskStatus,
    pub dates: Vec<TaskDate>,
    pub summary: String,
    pub location: String,
    /// 1-based line in the source note, 0 when unknown.
    pub line: usize,
}

impl Task {
    pub fn new(
        status: TaskStatus,
        dates: Vec<TaskDate>,
        summary: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            status,
            dates,
            summary: summary.into(),
            location: location.into(),
            line: 0,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn has_a(&self, name: TaskDateName) -> bool {
        self.dates.iter().any(|d| d.name == name)
    }

    pub fn has_any_date(&self) -> bool {
        !self.dates.is_empty()
    }

    /// The entry for `name`, or the first entry when `name` is `None`.
    pub fn find_date(&self, name: Option<TaskDateName>) -> Option<&TaskDate> {
        match name {
            Some(name) => self.dates.iter().find(|d| d.name == name),
            None => self.dates.first(),
        }
    }

    /// Formatted date for `name` (first date when `None`), or an empty string.
    pub fn get_date(&self, name: Option<TaskDateName>, pattern: &str, day_planner: bool) -> String {
        self.find_date(name)
            .map(|d| d.date.format(pattern, day_planner))
            .unwrap_or_default()
    }

    pub fn get_location(&self) -> &str {
        &self.location
    }

    /// A fresh random identifier on every call.
    pub fn get_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Identifier derived from the task's location, line, text and `salt`.
    ///
    /// Rebuilding the same vault yields the same value, so calendar clients
    /// can match blocks across refreshes. Identical lines in one note still
    /// differ by line number.
    pub fn get_stable_id(&self, salt: &str) -> String {
        let seed = format!(
            "{}\n{}\n{}\n{}",
            self.location, self.line, self.summary, salt
        );
        Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_with(dates: Vec<TaskDate>) -> Task {
        Task::new(TaskStatus::ToDo, dates, "Something", "obsidian://open?vault=v&file=f")
    }

    #[test]
    fn test_has_a_and_any_date() {
        let task = task_with(vec![TaskDate::new(
            TaskDateName::Due,
            DateType::AllDay(day(2024, 3, 1)),
        )]);
        assert!(task.has_any_date());
        assert!(task.has_a(TaskDateName::Due));
        assert!(!task.has_a(TaskDateName::Start));
        assert!(!task_with(vec![]).has_any_date());
    }

    #[test]
    fn test_get_date_defaults_to_first_entry() {
        let task = task_with(vec![
            TaskDate::new(TaskDateName::Scheduled, DateType::AllDay(day(2024, 2, 10))),
            TaskDate::new(TaskDateName::Due, DateType::AllDay(day(2024, 3, 1))),
        ]);
        assert_eq!(task.get_date(None, "YYYYMMDD", false), "20240210");
        assert_eq!(task.get_date(Some(TaskDateName::Due), "YYYYMMDD", false), "20240301");
        assert_eq!(task.get_date(Some(TaskDateName::Done), "YYYYMMDD", false), "");
        assert_eq!(task_with(vec![]).get_date(None, "YYYYMMDD", false), "");
    }

    #[test]
    fn test_get_date_all_day_is_never_shifted() {
        let task = task_with(vec![TaskDate::new(
            TaskDateName::Due,
            DateType::AllDay(day(2024, 3, 1)),
        )]);
        assert_eq!(task.get_date(None, "YYYYMMDDTHHmmss", true), "20240301T000000");
    }

    #[test]
    fn test_get_date_day_planner_converts_timed_values() {
        let local = day(2024, 3, 1).and_hms_opt(10, 30, 0).unwrap();
        let task = task_with(vec![TaskDate::new(
            TaskDateName::TimeStart,
            DateType::Specific(local),
        )]);
        let expected = local_to_utc_naive(&local).format("%Y%m%dT%H%M%S").to_string();
        assert_eq!(task.get_date(None, "YYYYMMDDTHHmmss", true), expected);
        assert_eq!(task.get_date(None, "YYYYMMDDTHHmmss", false), "20240301T103000");
    }

    #[test]
    fn test_ids() {
        let task = task_with(vec![]);
        assert_ne!(task.get_id(), task.get_id());
        assert_eq!(task.get_stable_id("VTODO"), task.get_stable_id("VTODO"));
        assert_ne!(task.get_stable_id("VTODO"), task.get_stable_id("VEVENT"));
    }

    #[test]
    fn test_stable_id_depends_on_line() {
        let first = task_with(vec![]).with_line(3);
        let second = task_with(vec![]).with_line(4);
        assert_eq!(first.get_stable_id("VTODO"), first.clone().get_stable_id("VTODO"));
        assert_ne!(first.get_stable_id("VTODO"), second.get_stable_id("VTODO"));
    }

    #[test]
    fn test_status_markers() {
        assert_eq!(TaskStatus::from_marker(" "), TaskStatus::ToDo);
        assert_eq!(TaskStatus::from_marker("/"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::from_marker("X"), TaskStatus::Done);
        assert_eq!(TaskStatus::from_marker("-"), TaskStatus::Cancelled);
        assert_eq!(TaskStatus::from_marker("?"), TaskStatus::ToDo);
    }
}
