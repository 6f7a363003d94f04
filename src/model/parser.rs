// Turns markdown checkbox lines into `Task` records.
use crate::config::{Config, HowToParseInternalLinks};
use crate::model::item::{DateType, Task, TaskDate, TaskDateName, TaskStatus};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

struct LinePatterns {
    task_line: Regex,
    marked_date: Regex,
    bare_date: Regex,
    day_planner_range: Regex,
    internal_link: Regex,
    whitespace: Regex,
}

static PATTERNS: Lazy<LinePatterns> = Lazy::new(|| {
    let compile = |pattern: &str| Regex::new(pattern).expect("valid regex");
    LinePatterns {
        task_line: compile(r"^\s*[-*]\s*\[(?<status>.?)\]\s*(?<summary>.*?)\s*$"),
        marked_date: compile(
            r"(?<marker>🛫|⏳|📅|✅)\s*(?<date>\d{4}-\d{2}-\d{1,2})(?:\s+(?<time>\d{1,2}:\d{2}))?",
        ),
        bare_date: compile(r"\b(?<date>\d{4}-\d{2}-\d{1,2})\b"),
        day_planner_range: compile(r"^(?<start>\d{1,2}:\d{2})\s*-\s*(?<end>\d{1,2}:\d{2})\s+"),
        internal_link: compile(r"\[\[(?<target>[^\]|]+)(?:\|(?<alias>[^\]]+))?\]\]"),
        whitespace: compile(r"\s{2,}"),
    }
});

fn marker_name(marker: &str) -> Option<TaskDateName> {
    match marker {
        "🛫" => Some(TaskDateName::Start),
        "⏳" => Some(TaskDateName::Scheduled),
        "📅" => Some(TaskDateName::Due),
        "✅" => Some(TaskDateName::Done),
        _ => None,
    }
}

fn parse_day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M").ok()
}

fn date_from_caps(caps: &Captures) -> Option<DateType> {
    let day = parse_day(&caps["date"])?;
    match caps.name("time").and_then(|t| parse_clock(t.as_str())) {
        Some(time) => Some(DateType::Specific(day.and_time(time))),
        None => Some(DateType::AllDay(day)),
    }
}

/// Rewrites `[[Page|Alias]]` links according to the configured style.
pub fn rewrite_internal_links(text: &str, style: HowToParseInternalLinks) -> String {
    match style {
        HowToParseInternalLinks::DoNotModifyThem => text.to_string(),
        HowToParseInternalLinks::KeepTitle => PATTERNS
            .internal_link
            .replace_all(text, |caps: &Captures| caps["target"].to_string())
            .into_owned(),
        HowToParseInternalLinks::PreferAlias => PATTERNS
            .internal_link
            .replace_all(text, |caps: &Captures| {
                caps.name("alias")
                    .map_or_else(|| caps["target"].to_string(), |a| a.as_str().to_string())
            })
            .into_owned(),
    }
}

/// Parses one markdown line, using today's local date for age filtering.
pub fn task_from_line(
    line: &str,
    location: &str,
    date_override: Option<NaiveDate>,
    config: &Config,
) -> Option<Task> {
    task_from_line_on(line, location, date_override, config, Local::now().date_naive())
}

/// Parses one markdown line.
///
/// Returns `None` for lines that are not checkbox items and for items the
/// configuration filters out (dateless without to-dos enabled, completed,
/// or entirely older than the retention window).
///
/// `date_override` is the date of the daily note the line lives in. It
/// anchors day-planner ranges and stands in as the due date for items that
/// carry no date of their own.
pub fn task_from_line_on(
    line: &str,
    location: &str,
    date_override: Option<NaiveDate>,
    config: &Config,
    today: NaiveDate,
) -> Option<Task> {
    let caps = PATTERNS.task_line.captures(line)?;
    let status = TaskStatus::from_marker(&caps["status"]);
    let mut summary = caps["summary"].to_string();
    let mut dates: Vec<TaskDate> = Vec::new();

    for date_caps in PATTERNS.marked_date.captures_iter(&summary) {
        if let (Some(name), Some(date)) =
            (marker_name(&date_caps["marker"]), date_from_caps(&date_caps))
        {
            dates.push(TaskDate::new(name, date));
        }
    }
    summary = PATTERNS.marked_date.replace_all(&summary, "").into_owned();

    if dates.is_empty()
        && let Some(day) = PATTERNS
            .bare_date
            .captures(&summary)
            .and_then(|caps| parse_day(&caps["date"]))
    {
        dates.push(TaskDate::new(TaskDateName::Due, DateType::AllDay(day)));
        summary = PATTERNS.bare_date.replace(&summary, "").into_owned();
    }

    let anchor = dates.first().map(|d| d.date.date_naive()).or(date_override);
    let planned = PATTERNS.day_planner_range.captures(&summary).and_then(|range| {
        Some((parse_clock(&range["start"])?, parse_clock(&range["end"])?))
    });
    if let (Some(anchor), Some((start, end))) = (anchor, planned) {
        dates.push(TaskDate::new(
            TaskDateName::TimeStart,
            DateType::Specific(anchor.and_time(start)),
        ));
        dates.push(TaskDate::new(
            TaskDateName::TimeEnd,
            DateType::Specific(anchor.and_time(end)),
        ));
        summary = PATTERNS.day_planner_range.replace(&summary, "").into_owned();
    }

    if dates.is_empty()
        && let Some(day) = date_override
    {
        dates.push(TaskDate::new(TaskDateName::Due, DateType::AllDay(day)));
    }

    if dates.is_empty() && !config.is_include_todos {
        return None;
    }

    if status == TaskStatus::Done && config.ignore_completed_tasks {
        return None;
    }

    if config.ignore_old_tasks && !dates.is_empty() {
        let threshold = today - Duration::days(i64::from(config.old_task_in_days));
        if dates.iter().all(|d| d.date.date_naive() < threshold) {
            return None;
        }
    }

    let summary = rewrite_internal_links(&summary, config.how_to_parse_internal_links);
    let summary = PATTERNS.whitespace.replace_all(summary.trim(), " ").into_owned();

    Some(Task::new(status, dates, summary, location))
}
