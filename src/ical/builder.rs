// Turns tasks into VEVENT/VTODO blocks and assembles the calendar document.
use crate::config::{Config, HowToProcessMultipleDates};
use crate::ical::text::{encode_uri, pretty};
use crate::model::display::{TaskDisplay, escape_text, normalize_line_breaks, strip_trailing_clock};
use crate::model::format::format_pattern;
use crate::model::item::local_to_utc_naive;
use crate::model::{DateType, Task, TaskDateName, TaskStatus};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use icalendar::{Calendar, Component, Event, Property, Todo, TodoStatus};

pub const PRODUCT_ID: &str = concat!("taskical//taskical v", env!("CARGO_PKG_VERSION"));

/// Labels used when every date of a task gets its own event.
const MULTI_EVENT_LABELS: &[(TaskDateName, &str)] = &[
    (TaskDateName::Start, "🛫 "),
    (TaskDateName::Scheduled, "⏳ "),
    (TaskDateName::Due, "📅 "),
];

// icalendar stamps blocks lacking DTSTAMP with the current time. Dateless
// to-dos get an empty one instead, removed after rendering.
const EMPTY_STAMP: &str = "\r\nDTSTAMP:\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
    Day,
    Time,
}

/// An event boundary before it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stamp {
    Day(NaiveDate),
    /// Local wall-clock time.
    Time(NaiveDateTime),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventSpan {
    start: Stamp,
    end: Option<Stamp>,
}

impl EventSpan {
    fn timed(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Stamp::Time(start),
            end: Some(Stamp::Time(end)),
        }
    }
}

/// Builds one iCalendar document from a list of tasks.
///
/// The builder owns its `Config` snapshot, so builds with different
/// settings never interfere. Apart from identifiers (random unless
/// `is_stable_identifiers` is set) the output depends only on the tasks and
/// the configuration.
#[derive(Debug, Clone)]
pub struct CalendarBuilder {
    config: Config,
    default_start: NaiveTime,
}

impl CalendarBuilder {
    pub fn new(config: Config) -> Self {
        let default_start = config.default_start_naive_time();
        Self {
            config,
            default_start,
        }
    }

    pub fn get_calendar(&self, tasks: &[Task]) -> String {
        let events = self.get_events(tasks);
        let todos = if self.config.is_include_todos {
            self.get_todos(tasks)
        } else {
            Vec::new()
        };

        log::debug!(
            "Building calendar from {} tasks: {} events, {} to-dos",
            tasks.len(),
            events.len(),
            todos.len()
        );

        let mut calendar = self.frame();
        calendar.extend(events);
        calendar.extend(todos);

        let ics = calendar.to_string().replace(EMPTY_STAMP, "\r\n");
        pretty(&ics)
    }

    /// Events for every task, in task order.
    pub fn get_events(&self, tasks: &[Task]) -> Vec<Event> {
        tasks.iter().flat_map(|task| self.get_event(task)).collect()
    }

    /// Zero or more events for one task.
    ///
    /// Dateless tasks yield nothing here; they can still become to-dos.
    pub fn get_event(&self, task: &Task) -> Vec<Event> {
        if !task.has_any_date() {
            return Vec::new();
        }

        let policy = self.config.how_to_process_multiple_dates;
        if policy != HowToProcessMultipleDates::CreateMultipleEvents {
            return self.emit_event(task, None, "").into_iter().collect();
        }

        let events: Vec<Event> = MULTI_EVENT_LABELS
            .iter()
            .filter_map(|(name, label)| {
                let date = task.find_date(Some(*name))?;
                self.emit_event(task, Some(&date.date), label)
            })
            .collect();

        if !events.is_empty() {
            return events;
        }

        let fallback = task.find_date(None).map(|d| d.date);
        self.emit_event(task, fallback.as_ref(), "")
            .into_iter()
            .collect()
    }

    /// One VEVENT for `task`, or `None` when nothing gives it a date.
    ///
    /// With `override_date` the event starts at that date and the configured
    /// policy is not consulted. `label_prefix` is put in front of the summary.
    pub fn emit_event(
        &self,
        task: &Task,
        override_date: Option<&DateType>,
        label_prefix: &str,
    ) -> Option<Event> {
        let span = match override_date {
            Some(date) => {
                let timed = date.has_time()
                    || task.get_time_from_summary().is_some()
                    || planned_on(task, date.date_naive()).is_some();
                let granularity = if timed {
                    Granularity::Time
                } else {
                    Granularity::Day
                };
                self.point(task, date, granularity)
            }
            None => self.resolve_span(task)?,
        };

        let start = self.render_stamp(span.start);
        let summary = strip_trailing_clock(&task.summary_text(&self.config.hashtags_to_remove));

        let mut event = Event::new();
        event
            .add_property(
                "UID",
                self.identifier(task, &format!("VEVENT:{}{}", label_prefix, start)),
            )
            .add_property(
                "DTSTAMP",
                task.get_date(None, "YYYYMMDDTHHmmss", self.day_planner()),
            )
            .add_property("DTSTART", start);
        if let Some(end) = span.end {
            event.add_property("DTEND", self.render_stamp(end));
        }
        event
            .add_property("SUMMARY", format!("{}{}", label_prefix, summary))
            .append_property(location_property(task));
        Some(event)
    }

    /// To-dos for every eligible task, in task order.
    pub fn get_todos(&self, tasks: &[Task]) -> Vec<Todo> {
        tasks
            .iter()
            .filter(|task| {
                // Only dateless tasks are to-dos when the user asked for that.
                !(self.config.is_only_tasks_without_dates_are_todos && task.has_any_date())
            })
            .map(|task| self.emit_todo(task))
            .collect()
    }

    pub fn emit_todo(&self, task: &Task) -> Todo {
        let day_planner = self.day_planner();
        let stamp = if task.has_any_date() {
            task.get_date(None, "YYYYMMDDTHHmmss", day_planner)
        } else {
            String::new()
        };

        let mut todo = Todo::new();
        todo.add_property("UID", self.identifier(task, "VTODO"))
            .add_property("SUMMARY", task.summary_text(&self.config.hashtags_to_remove))
            .add_property("DTSTAMP", stamp)
            .append_property(location_property(task));

        if task.has_a(TaskDateName::Due) {
            todo.append_property(date_property(
                "DUE",
                task.get_date(Some(TaskDateName::Due), "YYYYMMDD", day_planner),
            ));
        }
        if task.has_a(TaskDateName::Done) {
            todo.append_property(date_property(
                "COMPLETED",
                task.get_date(Some(TaskDateName::Done), "YYYYMMDD", day_planner),
            ));
        }

        todo.status(todo_status(task.status));
        todo
    }

    /// Calendar-level properties, in output order.
    fn frame(&self) -> Calendar {
        let name = normalize_line_breaks(&self.config.calendar_name);
        let mut calendar = Calendar::empty();
        calendar
            .append_property(Property::new("VERSION", "2.0"))
            .append_property(Property::new("PRODID", format!("-//{}//EN", PRODUCT_ID)))
            .append_property(Property::new("X-WR-CALNAME", name.as_str()))
            // icalendar has no value type for NAME and writes it verbatim.
            .append_property(Property::new("NAME", escape_text(&name)))
            .append_property(Property::new("CALSCALE", "GREGORIAN"));
        calendar
    }

    fn day_planner(&self) -> bool {
        self.config.is_day_planner_plugin_format_enabled
    }

    fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.config.default_duration))
    }

    fn identifier(&self, task: &Task, salt: &str) -> String {
        if self.config.is_stable_identifiers {
            task.get_stable_id(salt)
        } else {
            task.get_id()
        }
    }

    fn resolve_span(&self, task: &Task) -> Option<EventSpan> {
        let date_of = |name| task.find_date(Some(name)).map(|d| d.date);
        let start = date_of(TaskDateName::Start);
        let due = date_of(TaskDateName::Due);
        let first = task.find_date(None)?.date;
        let planned = || time_pair(task).map(|(s, e)| EventSpan::timed(s, e));

        let span = match self.config.how_to_process_multiple_dates {
            HowToProcessMultipleDates::PreferStartDate => {
                if let Some(date) = start.or(due) {
                    self.point(task, &date, Granularity::Day)
                } else if let Some(pair) = planned() {
                    pair
                } else {
                    self.point(task, &first, Granularity::Day)
                }
            }
            policy => {
                let granularity = if policy == HowToProcessMultipleDates::PreferDueDate {
                    Granularity::Day
                } else {
                    Granularity::Time
                };
                match (start, due) {
                    (Some(s), Some(d)) => self.range(task, &s, &d, granularity),
                    (None, Some(d)) => self.point(task, &d, granularity),
                    (Some(s), None) => self.point(task, &s, granularity),
                    (None, None) => {
                        planned().unwrap_or_else(|| self.point(task, &first, granularity))
                    }
                }
            }
        };
        Some(span)
    }

    /// Start and end for an all-day date shown with times: the day-planner
    /// pair on that day, else the summary's inline times, else the
    /// configured defaults.
    fn times_on(&self, task: &Task, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        if let Some(pair) = planned_on(task, day) {
            return pair;
        }
        match task.get_time_from_summary() {
            Some(times) => {
                let start = day.and_time(times.start);
                let mut end = day.and_time(times.end);
                if end <= start {
                    end += Duration::days(1);
                }
                (start, end)
            }
            None => {
                let start = day.and_time(self.default_start);
                (start, start + self.duration())
            }
        }
    }

    fn point(&self, task: &Task, date: &DateType, granularity: Granularity) -> EventSpan {
        if granularity == Granularity::Day {
            return EventSpan {
                start: Stamp::Day(date.date_naive()),
                end: None,
            };
        }

        let (start, end) = match date {
            DateType::Specific(at) => (*at, *at + self.duration()),
            DateType::AllDay(day) => self.times_on(task, *day),
        };
        EventSpan::timed(start, end)
    }

    fn range(
        &self,
        task: &Task,
        from: &DateType,
        to: &DateType,
        granularity: Granularity,
    ) -> EventSpan {
        if granularity == Granularity::Day {
            let first = from.date_naive();
            let last = to.date_naive().max(first);
            // All-day DTEND is exclusive.
            return EventSpan {
                start: Stamp::Day(first),
                end: Some(Stamp::Day(last + Duration::days(1))),
            };
        }

        let start = match from {
            DateType::Specific(at) => *at,
            DateType::AllDay(day) => self.times_on(task, *day).0,
        };
        let end = match to {
            DateType::Specific(at) => *at,
            DateType::AllDay(day) => self.times_on(task, *day).1,
        };
        let end = if end <= start {
            start + self.duration()
        } else {
            end
        };

        EventSpan::timed(start, end)
    }

    fn render_stamp(&self, stamp: Stamp) -> String {
        match stamp {
            Stamp::Day(day) => format_pattern(&day.and_time(NaiveTime::MIN), "YYYYMMDD"),
            Stamp::Time(at) if self.day_planner() => {
                format_pattern(&local_to_utc_naive(&at), "YYYYMMDD[T]HHmmss[Z]")
            }
            Stamp::Time(at) => format_pattern(&at, "YYYYMMDD[T]HHmmss"),
        }
    }
}

/// TimeStart/TimeEnd written by the day-planner format.
fn time_pair(task: &Task) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = task.find_date(Some(TaskDateName::TimeStart))?;
    let end = task.find_date(Some(TaskDateName::TimeEnd))?;
    Some((start.date.to_naive(), end.date.to_naive()))
}

/// The day-planner pair, when it starts on `day`.
fn planned_on(task: &Task, day: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
    time_pair(task).filter(|(start, _)| start.date() == day)
}

fn todo_status(status: TaskStatus) -> TodoStatus {
    match status {
        TaskStatus::ToDo => TodoStatus::NeedsAction,
        TaskStatus::InProgress => TodoStatus::InProcess,
        TaskStatus::Done => TodoStatus::Completed,
        TaskStatus::Cancelled => TodoStatus::Cancelled,
    }
}

fn date_property(name: &str, value: String) -> Property {
    let mut property = Property::new(name, value);
    property.add_parameter("VALUE", "DATE");
    property
}

fn location_property(task: &Task) -> Property {
    let encoded = encode_uri(task.get_location());
    let mut property = Property::new("LOCATION", encoded.as_str());
    property.add_parameter("ALTREP", &format!("\"{}\"", encoded));
    property
}
