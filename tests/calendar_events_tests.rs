// File: tests/calendar_events_tests.rs
use chrono::NaiveDate;
use taskical::config::{Config, HowToProcessMultipleDates};
use taskical::ical::{CalendarBuilder, pretty};
use taskical::model::{DateType, Task, TaskDate, TaskDateName, TaskStatus};

fn day(y: i32, m: u32, d: u32) -> DateType {
    DateType::AllDay(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn task(summary: &str, dates: &[(TaskDateName, DateType)]) -> Task {
    Task::new(
        TaskStatus::ToDo,
        dates
            .iter()
            .map(|(name, date)| TaskDate::new(*name, *date))
            .collect(),
        summary,
        "obsidian://open?vault=Notes&file=Inbox",
    )
}

fn with_policy(policy: HowToProcessMultipleDates) -> Config {
    Config {
        how_to_process_multiple_dates: policy,
        ..Config::default()
    }
}

/// Drops `UID:` lines so outputs can be compared byte for byte.
fn without_uids(calendar: &str) -> String {
    calendar
        .split("\r\n")
        .filter(|line| !line.starts_with("UID:"))
        .collect::<Vec<_>>()
        .join("\r\n")
}

#[test]
fn test_document_frame() {
    let calendar = CalendarBuilder::new(Config::default()).get_calendar(&[]);
    assert_eq!(
        calendar,
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//taskical//taskical v{}//EN\r\nX-WR-CALNAME:Obsidian Calendar\r\nNAME:Obsidian Calendar\r\nCALSCALE:GREGORIAN\r\nEND:VCALENDAR\r\n",
            env!("CARGO_PKG_VERSION")
        )
    );
}

#[test]
fn test_dateless_task_without_todos_emits_nothing() {
    let tasks = vec![task("Someday", &[])];
    let calendar = CalendarBuilder::new(Config::default()).get_calendar(&tasks);
    assert!(!calendar.contains("BEGIN:VEVENT"));
    assert!(!calendar.contains("BEGIN:VTODO"));
}

#[test]
fn test_prefer_due_date_only_due() {
    let tasks = vec![task("Pay rent", &[(TaskDateName::Due, day(2024, 3, 1))])];
    let calendar =
        CalendarBuilder::new(with_policy(HowToProcessMultipleDates::PreferDueDate)).get_calendar(&tasks);
    assert_eq!(calendar.matches("BEGIN:VEVENT").count(), 1);
    assert!(calendar.contains("DTSTART:20240301\r\n"));
}

#[test]
fn test_create_multiple_events_in_date_order() {
    let tasks = vec![task(
        "Launch",
        &[
            (TaskDateName::Due, day(2024, 3, 9)),
            (TaskDateName::Scheduled, day(2024, 3, 5)),
            (TaskDateName::Start, day(2024, 3, 1)),
        ],
    )];
    let calendar = CalendarBuilder::new(with_policy(HowToProcessMultipleDates::CreateMultipleEvents))
        .get_calendar(&tasks);

    assert_eq!(calendar.matches("BEGIN:VEVENT").count(), 3);

    let summaries: Vec<&str> = calendar
        .split("\r\n")
        .filter_map(|line| line.strip_prefix("SUMMARY:"))
        .collect();
    assert_eq!(summaries, vec!["🛫 🔲 Launch", "⏳ 🔲 Launch", "📅 🔲 Launch"]);

    let starts: Vec<&str> = calendar
        .split("\r\n")
        .filter_map(|line| line.strip_prefix("DTSTART:"))
        .collect();
    assert_eq!(starts, vec!["20240301", "20240305", "20240309"]);
}

#[test]
fn test_events_follow_task_order() {
    let tasks = vec![
        task("Second", &[(TaskDateName::Due, day(2024, 3, 9))]),
        task("First", &[(TaskDateName::Due, day(2024, 3, 1))]),
    ];
    let calendar = CalendarBuilder::new(Config::default()).get_calendar(&tasks);
    let second = calendar.find("Second").unwrap();
    let first = calendar.find("First").unwrap();
    assert!(second < first);
}

#[test]
fn test_output_is_deterministic_apart_from_uids() {
    let tasks = vec![
        task("Write; review, ship", &[(TaskDateName::Start, day(2024, 3, 1)), (TaskDateName::Due, day(2024, 3, 4))]),
        task("Standup 9:30 - 9:45", &[(TaskDateName::Scheduled, day(2024, 3, 2))]),
        task("Someday", &[]),
    ];
    let config = Config {
        is_include_todos: true,
        is_only_tasks_without_dates_are_todos: false,
        ..with_policy(HowToProcessMultipleDates::CreateMultipleEvents)
    };

    let first = CalendarBuilder::new(config.clone()).get_calendar(&tasks);
    let second = CalendarBuilder::new(config).get_calendar(&tasks);
    assert_ne!(first, second, "identifiers are random per build");
    assert_eq!(without_uids(&first), without_uids(&second));
}

#[test]
fn test_stable_identifiers_make_builds_identical() {
    let tasks = vec![
        task("Report", &[(TaskDateName::Due, day(2024, 3, 1))]),
        task("Someday", &[]),
    ];
    let config = Config {
        is_include_todos: true,
        is_stable_identifiers: true,
        ..Config::default()
    };
    let first = CalendarBuilder::new(config.clone()).get_calendar(&tasks);
    let second = CalendarBuilder::new(config).get_calendar(&tasks);
    assert_eq!(first, second);
}

#[test]
fn test_only_dateless_tasks_become_todos() {
    let tasks = vec![
        task("Dated", &[(TaskDateName::Due, day(2024, 3, 1))]),
        task("Dateless", &[]),
    ];
    let config = Config {
        is_include_todos: true,
        is_only_tasks_without_dates_are_todos: true,
        ..Config::default()
    };
    let calendar = CalendarBuilder::new(config).get_calendar(&tasks);

    assert_eq!(calendar.matches("BEGIN:VEVENT").count(), 1);
    assert_eq!(calendar.matches("BEGIN:VTODO").count(), 1);
    let todo = &calendar[calendar.find("BEGIN:VTODO").unwrap()..];
    assert!(todo.contains("SUMMARY:🔲 Dateless\r\n"));
    assert!(!todo.contains("DTSTAMP"));
}

#[test]
fn test_all_tasks_become_todos_when_allowed() {
    let mut done = task(
        "Filed taxes",
        &[(TaskDateName::Due, day(2024, 4, 15)), (TaskDateName::Done, day(2024, 4, 2))],
    );
    done.status = TaskStatus::Done;
    let tasks = vec![done, task("Dateless", &[])];
    let config = Config {
        is_include_todos: true,
        is_only_tasks_without_dates_are_todos: false,
        ..Config::default()
    };
    let calendar = CalendarBuilder::new(config).get_calendar(&tasks);

    assert_eq!(calendar.matches("BEGIN:VTODO").count(), 2);
    assert!(calendar.contains("DUE;VALUE=DATE:20240415\r\n"));
    assert!(calendar.contains("COMPLETED;VALUE=DATE:20240402\r\n"));
    assert!(calendar.contains("STATUS:COMPLETED\r\n"));
    assert!(calendar.contains("STATUS:NEEDS-ACTION\r\n"));
    // To-dos come after every event.
    assert!(calendar.rfind("END:VEVENT").unwrap() < calendar.find("BEGIN:VTODO").unwrap());
}

#[test]
fn test_calendar_name_from_config() {
    let config = Config {
        calendar_name: "Work".to_string(),
        ..Config::default()
    };
    let calendar = CalendarBuilder::new(config).get_calendar(&[]);
    assert!(calendar.contains("X-WR-CALNAME:Work\r\nNAME:Work\r\n"));
}

#[test]
fn test_calendar_name_cannot_inject_lines() {
    for name in ["Work\nBEGIN:VEVENT", "Work\r\nBEGIN:VEVENT", "Work\rBEGIN:VEVENT"] {
        let config = Config {
            calendar_name: name.to_string(),
            ..Config::default()
        };
        let calendar = CalendarBuilder::new(config).get_calendar(&[]);
        assert!(calendar.contains("X-WR-CALNAME:Work\\nBEGIN:VEVENT\r\n"));
        assert!(calendar.contains("NAME:Work\\nBEGIN:VEVENT\r\n"));
        assert!(!calendar.contains("\r\nBEGIN:VEVENT"));
    }

    let config = Config {
        calendar_name: "Home, family; misc".to_string(),
        ..Config::default()
    };
    let calendar = CalendarBuilder::new(config).get_calendar(&[]);
    assert!(calendar.contains("X-WR-CALNAME:Home\\, family\\; misc\r\n"));
    assert!(calendar.contains("NAME:Home\\, family\\; misc\r\n"));
}

#[test]
fn test_calendar_is_already_pretty() {
    let tasks = vec![task("Multi\nline", &[(TaskDateName::Due, day(2024, 3, 1))])];
    let calendar = CalendarBuilder::new(Config::default()).get_calendar(&tasks);
    assert_eq!(pretty(&calendar), calendar);
    assert!(calendar.contains("SUMMARY:🔲 Multi\\nline\r\n"));
    assert!(!calendar.replace("\r\n", "").contains('\n'));
}
