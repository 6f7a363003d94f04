// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use strum::EnumIter;

fn default_true() -> bool {
    true
}

fn default_start_time() -> String {
    "00:00:00".to_string()
}

fn default_duration() -> u32 {
    30
}

fn default_calendar_name() -> String {
    "Obsidian Calendar".to_string()
}

fn default_old_task_in_days() -> u32 {
    365
}

/// Which markdown dates become an event's start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
pub enum HowToProcessMultipleDates {
    PreferStartDate,
    CreateMultipleEvents,
    #[default]
    PreferDueDate,
    PreferDueDateWithTime,
}

impl fmt::Display for HowToProcessMultipleDates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HowToProcessMultipleDates::PreferStartDate => write!(f, "Prefer start date"),
            HowToProcessMultipleDates::CreateMultipleEvents => write!(f, "Create multiple events"),
            HowToProcessMultipleDates::PreferDueDate => write!(f, "Prefer due date"),
            HowToProcessMultipleDates::PreferDueDateWithTime => {
                write!(f, "Prefer due date (with time)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
pub enum HowToParseInternalLinks {
    #[default]
    DoNotModifyThem,
    KeepTitle,
    PreferAlias,
}

impl fmt::Display for HowToParseInternalLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HowToParseInternalLinks::DoNotModifyThem => write!(f, "Do not modify them"),
            HowToParseInternalLinks::KeepTitle => write!(f, "Keep the page title"),
            HowToParseInternalLinks::PreferAlias => write!(f, "Prefer the alias"),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub how_to_process_multiple_dates: HowToProcessMultipleDates,
    #[serde(default)]
    pub is_include_todos: bool,
    #[serde(default = "default_true")]
    pub is_only_tasks_without_dates_are_todos: bool,
    #[serde(default = "default_start_time")]
    pub default_start_time: String, // Format "HH:MM" or "HH:MM:SS"
    #[serde(default = "default_duration")]
    pub default_duration: u32, // Minutes
    #[serde(default)]
    pub hashtags_to_remove: Vec<String>,
    #[serde(default)]
    pub is_day_planner_plugin_format_enabled: bool,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,
    #[serde(default)]
    pub is_stable_identifiers: bool,

    #[serde(default)]
    pub ignore_completed_tasks: bool,
    #[serde(default)]
    pub ignore_old_tasks: bool,
    #[serde(default = "default_old_task_in_days")]
    pub old_task_in_days: u32,
    #[serde(default)]
    pub how_to_parse_internal_links: HowToParseInternalLinks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            how_to_process_multiple_dates: HowToProcessMultipleDates::default(),
            is_include_todos: false,
            // Match the serde defaults
            is_only_tasks_without_dates_are_todos: true,
            default_start_time: default_start_time(),
            default_duration: 30,
            hashtags_to_remove: Vec::new(),
            is_day_planner_plugin_format_enabled: false,
            calendar_name: default_calendar_name(),
            is_stable_identifiers: false,
            ignore_completed_tasks: false,
            ignore_old_tasks: false,
            old_task_in_days: 365,
            how_to_parse_internal_links: HowToParseInternalLinks::default(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        // Explicitly detect missing file so callers can fall back to defaults.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        // Walk the error chain and look for an underlying IO NotFound.
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// `default_start_time` as a clock time; unset or malformed values mean midnight.
    pub fn default_start_naive_time(&self) -> NaiveTime {
        let raw = self.default_start_time.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .unwrap_or(NaiveTime::MIN)
    }
}
