// Walks a directory of markdown notes and collects their tasks.
use crate::config::Config;
use crate::model::Task;
use crate::model::parser::task_from_line;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    name: String,
}

impl Vault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(anyhow::anyhow!("Vault '{}' is not a directory", root.display()));
        }
        let name = root
            .canonicalize()
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vault".to_string());
        Ok(Self { root, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every markdown file under the root, sorted by path. Dot-directories
    /// (`.obsidian`, `.trash`, ...) are skipped.
    pub fn markdown_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        collect_markdown(&self.root, &mut files)?;
        files.sort();
        Ok(files)
    }

    /// The source locator stored on each task from `path`.
    pub fn location_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let file = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("obsidian://open?vault={}&file={}", self.name, file)
    }

    /// Parses every note into tasks, in file order then line order.
    ///
    /// A file that cannot be read is logged and skipped.
    pub fn collect_tasks(&self, config: &Config) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();

        for path in self.markdown_files()? {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Skipping unreadable note {}: {}", path.display(), e);
                    continue;
                }
            };
            let before = tasks.len();
            tasks.extend(tasks_from_note(&content, &self.location_for(&path), &path, config));
            log::debug!("{}: {} tasks", path.display(), tasks.len() - before);
        }

        log::info!("Collected {} tasks from vault '{}'", tasks.len(), self.name);
        Ok(tasks)
    }
}

/// Daily notes are named after their date (`2024-03-01.md`).
pub fn daily_note_date(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

pub fn tasks_from_note(content: &str, location: &str, path: &Path, config: &Config) -> Vec<Task> {
    let date_override = daily_note_date(path);
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            task_from_line(line, location, date_override, config).map(|t| t.with_line(index + 1))
        })
        .collect()
}

fn collect_markdown(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');

        if path.is_dir() {
            if !hidden {
                collect_markdown(&path, files)?;
            }
        } else if path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    Ok(())
}
