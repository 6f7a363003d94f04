//! Shared command-line interface logic: argument parsing and help text.
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Export(ExportArgs),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArgs {
    pub vault: PathBuf,
    /// Use a different directory for config.
    pub root: Option<PathBuf>,
    /// Explicit config file, bypassing the context lookup.
    pub config: Option<PathBuf>,
    /// Write here instead of stdout.
    pub output: Option<PathBuf>,
}

/// Parses `args` (without the binary name).
pub fn parse_args(args: &[String]) -> Result<CliCommand> {
    let mut vault = None;
    let mut root = None;
    let mut config = None;
    let mut output = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("Missing value for {}", flag))
        };
        match arg.as_str() {
            "-h" | "--help" | "help" => return Ok(CliCommand::Help),
            "-r" | "--root" => root = Some(value_for(arg.as_str())?),
            "-c" | "--config" => config = Some(value_for(arg.as_str())?),
            "-o" | "--output" => output = Some(value_for(arg.as_str())?),
            flag if flag.starts_with('-') => {
                return Err(anyhow::anyhow!("Unknown option '{}'", flag));
            }
            path => {
                if vault.is_some() {
                    return Err(anyhow::anyhow!("Only one vault directory can be exported"));
                }
                vault = Some(PathBuf::from(path));
            }
        }
    }

    match vault {
        Some(vault) => Ok(CliCommand::Export(ExportArgs {
            vault,
            root,
            config,
            output,
        })),
        None => Ok(CliCommand::Help),
    }
}

pub fn print_help(binary_name: &str) {
    println!(
        "taskical v{} - Export markdown tasks as an iCalendar feed",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS] <vault-dir>", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config.");
    println!("    -c, --config <file>   Read settings from this TOML file.");
    println!("    -o, --output <file>   Write the calendar to a file instead of stdout.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("TASK SYNTAX:");
    println!("    - [ ] / [/] / [x] / [-]   To do / in progress / done / cancelled");
    println!("    🛫 2024-03-01            Start date");
    println!("    ⏳ 2024-03-01            Scheduled date");
    println!("    📅 2024-03-01 14:00      Due date (optional time)");
    println!("    ✅ 2024-03-01            Done date");
    println!("    09:00 - 10:00 Title       Day planner range (daily notes)");
    println!();
    println!("LOGGING:");
    println!("    TASKICAL_LOG=debug {} <vault-dir>", binary_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_export_with_options() {
        let cmd = parse_args(&args(&["-o", "out.ics", "--root", "/tmp/x", "notes"])).unwrap();
        assert_eq!(
            cmd,
            CliCommand::Export(ExportArgs {
                vault: PathBuf::from("notes"),
                root: Some(PathBuf::from("/tmp/x")),
                config: None,
                output: Some(PathBuf::from("out.ics")),
            })
        );
    }

    #[test]
    fn test_help_and_errors() {
        assert_eq!(parse_args(&args(&[])).unwrap(), CliCommand::Help);
        assert_eq!(parse_args(&args(&["notes", "-h"])).unwrap(), CliCommand::Help);
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["-o"])).is_err());
        assert!(parse_args(&args(&["a", "b"])).is_err());
    }
}
