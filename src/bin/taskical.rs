use anyhow::{Context, Result};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use taskical::cli::{self, CliCommand, ExportArgs};
use taskical::config::Config;
use taskical::context::StandardContext;
use taskical::ical::CalendarBuilder;
use taskical::storage::LocalStorage;
use taskical::vault::Vault;

fn init_logging() {
    let level = env::var("TASKICAL_LOG")
        .ok()
        .and_then(|raw| raw.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // Logs go to stderr so stdout stays a clean .ics stream.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn load_config(args: &ExportArgs) -> Result<Config> {
    // An explicitly named file must exist.
    if let Some(path) = &args.config {
        return Config::load_from_path(path);
    }

    let ctx = StandardContext::new(args.root.clone());
    match Config::load(&ctx) {
        Ok(config) => Ok(config),
        Err(e) if Config::is_missing_config_error(&e) => {
            log::info!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn export(args: ExportArgs) -> Result<()> {
    let config = load_config(&args)?;
    let vault = Vault::open(&args.vault)?;
    let tasks = vault
        .collect_tasks(&config)
        .with_context(|| format!("Failed to scan vault {:?}", vault.root()))?;

    let calendar = CalendarBuilder::new(config).get_calendar(&tasks);

    match &args.output {
        Some(path) => LocalStorage::write_calendar(path, &calendar)?,
        None => print!("{}", calendar),
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    match cli::parse_args(&args)? {
        CliCommand::Help => {
            cli::print_help("taskical");
            Ok(())
        }
        CliCommand::Export(export_args) => export(export_args),
    }
}
