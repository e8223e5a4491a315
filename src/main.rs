//! Binary entry point.
//!
//! Parses arguments, loads configuration, picks the store and the clock, then
//! hands the command to `daybook::commands`. Every error ends the run with a
//! logged message and exit code 1.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use daybook::args::{CliAction, Command, GlobalOptions, ParsedArgs};
use daybook::commands::{self, CommandContext, help};
use daybook::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use daybook::common::logger::Log;
use daybook::config::{self, Config};
use daybook::prayer::PrayerTimeEngine;
use daybook::store::{LogStore, MemoryStore, SqliteStore};
use daybook::time_source::{self, FixedTimeSource, RealTimeSource};
use daybook::{log_debug, log_decorated, log_end, log_error_exit, log_indented, log_version};

/// Runs one command with the given global options.
struct ApplicationRunner {
    options: GlobalOptions,
}

impl ApplicationRunner {
    fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    fn run(self, command: Command) -> Result<()> {
        Log::set_debug(self.options.debug_enabled);
        config::set_config_dir(self.options.config_dir.clone())?;

        let config = Config::load()?;
        let location = config.location()?;
        let tz = location.timezone;

        match &self.options.at {
            Some(at) => {
                let pinned = time_source::parse_datetime_in_tz(at, &tz)
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Invalid --at value '{at}'"))?;
                time_source::init_time_source(Arc::new(FixedTimeSource::new(
                    pinned.with_timezone(&Utc),
                )));
            }
            None => time_source::init_time_source(Arc::new(RealTimeSource)),
        }

        log_version!();
        if self.options.debug_enabled {
            config.log_config(&location);
        }

        let store: Box<dyn LogStore> = if self.options.memory {
            log_decorated!("Using an in-memory store; nothing will be saved");
            Box::new(MemoryStore::new())
        } else {
            let path = config.resolved_database_path()?;
            log_debug!("Opening database {}", path.display());
            Box::new(
                SqliteStore::open(&path)
                    .with_context(|| format!("Failed to open database {}", path.display()))?,
            )
        };

        let ctx = CommandContext {
            engine: PrayerTimeEngine::new(location),
            store,
            user_id: config.user_id().to_string(),
            now: time_source::now().with_timezone(&tz),
        };
        log_debug!(
            "Running '{}' at {}",
            command.name(),
            ctx.now.format("%Y-%m-%d %H:%M:%S %Z")
        );

        commands::run_command(&ctx, command)
    }
}

fn main() {
    let parsed_args = ParsedArgs::parse(std::env::args());

    let code = match parsed_args.action {
        CliAction::ShowVersion => {
            log_version!();
            log_end!();
            EXIT_SUCCESS
        }
        CliAction::ShowHelp { command } => {
            help::run_help_command(command.as_deref());
            EXIT_SUCCESS
        }
        CliAction::ShowHelpDueToError { command, reason } => {
            log_version!();
            log_error_exit!("{}", reason);
            help::show_command_usage(command.as_deref());
            log_indented!("Run 'daybook help' for more information.");
            log_end!();
            EXIT_FAILURE
        }
        CliAction::Run { options, command } => {
            match ApplicationRunner::new(options).run(command) {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    log_error_exit!("{}", e);
                    for cause in e.chain().skip(1) {
                        log_indented!("caused by: {}", cause);
                    }
                    log_end!();
                    EXIT_FAILURE
                }
            }
        }
    };

    std::process::exit(code);
}
