//! Command-line argument parsing.
//!
//! Global flags may appear anywhere on the line. The first positional
//! argument names the command; the rest are its arguments. Running with no
//! command shows today's status.

use crate::daily::UngatedField;
use crate::prayer::GatedField;

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    /// Pin the clock to this local date-time (`YYYY-MM-DD HH:MM[:SS]`).
    pub at: Option<String>,
    /// Use a throwaway in-memory store instead of the database.
    pub memory: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Times {
        date: Option<String>,
    },
    Next,
    Status,
    Toggle {
        field: GatedField,
    },
    Travel,
    Exercise {
        kind: String,
        minutes: Option<u32>,
    },
    Reading {
        text: String,
        perspective: Option<String>,
    },
    Environment {
        note: Option<String>,
    },
    Languages {
        languages: Vec<String>,
        tool: String,
        activities: Vec<String>,
    },
    Reflect {
        presence: u8,
        notes: Option<String>,
    },
    Clear {
        field: UngatedField,
    },
    Week,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Times { .. } => "times",
            Command::Next => "next",
            Command::Status => "status",
            Command::Toggle { .. } => "toggle",
            Command::Travel => "travel",
            Command::Exercise { .. } => "exercise",
            Command::Reading { .. } => "reading",
            Command::Environment { .. } => "environment",
            Command::Languages { .. } => "languages",
            Command::Reflect { .. } => "reflect",
            Command::Clear { .. } => "clear",
            Command::Week => "week",
        }
    }
}

/// What the binary should do.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    Run {
        options: GlobalOptions,
        command: Command,
    },
    /// General help, or help for one command.
    ShowHelp { command: Option<String> },
    ShowVersion,
    /// Arguments could not be parsed; show usage with the reason.
    ShowHelpDueToError { command: Option<String>, reason: String },
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse `args`, where the first item is the program name.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut options = GlobalOptions::default();
        let mut positional: Vec<String> = Vec::new();
        let mut display_help = false;
        let mut display_version = false;

        let mut iter = args_vec.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--debug" | "-d" => options.debug_enabled = true,
                "--memory" | "-m" => options.memory = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--config" | "-c" | "--at" | "-a" => {
                    let Some(value) = iter.next() else {
                        return error(None, format!("{arg} requires a value"));
                    };
                    if matches!(arg.as_str(), "--config" | "-c") {
                        options.config_dir = Some(value);
                    } else {
                        options.at = Some(value);
                    }
                }
                "--" => positional.extend(iter.by_ref()),
                flag if flag.starts_with('-') && flag.len() > 1 && !is_number(flag) => {
                    return error(None, format!("Unknown option: {flag}"));
                }
                _ => positional.push(arg),
            }
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }

        let mut positional = positional.into_iter();
        let Some(name) = positional.next() else {
            let action = if display_help {
                CliAction::ShowHelp { command: None }
            } else {
                CliAction::Run {
                    options,
                    command: Command::Status,
                }
            };
            return ParsedArgs { action };
        };

        if name == "help" {
            return ParsedArgs {
                action: CliAction::ShowHelp {
                    command: positional.next(),
                },
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp {
                    command: Some(name),
                },
            };
        }
        if name == "version" {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }

        let rest: Vec<String> = positional.collect();
        match parse_command(&name, rest) {
            Ok(command) => ParsedArgs {
                action: CliAction::Run { options, command },
            },
            Err(reason) => error(Some(name), reason),
        }
    }
}

fn error(command: Option<String>, reason: String) -> ParsedArgs {
    ParsedArgs {
        action: CliAction::ShowHelpDueToError { command, reason },
    }
}

fn is_number(s: &str) -> bool {
    s.parse::<f64>().is_ok()
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Join trailing words into one optional text argument.
fn joined(words: &[String]) -> Option<String> {
    (!words.is_empty()).then(|| words.join(" "))
}

fn parse_command(name: &str, args: Vec<String>) -> Result<Command, String> {
    let arity = |min: usize, max: Option<usize>| -> Result<(), String> {
        if args.len() < min {
            return Err(format!("'{name}' needs at least {min} argument(s)"));
        }
        if let Some(max) = max
            && args.len() > max
        {
            return Err(format!("'{name}' takes at most {max} argument(s)"));
        }
        Ok(())
    };

    let command = match name {
        "times" | "t" => {
            arity(0, Some(1))?;
            Command::Times {
                date: args.first().cloned(),
            }
        }
        "next" | "n" => {
            arity(0, Some(0))?;
            Command::Next
        }
        "status" | "s" => {
            arity(0, Some(0))?;
            Command::Status
        }
        "toggle" => {
            arity(1, Some(1))?;
            Command::Toggle {
                field: args[0].parse()?,
            }
        }
        "travel" => {
            arity(0, Some(0))?;
            Command::Travel
        }
        "exercise" => {
            arity(1, Some(2))?;
            let minutes = args
                .get(1)
                .map(|m| {
                    m.parse::<u32>()
                        .map_err(|_| format!("minutes must be a whole number (got '{m}')"))
                })
                .transpose()?;
            Command::Exercise {
                kind: args[0].clone(),
                minutes,
            }
        }
        "reading" => {
            arity(1, Some(2))?;
            Command::Reading {
                text: args[0].clone(),
                perspective: args.get(1).cloned(),
            }
        }
        "environment" | "env" => Command::Environment {
            note: joined(&args),
        },
        "languages" | "lang" => {
            arity(2, Some(3))?;
            Command::Languages {
                languages: split_list(&args[0]),
                tool: args[1].clone(),
                activities: args.get(2).map(|a| split_list(a)).unwrap_or_default(),
            }
        }
        "reflect" => {
            arity(1, None)?;
            let presence = args[0]
                .parse::<u8>()
                .map_err(|_| format!("presence must be a number from 1 to 10 (got '{}')", args[0]))?;
            Command::Reflect {
                presence,
                notes: joined(&args[1..]),
            }
        }
        "clear" => {
            arity(1, Some(1))?;
            Command::Clear {
                field: args[0].parse()?,
            }
        }
        "week" | "w" => {
            arity(0, Some(0))?;
            Command::Week
        }
        unknown => return Err(format!("Unknown command: {unknown}")),
    };
    Ok(command)
}
