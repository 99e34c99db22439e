pub mod directions;
pub mod project;
pub mod stops;

use clap::Subcommand;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::config::AppConfigError;

pub trait CommandInterpreter {
    type CommandResult;
    type CommandError: std::error::Error;

    fn interpret(&self, command: &str) -> Result<Self::CommandResult, Self::CommandError>;
}

// try_tail drops the leading '.' from the remainder of a dotted command.
pub(crate) fn try_tail(s: &str) -> Option<String> {
    let s = s.chars().skip(1).collect::<String>();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Operation {
    /// project arrival times along a timetable using current traffic estimates
    Project {
        /// CSV timetable with stop,time[,code] columns; the built-in Oxford to London timetable if omitted
        #[arg(long)]
        timetable: Option<PathBuf>,
        /// configured route whose name and colour head the report
        #[arg(long)]
        route: Option<String>,
        /// do not wait between Directions API calls
        #[arg(long, default_value_t = false)]
        no_pacing: bool,
    },
    /// list stop sequences from TransXChange timetable files.
    /// SELECTOR is empty (all configured routes), `list`, `<route>` or `<route>.<direction>`
    Stops {
        #[arg(default_value_t = String::new())]
        selector: String,
    },
    /// make a single Directions API request and print the leg details
    Directions {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    Config(#[from] AppConfigError),
    #[error("{0}")]
    Project(#[from] project::ProjectCommandError),
    #[error("{0}")]
    Stops(#[from] stops::StopsCommandError),
    #[error("{0}")]
    Directions(#[from] directions::DirectionsCommandError),
}

impl Operation {
    pub fn run(&self, config: &AppConfig) -> Result<(), CommandError> {
        match self {
            Operation::Project { timetable, route, no_pacing } => {
                project::ProjectCommand {
                    config,
                    timetable: timetable.as_deref(),
                    route: route.as_deref(),
                    pacing: !no_pacing,
                }
                .run()?;
            }
            Operation::Stops { selector } => {
                stops::StopsCommandInterpreter(config).interpret(selector)?;
            }
            Operation::Directions { origin, destination } => {
                directions::DirectionsCommand { config, origin, destination }.run()?;
            }
        }
        Ok(())
    }
}
