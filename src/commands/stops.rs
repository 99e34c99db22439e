use crate::commands::{try_tail, CommandInterpreter};
use crate::config::{AppConfig, RouteConfig};
use crate::timetable::stops::Stop;
use crate::transxchange::direction::{Direction, DirectionParseError};
use crate::transxchange::{load_stops, TransXChangeError};
use colored::Colorize;
use log::error;
use std::io::{self, Write};

pub struct StopsCommandInterpreter<'a>(pub &'a AppConfig);

#[derive(Debug, thiserror::Error)]
pub enum StopsCommandError {
    #[error("No such route: {0}")]
    NoSuchRoute(String),
    #[error("{0}")]
    InvalidDirection(#[from] DirectionParseError),
    #[error("Error extracting stops for {0} {1}: {2}")]
    ErrorExtractingStops(String, Direction, #[source] TransXChangeError),
    #[error("Failed to write stops: {0}")]
    Output(#[from] io::Error),
}

impl<'a> CommandInterpreter for StopsCommandInterpreter<'a> {
    type CommandResult = ();
    type CommandError = StopsCommandError;

    // commands are dotted paths: "" for every configured route, "list",
    // "<route>" for its configured directions, or "<route>.<direction>".
    fn interpret(&self, command: &str) -> Result<Self::CommandResult, Self::CommandError> {
        let (first, rest) = command.find(".").and_then(|i| command.split_at_checked(i)).unwrap_or((command, ""));
        match first {
            "" => self.all(),
            "list" => self.list(),
            route_name => match try_tail(rest) {
                Some(direction) => self.direction(route_name, direction.parse::<Direction>()?),
                None => self.0.route(route_name)
                    .ok_or(StopsCommandError::NoSuchRoute(route_name.to_string()))
                    .and_then(|route| self.route(route)),
            },
        }
    }
}

impl StopsCommandInterpreter<'_> {
    fn list(&self) -> Result<(), StopsCommandError> {
        let mut out = io::stdout().lock();
        for route in &self.0.routes {
            let directions = route.directions.iter()
                .map(Direction::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "{}: {}", route.route_name.bold(), directions)?;
        }
        Ok(())
    }

    // all processes every configured route, reporting failures and carrying on.
    fn all(&self) -> Result<(), StopsCommandError> {
        for route in &self.0.routes {
            if let Err(e) = self.route(route) {
                error!("{}", e);
            }
        }
        Ok(())
    }

    // route tries every configured direction and returns the first failure.
    fn route(&self, route: &RouteConfig) -> Result<(), StopsCommandError> {
        println!();
        println!("{}", format!("=== Processing route: {} ===", route.route_name).bold());
        let mut first_error = None;
        for direction in &route.directions {
            if let Err(e) = self.direction(&route.route_name, *direction) {
                match first_error {
                    None => first_error = Some(e),
                    Some(_) => error!("{}", e),
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn direction(&self, route_name: &str, direction: Direction) -> Result<(), StopsCommandError> {
        println!();
        println!("--- Direction: {} ---", direction);
        let stops = load_stops(
            &self.0.timetable_dir(),
            route_name,
            direction,
            &self.0.direction_classifier(),
        )
        .map_err(|e| StopsCommandError::ErrorExtractingStops(route_name.to_string(), direction, e))?;
        write_stops(&mut io::stdout().lock(), &stops)?;
        Ok(())
    }
}

// write_stops prints a numbered stop sequence.
pub fn write_stops<W: io::Write>(out: &mut W, stops: &[Stop]) -> io::Result<()> {
    if stops.is_empty() {
        return writeln!(out, "{}", "No stops found for this direction".truecolor(128, 128, 128));
    }
    writeln!(out, "Extracted {} stops:", stops.len())?;
    for (i, stop) in stops.iter().enumerate() {
        writeln!(out, "  {:2}. {}", i + 1, stop)?;
    }
    Ok(())
}
