use chrono::Utc;
use hex_color::HexColor;
use log::info;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::config::{read_api_key, AppConfig, AppConfigError};
use crate::directions::pacing::Paced;
use crate::directions::GoogleDirections;
use crate::projection::{project, ProjectionError, ProjectionRecord, TravelTimeLookup};
use crate::report::Report;
use crate::timetable::loaders::csv_loader::{load_route, RouteCsvLoadError};
use crate::timetable::{builtin, Route, ScheduleError};

const BUILTIN_TITLE: &str = "Oxford to London Bus Timetable Analysis";

#[derive(Debug, thiserror::Error)]
pub enum ProjectCommandError {
    #[error("{0}")]
    Config(#[from] AppConfigError),
    #[error("Failed to load timetable: {0}")]
    Timetable(#[from] RouteCsvLoadError),
    #[error("Invalid built-in timetable: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("Error during analysis: {0}")]
    Projection(#[from] ProjectionError),
    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

pub struct ProjectCommand<'a> {
    pub config: &'a AppConfig,
    pub timetable: Option<&'a Path>,
    pub route: Option<&'a str>,
    pub pacing: bool,
}

impl ProjectCommand<'_> {
    pub fn run(&self) -> Result<Vec<ProjectionRecord>, ProjectCommandError> {
        // setup problems are reported before any request is made
        let api_key = read_api_key(&self.config.api_key_path())?;
        let timezone = self.config.timezone()?;
        let (title, color) = self.heading()?;
        let route = self.load_route()?;

        let interval = if self.pacing { self.config.pacing() } else { Duration::ZERO };
        let lookup = Paced::new(
            GoogleDirections::new(api_key, self.config.directions.clone()),
            interval,
        );
        let generated_at = Utc::now()
            .with_timezone(&timezone)
            .format("%Y-%m-%d %H:%M %Z")
            .to_string();

        project_and_report(&route, &lookup, title, color, Some(generated_at), &mut io::stdout().lock())
    }

    fn heading(&self) -> Result<(String, Option<HexColor>), ProjectCommandError> {
        match self.route.and_then(|name| self.config.route(name)) {
            Some(route) => Ok((format!("{} Timetable Analysis", route.route_name), route.color()?)),
            None => Ok((
                self.route
                    .map(|name| format!("{} Timetable Analysis", name))
                    .or_else(|| self.timetable.map(|path| format!("{} Timetable Analysis", path.display())))
                    .unwrap_or_else(|| String::from(BUILTIN_TITLE)),
                None,
            )),
        }
    }

    fn load_route(&self) -> Result<Route, ProjectCommandError> {
        match self.timetable {
            Some(path) => {
                info!("Loading timetable from {}", path.display());
                Ok(load_route(path)?)
            }
            None => Ok(builtin::oxford_london()?),
        }
    }
}

// project_and_report runs the projection and writes the report to `out`.
pub fn project_and_report<L, W>(
    route: &Route,
    lookup: &L,
    title: String,
    color: Option<HexColor>,
    generated_at: Option<String>,
    out: &mut W,
) -> Result<Vec<ProjectionRecord>, ProjectCommandError>
where
    L: TravelTimeLookup + ?Sized,
    W: io::Write,
{
    writeln!(out, "Analyzing {} stops with current traffic conditions...", route.len())?;
    writeln!(out, "Note: 'x' means the coach doesn't stop at that location")?;
    writeln!(out)?;

    let records = project(route, lookup)?;
    Report {
        title,
        color,
        generated_at,
        records: &records,
    }
    .write_to(out)?;
    Ok(records)
}
