use colored::Colorize;
use std::io;

use crate::config::{read_api_key, AppConfig, AppConfigError};
use crate::directions::{DirectionsError, GoogleDirections, Leg};
use crate::projection::Departure;

#[derive(Debug, thiserror::Error)]
pub enum DirectionsCommandError {
    #[error("{0}")]
    Config(#[from] AppConfigError),
    #[error("Directions request failed: {0}")]
    Directions(#[from] DirectionsError),
    #[error("Failed to write directions: {0}")]
    Output(#[from] io::Error),
}

// DirectionsCommand makes a single request, to check the key and connectivity.
pub struct DirectionsCommand<'a> {
    pub config: &'a AppConfig,
    pub origin: &'a str,
    pub destination: &'a str,
}

impl DirectionsCommand<'_> {
    pub fn run(&self) -> Result<Leg, DirectionsCommandError> {
        let api_key = read_api_key(&self.config.api_key_path())?;
        let client = GoogleDirections::new(api_key, self.config.directions.clone());
        println!("Getting directions from {} to {}...", self.origin, self.destination);
        let leg = client.directions(self.origin, self.destination, Departure::Now)?;
        write_leg(&mut io::stdout().lock(), &leg)?;
        Ok(leg)
    }
}

pub fn write_leg<W: io::Write>(out: &mut W, leg: &Leg) -> io::Result<()> {
    writeln!(out, "{}", "Route found!".green().bold())?;
    writeln!(out, "Distance: {}", leg.distance.text)?;
    writeln!(out, "Duration: {}", leg.duration.text)?;
    if let Some(in_traffic) = &leg.duration_in_traffic {
        writeln!(out, "Duration in traffic: {}", in_traffic.text)?;
    }
    writeln!(out, "Start address: {}", leg.start_address)?;
    writeln!(out, "End address: {}", leg.end_address)?;
    Ok(())
}
