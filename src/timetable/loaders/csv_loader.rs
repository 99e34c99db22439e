use crate::timetable::stop_times::{ParseTimeError, ScheduledTime};
use crate::timetable::stops::Stop;
use crate::timetable::{Route, ScheduleEntry};
use std::collections;
use std::fs;
use std::io;
use std::iter;
use std::path::Path;

// RouteCsvLoadError is an error that occurs when loading a timetable from a CSV file.
#[derive(Debug, thiserror::Error)]
pub enum RouteCsvLoadError {
    #[error("Failed to open {0}: {1}")]
    FailedToOpen(String, #[source] io::Error),
    #[error("No header found")]
    NoHeader,
    #[error("Error loading timetable row {0}: {1}")]
    EntryLoadError(usize, #[source] ScheduleEntryLoadError),
    #[error("Error reading CSV: {0}")]
    CSVReadError(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleEntryLoadError {
    #[error("stop is required")]
    StopRequired,
    #[error("time is required")]
    TimeRequired,
    #[error("Error parsing time: {0}")]
    TimeError(#[source] ParseTimeError),
}

// load_route reads a `stop,time[,code]` CSV timetable from disk.
pub fn load_route(path: &Path) -> Result<Route, RouteCsvLoadError> {
    let file = fs::File::open(path)
        .map_err(|e| RouteCsvLoadError::FailedToOpen(path.display().to_string(), e))?;
    Route::try_from(csv::Reader::from_reader(file))
}

// Route implements TryFrom<csv::Reader<R>> by attempting to consume and read from a csv::Reader<R>.
// Rows are kept in file order, which is the direction of travel.
impl<R: io::Read> TryFrom<csv::Reader<R>> for Route {
    type Error = RouteCsvLoadError;

    fn try_from(mut r: csv::Reader<R>) -> Result<Self, Self::Error> {
        // try to get the headers; if there are no headers, return a RouteCsvLoadError::NoHeader.
        let header = r.headers().cloned().map_err(|_| RouteCsvLoadError::NoHeader)?;
        r.into_records()
            .enumerate()
            .map(|(row, record_result)| {
                // if there was an error reading this record, return that error.
                let record = record_result?;
                // zip the header and record together into a field map.
                let fields = iter::zip(
                    header.iter().map(|s| s.trim().to_string()),
                    record.iter().map(|s| s.trim().to_string()),
                )
                .collect::<collections::HashMap<String, String>>();
                ScheduleEntry::try_from(&fields)
                    .map_err(|e| RouteCsvLoadError::EntryLoadError(row + 1, e))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Route::new)
    }
}

// ScheduleEntry implements TryFrom<&HashMap<String, String>> by interpreting the keys as field names, and
// the values as string-encoded values for those fields.
impl TryFrom<&collections::HashMap<String, String>> for ScheduleEntry {
    type Error = ScheduleEntryLoadError;

    fn try_from(fields: &collections::HashMap<String, String>) -> Result<Self, Self::Error> {
        let name = fields.get("stop")
            .filter(|s| !s.is_empty())
            .ok_or(ScheduleEntryLoadError::StopRequired)?;
        let time = fields.get("time")
            .filter(|s| !s.is_empty())
            .ok_or(ScheduleEntryLoadError::TimeRequired)?
            .parse::<ScheduledTime>()
            .map_err(ScheduleEntryLoadError::TimeError)?;
        let stop = match fields.get("code").filter(|s| !s.is_empty()) {
            Some(code) => Stop::with_code(name.as_str(), code.as_str()),
            None => Stop::new(name.as_str()),
        };
        Ok(ScheduleEntry::new(stop, time))
    }
}
