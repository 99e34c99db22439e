pub mod builtin;
pub mod loaders;
pub mod stop_times;
pub mod stops;

use std::ops::Index;
use std::slice;

use stop_times::{ParseTimeError, ScheduledTime};
use stops::Stop;

// ScheduleEntry pairs a stop with its published time, or the not-served marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub stop: Stop,
    pub time: ScheduledTime,
}

impl ScheduleEntry {
    pub fn new(stop: Stop, time: ScheduledTime) -> Self {
        ScheduleEntry { stop, time }
    }

    pub fn is_served(&self) -> bool {
        self.time.is_served()
    }
}

// Route is the ordered list of entries in the direction of travel.
// It is built once from static input and never reordered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    entries: Vec<ScheduleEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{stops} stops but {times} timetable entries")]
    LengthMismatch { stops: usize, times: usize },
    #[error("Invalid time for stop '{stop}': {source}")]
    InvalidTime {
        stop: String,
        #[source]
        source: ParseTimeError,
    },
}

impl Route {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Route { entries }
    }

    // from_parallel builds a route from a list of stop names and a list of the
    // same length holding HH:MM times or the not-served marker.
    pub fn from_parallel<S: AsRef<str>, T: AsRef<str>>(
        stops: &[S],
        times: &[T],
    ) -> Result<Self, ScheduleError> {
        if stops.len() != times.len() {
            return Err(ScheduleError::LengthMismatch {
                stops: stops.len(),
                times: times.len(),
            });
        }
        stops
            .iter()
            .zip(times.iter())
            .map(|(stop, time)| {
                time.as_ref()
                    .parse::<ScheduledTime>()
                    .map(|time| ScheduleEntry::new(Stop::new(stop.as_ref()), time))
                    .map_err(|source| ScheduleError::InvalidTime {
                        stop: stop.as_ref().to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Route::new)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn iter(&self) -> slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    pub fn served_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_served()).count()
    }

    // prior_scheduled_minutes finds the published time of the nearest served
    // entry before `index`, regardless of what happened when projecting it.
    pub fn prior_scheduled_minutes(&self, index: usize) -> Option<u32> {
        self.entries[..index.min(self.entries.len())]
            .iter()
            .rev()
            .find_map(|entry| entry.time.minutes())
    }
}

impl Index<usize> for Route {
    type Output = ScheduleEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a Route {
    type Item = &'a ScheduleEntry;
    type IntoIter = slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
