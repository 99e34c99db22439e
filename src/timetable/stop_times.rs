use chrono::{NaiveTime, Timelike};
use std::fmt;
use std::num;
use std::str::FromStr;

// the marker used in timetables for a stop the coach passes without calling at.
pub const NOT_SERVED_MARKER: &str = "x";

// ScheduledTime is the published time at a stop, or the marker saying the
// coach does not call there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTime {
    At(NaiveTime),
    NotServed,
}

impl ScheduledTime {
    pub fn is_served(&self) -> bool {
        matches!(self, ScheduledTime::At(_))
    }

    // minutes since midnight, if the stop is served.
    pub fn minutes(&self) -> Option<u32> {
        match self {
            ScheduledTime::At(time) => Some(minutes_since_midnight(time)),
            ScheduledTime::NotServed => None,
        }
    }
}

impl fmt::Display for ScheduledTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduledTime::At(time) => write!(f, "{}", time.format("%H:%M")),
            ScheduledTime::NotServed => write!(f, "{}", NOT_SERVED_MARKER),
        }
    }
}

impl FromStr for ScheduledTime {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(NOT_SERVED_MARKER) {
            Ok(ScheduledTime::NotServed)
        } else {
            parse_time(s).map(ScheduledTime::At)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseTimeError {
    #[error("Improper number of segments in '{0}', expected HH:MM")]
    ImproperNumberOfSegments(String),
    #[error("Invalid hour segment: {0}")]
    InvalidHourSegment(#[source] num::ParseIntError),
    #[error("Invalid minute segment: {0}")]
    InvalidMinuteSegment(#[source] num::ParseIntError),
    #[error("Invalid time '{0:02}:{1:02}'")]
    InvalidTime(u32, u32),
}

// parse_time reads an HH:MM clock time.
pub fn parse_time(s: &str) -> Result<NaiveTime, ParseTimeError> {
    let segments = s.split(':').collect::<Vec<&str>>();
    if segments.len() != 2 {
        return Err(ParseTimeError::ImproperNumberOfSegments(s.to_string()));
    }
    let hours = segments[0].parse::<u32>().map_err(ParseTimeError::InvalidHourSegment)?;
    let minutes = segments[1].parse::<u32>().map_err(ParseTimeError::InvalidMinuteSegment)?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
        .ok_or(ParseTimeError::InvalidTime(hours, minutes))
}

pub fn minutes_since_midnight(time: &NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

// format_clock renders minutes since midnight as HH:MM, truncating seconds.
// There is no rollover: a coach arriving 5 minutes after midnight shows 24:05.
pub fn format_clock(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor() as i64;
    let mins = (minutes % 60.0).floor() as i64;
    format!("{:02}:{:02}", hours, mins)
}
