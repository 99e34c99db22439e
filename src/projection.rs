//! Projects arrival times along a route by replacing the timetable's leg
//! durations with live travel-time estimates.
//!
//! The projection walks the route once, left to right, carrying the last stop
//! the coach actually called at and the time it got there. Stops it passes
//! without calling at are echoed as not served. A stop whose travel time
//! cannot be estimated is left out of the output altogether and the walk
//! carries on from the previous called-at stop.
use chrono::{DateTime, NaiveTime, Utc};
use log::{debug, info, warn};

use crate::timetable::stop_times::{format_clock, minutes_since_midnight, ScheduledTime};
use crate::timetable::stops::Stop;
use crate::timetable::Route;

/// When the journey whose travel time is being estimated sets off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    Now,
    At(DateTime<Utc>),
}

/// A source of travel-time estimates between two locations.
///
/// Returns the estimated duration in minutes, or `None` when no estimate is
/// available for any reason (no route, transport failure, bad response).
pub trait TravelTimeLookup {
    fn travel_minutes(&self, origin: &str, destination: &str, departure: Departure) -> Option<f64>;
}

impl<F> TravelTimeLookup for F
where
    F: Fn(&str, &str, Departure) -> Option<f64>,
{
    fn travel_minutes(&self, origin: &str, destination: &str, departure: Departure) -> Option<f64> {
        self(origin, destination, departure)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Served {
        scheduled: NaiveTime,
        // minutes beyond the timetabled leg, never negative, one decimal place
        extra_delay: f64,
        predicted_minutes: f64,
    },
    NotServed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRecord {
    pub stop: Stop,
    pub projection: Projection,
}

impl ProjectionRecord {
    pub fn is_served(&self) -> bool {
        matches!(self.projection, Projection::Served { .. })
    }

    pub fn extra_delay(&self) -> Option<f64> {
        match self.projection {
            Projection::Served { extra_delay, .. } => Some(extra_delay),
            Projection::NotServed => None,
        }
    }

    pub fn scheduled(&self) -> ScheduledTime {
        match self.projection {
            Projection::Served { scheduled, .. } => ScheduledTime::At(scheduled),
            Projection::NotServed => ScheduledTime::NotServed,
        }
    }

    // predicted arrival as HH:MM
    pub fn predicted_arrival(&self) -> Option<String> {
        match self.projection {
            Projection::Served { predicted_minutes, .. } => Some(format_clock(predicted_minutes)),
            Projection::NotServed => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("Route has no stops")]
    EmptyRoute,
    #[error("First stop '{0}' is not served and cannot anchor the projection")]
    UnservedAnchor(String),
}

/// Projects arrival times for every stop on `route`.
///
/// The first stop anchors the projection at its published time. Each later
/// called-at stop is reached from the previous called-at stop using the
/// estimate from `lookup`; an early coach waits for its published time.
pub fn project<L>(route: &Route, lookup: &L) -> Result<Vec<ProjectionRecord>, ProjectionError>
where
    L: TravelTimeLookup + ?Sized,
{
    let anchor = route.entries().first().ok_or(ProjectionError::EmptyRoute)?;
    let anchor_time = match anchor.time {
        ScheduledTime::At(time) => time,
        ScheduledTime::NotServed => {
            return Err(ProjectionError::UnservedAnchor(anchor.stop.name.clone()))
        }
    };

    let mut last_served_stop = &anchor.stop;
    let mut last_served_minutes = f64::from(minutes_since_midnight(&anchor_time));

    let mut records = Vec::with_capacity(route.len());
    records.push(ProjectionRecord {
        stop: anchor.stop.clone(),
        projection: Projection::Served {
            scheduled: anchor_time,
            extra_delay: 0.0,
            predicted_minutes: last_served_minutes,
        },
    });

    for (i, entry) in route.iter().enumerate().skip(1) {
        let scheduled = match entry.time {
            ScheduledTime::At(time) => time,
            ScheduledTime::NotServed => {
                debug!("{} is not served, passing through", entry.stop);
                records.push(ProjectionRecord {
                    stop: entry.stop.clone(),
                    projection: Projection::NotServed,
                });
                continue;
            }
        };
        let scheduled_minutes = f64::from(minutes_since_midnight(&scheduled));

        info!("Analyzing: {}", entry.stop);
        let travel_minutes = match lookup.travel_minutes(
            last_served_stop.location(),
            entry.stop.location(),
            Departure::Now,
        ) {
            Some(minutes) => minutes,
            None => {
                warn!("Skipping {} due to travel time lookup failure", entry.stop);
                continue;
            }
        };

        let predicted_minutes = (last_served_minutes + travel_minutes).max(scheduled_minutes);

        let extra_delay = match route.prior_scheduled_minutes(i) {
            Some(prior_minutes) => {
                let scheduled_leg = scheduled_minutes - f64::from(prior_minutes);
                let actual_leg = predicted_minutes - last_served_minutes;
                (actual_leg - scheduled_leg).max(0.0)
            }
            None => 0.0,
        };

        records.push(ProjectionRecord {
            stop: entry.stop.clone(),
            projection: Projection::Served {
                scheduled,
                extra_delay: round_tenths(extra_delay),
                predicted_minutes,
            },
        });

        last_served_stop = &entry.stop;
        last_served_minutes = predicted_minutes;
    }

    Ok(records)
}

// round_tenths rounds the exact binary value to one decimal place, ties to even.
fn round_tenths(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    // RecordingLookup answers from a fixed table and remembers every question asked.
    struct RecordingLookup {
        legs: HashMap<(String, String), f64>,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl RecordingLookup {
        fn new(legs: &[(&str, &str, f64)]) -> Self {
            RecordingLookup {
                legs: legs
                    .iter()
                    .map(|(o, d, m)| ((o.to_string(), d.to_string()), *m))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.borrow().clone()
        }
    }

    impl TravelTimeLookup for RecordingLookup {
        fn travel_minutes(&self, origin: &str, destination: &str, departure: Departure) -> Option<f64> {
            assert_eq!(departure, Departure::Now);
            self.calls.borrow_mut().push((origin.to_string(), destination.to_string()));
            self.legs.get(&(origin.to_string(), destination.to_string())).copied()
        }
    }

    fn route(stops: &[&str], times: &[&str]) -> Route {
        Route::from_parallel(stops, times).unwrap()
    }

    fn served(record: &ProjectionRecord) -> (String, f64, String) {
        (
            record.scheduled().to_string(),
            record.extra_delay().unwrap(),
            record.predicted_arrival().unwrap(),
        )
    }

    #[test]
    fn unserved_stop_is_skipped_when_computing_the_next_leg() {
        let route = route(&["A", "B", "C"], &["07:00", "x", "07:45"]);
        let lookup = RecordingLookup::new(&[("A", "C", 50.0)]);

        let records = project(&route, &lookup).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(served(&records[0]), ("07:00".to_string(), 0.0, "07:00".to_string()));
        assert_eq!(records[1].projection, Projection::NotServed);
        assert_eq!(records[1].stop, Stop::new("B"));
        assert_eq!(served(&records[2]), ("07:45".to_string(), 5.0, "07:50".to_string()));
        assert_eq!(lookup.calls(), vec![("A".to_string(), "C".to_string())]);
    }

    #[test]
    fn failed_lookup_drops_the_stop_and_keeps_the_previous_origin() {
        let route = route(&["A", "B", "C"], &["07:00", "07:20", "07:45"]);
        // no estimate for A -> B
        let lookup = RecordingLookup::new(&[("A", "C", 40.0)]);

        let records = project(&route, &lookup).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stop, Stop::new("A"));
        assert_eq!(records[1].stop, Stop::new("C"));
        assert_eq!(
            lookup.calls(),
            vec![("A".to_string(), "B".to_string()), ("A".to_string(), "C".to_string())]
        );
        // predicted from A at 07:00 + 40 = 07:40, waits for 07:45.
        // the timetabled leg is still measured from B's 07:20 even though B was dropped.
        assert_eq!(served(&records[1]), ("07:45".to_string(), 20.0, "07:45".to_string()));
    }

    #[test]
    fn all_served_and_answered_gives_one_record_per_stop() {
        let route = route(&["A", "B", "C", "D"], &["07:00", "07:10", "07:30", "08:00"]);
        let lookup = |_: &str, _: &str, _: Departure| Some(12.0);

        let records = project(&route, &lookup).unwrap();

        assert_eq!(records.len(), route.len());
        assert!(records.iter().all(ProjectionRecord::is_served));
    }

    #[test]
    fn exact_timetable_legs_give_no_delay() {
        let route = route(
            &["A", "B", "C", "D", "E"],
            &["07:00", "07:15", "x", "07:45", "08:20"],
        );
        let lookup = RecordingLookup::new(&[("A", "B", 15.0), ("B", "D", 30.0), ("D", "E", 35.0)]);

        let records = project(&route, &lookup).unwrap();

        for (record, entry) in records.iter().zip(route.iter()) {
            match record.projection {
                Projection::Served { extra_delay, .. } => {
                    assert_eq!(extra_delay, 0.0);
                    assert_eq!(record.predicted_arrival(), Some(entry.time.to_string()));
                }
                Projection::NotServed => assert!(!entry.is_served()),
            }
        }
    }

    #[test]
    fn early_coach_waits_and_never_has_negative_delay() {
        let route = route(&["A", "B"], &["07:00", "07:30"]);
        let lookup = |_: &str, _: &str, _: Departure| Some(10.0);

        let records = project(&route, &lookup).unwrap();

        assert_eq!(served(&records[1]), ("07:30".to_string(), 0.0, "07:30".to_string()));
    }

    #[test]
    fn delay_propagates_and_is_only_charged_once() {
        // A 07:00 -> B 07:15 takes 25 (10 late), B -> C timetabled 15 takes 15.
        let route = route(&["A", "B", "C"], &["07:00", "07:15", "07:30"]);
        let lookup = RecordingLookup::new(&[("A", "B", 25.0), ("B", "C", 15.0)]);

        let records = project(&route, &lookup).unwrap();

        assert_eq!(served(&records[1]), ("07:15".to_string(), 10.0, "07:25".to_string()));
        assert_eq!(served(&records[2]), ("07:30".to_string(), 0.0, "07:40".to_string()));
    }

    #[test]
    fn extra_delay_is_rounded_to_one_decimal() {
        let route = route(&["A", "B"], &["07:00", "07:10"]);
        let lookup = |_: &str, _: &str, _: Departure| Some(12.4666);

        let records = project(&route, &lookup).unwrap();

        assert_relative_eq!(records[1].extra_delay().unwrap(), 2.5);
        assert_eq!(records[1].predicted_arrival().as_deref(), Some("07:12"));
    }

    #[test]
    fn half_tenth_delays_round_to_even() {
        let route = route(&["A", "B"], &["07:00", "07:15"]);

        // 915 s is exactly a quarter minute over the 15 minute leg
        let records = project(&route, &|_: &str, _: &str, _: Departure| Some(915.0 / 60.0)).unwrap();
        assert_eq!(records[1].extra_delay(), Some(0.2));

        let records = project(&route, &|_: &str, _: &str, _: Departure| Some(903.0 / 60.0)).unwrap();
        assert_eq!(records[1].extra_delay(), Some(0.1));

        assert_eq!(round_tenths(0.05), 0.1);
        assert_eq!(round_tenths(0.35), 0.3);
    }

    #[test]
    fn anchor_only_route_needs_no_lookups() {
        let route = route(&["A"], &["06:55"]);
        let lookup = RecordingLookup::new(&[]);

        let records = project(&route, &lookup).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(served(&records[0]), ("06:55".to_string(), 0.0, "06:55".to_string()));
        assert!(lookup.calls().is_empty());
    }

    #[test]
    fn rejects_empty_route_and_unserved_anchor() {
        let lookup = RecordingLookup::new(&[]);
        assert!(matches!(
            project(&Route::default(), &lookup),
            Err(ProjectionError::EmptyRoute)
        ));
        assert!(matches!(
            project(&route(&["A", "B"], &["x", "07:00"]), &lookup),
            Err(ProjectionError::UnservedAnchor(name)) if name == "A"
        ));
        assert!(lookup.calls().is_empty());
    }
}
