use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::projection::{Departure, TravelTimeLookup};

// Paced spaces out calls to the wrapped lookup so that consecutive calls start
// at least `interval` apart, to stay under the provider's rate limits.
pub struct Paced<L> {
    inner: L,
    interval: Duration,
    last_call: Cell<Option<Instant>>,
}

impl<L> Paced<L> {
    pub fn new(inner: L, interval: Duration) -> Self {
        Paced {
            inner,
            interval,
            last_call: Cell::new(None),
        }
    }

    fn wait_for_turn(&self) {
        if let Some(last_call) = self.last_call.get() {
            let elapsed = last_call.elapsed();
            if elapsed < self.interval {
                let wait = self.interval - elapsed;
                debug!("Pacing lookups, sleeping {} ms", wait.as_millis());
                thread::sleep(wait);
            }
        }
        self.last_call.set(Some(Instant::now()));
    }
}

impl<L: TravelTimeLookup> TravelTimeLookup for Paced<L> {
    fn travel_minutes(&self, origin: &str, destination: &str, departure: Departure) -> Option<f64> {
        self.wait_for_turn();
        self.inner.travel_minutes(origin, destination, departure)
    }
}
