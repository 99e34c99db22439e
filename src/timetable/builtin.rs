use super::{Route, ScheduleError};

// Oxford Gloucester Green to London Victoria, weekday 07:00 departure.
pub const OXFORD_LONDON_STOPS: [&str; 10] = [
    "Oxford Gloucester Green, Oxford, UK",
    "Headington Brookes University, Oxford, UK",
    "Thornhill Park & Ride, Oxford, UK",
    "Lewknor Turn M40 Junction 6, UK",
    "North Hillingdon Station, Hillingdon, UK",
    "White City, London, UK",
    "Lisson Grove Marylebone Town Hall, London, UK",
    "Shepherd's Bush Holland Park, London, UK",
    "Marble Arch Park Lane, London, UK",
    "London Victoria Coach Station, London, UK",
];

// 'x' marks a stop the coach passes without calling at
pub const OXFORD_LONDON_TIMES: [&str; 10] = [
    "07:00", "07:15", "07:30", "07:45", "08:20", "x", "09:21", "x", "09:29", "09:39",
];

pub fn oxford_london() -> Result<Route, ScheduleError> {
    Route::from_parallel(&OXFORD_LONDON_STOPS, &OXFORD_LONDON_TIMES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_timetable_parses() {
        let route = oxford_london().unwrap();
        assert_eq!(route.len(), 10);
        assert_eq!(route.served_count(), 8);
        assert!(route[0].is_served());
        assert!(!route[5].is_served());
        assert!(!route[7].is_served());
    }
}
