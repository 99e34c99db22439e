pub mod commands;
pub mod config;
pub mod directions;
pub mod projection;
pub mod report;
pub mod timetable;
pub mod transxchange;
