pub mod almanac;
pub mod apparent;
pub mod config;
pub mod constants;
pub mod earth_orientation;
pub mod ephemeris;
pub mod observers;
pub mod ref_system;
pub mod skywatch;
pub mod skywatch_errors;
pub mod stars;
pub mod time;
