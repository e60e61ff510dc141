//! # Constants and type definitions for Skywatch
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the `skywatch` library.
//!
//! ## Overview
//!
//! - Astronomical and geophysical constants (WGS84 ellipsoid, speed of light, AU)
//! - Unit conversions (degrees ↔ radians, days ↔ seconds, arcseconds ↔ radians)
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian year
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Modified Julian Date of the J2000 epoch (2000-01-01 12:00 TT)
pub const T2000: f64 = 51544.5;

/// Julian Date of the J2000 epoch
pub const JD2000: f64 = 2_451_545.0;

/// Offset between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Degrees to radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds to radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Milliarcseconds to radians
pub const RADMAS: f64 = RADSEC / 1000.0;

/// WGS84 equatorial radius in meters
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 polar radius in meters
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.314_245;

/// Ratio of sidereal to solar day, used for the Earth rotation rate
pub const SIDEREAL_RATE: f64 = 1.002_737_909_350_795;

/// Earth angular velocity in rad/s
pub const EARTH_ROTATION_RATE: f64 = DPI * SIDEREAL_RATE / SECONDS_PER_DAY;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in km/day
pub const VLIGHT_KM_DAY: f64 = VLIGHT * SECONDS_PER_DAY;

/// Catalog epoch of the Hipparcos main catalog (J1991.25), as a TT Julian date
pub const HIPPARCOS_EPOCH_JD: f64 = JD2000 + (1991.25 - 2000.0) * DAYS_PER_JULIAN_YEAR;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Modified Julian Date
pub type MJD = f64;
/// Julian Date
pub type JD = f64;
