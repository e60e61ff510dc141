//! # Time scale
//!
//! [`TimePoint`] is the single continuous time coordinate used by every computation of the crate.
//! It wraps a [`hifitime::Epoch`], so offsets such as "+18 hours" are exact
//! [`Duration`] arithmetic, and exposes the instant as a **Terrestrial Time (TT)** Julian date.
//!
//! ## Leap seconds
//!
//! The policy is **leap-second aware**: hifitime carries the IERS leap-second table and UTC is only
//! applied at the civil-string boundary ([`TimePoint::from_utc_str`], [`TimePoint::to_utc_string`]).
//! Arithmetic never sees a leap second. The civil label of an inserted leap second
//! (`23:59:60`) is rejected by [`TimePoint::from_utc_str`]: name the instant as `23:59:59.999…`
//! or as an offset from a neighbouring second instead.
//!
//! ## Other scales
//!
//! * Ephemeris lookups use TDB seconds past J2000 ([`TimePoint::et_seconds`]).
//! * Sidereal time uses UT1, approximated here by UTC ([`TimePoint::ut1_mjd`]).
//!   |UT1 − UTC| stays below 0.9 s, i.e. less than 0.004° of Earth rotation.
use std::{fmt, str::FromStr};

use hifitime::{Duration, Epoch, TimeScale};

use crate::{
    constants::{Radian, DPI, JD, JDTOMJD, MJD, SECONDS_PER_DAY, T2000},
    skywatch_errors::SkywatchError,
};

/// A continuous, monotonic time coordinate (TT internally).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimePoint {
    epoch: Epoch,
}

impl TimePoint {
    pub fn from_epoch(epoch: Epoch) -> Self {
        TimePoint { epoch }
    }

    /// Current instant, read from the system clock.
    ///
    /// Return
    /// ----------
    /// * The current [`TimePoint`], or [`SkywatchError::SystemClock`] if the clock cannot be read.
    pub fn now() -> Result<Self, SkywatchError> {
        let epoch = Epoch::now().map_err(|e| SkywatchError::SystemClock(e.to_string()))?;
        Ok(TimePoint { epoch })
    }

    /// Build a time point from a Julian date in the TT scale.
    pub fn from_tt_jd(jd: JD) -> Self {
        TimePoint {
            epoch: Epoch::from_mjd_in_time_scale(jd - JDTOMJD, TimeScale::TT),
        }
    }

    /// Offset a base time point by a (possibly fractional, possibly negative) number of days.
    ///
    /// The offset is applied on the internal continuous scale, so `from_offset(t, 18.0 / 24.0)`
    /// is exactly 64 800 SI seconds after `t` whatever leap seconds occur in between.
    pub fn from_offset(base: TimePoint, days: f64) -> Self {
        TimePoint {
            epoch: base.epoch + Duration::from_days(days),
        }
    }

    /// Parse a civil UTC instant.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: an ISO 8601 string `YYYY-MM-DDTHH:MM:SS[.fff][Z]`. A space is accepted in place of `T`.
    ///
    /// Return
    /// ----------
    /// * The parsed [`TimePoint`], or [`SkywatchError::InvalidTimeInput`] for malformed or impossible
    ///   calendar input, including a `:60` seconds field.
    ///
    /// See also
    /// ------------
    /// * [`TimePoint::to_utc_string`] – Inverse operation.
    pub fn from_utc_str(input: &str) -> Result<Self, SkywatchError> {
        let trimmed = input.trim();
        let body = trimmed.strip_suffix('Z').unwrap_or(trimmed).trim_end();
        if body.is_empty() {
            return Err(SkywatchError::InvalidTimeInput(
                "empty calendar string".to_string(),
            ));
        }

        // hifitime folds a `:60` label onto the previous second
        let seconds = body.rsplit(':').next().unwrap_or_default();
        if seconds.split('.').next().is_some_and(|whole| whole == "60") {
            return Err(SkywatchError::InvalidTimeInput(format!(
                "{input}: leap-second label :60 is not accepted"
            )));
        }

        let epoch = Epoch::from_str(&format!("{body} UTC"))
            .map_err(|e| SkywatchError::InvalidTimeInput(format!("{input}: {e}")))?;
        Ok(TimePoint { epoch })
    }

    /// Format the instant as ISO 8601 UTC with a trailing `Z`.
    ///
    /// Arguments
    /// -----------------
    /// * `precision`: number of decimals kept on the seconds field (clamped to 9). The value is
    ///   rounded to the nearest unit of the last kept decimal.
    ///
    /// Return
    /// ----------
    /// * A string such as `2024-06-20T19:00:00Z` (precision 0) or `2024-06-20T19:00:00.250Z`.
    pub fn to_utc_string(&self, precision: u8) -> String {
        format!("{}Z", self.to_utc_string_without_zone(precision))
    }

    /// Same as [`TimePoint::to_utc_string`], without the zone designator.
    pub fn to_utc_string_without_zone(&self, precision: u8) -> String {
        let places = u32::from(precision.min(9));
        let unit = Duration::from_seconds(10f64.powi(-(places as i32)));
        let rounded = self.epoch.to_time_scale(TimeScale::UTC).round(unit);
        let (year, month, day, hour, minute, second, nanos) = rounded.to_gregorian_utc();

        let mut out = format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}");
        if places > 0 {
            let fraction = nanos / 10u32.pow(9 - places);
            out.push_str(&format!(".{fraction:0width$}", width = places as usize));
        }
        out
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Julian date in the TT scale.
    pub fn tt_jd(&self) -> JD {
        self.epoch.to_jde_tt_days()
    }

    /// Modified Julian date in the TT scale.
    pub fn tt_mjd(&self) -> MJD {
        self.epoch.to_mjd_tt_days()
    }

    /// Modified Julian date in UT1, approximated by UTC.
    pub fn ut1_mjd(&self) -> MJD {
        self.epoch.to_mjd_utc_days()
    }

    /// TDB seconds past J2000, the time argument of JPL kernels.
    pub fn et_seconds(&self) -> f64 {
        self.epoch.to_et_seconds()
    }

    /// Signed number of days elapsed from `earlier` to `self`.
    pub fn days_since(&self, earlier: &TimePoint) -> f64 {
        (self.epoch - earlier.epoch).to_seconds() / SECONDS_PER_DAY
    }
}

impl FromStr for TimePoint {
    type Err = SkywatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimePoint::from_utc_str(s)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_utc_string(3))
    }
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians.
///
/// IAU 1982 polynomial for GMST at 0h UT1, plus the rotation accumulated over the fraction of
/// the day.
///
/// Arguments
/// -----------------
/// * `ut1_mjd`: Modified Julian Date in the UT1 scale.
///
/// Return
/// ----------
/// * GMST in radians, in `[0, 2π)`.
///
/// See also
/// ------------
/// * [`crate::earth_orientation::gast`] – Apparent sidereal time (adds the equation of the equinoxes).
pub fn gmst(ut1_mjd: MJD) -> Radian {
    // GMST at 0h UT1, in seconds
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // sidereal/solar day ratio
    const RAP: f64 = 1.00273790934;

    let midnight = ut1_mjd.floor();
    let t = (midnight - T2000) / 36525.0;
    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;
    let day_fraction = ut1_mjd - midnight;

    (gmst0 + day_fraction * DPI * RAP).rem_euclid(DPI)
}
