//! Rise/set predicates.
//!
//! [`AboveHorizon`] is a boolean [`StepFunction`]: `true` while the target's apparent altitude
//! is above a horizon altitude. Its `false → true` transitions are risings, its `true → false`
//! transitions settings.
//!
//! Horizons used by the builders:
//!
//! | target              | horizon          | reason                               |
//! |---------------------|------------------|--------------------------------------|
//! | Sun                 | −0.8333°         | refraction (34′) + solar radius (16′)|
//! | other bodies, stars | −34′             | refraction at the horizon            |
//!
//! A body's apparent radius can be subtracted with [`AboveHorizon::with_radius_degrees`].
use std::fmt;

use super::{DiscreteEvent, StepFunction};
use crate::{
    apparent::{apparent_alt_az_with, LightTimeSettings, Target},
    constants::Degree,
    ephemeris::{Body, Ephemeris},
    observers::{observer_position, GeodeticLocation},
    skywatch_errors::SkywatchError,
    time::TimePoint,
};

/// Horizon altitude of sunrise and sunset, degrees.
pub const SUN_HORIZON_DEGREES: Degree = -0.8333;

/// Standard refraction at the horizon, degrees.
pub const REFRACTION_HORIZON_DEGREES: Degree = -34.0 / 60.0;

/// Sampling step of rise/set searches, days.
pub const RISE_SET_STEP_DAYS: f64 = 0.04;

/// Kind of a horizon crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiseSet {
    Rise,
    Set,
}

impl RiseSet {
    /// Tag a transition by the value the predicate takes after it.
    pub fn from_transition(above_after: bool) -> Self {
        if above_after {
            RiseSet::Rise
        } else {
            RiseSet::Set
        }
    }
}

impl fmt::Display for RiseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiseSet::Rise => write!(f, "rise"),
            RiseSet::Set => write!(f, "set"),
        }
    }
}

impl DiscreteEvent<bool> {
    pub fn rise_set(&self) -> RiseSet {
        RiseSet::from_transition(self.value)
    }
}

/// `true` while `target` is above `horizon_degrees` for an observer at `location`.
#[derive(Debug, Clone)]
pub struct AboveHorizon<'a, E: Ephemeris + ?Sized> {
    ephemeris: &'a E,
    pub target: Target,
    pub location: GeodeticLocation,
    pub horizon_degrees: Degree,
    pub step_days: f64,
    pub light_time: LightTimeSettings,
}

impl<'a, E: Ephemeris + ?Sized> AboveHorizon<'a, E> {
    pub fn new(
        ephemeris: &'a E,
        target: impl Into<Target>,
        location: GeodeticLocation,
        horizon_degrees: Degree,
    ) -> Self {
        AboveHorizon {
            ephemeris,
            target: target.into(),
            location,
            horizon_degrees,
            step_days: RISE_SET_STEP_DAYS,
            light_time: LightTimeSettings::default(),
        }
    }

    /// Lower the horizon by the apparent radius of the target, so events refer to the upper limb.
    pub fn with_radius_degrees(mut self, radius_degrees: Degree) -> Self {
        self.horizon_degrees -= radius_degrees;
        self
    }

    pub fn with_step_days(mut self, step_days: f64) -> Self {
        self.step_days = step_days;
        self
    }

    pub fn with_light_time(mut self, light_time: LightTimeSettings) -> Self {
        self.light_time = light_time;
        self
    }

    /// Apparent altitude of the target at `t`, degrees.
    pub fn altitude(&self, t: &TimePoint) -> Result<Degree, SkywatchError> {
        let observer = observer_position(self.ephemeris, &self.location, t)?;
        let coords =
            apparent_alt_az_with(self.ephemeris, &observer, &self.target, t, &self.light_time)?;
        Ok(coords.altitude)
    }
}

impl<E: Ephemeris + ?Sized> StepFunction for AboveHorizon<'_, E> {
    type Value = bool;

    fn value_at(&self, t: &TimePoint) -> Result<bool, SkywatchError> {
        Ok(self.altitude(t)? > self.horizon_degrees)
    }

    fn step_days(&self) -> f64 {
        self.step_days
    }
}

/// Sunrise/sunset predicate: the Sun's upper limb above the refracted horizon.
///
/// See also
/// ------------
/// * [`find_discrete`](crate::almanac::find_discrete) – Runs the search.
pub fn sunrise_sunset<'a, E: Ephemeris + ?Sized>(
    ephemeris: &'a E,
    location: GeodeticLocation,
) -> AboveHorizon<'a, E> {
    AboveHorizon::new(ephemeris, Body::Sun, location, SUN_HORIZON_DEGREES)
}

/// Rising/setting predicate of any target against the refracted horizon (−34′).
///
/// The target's center is used; chain [`AboveHorizon::with_radius_degrees`] to time the upper
/// limb instead.
pub fn risings_and_settings<'a, E: Ephemeris + ?Sized>(
    ephemeris: &'a E,
    target: impl Into<Target>,
    location: GeodeticLocation,
) -> AboveHorizon<'a, E> {
    AboveHorizon::new(ephemeris, target, location, REFRACTION_HORIZON_DEGREES)
}

#[cfg(test)]
mod rise_set_test {
    use super::*;
    use nalgebra::Vector3;

    use crate::{almanac::find_discrete, constants::AU, ephemeris::BodyPosition, stars::Star};

    struct StaticSky;

    impl Ephemeris for StaticSky {
        fn position(&self, body: Body, t: &TimePoint) -> Result<BodyPosition, SkywatchError> {
            let position = match body {
                Body::Earth => Vector3::zeros(),
                Body::Sun => Vector3::new(AU, 0.0, 0.0),
                other => return Err(SkywatchError::UnknownBody(other.naif_id())),
            };
            Ok(BodyPosition {
                position,
                velocity: Vector3::zeros(),
                epoch: *t,
            })
        }

        fn coverage(&self, _body: Body) -> Option<(TimePoint, TimePoint)> {
            None
        }
    }

    #[test]
    fn test_from_transition() {
        assert_eq!(RiseSet::from_transition(true), RiseSet::Rise);
        assert_eq!(RiseSet::from_transition(false), RiseSet::Set);
        assert_eq!(RiseSet::Rise.to_string(), "rise");
    }

    #[test]
    fn test_builders() {
        let site = GeodeticLocation::new(38.478752, -107.877739, 0.0).unwrap();
        let sun = sunrise_sunset(&StaticSky, site);
        assert_eq!(sun.horizon_degrees, SUN_HORIZON_DEGREES);
        assert_eq!(sun.step_days(), 0.04);
        assert_eq!(sun.target, Target::Body(Body::Sun));

        let moon = risings_and_settings(&StaticSky, Body::Moon, site).with_radius_degrees(0.25);
        assert!((moon.horizon_degrees - (-34.0 / 60.0 - 0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_static_sun_rises_and_sets_once_a_day() {
        let site = GeodeticLocation::new(38.478752, -107.877739, 0.0).unwrap();
        let start = TimePoint::from_utc_str("2024-06-20T00:00:00Z").unwrap();
        let end = TimePoint::from_offset(start, 2.0);

        let predicate = sunrise_sunset(&StaticSky, site);
        let events = find_discrete(&predicate, &start, &end).unwrap();

        // A Sun fixed at RA 0h, Dec 0° crosses the horizon twice per sidereal day
        assert!((4..=5).contains(&events.len()), "{events:?}");
        assert!(events
            .windows(2)
            .all(|w| w[0].rise_set() != w[1].rise_set()));
    }

    #[test]
    fn test_circumpolar_star_never_sets() {
        let site = GeodeticLocation::new(38.478752, -107.877739, 0.0).unwrap();
        let near_pole = Star::fixed(11767, 37.95, 89.26);
        let start = TimePoint::from_utc_str("2024-06-20T00:00:00Z").unwrap();
        let end = TimePoint::from_offset(start, 1.0);

        let predicate = risings_and_settings(&StaticSky, near_pole, site);
        assert!(predicate.value_at(&start).unwrap());
        let events = find_discrete(&predicate, &start, &end).unwrap();
        assert!(events.is_empty());
    }
}
