//! # Apparent position calculator
//!
//! Turns a barycentric observer state and a target into **topocentric altitude/azimuth**.
//!
//! ## Pipeline
//!
//! 1. **Light time** (solar-system bodies only): the target is taken at its emission time
//!    `t_emit = t − |r_target(t_emit) − r_obs(t)| / c`, iterated to convergence.
//! 2. **Aberration**: relativistic stellar aberration from the observer's barycentric velocity
//!    ([`aberration`](crate::ref_system::aberration)).
//! 3. **Frames**: ICRF → true equator and equinox of date → terrestrial → local East-North-Up.
//! 4. **Horizon coordinates**: `alt = asin(up)`, `az = atan2(east, north)` in `[0°, 360°)`.
//!
//! Stars skip step 1: their position is propagated by space motion from the catalog epoch
//! ([`Star::barycentric_position`](crate::stars::Star::barycentric_position)).
//!
//! Atmospheric refraction and gravitational light deflection are not applied.
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, Kilometer, VLIGHT_KM_DAY},
    ephemeris::{Body, BodyPosition, Ephemeris},
    observers::ObserverState,
    ref_system::{aberration, cartesian_to_radec},
    skywatch_errors::SkywatchError,
    stars::Star,
    time::TimePoint,
};

/// Something that can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Body(Body),
    Star(Star),
}

impl From<Body> for Target {
    fn from(body: Body) -> Self {
        Target::Body(body)
    }
}

impl From<Star> for Target {
    fn from(star: Star) -> Self {
        Target::Star(star)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Body(body) => write!(f, "{body}"),
            Target::Star(star) => write!(f, "HIP {}", star.hip),
        }
    }
}

/// Convergence settings of the light-time iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightTimeSettings {
    /// Stop once two successive emission times differ by less than this (days)
    pub tolerance_days: f64,
    /// Upper bound on the number of iterations
    pub max_iterations: usize,
}

impl Default for LightTimeSettings {
    fn default() -> Self {
        LightTimeSettings {
            tolerance_days: 1e-9,
            max_iterations: 10,
        }
    }
}

/// Topocentric apparent coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentCoordinates {
    /// Altitude above the horizon, degrees in `[-90, 90]`
    pub altitude: Degree,
    /// Azimuth from north through east, degrees in `[0, 360)`
    pub azimuth: Degree,
    /// Observer → target distance (km), `None` for a star without parallax
    pub distance: Option<Kilometer>,
    /// Apparent right ascension of date, degrees in `[0, 360)`
    pub right_ascension: Degree,
    /// Apparent declination of date, degrees
    pub declination: Degree,
}

/// Emission-time state of `body` seen from `observer_position` at `t`.
///
/// Return
/// ----------
/// * The target state at emission time, and the number of iterations used.
fn light_time_corrected<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    body: Body,
    observer_position: &Vector3<f64>,
    t: &TimePoint,
    settings: &LightTimeSettings,
) -> Result<(BodyPosition, usize), SkywatchError> {
    let mut emitted = ephemeris.position(body, t)?;
    let mut t_emit = *t;

    for iteration in 1..=settings.max_iterations {
        let light_time = (emitted.position - observer_position).norm() / VLIGHT_KM_DAY;
        let next = TimePoint::from_offset(*t, -light_time);
        let change = next.days_since(&t_emit).abs();

        t_emit = next;
        emitted = ephemeris.position(body, &t_emit)?;

        if change < settings.tolerance_days {
            return Ok((emitted, iteration));
        }
    }

    Ok((emitted, settings.max_iterations))
}

/// Map an ephemeris failure on the target side to [`SkywatchError::BodyUnavailable`].
fn unavailable(body: Body, err: SkywatchError) -> SkywatchError {
    match err {
        SkywatchError::OutOfRangeTime { .. } | SkywatchError::UnknownBody(_) => {
            SkywatchError::BodyUnavailable {
                target: body.name().to_string(),
                reason: err.to_string(),
            }
        }
        other => other,
    }
}

/// Apparent altitude/azimuth of `target` for `observer` at `t`, with default light-time settings.
///
/// Arguments
/// -----------------
/// * `ephemeris`: source of the target position.
/// * `observer`: barycentric observer state at `t`, from
///   [`observer_position`](crate::observers::observer_position).
/// * `target`: a solar-system body or a catalogued star.
/// * `t`: observation instant.
///
/// Return
/// ----------
/// * The [`ApparentCoordinates`], or [`SkywatchError::BodyUnavailable`] when the ephemeris cannot
///   supply the target at the required time.
///
/// See also
/// ------------
/// * [`apparent_alt_az_with`] – Same with explicit light-time settings.
pub fn apparent_alt_az<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    observer: &ObserverState,
    target: &Target,
    t: &TimePoint,
) -> Result<ApparentCoordinates, SkywatchError> {
    apparent_alt_az_with(
        ephemeris,
        observer,
        target,
        t,
        &LightTimeSettings::default(),
    )
}

/// [`apparent_alt_az`] with explicit light-time settings.
pub fn apparent_alt_az_with<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    observer: &ObserverState,
    target: &Target,
    t: &TimePoint,
    settings: &LightTimeSettings,
) -> Result<ApparentCoordinates, SkywatchError> {
    let observer_position = observer.barycentric.position;

    let (line_of_sight, distance) = match target {
        Target::Body(body) => {
            let (emitted, _) =
                light_time_corrected(ephemeris, *body, &observer_position, t, settings)
                    .map_err(|e| unavailable(*body, e))?;
            let line_of_sight = emitted.position - observer_position;
            let distance = line_of_sight.norm();
            (line_of_sight, Some(distance))
        }
        Target::Star(star) => {
            let line_of_sight = star.barycentric_position(t) - observer_position;
            let distance = star.distance().map(|_| line_of_sight.norm());
            (line_of_sight, distance)
        }
    };

    let apparent = aberration(&line_of_sight, &observer.barycentric.velocity);

    let true_of_date = observer.orientation.celestial_to_true * apparent;
    let (ra, dec, _) = cartesian_to_radec(true_of_date);

    let terrestrial = observer.orientation.true_to_terrestrial() * true_of_date;
    let enu = observer.location.enu_basis() * terrestrial;

    let altitude = enu.z.clamp(-1.0, 1.0).asin().to_degrees();
    let mut azimuth = enu.x.atan2(enu.y).to_degrees().rem_euclid(360.0);
    if azimuth >= 360.0 {
        azimuth = 0.0;
    }

    Ok(ApparentCoordinates {
        altitude,
        azimuth,
        distance,
        right_ascension: ra.to_degrees(),
        declination: dec.to_degrees(),
    })
}
