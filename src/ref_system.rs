//! # Reference frames
//!
//! Rotation helpers and the chain of frames used by the apparent position pipeline:
//!
//! ```text
//! ICRF (≈ J2000 mean equator) --P--> mean of date --N--> true of date --R3(GAST)--> terrestrial
//! ```
//!
//! The frame bias between ICRF and the J2000 mean equator (≈ 0.02") and polar motion are ignored.
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    constants::{Radian, DPI, VLIGHT},
    earth_orientation::{gast, prec, rnut80},
    time::TimePoint,
};

/// Build an active rotation matrix of angle `alpha` around the axis `k` (0 → X, 1 → Y, 2 → Z).
///
/// The rotated vector is `x' = R · x`. A change of basis of angle `alpha` is `rotmt(-alpha, k)`.
///
/// # Panics
///
/// Panics if `k > 2`, as only axes 0–2 are valid.
pub fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Orientation of the Earth at a given instant.
///
/// Holds the celestial-to-true-of-date rotation (precession then nutation) and the Greenwich
/// apparent sidereal time, from which the rotation to the terrestrial frame is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthOrientation {
    /// ICRF → true equator and equinox of date (`N · P`)
    pub celestial_to_true: Matrix3<f64>,
    /// Greenwich apparent sidereal time (radians)
    pub gast: Radian,
}

impl EarthOrientation {
    /// Evaluate precession, nutation and sidereal time at `t`.
    pub fn at(t: &TimePoint) -> Self {
        let tt_mjd = t.tt_mjd();
        EarthOrientation {
            celestial_to_true: rnut80(tt_mjd) * prec(tt_mjd),
            gast: gast(t.ut1_mjd(), tt_mjd),
        }
    }

    /// True of date → terrestrial (Greenwich meridian along +X).
    pub fn true_to_terrestrial(&self) -> Matrix3<f64> {
        rotmt(-self.gast, 2)
    }

    /// ICRF → terrestrial.
    pub fn celestial_to_terrestrial(&self) -> Matrix3<f64> {
        self.true_to_terrestrial() * self.celestial_to_true
    }
}

/// Apply stellar aberration to a line of sight.
///
/// Relativistic formula for an observer moving with barycentric velocity `observer_velocity`
/// (km/s). Gravitational light deflection is not modelled.
///
/// Arguments
/// -----------------
/// * `line_of_sight`: observer → target vector (any length unit, non-zero).
/// * `observer_velocity`: barycentric velocity of the observer in km/s.
///
/// Return
/// ----------
/// * The apparent direction, as a unit vector.
pub fn aberration(line_of_sight: &Vector3<f64>, observer_velocity: &Vector3<f64>) -> Vector3<f64> {
    let p = line_of_sight.normalize();
    let v = observer_velocity / VLIGHT;
    let bm1 = (1.0 - v.norm_squared()).sqrt();
    let pdv = p.dot(&v);
    let w1 = 1.0 + pdv / (1.0 + bm1);

    ((bm1 * p + w1 * v) / (1.0 + pdv)).normalize()
}

/// Convert a 3D Cartesian position vector to right ascension and declination.
///
/// Returns
/// --------
/// * Tuple `(α, δ, ρ)`: right ascension in `[0, 2π)`, declination in `[−π/2, π/2]`, norm.
///   A zero vector yields `(0.0, 0.0, 0.0)`.
pub fn cartesian_to_radec(cartesian_position: Vector3<f64>) -> (f64, f64, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }

    let delta = (cartesian_position.z / pos_norm).clamp(-1.0, 1.0).asin();
    let alpha = cartesian_position.y.atan2(cartesian_position.x).rem_euclid(DPI);
    (alpha, delta, pos_norm)
}
