//! # Ephemeris tables
//!
//! The rest of the crate only sees the narrow [`Ephemeris`] trait: a body identifier and a
//! [`TimePoint`] in, a barycentric [`BodyPosition`] out. The production implementation reads a
//! NAIF SPK kernel ([`naif::spk_kernel::SpkKernel`]); tests plug in synthetic tables.
//!
//! ## Conventions
//!
//! * Positions are **barycentric** (relative to the solar system barycenter), in **km**.
//! * Velocities are in **km/s**.
//! * The frame is ICRF, which JPL DE kernels use as their "J2000" frame.
use nalgebra::Vector3;

use crate::{skywatch_errors::SkywatchError, time::TimePoint};

pub mod naif;
pub mod naif_ids;

pub use naif_ids::Body;

/// A barycentric state vector, valid at `epoch`. Produced fresh for each query.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPosition {
    /// Position in km (ICRF)
    pub position: Vector3<f64>,
    /// Velocity in km/s (ICRF)
    pub velocity: Vector3<f64>,
    /// Instant the state is valid for
    pub epoch: TimePoint,
}

impl BodyPosition {
    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|v| v.is_finite())
    }
}

/// A source of barycentric body positions.
///
/// Implementations are pure over immutable loaded data: two calls with the same arguments return
/// the same value.
pub trait Ephemeris {
    /// Barycentric state of `body` at `t`.
    ///
    /// Errors
    /// ------
    /// * [`SkywatchError::OutOfRangeTime`] if `t` is outside the data covering `body`.
    /// * [`SkywatchError::UnknownBody`] if `body` is not carried by the table.
    fn position(&self, body: Body, t: &TimePoint) -> Result<BodyPosition, SkywatchError>;

    /// Time span over which [`Ephemeris::position`] succeeds for `body`, if the body is known.
    ///
    /// When the data leaves gaps for `body`, the longest gap-free span is returned.
    fn coverage(&self, body: Body) -> Option<(TimePoint, TimePoint)>;
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn position(&self, body: Body, t: &TimePoint) -> Result<BodyPosition, SkywatchError> {
        (**self).position(body, t)
    }

    fn coverage(&self, body: Body) -> Option<(TimePoint, TimePoint)> {
        (**self).coverage(body)
    }
}

impl<E: Ephemeris + ?Sized> Ephemeris for Box<E> {
    fn position(&self, body: Body, t: &TimePoint) -> Result<BodyPosition, SkywatchError> {
        (**self).position(body, t)
    }

    fn coverage(&self, body: Body) -> Option<(TimePoint, TimePoint)> {
        (**self).coverage(body)
    }
}
