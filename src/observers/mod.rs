//! # Observer & site geometry
//!
//! This module turns a geodetic site on the WGS84 ellipsoid into a **barycentric state vector**
//! usable by the apparent position pipeline. It provides:
//!
//! - [`GeodeticLocation`](crate::observers::GeodeticLocation): a validated, NaN-free site
//!   (latitude, longitude, elevation) with its **geocentric parallax coordinates**
//!   (ρ·cosφ′, ρ·sinφ′), its body-fixed position and its local East-North-Up basis.
//! - [`observer_position`](crate::observers::observer_position): the observer's barycentric
//!   position and velocity at a given instant ([`ObserverState`](crate::observers::ObserverState)).
//! - [`geocentric_offset`](crate::observers::geocentric_offset): the geocenter → site vector
//!   alone, in ICRF.
//!
//! ## Frames & conventions
//!
//! ```text
//! Body-fixed (terrestrial) --R3(-GAST)ᵀ--> true of date --Nᵀ--> mean of date --Pᵀ--> ICRF
//! ```
//!
//! The rotation is [`EarthOrientation::celestial_to_terrestrial`](crate::ref_system::EarthOrientation::celestial_to_terrestrial)
//! (IAU 1976 precession, IAU 1980 nutation, apparent sidereal time), used transposed.
//!
//! ## Units
//!
//! - Latitude / longitude: **degrees** (east positive).
//! - Elevation: **meters** above the ellipsoid.
//! - Parallax coordinates: **Earth equatorial radii**.
//! - Positions: **km**, velocities: **km/s**.
//!
//! ## See also
//! ------------
//! * [`geodetic_to_parallax`](crate::observers::geodetic_to_parallax) – Geodetic latitude/elevation → (ρ·cosφ′, ρ·sinφ′).
//! * [`EarthOrientation`](crate::ref_system::EarthOrientation) – Earth orientation at an instant.
//! * [`apparent_alt_az`](crate::apparent::apparent_alt_az) – Main consumer of [`ObserverState`].
use nalgebra::{Matrix3, Vector3};
use ordered_float::NotNan;

use crate::{
    constants::{Degree, Meter, Radian, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, EARTH_ROTATION_RATE},
    ephemeris::{Body, BodyPosition, Ephemeris},
    ref_system::EarthOrientation,
    skywatch_errors::SkywatchError,
    time::TimePoint,
};

/// A fixed observing site on the WGS84 ellipsoid.
///
/// Fields are stored as `NotNan<f64>` so a location can never carry a NaN once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeodeticLocation {
    latitude: NotNan<f64>,
    longitude: NotNan<f64>,
    elevation: NotNan<f64>,
}

fn checked(value: f64, what: &str) -> Result<NotNan<f64>, SkywatchError> {
    if !value.is_finite() {
        return Err(SkywatchError::InvalidLocation(format!(
            "{what} must be finite, got {value}"
        )));
    }
    NotNan::new(value).map_err(|e| SkywatchError::InvalidLocation(format!("{what}: {e}")))
}

impl GeodeticLocation {
    /// Build a validated site.
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: geodetic latitude in degrees, within `[-90, 90]`.
    /// * `longitude`: longitude in degrees, east positive, within `[-360, 360]`.
    /// * `elevation`: height above the ellipsoid in meters.
    ///
    /// Return
    /// ----------
    /// * The location, or [`SkywatchError::InvalidLocation`] for NaN, infinite or out-of-range input.
    pub fn new(
        latitude: Degree,
        longitude: Degree,
        elevation: Meter,
    ) -> Result<Self, SkywatchError> {
        let latitude = checked(latitude, "latitude")?;
        let longitude = checked(longitude, "longitude")?;
        let elevation = checked(elevation, "elevation")?;

        if latitude.abs() > 90.0 {
            return Err(SkywatchError::InvalidLocation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if longitude.abs() > 360.0 {
            return Err(SkywatchError::InvalidLocation(format!(
                "longitude {longitude} is outside [-360, 360]"
            )));
        }

        Ok(GeodeticLocation {
            latitude,
            longitude,
            elevation,
        })
    }

    pub fn latitude(&self) -> Degree {
        self.latitude.into_inner()
    }

    pub fn longitude(&self) -> Degree {
        self.longitude.into_inner()
    }

    pub fn elevation(&self) -> Meter {
        self.elevation.into_inner()
    }

    /// Nautical time zone of the site, `round(longitude / 15)` hours (ties to even).
    pub fn zone_offset_hours(&self) -> f64 {
        (self.longitude() / 15.0).round_ties_even()
    }

    /// Geocentric parallax coordinates (ρ·cosφ′, ρ·sinφ′) in Earth equatorial radii.
    pub fn parallax_coordinates(&self) -> (f64, f64) {
        geodetic_to_parallax(self.latitude(), self.elevation())
    }

    /// Position of the site in the terrestrial (body-fixed) frame, in km.
    ///
    /// The X axis points to the Greenwich meridian, Z to the north pole.
    pub fn body_fixed_coord(&self) -> Vector3<f64> {
        let (rho_cos_phi, rho_sin_phi) = self.parallax_coordinates();
        let lon_radians = self.longitude().to_radians();
        let radius_km = EARTH_MAJOR_AXIS / 1000.0;

        Vector3::new(
            radius_km * rho_cos_phi * lon_radians.cos(),
            radius_km * rho_cos_phi * lon_radians.sin(),
            radius_km * rho_sin_phi,
        )
    }

    /// Rotation from the terrestrial frame to the local East-North-Up frame.
    ///
    /// The rows of the returned matrix are the East, North and Up unit vectors, expressed in the
    /// terrestrial frame. "Up" is the ellipsoid normal (geodetic latitude).
    pub fn enu_basis(&self) -> Matrix3<f64> {
        let (sin_lat, cos_lat) = self.latitude().to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude().to_radians().sin_cos();

        Matrix3::new(
            -sin_lon,
            cos_lon,
            0.0,
            -sin_lat * cos_lon,
            -sin_lat * sin_lon,
            cos_lat,
            cos_lat * cos_lon,
            cos_lat * sin_lon,
            sin_lat,
        )
    }
}

/// Compute normalized geocentric parallax coordinates from geodetic latitude and height.
///
/// ```text
/// u = atan( (sin φ * (b/a)) / cos φ )
/// ρ_sinφ = (b/a) * sin u + (h/a) * sin φ
/// ρ_cosφ = cos u + (h/a) * cos φ
/// ```
///
/// where `a` and `b` are the Earth's semi-major and semi-minor axes,
/// and `h` is the height above the ellipsoid.
///
/// Arguments
/// -----------------
/// * `lat`: geodetic latitude in **radians**.
/// * `height`: height above the ellipsoid in **meters**.
///
/// Return
/// ----------
/// * `(rho_cos_phi, rho_sin_phi)` in units of the equatorial radius.
pub fn lat_alt_to_parallax(lat: Radian, height: Meter) -> (f64, f64) {
    // Ratio of the Earth's minor to major axis
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // Parametric latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}

/// Degree version of [`lat_alt_to_parallax`].
pub fn geodetic_to_parallax(lat: Degree, height: Meter) -> (f64, f64) {
    lat_alt_to_parallax(lat.to_radians(), height)
}

/// Barycentric state of an observer at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverState {
    /// Barycentric position (km) and velocity (km/s) of the site, ICRF
    pub barycentric: BodyPosition,
    /// Site the state was computed for
    pub location: GeodeticLocation,
    /// Earth orientation used to place the site
    pub orientation: EarthOrientation,
}

impl ObserverState {
    pub fn epoch(&self) -> &TimePoint {
        &self.barycentric.epoch
    }

    /// ICRF → terrestrial rotation at the state epoch.
    pub fn celestial_to_terrestrial(&self) -> Matrix3<f64> {
        self.orientation.celestial_to_terrestrial()
    }

    /// ICRF → local East-North-Up rotation at the state epoch.
    pub fn celestial_to_horizon(&self) -> Matrix3<f64> {
        self.location.enu_basis() * self.celestial_to_terrestrial()
    }
}

/// Site position and Earth-rotation velocity relative to the geocenter, ICRF (km, km/s).
fn geocentric_state(
    location: &GeodeticLocation,
    orientation: &EarthOrientation,
) -> (Vector3<f64>, Vector3<f64>) {
    let terrestrial_to_celestial = orientation.celestial_to_terrestrial().transpose();

    let body_fixed = location.body_fixed_coord();
    let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE);
    let body_fixed_velocity = omega.cross(&body_fixed);

    (
        terrestrial_to_celestial * body_fixed,
        terrestrial_to_celestial * body_fixed_velocity,
    )
}

/// Geocenter → site vector in ICRF (km) at `t`.
pub fn geocentric_offset(location: &GeodeticLocation, t: &TimePoint) -> Vector3<f64> {
    geocentric_state(location, &EarthOrientation::at(t)).0
}

/// Barycentric position and velocity of an observer at `t`.
///
/// The Earth's barycentric state comes from `ephemeris`. The site offset is rotated from the
/// terrestrial frame to ICRF with the Earth orientation at `t`, and the velocity includes the
/// Earth rotation term `ω × r`.
///
/// Arguments
/// -----------------
/// * `ephemeris`: source of the Earth (NAIF 399) state.
/// * `location`: observing site.
/// * `t`: instant of the observation.
///
/// Return
/// ----------
/// * The [`ObserverState`], or the ephemeris error for the Earth unchanged.
///
/// See also
/// ------------
/// * [`geocentric_offset`] – Site offset alone.
pub fn observer_position<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    location: &GeodeticLocation,
    t: &TimePoint,
) -> Result<ObserverState, SkywatchError> {
    let earth = ephemeris.position(Body::Earth, t)?;
    let orientation = EarthOrientation::at(t);
    let (offset, rotation_velocity) = geocentric_state(location, &orientation);

    Ok(ObserverState {
        barycentric: BodyPosition {
            position: earth.position + offset,
            velocity: earth.velocity + rotation_velocity,
            epoch: *t,
        },
        location: *location,
        orientation,
    })
}

#[cfg(test)]
mod observer_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::constants::SIDEREAL_RATE;

    struct FixedEarth;

    impl Ephemeris for FixedEarth {
        fn position(&self, body: Body, t: &TimePoint) -> Result<BodyPosition, SkywatchError> {
            match body {
                Body::Earth => Ok(BodyPosition {
                    position: Vector3::new(-2.6e7, 1.3e8, 5.8e7),
                    velocity: Vector3::new(-29.7, -5.0, -2.2),
                    epoch: *t,
                }),
                other => Err(SkywatchError::UnknownBody(other.naif_id())),
            }
        }

        fn coverage(&self, _body: Body) -> Option<(TimePoint, TimePoint)> {
            None
        }
    }

    #[test]
    fn test_location_constructor() {
        let site = GeodeticLocation::new(38.478752, -107.877739, 0.0).unwrap();
        assert_eq!(site.latitude(), 38.478752);
        assert_eq!(site.longitude(), -107.877739);
        assert_eq!(site.elevation(), 0.0);
        assert_eq!(site.zone_offset_hours(), -7.0);

        assert!(matches!(
            GeodeticLocation::new(f64::NAN, 0.0, 0.0),
            Err(SkywatchError::InvalidLocation(_))
        ));
        assert!(matches!(
            GeodeticLocation::new(90.5, 0.0, 0.0),
            Err(SkywatchError::InvalidLocation(_))
        ));
        assert!(matches!(
            GeodeticLocation::new(0.0, 0.0, f64::INFINITY),
            Err(SkywatchError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_parallax_coordinates() {
        let (rho_cos_phi, rho_sin_phi) = geodetic_to_parallax(0.0, 0.0);
        assert_eq!(rho_cos_phi, 1.0);
        assert_eq!(rho_sin_phi, 0.0);

        // Rubin Observatory, Cerro Pachón
        let rubin = GeodeticLocation::new(-30.2446, 289.25058, 2647.).unwrap();
        let (rho_cos_phi, rho_sin_phi) = rubin.parallax_coordinates();
        assert_abs_diff_eq!(rho_cos_phi, 0.8649760504617418, epsilon = 1e-8);
        assert_abs_diff_eq!(rho_sin_phi, -0.5009551027512434, epsilon = 1e-8);
    }

    #[test]
    fn test_body_fixed_coord() {
        let site = GeodeticLocation::new(0.0, 90.0, 0.0).unwrap();
        assert_abs_diff_eq!(
            site.body_fixed_coord(),
            Vector3::new(0.0, 6378.137, 0.0),
            epsilon = 1e-9
        );

        let pole = GeodeticLocation::new(90.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(pole.body_fixed_coord().z, 6356.752314245, epsilon = 1e-6);
    }

    #[test]
    fn test_enu_basis() {
        let site = GeodeticLocation::new(38.478752, -107.877739, 0.0).unwrap();
        let enu = site.enu_basis();
        assert_abs_diff_eq!(enu * enu.transpose(), Matrix3::identity(), epsilon = 1e-14);

        // Up is tilted from the geocentric direction by the vertical deviation (< 0.2°)
        let up = enu.row(2).transpose();
        let geocentric = site.body_fixed_coord().normalize();
        assert!(up.dot(&geocentric) > 0.25f64.to_radians().cos());

        let pole = GeodeticLocation::new(90.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(
            pole.enu_basis().row(2).transpose(),
            Vector3::z(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_geocentric_offset_follows_earth_rotation() {
        let site = GeodeticLocation::new(38.478752, -107.877739, 2000.0).unwrap();
        let t = TimePoint::from_utc_str("2024-06-20T19:00:00Z").unwrap();
        let half_turn = TimePoint::from_offset(t, 0.5 / SIDEREAL_RATE);

        let o1 = geocentric_offset(&site, &t);
        let o2 = geocentric_offset(&site, &half_turn);

        assert_abs_diff_eq!(o1.norm(), site.body_fixed_coord().norm(), epsilon = 1e-9);
        // Half a sidereal day later the equatorial components are reversed
        assert_abs_diff_eq!(o1.x + o2.x, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(o1.y + o2.y, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(o1.z, o2.z, epsilon = 0.05);
    }

    #[test]
    fn test_observer_position() {
        let site = GeodeticLocation::new(0.0, 0.0, 0.0).unwrap();
        let t = TimePoint::from_utc_str("2024-03-20T03:06:00Z").unwrap();
        let state = observer_position(&FixedEarth, &site, &t).unwrap();
        let earth = FixedEarth.position(Body::Earth, &t).unwrap();

        assert_eq!(state.epoch(), &t);
        assert_abs_diff_eq!(
            state.barycentric.position - earth.position,
            geocentric_offset(&site, &t),
            epsilon = 1e-6
        );

        // Equatorial rotation speed: ω·a ≈ 0.4651 km/s, perpendicular to the offset
        let rotation_velocity = state.barycentric.velocity - earth.velocity;
        assert_abs_diff_eq!(
            rotation_velocity.norm(),
            EARTH_ROTATION_RATE * 6378.137,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            rotation_velocity.dot(&(state.barycentric.position - earth.position)),
            0.0,
            epsilon = 1e-6
        );

        // The local vertical maps back onto the site direction
        let up_icrf = state.celestial_to_horizon().row(2).transpose();
        assert_abs_diff_eq!(
            up_icrf,
            geocentric_offset(&site, &t).normalize(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_observer_position_propagates_ephemeris_error() {
        struct Empty;
        impl Ephemeris for Empty {
            fn position(&self, body: Body, _t: &TimePoint) -> Result<BodyPosition, SkywatchError> {
                Err(SkywatchError::UnknownBody(body.naif_id()))
            }
            fn coverage(&self, _body: Body) -> Option<(TimePoint, TimePoint)> {
                None
            }
        }

        let site = GeodeticLocation::new(0.0, 0.0, 0.0).unwrap();
        let t = TimePoint::from_tt_jd(2_451_545.0);
        assert_eq!(
            observer_position(&Empty, &site, &t),
            Err(SkywatchError::UnknownBody(399))
        );
    }
}
