//! Ephemeris record decoding and Chebyshev interpolation.
//!
//! An SPK type 2 record holds, in little-endian `f64`:
//! 1. `mid` (TDB seconds past J2000),
//! 2. `radius`, the half length of the record span (seconds),
//! 3. `ncoeff` Chebyshev coefficients for X (km), then Y, then Z.
//!
//! Type 3 records append `ncoeff` coefficients for each velocity component; those are skipped
//! and the velocity is taken from the derivative of the position series instead.
//!
//! The normalized time is `τ = (et - mid) / radius`, clamped to `[-1, 1]`.
//! Position uses `T_n(τ)`; velocity uses `T'_n(τ) / radius` (km/s).
use nalgebra::Vector3;
use nom::{multi::count, number::complete::le_f64, IResult, Parser};

#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    pub mid: f64,
    pub radius: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl EphemerisRecord {
    /// Decode one record.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: the `rsize` words of the record.
    /// * `ncoeff`: number of Chebyshev coefficients per component.
    pub fn parse(input: &[u8], ncoeff: usize) -> IResult<&[u8], Self> {
        let (input, mid) = le_f64(input)?;
        let (input, radius) = le_f64(input)?;
        let (input, x) = count(le_f64, ncoeff).parse(input)?;
        let (input, y) = count(le_f64, ncoeff).parse(input)?;
        let (input, z) = count(le_f64, ncoeff).parse(input)?;
        Ok((
            input,
            EphemerisRecord {
                mid,
                radius,
                x,
                y,
                z,
            },
        ))
    }

    /// Evaluate position (km) and velocity (km/s) at `ephem_time` (TDB seconds past J2000).
    pub fn interpolate(&self, ephem_time: f64) -> (Vector3<f64>, Vector3<f64>) {
        let tau = ((ephem_time - self.mid) / self.radius).clamp(-1.0, 1.0);
        let n = self.x.len();

        // T_0 = 1, T_1 = τ, T_n = 2τ T_{n-1} - T_{n-2}
        // T'_0 = 0, T'_1 = 1, T'_n = 2 T_{n-1} + 2τ T'_{n-1} - T'_{n-2}
        let mut poly = vec![0.0; n];
        let mut deriv = vec![0.0; n];
        if n > 0 {
            poly[0] = 1.0;
        }
        if n > 1 {
            poly[1] = tau;
            deriv[1] = 1.0;
        }
        for k in 2..n {
            poly[k] = 2.0 * tau * poly[k - 1] - poly[k - 2];
            deriv[k] = 2.0 * poly[k - 1] + 2.0 * tau * deriv[k - 1] - deriv[k - 2];
        }

        let series = |coeffs: &[f64], basis: &[f64]| -> f64 {
            coeffs.iter().zip(basis).map(|(c, b)| c * b).sum()
        };

        let position = Vector3::new(
            series(&self.x, &poly),
            series(&self.y, &poly),
            series(&self.z, &poly),
        );
        let velocity = Vector3::new(
            series(&self.x, &deriv),
            series(&self.y, &deriv),
            series(&self.z, &deriv),
        ) / self.radius;

        (position, velocity)
    }
}
