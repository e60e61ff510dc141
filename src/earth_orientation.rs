//! # Earth orientation
//!
//! Classical (equinox-based) Earth orientation models:
//!
//! * mean obliquity of the ecliptic, IAU 1976 ([`obleq`]),
//! * nutation in longitude and obliquity, IAU 1980 ([`nutn80`]),
//! * precession from J2000 to the mean equator of date, IAU 1976 ([`prec`]),
//! * equation of the equinoxes and apparent sidereal time ([`equequ`], [`gast`]).
//!
//! All matrices returned here act on **column vectors**: `x_date = M · x_J2000`.
//! They are assembled from [`rotmt`], which builds active rotations.
use nalgebra::Matrix3;

use crate::{
    constants::{ArcSec, Radian, DPI, RADEG, RADSEC, T2000},
    ref_system::rotmt,
    time::gmst,
};

/// Julian centuries of TT elapsed since J2000.
fn centuries_since_j2000(tjm: f64) -> f64 {
    (tjm - T2000) / 36525.0
}

/// Compute the mean obliquity of the ecliptic at a given epoch (IAU 1976 model).
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * Mean obliquity of the ecliptic in radians.
pub fn obleq(tjm: f64) -> Radian {
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.00059 * RADSEC;
    let ob3 = 0.001813 * RADSEC;

    let t = centuries_since_j2000(tjm);

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// One periodic term of the IAU 1980 nutation series.
///
/// Multipliers of (D, M, M', F, Ω), then the Δψ sine coefficient `a + b·T` and the Δε cosine
/// coefficient `c + d·T`, in units of 0.0001".
struct NutationTerm {
    args: [f64; 5],
    psi: (f64, f64),
    eps: (f64, f64),
}

const fn term(args: [f64; 5], psi: (f64, f64), eps: (f64, f64)) -> NutationTerm {
    NutationTerm { args, psi, eps }
}

/// Leading terms of the IAU 1980 series, every term above 0.0005" in amplitude.
const NUTATION_1980: [NutationTerm; 49] = [
    term([0., 0., 0., 0., 1.], (-171996., -174.2), (92025., 8.9)),
    term([-2., 0., 0., 2., 2.], (-13187., -1.6), (5736., -3.1)),
    term([0., 0., 0., 2., 2.], (-2274., -0.2), (977., -0.5)),
    term([0., 0., 0., 0., 2.], (2062., 0.2), (-895., 0.5)),
    term([0., 1., 0., 0., 0.], (1426., -3.4), (54., -0.1)),
    term([0., 0., 1., 0., 0.], (712., 0.1), (-7., 0.)),
    term([-2., 1., 0., 2., 2.], (-517., 1.2), (224., -0.6)),
    term([0., 0., 0., 2., 1.], (-386., -0.4), (200., 0.)),
    term([0., 0., 1., 2., 2.], (-301., 0.), (129., -0.1)),
    term([-2., -1., 0., 2., 2.], (217., -0.5), (-95., 0.3)),
    term([-2., 0., 1., 0., 0.], (-158., 0.), (0., 0.)),
    term([-2., 0., 0., 2., 1.], (129., 0.1), (-70., 0.)),
    term([0., 0., -1., 2., 2.], (123., 0.), (-53., 0.)),
    term([2., 0., 0., 0., 0.], (63., 0.), (0., 0.)),
    term([0., 0., 1., 0., 1.], (63., 0.1), (-33., 0.)),
    term([2., 0., -1., 2., 2.], (-59., 0.), (26., 0.)),
    term([0., 0., -1., 0., 1.], (-58., -0.1), (32., 0.)),
    term([0., 0., 1., 2., 1.], (-51., 0.), (27., 0.)),
    term([-2., 0., 2., 0., 0.], (48., 0.), (0., 0.)),
    term([0., 0., -2., 2., 1.], (46., 0.), (-24., 0.)),
    term([2., 0., 0., 2., 2.], (-38., 0.), (16., 0.)),
    term([0., 0., 2., 2., 2.], (-31., 0.), (13., 0.)),
    term([0., 0., 2., 0., 0.], (29., 0.), (0., 0.)),
    term([-2., 0., 1., 2., 2.], (29., 0.), (-12., 0.)),
    term([0., 0., 0., 2., 0.], (26., 0.), (0., 0.)),
    term([-2., 0., 0., 2., 0.], (-22., 0.), (0., 0.)),
    term([0., 0., -1., 2., 1.], (21., 0.), (-10., 0.)),
    term([0., 2., 0., 0., 0.], (17., -0.1), (0., 0.)),
    term([2., 0., -1., 0., 1.], (16., 0.), (-8., 0.)),
    term([-2., 2., 0., 2., 2.], (-16., 0.1), (7., 0.)),
    term([0., 1., 0., 0., 1.], (-15., 0.), (9., 0.)),
    term([-2., 0., 1., 0., 1.], (-13., 0.), (7., 0.)),
    term([0., -1., 0., 0., 1.], (-12., 0.), (6., 0.)),
    term([0., 0., 2., -2., 0.], (11., 0.), (0., 0.)),
    term([2., 0., -1., 2., 1.], (-10., 0.), (5., 0.)),
    term([2., 0., 1., 2., 2.], (-8., 0.), (3., 0.)),
    term([0., 1., 0., 2., 2.], (7., 0.), (-3., 0.)),
    term([-2., 1., 1., 0., 0.], (-7., 0.), (0., 0.)),
    term([0., -1., 0., 2., 2.], (-7., 0.), (3., 0.)),
    term([2., 0., 0., 2., 1.], (-7., 0.), (3., 0.)),
    term([2., 0., 1., 0., 0.], (6., 0.), (0., 0.)),
    term([-2., 0., 2., 2., 2.], (6., 0.), (-3., 0.)),
    term([-2., 0., 1., 2., 1.], (6., 0.), (-3., 0.)),
    term([2., 0., -2., 0., 1.], (-6., 0.), (3., 0.)),
    term([2., 0., 0., 0., 1.], (-6., 0.), (3., 0.)),
    term([0., -1., 1., 0., 0.], (5., 0.), (0., 0.)),
    term([-2., -1., 0., 2., 1.], (-5., 0.), (3., 0.)),
    term([-2., 0., 0., 0., 1.], (-5., 0.), (3., 0.)),
    term([0., 0., 2., 2., 1.], (-5., 0.), (3., 0.)),
];

/// Compute the nutation angles in longitude and obliquity using the IAU 1980 model.
///
/// The series is evaluated on the five Delaunay-type arguments (mean elongation of the Moon D,
/// mean anomalies of the Sun M and Moon M', argument of latitude F, longitude of the lunar node Ω).
/// The 49 leading terms are summed; the omitted terms are below 0.0005" each.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * `(Δψ, Δε)` in arcseconds.
///
/// # See also
/// * [`rnut80`] – nutation rotation matrix built from these angles
pub fn nutn80(tjm: f64) -> (ArcSec, ArcSec) {
    let t = centuries_since_j2000(tjm);
    let t2 = t * t;
    let t3 = t2 * t;

    let d = (297.85036 + 445267.111480 * t - 0.0019142 * t2 + t3 / 189474.0) * RADEG;
    let m = (357.52772 + 35999.050340 * t - 0.0001603 * t2 - t3 / 300000.0) * RADEG;
    let mp = (134.96298 + 477198.867398 * t + 0.0086972 * t2 + t3 / 56250.0) * RADEG;
    let f = (93.27191 + 483202.017538 * t - 0.0036825 * t2 + t3 / 327270.0) * RADEG;
    let om = (125.04452 - 1934.136261 * t + 0.0020708 * t2 + t3 / 450000.0) * RADEG;
    let fundamental = [d % DPI, m % DPI, mp % DPI, f % DPI, om % DPI];

    let (dpsi, deps) = NUTATION_1980
        .iter()
        .fold((0.0, 0.0), |(dpsi, deps), term| {
            let arg: f64 = term
                .args
                .iter()
                .zip(fundamental.iter())
                .map(|(k, a)| k * a)
                .sum();
            (
                dpsi + (term.psi.0 + term.psi.1 * t) * arg.sin(),
                deps + (term.eps.0 + term.eps.1 * t) * arg.cos(),
            )
        });

    (dpsi * 1e-4, deps * 1e-4)
}

/// Nutation matrix (IAU 1980) mapping mean equator and equinox of date to true equator and
/// equinox of date.
///
/// `N = Rx(ε + Δε) · Rz(Δψ) · Rx(−ε)` with active rotations.
pub fn rnut80(tjm: f64) -> Matrix3<f64> {
    let epsm = obleq(tjm);
    let (dpsi, deps) = nutn80(tjm);
    let epst = epsm + deps * RADSEC;

    rotmt(epst, 0) * rotmt(dpsi * RADSEC, 2) * rotmt(-epsm, 0)
}

/// Equation of the equinoxes `Δψ · cos ε`, in radians.
///
/// # See also
/// * [`gast`] – adds this term to the mean sidereal time
pub fn equequ(tjm: f64) -> Radian {
    let oblm = obleq(tjm);
    let (dpsi, _deps) = nutn80(tjm);
    RADSEC * dpsi * oblm.cos()
}

/// Greenwich apparent sidereal time, in radians in `[0, 2π)`.
///
/// Arguments
/// ---------
/// * `ut1_mjd`: Modified Julian Date in UT1 (rotation angle).
/// * `tt_mjd`: Modified Julian Date in TT (nutation argument).
pub fn gast(ut1_mjd: f64, tt_mjd: f64) -> Radian {
    (gmst(ut1_mjd) + equequ(tt_mjd)).rem_euclid(DPI)
}

/// Precession matrix from the J2000 mean equator to the mean equator of date (IAU 1976).
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date (TT scale).
///
/// Returns
/// --------
/// * `P` such that `x_mean(tjm) = P · x_J2000`, i.e. `P = Rz(z) · Ry(−θ) · Rz(ζ)` with active
///   rotations and the Lieske angles
///
/// ```text
/// ζ = 2306.2181"·T + 0.30188"·T² + 0.017998"·T³
/// z = 2306.2181"·T + 1.09468"·T² + 0.018203"·T³
/// θ = 2004.3109"·T − 0.42665"·T² − 0.041833"·T³
/// ```
pub fn prec(tjm: f64) -> Matrix3<f64> {
    let t = centuries_since_j2000(tjm);

    let zeta = ((0.017998 * t + 0.30188) * t + 2306.2181) * t * RADSEC;
    let z = ((0.018203 * t + 1.09468) * t + 2306.2181) * t * RADSEC;
    let theta = ((-0.041833 * t - 0.42665) * t + 2004.3109) * t * RADSEC;

    rotmt(z, 2) * rotmt(-theta, 1) * rotmt(zeta, 2)
}
