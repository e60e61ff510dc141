//! # Star catalog
//!
//! Fixed-star targets, read from the Hipparcos main catalog (`hip_main.dat`).
//!
//! The file is pipe-delimited without header. Only a few columns are used
//! (0-based indices):
//!
//! | index | content                          |
//! |-------|----------------------------------|
//! | 1     | HIP number                       |
//! | 5     | V magnitude                      |
//! | 8, 9  | RA, Dec (degrees, ICRS, J1991.25)|
//! | 11    | parallax (mas)                   |
//! | 12    | μα·cos δ (mas/yr)                |
//! | 13    | μδ (mas/yr)                      |
//!
//! Rows without an RA (a few entries have no astrometric solution) are skipped.
//!
//! A [`Star`] is propagated linearly from its catalog epoch by its space motion; no light-time
//! iteration is applied to stars.
use std::{collections::HashMap, io::Read};

use camino::Utf8Path;
use nalgebra::Vector3;
use tracing::{debug, info};

use crate::{
    constants::{
        Degree, Kilometer, AU, DAYS_PER_JULIAN_YEAR, HIPPARCOS_EPOCH_JD, JD, RADMAS,
        SECONDS_PER_DAY,
    },
    skywatch_errors::SkywatchError,
    time::TimePoint,
};

/// HIP number of Polaris (α UMi).
pub const POLARIS_HIP: u32 = 11767;

/// Parallax substituted for stars without a positive parallax, so they sit very far away.
const MIN_PARALLAX_MAS: f64 = 1e-6;

/// A catalogued star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub hip: u32,
    /// Right ascension at the catalog epoch, degrees (ICRS)
    pub ra_degrees: Degree,
    /// Declination at the catalog epoch, degrees (ICRS)
    pub dec_degrees: Degree,
    /// Proper motion in RA, already multiplied by cos δ, mas/yr
    pub ra_mas_per_year: f64,
    /// Proper motion in declination, mas/yr
    pub dec_mas_per_year: f64,
    pub parallax_mas: f64,
    pub radial_km_per_s: f64,
    pub magnitude: Option<f64>,
    /// Catalog epoch, Julian date (TT)
    pub epoch_jd: JD,
}

impl Star {
    /// A star at rest at `ra_degrees`/`dec_degrees`, infinitely far away, at the Hipparcos epoch.
    pub fn fixed(hip: u32, ra_degrees: Degree, dec_degrees: Degree) -> Self {
        Star {
            hip,
            ra_degrees,
            dec_degrees,
            ra_mas_per_year: 0.0,
            dec_mas_per_year: 0.0,
            parallax_mas: 0.0,
            radial_km_per_s: 0.0,
            magnitude: None,
            epoch_jd: HIPPARCOS_EPOCH_JD,
        }
    }

    /// Barycentric distance in km, `None` when the star has no measured parallax.
    pub fn distance(&self) -> Option<Kilometer> {
        (self.parallax_mas > 0.0).then(|| AU / (self.parallax_mas * RADMAS).sin())
    }

    /// Barycentric position at the catalog epoch (km) and space velocity (km/day).
    fn catalog_state(&self) -> (Vector3<f64>, Vector3<f64>) {
        let parallax = self.parallax_mas.max(MIN_PARALLAX_MAS);
        let distance = AU / (parallax * RADMAS).sin();

        let (sin_ra, cos_ra) = self.ra_degrees.to_radians().sin_cos();
        let (sin_dec, cos_dec) = self.dec_degrees.to_radians().sin_cos();

        let toward = Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec);
        let east = Vector3::new(-sin_ra, cos_ra, 0.0);
        let north = Vector3::new(-sin_dec * cos_ra, -sin_dec * sin_ra, cos_dec);

        // mas/yr → rad/day
        let pm_ra = self.ra_mas_per_year * RADMAS / DAYS_PER_JULIAN_YEAR;
        let pm_dec = self.dec_mas_per_year * RADMAS / DAYS_PER_JULIAN_YEAR;

        let velocity = distance * (pm_ra * east + pm_dec * north)
            + self.radial_km_per_s * SECONDS_PER_DAY * toward;

        (distance * toward, velocity)
    }

    /// Barycentric position (km, ICRF) at `t`, moved linearly from the catalog epoch.
    pub fn barycentric_position(&self, t: &TimePoint) -> Vector3<f64> {
        let (position, velocity) = self.catalog_state();
        position + velocity * (t.tt_jd() - self.epoch_jd)
    }
}

/// The loaded Hipparcos catalog, indexed by HIP number.
#[derive(Debug, Clone, Default)]
pub struct StarCatalog {
    stars: HashMap<u32, Star>,
}

fn parse_field(field: &str, column: usize, line: u64) -> Result<Option<f64>, SkywatchError> {
    if field.is_empty() {
        return Ok(None);
    }
    field.parse::<f64>().map(Some).map_err(|e| {
        SkywatchError::CatalogLoad(format!(
            "line {line}, column {column}: cannot read {field:?} as a number ({e})"
        ))
    })
}

impl StarCatalog {
    /// Read `hip_main.dat` from `path`.
    ///
    /// Return
    /// ----------
    /// * The catalog, or a [`SkywatchError::IoError`] / [`SkywatchError::CatalogLoad`] error.
    pub fn load(path: &Utf8Path) -> Result<Self, SkywatchError> {
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!(path = %path, stars = catalog.len(), "loaded star catalog");
        Ok(catalog)
    }

    /// Parse Hipparcos rows from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SkywatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut stars = HashMap::new();
        let mut skipped = 0usize;

        for row in csv_reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            let number = |column: usize| parse_field(row.get(column).unwrap_or(""), column, line);

            let hip = row
                .get(1)
                .and_then(|field| field.parse::<u32>().ok())
                .ok_or_else(|| {
                    SkywatchError::CatalogLoad(format!("line {line}: missing HIP number"))
                })?;

            let (Some(ra_degrees), Some(dec_degrees)) = (number(8)?, number(9)?) else {
                skipped += 1;
                continue;
            };

            stars.insert(
                hip,
                Star {
                    hip,
                    ra_degrees,
                    dec_degrees,
                    ra_mas_per_year: number(12)?.unwrap_or(0.0),
                    dec_mas_per_year: number(13)?.unwrap_or(0.0),
                    parallax_mas: number(11)?.unwrap_or(0.0),
                    radial_km_per_s: 0.0,
                    magnitude: number(5)?,
                    epoch_jd: HIPPARCOS_EPOCH_JD,
                },
            );
        }

        if skipped > 0 {
            debug!(skipped, "catalog rows without astrometry");
        }

        Ok(StarCatalog { stars })
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Look up a star by HIP number.
    pub fn get(&self, hip: u32) -> Result<Star, SkywatchError> {
        self.stars
            .get(&hip)
            .copied()
            .ok_or(SkywatchError::StarNotFound(hip))
    }

    pub fn polaris(&self) -> Result<Star, SkywatchError> {
        self.get(POLARIS_HIP)
    }
}

#[cfg(test)]
mod stars_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    use crate::{constants::JD2000, ref_system::cartesian_to_radec};

    const ROWS: &str = "\
H|       11767| |02 31 47.08|+89 15 50.9| 1.97| |H|037.94614689|+89.26413805| |   7.56|   44.22|  -11.74|
H|       32349| |06 45 09.25|-16 42 47.3|-1.44| |H|101.28854105|-16.71314306| | 379.21| -546.01|-1223.08|
H|         143| |00 01 49.47|+00 39 27.0| 9.82| |G|            |            | |       |        |        |
";

    #[test]
    fn test_read_catalog() {
        let catalog = StarCatalog::from_reader(ROWS.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);

        let sirius = catalog.get(32349).unwrap();
        assert_eq!(sirius.ra_degrees, 101.28854105);
        assert_eq!(sirius.dec_degrees, -16.71314306);
        assert_eq!(sirius.parallax_mas, 379.21);
        assert_eq!(sirius.ra_mas_per_year, -546.01);
        assert_eq!(sirius.magnitude, Some(-1.44));

        assert_eq!(catalog.get(143), Err(SkywatchError::StarNotFound(143)));
        assert_eq!(catalog.polaris().unwrap().hip, POLARIS_HIP);
    }

    #[test]
    fn test_bad_number() {
        let rows = "H|1| | | | 1.0| | |abc|+10.0| |1.0|0|0|\n";
        assert!(matches!(
            StarCatalog::from_reader(rows.as_bytes()),
            Err(SkywatchError::CatalogLoad(_))
        ));
    }

    #[test]
    fn test_distance() {
        let catalog = StarCatalog::from_reader(ROWS.as_bytes()).unwrap();
        // Sirius: 2.64 pc
        let parsec = AU / RADMAS.sin() / 1000.0;
        let distance = catalog.get(32349).unwrap().distance().unwrap();
        assert_abs_diff_eq!(distance / parsec, 1000.0 / 379.21, epsilon = 1e-9);
        assert_eq!(Star::fixed(1, 0.0, 0.0).distance(), None);
    }

    #[test]
    fn test_proper_motion() {
        let catalog = StarCatalog::from_reader(ROWS.as_bytes()).unwrap();
        let sirius = catalog.get(32349).unwrap();

        let at_epoch = TimePoint::from_tt_jd(sirius.epoch_jd);
        let (ra0, dec0, _) = cartesian_to_radec(sirius.barycentric_position(&at_epoch));
        assert_abs_diff_eq!(ra0.to_degrees(), sirius.ra_degrees, epsilon = 1e-9);
        assert_abs_diff_eq!(dec0.to_degrees(), sirius.dec_degrees, epsilon = 1e-9);

        // 8.75 years to J2000: Δδ ≈ -1223.08 mas/yr × 8.75 yr
        let j2000 = TimePoint::from_tt_jd(JD2000);
        let (_, dec, _) = cartesian_to_radec(sirius.barycentric_position(&j2000));
        let delta_dec_mas = (dec.to_degrees() - sirius.dec_degrees) * 3.6e6;
        assert_abs_diff_eq!(delta_dec_mas, -1223.08 * 8.75, epsilon = 1.0);
    }
}
