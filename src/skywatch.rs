//! # Skywatch handle
//!
//! [`Skywatch`] is the explicitly initialized, read-only environment of the crate: it owns the
//! ephemeris, the optional star catalog and the [`SkywatchConfig`] settings, and offers the
//! high-level queries (observer state, apparent coordinates, rise/set searches).
//!
//! The handle is `Send + Sync`; share it by reference or in an `Arc`.
//!
//! # Example
//! ```rust, no_run
//! use skywatch::{
//!     config::SkywatchConfig, ephemeris::Body, observers::GeodeticLocation, skywatch::Skywatch,
//!     time::TimePoint,
//! };
//!
//! let sky = Skywatch::new(SkywatchConfig::default())?;
//! let site = GeodeticLocation::new(38.478752, -107.877739, 0.0)?;
//! let now = TimePoint::now()?;
//!
//! let moon = sky.apparent(&site, Body::Moon, &now)?;
//! println!("Moon: alt {:.2}° az {:.2}°", moon.altitude, moon.azimuth);
//!
//! let end = TimePoint::from_offset(now, 18.0 / 24.0);
//! for event in sky.find_discrete(&sky.sunrise_sunset(site), &now, &end)? {
//!     println!("{} {}", event.rise_set(), event.time.to_utc_string(0));
//! }
//! # Ok::<(), skywatch::skywatch_errors::SkywatchError>(())
//! ```
use std::fmt;

use tracing::info;

use crate::{
    almanac::{
        find_discrete_with_tolerance,
        rise_set::{self, AboveHorizon},
        DiscreteEvent, StepFunction,
    },
    apparent::{apparent_alt_az_with, ApparentCoordinates, Target},
    config::SkywatchConfig,
    ephemeris::{naif::spk_kernel::SpkKernel, Ephemeris},
    observers::{observer_position, GeodeticLocation, ObserverState},
    skywatch_errors::SkywatchError,
    stars::{Star, StarCatalog},
    time::TimePoint,
};

/// Ephemeris shared by a [`Skywatch`] handle.
pub type SharedEphemeris = dyn Ephemeris + Send + Sync;

pub struct Skywatch {
    ephemeris: Box<SharedEphemeris>,
    star_catalog: Option<StarCatalog>,
    config: SkywatchConfig,
}

impl Skywatch {
    /// Load the ephemeris kernel and, if configured, the star catalog.
    ///
    /// Loading is all-or-nothing: any I/O or format error aborts the construction.
    ///
    /// Arguments
    /// -----------------
    /// * `config`: paths and search settings, validated before anything is read.
    ///
    /// Return
    /// ----------
    /// * The ready-to-use handle, or the first loading error.
    ///
    /// See also
    /// ------------
    /// * [`Skywatch::with_ephemeris`] – Build around an already loaded ephemeris.
    pub fn new(config: SkywatchConfig) -> Result<Self, SkywatchError> {
        config.validate()?;

        let kernel = SpkKernel::open(&config.ephemeris_path)?;
        let star_catalog = config
            .star_catalog_path
            .as_deref()
            .map(StarCatalog::load)
            .transpose()?;

        info!(
            ephemeris = %config.ephemeris_path,
            stars = star_catalog.as_ref().map(StarCatalog::len).unwrap_or(0),
            "skywatch environment ready"
        );

        Ok(Skywatch {
            ephemeris: Box::new(kernel),
            star_catalog,
            config,
        })
    }

    /// Build a handle around any ephemeris (e.g. a test fixture). No file is read, the catalog
    /// path of `config` is ignored.
    pub fn with_ephemeris(
        ephemeris: impl Ephemeris + Send + Sync + 'static,
        config: SkywatchConfig,
    ) -> Self {
        Skywatch {
            ephemeris: Box::new(ephemeris),
            star_catalog: None,
            config,
        }
    }

    pub fn with_star_catalog(mut self, star_catalog: StarCatalog) -> Self {
        self.star_catalog = Some(star_catalog);
        self
    }

    pub fn get_ephemeris(&self) -> &SharedEphemeris {
        self.ephemeris.as_ref()
    }

    pub fn get_star_catalog(&self) -> Result<&StarCatalog, SkywatchError> {
        self.star_catalog
            .as_ref()
            .ok_or(SkywatchError::NoStarCatalog)
    }

    pub fn get_config(&self) -> &SkywatchConfig {
        &self.config
    }

    /// Star `hip` from the loaded catalog.
    pub fn star(&self, hip: u32) -> Result<Star, SkywatchError> {
        self.get_star_catalog()?.get(hip)
    }

    /// Barycentric state of an observer at `location` at `t`.
    pub fn observer(
        &self,
        location: &GeodeticLocation,
        t: &TimePoint,
    ) -> Result<ObserverState, SkywatchError> {
        observer_position(self.get_ephemeris(), location, t)
    }

    /// Apparent altitude/azimuth of `target` seen from `location` at `t`.
    pub fn apparent(
        &self,
        location: &GeodeticLocation,
        target: impl Into<Target>,
        t: &TimePoint,
    ) -> Result<ApparentCoordinates, SkywatchError> {
        let observer = self.observer(location, t)?;
        apparent_alt_az_with(
            self.get_ephemeris(),
            &observer,
            &target.into(),
            t,
            &self.config.light_time,
        )
    }

    /// Sunrise/sunset predicate with the configured step and light-time settings.
    pub fn sunrise_sunset(&self, location: GeodeticLocation) -> AboveHorizon<'_, SharedEphemeris> {
        rise_set::sunrise_sunset(self.get_ephemeris(), location)
            .with_step_days(self.config.rise_set_step_days)
            .with_light_time(self.config.light_time)
    }

    /// Rising/setting predicate of `target` with the configured step and light-time settings.
    pub fn risings_and_settings(
        &self,
        target: impl Into<Target>,
        location: GeodeticLocation,
    ) -> AboveHorizon<'_, SharedEphemeris> {
        rise_set::risings_and_settings(self.get_ephemeris(), target, location)
            .with_step_days(self.config.rise_set_step_days)
            .with_light_time(self.config.light_time)
    }

    /// Transitions of `f` in `[start, end)`, bisected to the configured tolerance.
    pub fn find_discrete<S: StepFunction + ?Sized>(
        &self,
        f: &S,
        start: &TimePoint,
        end: &TimePoint,
    ) -> Result<Vec<DiscreteEvent<S::Value>>, SkywatchError> {
        find_discrete_with_tolerance(f, start, end, self.config.event_tolerance_seconds)
    }
}

impl fmt::Debug for Skywatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skywatch")
            .field("star_catalog", &self.star_catalog.as_ref().map(StarCatalog::len))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
