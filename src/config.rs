//! Configuration of a [`Skywatch`](crate::skywatch::Skywatch) handle.
//!
//! Every field has a default, so a JSON file only needs the entries it changes:
//!
//! ```json
//! {
//!   "ephemeris_path": "data/de421.bsp",
//!   "star_catalog_path": "data/hip_main.dat",
//!   "event_tolerance_seconds": 0.5
//! }
//! ```
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    almanac::{rise_set::RISE_SET_STEP_DAYS, DEFAULT_TOLERANCE_SECONDS},
    apparent::LightTimeSettings,
    skywatch_errors::SkywatchError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkywatchConfig {
    /// SPK kernel to load (default: `de421.bsp`)
    pub ephemeris_path: Utf8PathBuf,
    /// Hipparcos `hip_main.dat`, if star targets are needed
    pub star_catalog_path: Option<Utf8PathBuf>,
    /// Width of the final bisection bracket of event searches (default: 1 s)
    pub event_tolerance_seconds: f64,
    /// Sampling step of rise/set searches (default: 0.04 day)
    pub rise_set_step_days: f64,
    pub light_time: LightTimeSettings,
}

impl Default for SkywatchConfig {
    fn default() -> Self {
        SkywatchConfig {
            ephemeris_path: Utf8PathBuf::from("de421.bsp"),
            star_catalog_path: None,
            event_tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
            rise_set_step_days: RISE_SET_STEP_DAYS,
            light_time: LightTimeSettings::default(),
        }
    }
}

impl SkywatchConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SkywatchError> {
        let config: SkywatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, SkywatchError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, SkywatchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the numeric settings.
    pub fn validate(&self) -> Result<(), SkywatchError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;

        if !positive(self.event_tolerance_seconds) {
            return Err(SkywatchError::ConfigParse(format!(
                "event_tolerance_seconds must be positive, got {}",
                self.event_tolerance_seconds
            )));
        }
        if !positive(self.rise_set_step_days) {
            return Err(SkywatchError::InvalidStep(self.rise_set_step_days));
        }
        if !positive(self.light_time.tolerance_days) || self.light_time.max_iterations == 0 {
            return Err(SkywatchError::ConfigParse(format!(
                "invalid light-time settings: {:?}",
                self.light_time
            )));
        }
        Ok(())
    }
}
