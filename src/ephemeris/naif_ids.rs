//! NAIF integer identifiers of the bodies carried by JPL DE kernels.
use std::{fmt, str::FromStr};

use crate::skywatch_errors::SkywatchError;

/// A solar-system body addressable in an SPK kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    SolarSystemBarycenter,
    MercuryBarycenter,
    VenusBarycenter,
    EarthMoonBarycenter,
    MarsBarycenter,
    JupiterBarycenter,
    SaturnBarycenter,
    UranusBarycenter,
    NeptuneBarycenter,
    PlutoBarycenter,
    Sun,
    Mercury,
    Venus,
    Moon,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

const ALL_BODIES: [Body; 21] = [
    Body::SolarSystemBarycenter,
    Body::MercuryBarycenter,
    Body::VenusBarycenter,
    Body::EarthMoonBarycenter,
    Body::MarsBarycenter,
    Body::JupiterBarycenter,
    Body::SaturnBarycenter,
    Body::UranusBarycenter,
    Body::NeptuneBarycenter,
    Body::PlutoBarycenter,
    Body::Sun,
    Body::Mercury,
    Body::Venus,
    Body::Moon,
    Body::Earth,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
];

impl Body {
    pub fn naif_id(&self) -> i32 {
        match self {
            Body::SolarSystemBarycenter => 0,
            Body::MercuryBarycenter => 1,
            Body::VenusBarycenter => 2,
            Body::EarthMoonBarycenter => 3,
            Body::MarsBarycenter => 4,
            Body::JupiterBarycenter => 5,
            Body::SaturnBarycenter => 6,
            Body::UranusBarycenter => 7,
            Body::NeptuneBarycenter => 8,
            Body::PlutoBarycenter => 9,
            Body::Sun => 10,
            Body::Mercury => 199,
            Body::Venus => 299,
            Body::Moon => 301,
            Body::Earth => 399,
            Body::Mars => 499,
            Body::Jupiter => 599,
            Body::Saturn => 699,
            Body::Uranus => 799,
            Body::Neptune => 899,
            Body::Pluto => 999,
        }
    }

    pub fn from_naif_id(id: i32) -> Result<Body, SkywatchError> {
        ALL_BODIES
            .iter()
            .copied()
            .find(|body| body.naif_id() == id)
            .ok_or(SkywatchError::UnknownBody(id))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Body::SolarSystemBarycenter => "solar system barycenter",
            Body::MercuryBarycenter => "mercury barycenter",
            Body::VenusBarycenter => "venus barycenter",
            Body::EarthMoonBarycenter => "earth barycenter",
            Body::MarsBarycenter => "mars barycenter",
            Body::JupiterBarycenter => "jupiter barycenter",
            Body::SaturnBarycenter => "saturn barycenter",
            Body::UranusBarycenter => "uranus barycenter",
            Body::NeptuneBarycenter => "neptune barycenter",
            Body::PlutoBarycenter => "pluto barycenter",
            Body::Sun => "sun",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Moon => "moon",
            Body::Earth => "earth",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
        }
    }
}

/// System barycenter standing in for a planet center (`x99 → x`) when a kernel only carries
/// barycenters for that system. The Earth is excluded: the Moon moves the Earth-Moon barycenter
/// by thousands of kilometers.
pub(crate) fn system_barycenter(naif_id: i32) -> Option<i32> {
    (naif_id % 100 == 99 && (199..=999).contains(&naif_id) && naif_id != 399)
        .then_some(naif_id / 100)
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Body {
    type Err = SkywatchError;

    /// Parse a body from its name (case insensitive, e.g. `"Mars"`, `"earth barycenter"`) or its
    /// NAIF id (e.g. `"499"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        if let Ok(id) = key.parse::<i32>() {
            return Body::from_naif_id(id);
        }
        let key = match key.as_str() {
            "ssb" => "solar system barycenter",
            "emb" | "earth-moon barycenter" => "earth barycenter",
            other => other,
        };
        ALL_BODIES
            .iter()
            .copied()
            .find(|body| body.name() == key)
            .ok_or_else(|| SkywatchError::BodyUnavailable {
                target: s.to_string(),
                reason: "unrecognised body name".to_string(),
            })
    }
}
