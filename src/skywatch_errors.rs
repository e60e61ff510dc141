use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkywatchError {
    #[error("Invalid time input: {0}")]
    InvalidTimeInput(String),

    #[error("Unable to read the system clock: {0}")]
    SystemClock(String),

    #[error("Epoch {epoch} is outside the ephemeris coverage for NAIF body {body}")]
    OutOfRangeTime { body: i32, epoch: String },

    #[error("Unknown body (NAIF id {0}): no segment chain to the solar system barycenter")]
    UnknownBody(i32),

    #[error("Position of {target} is unavailable: {reason}")]
    BodyUnavailable { target: String, reason: String },

    #[error("Unable to load ephemeris kernel: {0}")]
    EphemerisLoad(String),

    #[error("Unable to load star catalog: {0}")]
    CatalogLoad(String),

    #[error("Star HIP {0} not found in catalog")]
    StarNotFound(u32),

    #[error("No star catalog loaded")]
    NoStarCatalog,

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV reading error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    ConfigParse(String),

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Invalid geodetic location: {0}")]
    InvalidLocation(String),

    #[error("Invalid sampling step for the event finder: {0} days")]
    InvalidStep(f64),
}

impl From<serde_json::Error> for SkywatchError {
    fn from(err: serde_json::Error) -> Self {
        SkywatchError::ConfigParse(err.to_string())
    }
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for SkywatchError {
    fn from(err: nom::Err<E>) -> Self {
        SkywatchError::NomParsingError(format!("{err:?}"))
    }
}

impl PartialEq for SkywatchError {
    fn eq(&self, other: &Self) -> bool {
        use SkywatchError::*;
        match (self, other) {
            (InvalidTimeInput(a), InvalidTimeInput(b)) => a == b,
            (SystemClock(a), SystemClock(b)) => a == b,
            (
                OutOfRangeTime {
                    body: a,
                    epoch: ea,
                },
                OutOfRangeTime {
                    body: b,
                    epoch: eb,
                },
            ) => a == b && ea == eb,
            (UnknownBody(a), UnknownBody(b)) => a == b,
            (
                BodyUnavailable {
                    target: a,
                    reason: ra,
                },
                BodyUnavailable {
                    target: b,
                    reason: rb,
                },
            ) => a == b && ra == rb,
            (EphemerisLoad(a), EphemerisLoad(b)) => a == b,
            (CatalogLoad(a), CatalogLoad(b)) => a == b,
            (StarNotFound(a), StarNotFound(b)) => a == b,
            (ConfigParse(a), ConfigParse(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (InvalidLocation(a), InvalidLocation(b)) => a == b,
            (InvalidStep(a), InvalidStep(b)) => a == b,

            // not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (NoStarCatalog, NoStarCatalog) => true,

            _ => false,
        }
    }
}
