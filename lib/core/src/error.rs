use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Feature column not found in table: {0}")]
    MissingFeature(String),

    #[error("Candidate pool too small to fit scaling: {rows} rows, need at least {min}")]
    PoolTooSmall { rows: usize, min: usize },

    #[error("No numeric features selected")]
    NoFeatures,

    #[error("Invalid query dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("No coordinates available for neighborhood: {0}")]
    NoCoordinates(String),

    #[error("Query is missing required key: {0}")]
    MissingQueryKey(&'static str),

    #[error("Query value for '{0}' is not numeric")]
    NonNumericQueryValue(String),

    #[error("Limit must be >= 1, got {0}")]
    InvalidLimit(usize),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown feature set: {0}")]
    UnknownFeatureSet(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification used to decide which failures a caller may recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing columns, pools too small to scale, dimension mismatches.
    Data,
    /// Malformed queries or arguments.
    Validation,
    /// Strategy or feature-set selector not registered.
    UnknownStrategy,
    /// Files, encodings and configuration.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingFeature(_)
            | Error::PoolTooSmall { .. }
            | Error::NoFeatures
            | Error::InvalidDimension { .. }
            | Error::NoCoordinates(_) => ErrorKind::Data,
            Error::MissingQueryKey(_)
            | Error::NonNumericQueryValue(_)
            | Error::InvalidLimit(_) => ErrorKind::Validation,
            Error::UnknownStrategy(_) | Error::UnknownFeatureSet(_) => ErrorKind::UnknownStrategy,
            Error::Storage(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::InvalidConfig(_) => ErrorKind::Io,
        }
    }

    /// Data errors are the only ones a tiered strategy skips over.
    #[inline]
    pub fn is_data(&self) -> bool {
        self.kind() == ErrorKind::Data
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
