use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),
    #[error(transparent)]
    Fetch(#[from] FetchFailure),
    #[error("Lookup failed for {item}: {reason}")]
    Lookup { item: String, reason: String },
    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Chart error: {0}")]
    Chart(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A non-2xx response (or a transport error, reported with status 0).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("GET {endpoint} failed with status {status}: {body}")]
pub struct FetchFailure {
    pub endpoint: String,
    pub status: u16,
    pub body: String,
}

impl FetchFailure {
    pub fn new(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }
}

impl From<ureq::Error> for PulseError {
    fn from(err: ureq::Error) -> Self {
        PulseError::Http(Box::new(err))
    }
}

impl PulseError {
    pub fn lookup(item: impl Into<String>, reason: impl ToString) -> Self {
        PulseError::Lookup {
            item: item.into(),
            reason: reason.to_string(),
        }
    }
}
