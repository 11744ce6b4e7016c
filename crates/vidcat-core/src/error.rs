use std::fmt;

use thiserror::Error;

/// Why a URL is not a YouTube watch-page link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("malformed url: {0}")]
    Malformed(String),
    #[error("wrong host: {0}")]
    WrongHost(String),
    #[error("wrong path: {0}")]
    WrongPath(String),
    #[error("missing or empty v parameter")]
    MissingVideoId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Url,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => f.write_str("name"),
            Field::Url => f.write_str("url"),
        }
    }
}

/// Recoverable rejection of a single add request. Nothing is stored when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid url: {0}")]
    InvalidUrl(Rejected),
    #[error("duplicate url: {url}")]
    Duplicate { url: String },
    #[error("missing required field: {0}")]
    MissingField(Field),
}

impl RecordError {
    pub fn user_message(&self) -> String {
        match self {
            RecordError::InvalidUrl(_) => "Invalid Youtube URL".to_string(),
            RecordError::Duplicate { .. } => "That video is already in the catalog".to_string(),
            RecordError::MissingField(field) => format!("A {field} is required"),
        }
    }
}

#[derive(Debug, Error)]
pub enum VidcatError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl VidcatError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VidcatError::Record(_))
    }

    pub fn as_record(&self) -> Option<&RecordError> {
        match self {
            VidcatError::Record(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Rejected> for VidcatError {
    fn from(reason: Rejected) -> Self {
        VidcatError::Record(RecordError::InvalidUrl(reason))
    }
}

pub type VidcatResult<T> = Result<T, VidcatError>;
