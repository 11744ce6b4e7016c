use serde::Deserialize;

use crate::error::{Field, RecordError};

/// A catalog entry as submitted by a caller, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVideo {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub notes: String,
}

impl NewVideo {
    pub fn new(name: impl Into<String>, url: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            notes: notes.into(),
        }
    }

    /// `name` and `url` must carry something other than whitespace.
    pub fn check_required(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::MissingField(Field::Name));
        }
        if self.url.trim().is_empty() {
            return Err(RecordError::MissingField(Field::Url));
        }
        Ok(())
    }
}
