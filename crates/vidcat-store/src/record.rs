use serde::Serialize;
use sqlx::FromRow;

/// A stored catalog entry. Only [`crate::VideoStore`] produces these, so every
/// instance has passed URL validation and carries the id derived from its URL.
///
/// Rows cannot be decoded into it from outside the store:
///
/// ```compile_fail
/// let _ = sqlx::query_as::<sqlx::Sqlite, vidcat_store::VideoRecord>("SELECT 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    name: String,
    url: String,
    notes: String,
    video_id: String,
}

impl VideoRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct VideoRow {
    name: String,
    url: String,
    notes: String,
    video_id: String,
}

impl VideoRow {
    pub(crate) fn into_record(self) -> VideoRecord {
        VideoRecord {
            name: self.name,
            url: self.url,
            notes: self.notes,
            video_id: self.video_id,
        }
    }
}

pub(crate) fn into_records(rows: Vec<VideoRow>) -> Vec<VideoRecord> {
    rows.into_iter().map(VideoRow::into_record).collect()
}
