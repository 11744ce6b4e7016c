mod database;
mod record;

use std::path::Path;

use log::{debug, info};
use sqlx::{Sqlite, SqlitePool};
use vidcat_core::{NewVideo, RecordError, VidcatError, VidcatResult};
use vidcat_youtube::validate_and_extract;

pub use database::SCHEMA_VERSION;
pub use record::VideoRecord;

use record::VideoRow;

const SELECT_VIDEOS: &str = "SELECT name, url, notes, video_id FROM videos";
const ORDER_BY_NAME: &str = "ORDER BY name COLLATE NOCASE, id";

/// The video catalog. Owns every stored [`VideoRecord`]; records enter only
/// through [`VideoStore::add`].
#[derive(Debug, Clone)]
pub struct VideoStore {
    pool: SqlitePool,
}

impl VideoStore {
    pub async fn open(path: impl AsRef<Path>) -> VidcatResult<Self> {
        let pool = database::open_pool(path.as_ref()).await?;
        Ok(Self { pool })
    }

    pub async fn in_memory() -> VidcatResult<Self> {
        let pool = database::memory_pool().await?;
        Ok(Self { pool })
    }

    pub async fn add(&self, name: &str, url: &str, notes: &str) -> VidcatResult<VideoRecord> {
        self.add_video(&NewVideo::new(name, url, notes)).await
    }

    /// Validates and stores one entry. Either the whole record is written or
    /// nothing is; a URL already in the catalog fails with
    /// [`RecordError::Duplicate`] as reported by the `UNIQUE` constraint.
    pub async fn add_video(&self, video: &NewVideo) -> VidcatResult<VideoRecord> {
        video.check_required()?;
        let url = video.url.trim();
        let video_id = validate_and_extract(url).inspect_err(|reason| {
            debug!("rejected {url:?}: {reason}");
        })?;

        let record = sqlx::query_as::<Sqlite, VideoRow>(
            r#"INSERT INTO videos (name, url, notes, video_id)
VALUES
    (?, ?, ?, ?)
RETURNING name, url, notes, video_id;"#,
        )
        .bind(video.name.trim())
        .bind(url)
        .bind(&video.notes)
        .bind(&video_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| insert_error(err, url))?
        .into_record();

        info!("added video {} ({})", record.video_id(), record.name());
        Ok(record)
    }

    /// Every record, ordered by name ignoring case.
    pub async fn list_all(&self) -> VidcatResult<Vec<VideoRecord>> {
        let sql = format!("{SELECT_VIDEOS} {ORDER_BY_NAME};");
        let rows = sqlx::query_as::<Sqlite, VideoRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| VidcatError::Storage(format!("failed to list videos: {err}")))?;
        Ok(record::into_records(rows))
    }

    /// Records whose name contains `term`, ignoring case, in `list_all` order.
    /// A blank term matches everything; otherwise the term is matched as given,
    /// surrounding spaces included.
    pub async fn search(&self, term: &str) -> VidcatResult<Vec<VideoRecord>> {
        if term.trim().is_empty() {
            return self.list_all().await;
        }
        let pattern = format!("%{}%", escape_like(term));
        let sql = format!(r"{SELECT_VIDEOS} WHERE name LIKE ? ESCAPE '\' {ORDER_BY_NAME};");
        let rows = sqlx::query_as::<Sqlite, VideoRow>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| VidcatError::Storage(format!("failed to search videos: {err}")))?;
        Ok(record::into_records(rows))
    }

    pub async fn count(&self) -> VidcatResult<u64> {
        let count = sqlx::query_as::<Sqlite, (i64,)>("SELECT COUNT(*) FROM videos;")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| VidcatError::Storage(format!("failed to count videos: {err}")))?;
        Ok(count.0.max(0) as u64)
    }
}

fn insert_error(err: sqlx::Error, url: &str) -> VidcatError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            debug!("duplicate url {url:?}");
            RecordError::Duplicate {
                url: url.to_string(),
            }
            .into()
        }
        _ => VidcatError::Storage(format!("failed to insert video: {err}")),
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcat_core::{Field, Rejected};

    const INVALID_URLS: [&str; 6] = [
        "https://www.youtube.com/",
        "https://www.youtube.com/watch?",
        "https://www.youtube.com/watch?abc=123",
        "https://www.d.com/watch?wa",
        "https://www.github.com",
        "https://www.github.com/watch?abc=123",
    ];

    async fn store_with(names: &[&str]) -> VideoStore {
        let store = VideoStore::in_memory().await.unwrap();
        for (index, name) in names.iter().enumerate() {
            let url = format!("https://www.youtube.com/watch?v={}", 123 + index);
            store.add(name, &url, "example").await.unwrap();
        }
        store
    }

    fn names(records: &[VideoRecord]) -> Vec<&str> {
        records.iter().map(VideoRecord::name).collect()
    }

    #[tokio::test]
    async fn add_video_derives_video_id() {
        let store = VideoStore::in_memory().await.unwrap();
        let record = store
            .add("tech", "https://www.youtube.com/watch?v=nlrnWe_45_U", "a thing")
            .await
            .unwrap();

        assert_eq!(record.name(), "tech");
        assert_eq!(record.url(), "https://www.youtube.com/watch?v=nlrnWe_45_U");
        assert_eq!(record.notes(), "a thing");
        assert_eq!(record.video_id(), "nlrnWe_45_U");
        assert_eq!(store.count().await.unwrap(), 1);

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored, vec![record]);
    }

    #[tokio::test]
    async fn invalid_url_is_not_added() {
        let store = VideoStore::in_memory().await.unwrap();
        for url in INVALID_URLS {
            let result = store.add("example", url, "example notes").await;
            assert!(
                matches!(
                    result,
                    Err(VidcatError::Record(RecordError::InvalidUrl(_)))
                ),
                "{url} should be rejected"
            );
            assert_eq!(store.count().await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn invalid_url_keeps_reason() {
        let store = VideoStore::in_memory().await.unwrap();
        let err = store
            .add("example", "https://www.youtube.com/watch/somethingelse?v=123456", "")
            .await
            .unwrap_err();
        assert_eq!(
            err.as_record(),
            Some(&RecordError::InvalidUrl(Rejected::WrongPath(
                "/watch/somethingelse".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn duplicate_url_is_rejected() {
        let store = VideoStore::in_memory().await.unwrap();
        let url = "https://www.youtube.com/watch?v=123";
        store.add("ZXY", url, "example").await.unwrap();

        let result = store.add("ZXY", url, "example").await;
        match result {
            Err(VidcatError::Record(RecordError::Duplicate { url: dup })) => assert_eq!(dup, url),
            other => panic!("Expected Duplicate error, got {other:?}"),
        }
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn padded_url_is_stored_trimmed() {
        let store = VideoStore::in_memory().await.unwrap();
        let record = store
            .add(" tech ", "  https://www.youtube.com/watch?v=123 \n", "  spaced  ")
            .await
            .unwrap();
        assert_eq!(record.name(), "tech");
        assert_eq!(record.url(), "https://www.youtube.com/watch?v=123");
        assert_eq!(record.notes(), "  spaced  ");

        let result = store
            .add("again", "https://www.youtube.com/watch?v=123", "")
            .await;
        assert!(matches!(
            result,
            Err(VidcatError::Record(RecordError::Duplicate { .. }))
        ));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicates_store_one_record() {
        let store = VideoStore::in_memory().await.unwrap();
        let url = "https://www.youtube.com/watch?v=123";
        let (first, second) = tokio::join!(store.add("one", url, ""), store.add("two", url, ""));

        let duplicates = [&first, &second]
            .iter()
            .filter(|result| {
                matches!(
                    result,
                    Err(VidcatError::Record(RecordError::Duplicate { .. }))
                )
            })
            .count();
        assert_eq!(duplicates, 1);
        assert!(first.is_ok() || second.is_ok());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let store = VideoStore::in_memory().await.unwrap();

        let err = store
            .add("  ", "https://www.youtube.com/watch?v=123", "")
            .await
            .unwrap_err();
        assert_eq!(err.as_record(), Some(&RecordError::MissingField(Field::Name)));

        let err = store.add("tech", "", "").await.unwrap_err();
        assert_eq!(err.as_record(), Some(&RecordError::MissingField(Field::Url)));

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_notes_are_allowed() {
        let store = VideoStore::in_memory().await.unwrap();
        let record = store
            .add("tech", "https://www.youtube.com/watch?v=123", "")
            .await
            .unwrap();
        assert_eq!(record.notes(), "");
    }

    #[tokio::test]
    async fn all_videos_listed_in_name_order() {
        let store = store_with(&["ZXY", "abc", "AAA", "lmn"]).await;
        let videos = store.list_all().await.unwrap();
        assert_eq!(names(&videos), vec!["AAA", "abc", "lmn", "ZXY"]);
    }

    #[tokio::test]
    async fn equal_names_keep_insertion_order() {
        let store = store_with(&["same", "Same", "SAME"]).await;
        let videos = store.list_all().await.unwrap();
        assert_eq!(names(&videos), vec!["same", "Same", "SAME"]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = VideoStore::in_memory().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn listing_is_repeatable() {
        let store = store_with(&["ZXY", "abc", "AAA"]).await;
        let first = store.list_all().await.unwrap();
        let second = store.list_all().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn search_matches_name_ignoring_case() {
        let store = store_with(&["ZXY", "abc", "AAA", "lmn", "Bob"]).await;
        let videos = store.search("b").await.unwrap();
        assert_eq!(names(&videos), vec!["abc", "Bob"]);
    }

    #[tokio::test]
    async fn search_does_not_look_at_notes() {
        let store = store_with(&["ZXY"]).await;
        assert!(store.search("example").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let store = store_with(&["100% rust", "1000 rust", "snake_case", "snakeXcase"]).await;
        assert_eq!(names(&store.search("0%").await.unwrap()), vec!["100% rust"]);
        assert_eq!(names(&store.search("e_c").await.unwrap()), vec!["snake_case"]);
    }

    #[tokio::test]
    async fn search_keeps_surrounding_spaces() {
        let store = store_with(&["trust", "my rust", "Rusty"]).await;
        assert_eq!(names(&store.search(" rust").await.unwrap()), vec!["my rust"]);
        assert_eq!(
            names(&store.search("rust").await.unwrap()),
            vec!["my rust", "Rusty", "trust"]
        );
    }

    #[tokio::test]
    async fn blank_search_lists_everything() {
        let store = store_with(&["ZXY", "abc"]).await;
        let all = store.list_all().await.unwrap();
        assert_eq!(store.search("  ").await.unwrap(), all);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.db");
        {
            let store = VideoStore::open(&path).await.unwrap();
            store
                .add("tech", "https://www.youtube.com/watch?v=nlrnWe_45_U", "a thing")
                .await
                .unwrap();
            store.pool.close().await;
        }

        let store = VideoStore::open(&path).await.unwrap();
        let videos = store.list_all().await.unwrap();
        assert_eq!(names(&videos), vec!["tech"]);
        assert_eq!(videos[0].video_id(), "nlrnWe_45_U");
    }

    #[tokio::test]
    async fn foreign_schema_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.db");
        {
            let store = VideoStore::open(&path).await.unwrap();
            sqlx::query("PRAGMA user_version = 42;")
                .execute(&store.pool)
                .await
                .unwrap();
            store.pool.close().await;
        }

        let result = VideoStore::open(&path).await;
        assert!(matches!(result, Err(VidcatError::Storage(_))));
    }

    #[tokio::test]
    async fn record_serializes_public_fields() {
        let store = store_with(&["tech"]).await;
        let videos = store.list_all().await.unwrap();
        let json = serde_json::to_value(&videos[0]).unwrap();
        assert_eq!(json["name"], "tech");
        assert_eq!(json["video_id"], "123");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
        assert_eq!(escape_like("plain"), "plain");
    }
}
