use std::path::Path;

use log::{debug, error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use vidcat_core::{VidcatError, VidcatResult};

pub const SCHEMA_VERSION: i64 = 1;

pub async fn open_pool(path: &Path) -> VidcatResult<SqlitePool> {
    info!("Opening video database at {path:?}");
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!("Creating parent directory for database: {parent:?}");
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| VidcatError::Storage(format!("failed to create db dir: {err}")))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .map_err(|err| VidcatError::Storage(format!("failed to open database: {err}")))?;
    prepare_schema(&pool).await?;
    Ok(pool)
}

pub async fn memory_pool() -> VidcatResult<SqlitePool> {
    // Each connection to ":memory:" is its own database, so keep exactly one alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(SqliteConnectOptions::new().in_memory(true))
        .await
        .map_err(|err| VidcatError::Storage(format!("failed to open database: {err}")))?;
    create_tables(&pool).await?;
    Ok(pool)
}

async fn prepare_schema(pool: &SqlitePool) -> VidcatResult<()> {
    let version = schema_version(pool).await?;
    debug!("db version: {version}");
    if version == 0 {
        info!("Creating database tables...");
        create_tables(pool).await
    } else {
        check_db_version(pool).await.inspect_err(|err| {
            error!("Database version check failed: {err}");
        })
    }
}

async fn schema_version(pool: &SqlitePool) -> VidcatResult<i64> {
    let version = sqlx::query_as::<Sqlite, (i64,)>("PRAGMA user_version;")
        .fetch_one(pool)
        .await
        .map_err(|err| VidcatError::Storage(format!("failed to read db version: {err}")))?;
    Ok(version.0)
}

pub async fn check_db_version(pool: &SqlitePool) -> VidcatResult<()> {
    let version = schema_version(pool).await?;
    if version == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(VidcatError::Storage(format!(
            "unsupported database version {version}, expected {SCHEMA_VERSION}"
        )))
    }
}

pub async fn create_tables(pool: &SqlitePool) -> VidcatResult<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS videos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    url TEXT NOT NULL UNIQUE,
    notes TEXT NOT NULL DEFAULT '',
    video_id TEXT NOT NULL
);"#,
    )
    .execute(pool)
    .await
    .map_err(|err| VidcatError::Storage(format!("failed to create videos table: {err}")))?;

    sqlx::query(format!("PRAGMA user_version = {SCHEMA_VERSION};").as_str())
        .execute(pool)
        .await
        .map_err(|err| VidcatError::Storage(format!("failed to set db version: {err}")))?;
    Ok(())
}
