mod config;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use vidcat_core::{VidcatError, VidcatResult};

pub use config::{OutputConfig, StorageConfig, VidcatConfig};

const CONFIG_DIR: &str = ".vidcat";
const DB_FILE: &str = "videos.db";

fn home_dir() -> VidcatResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| VidcatError::Config("home directory not found".to_string()))
}

pub fn config_path() -> VidcatResult<PathBuf> {
    Ok(home_dir()?.join(CONFIG_DIR).join("config.toml"))
}

pub fn default_db_path() -> VidcatResult<PathBuf> {
    Ok(home_dir()?.join(CONFIG_DIR).join(DB_FILE))
}

pub fn load_config() -> VidcatResult<VidcatConfig> {
    let path = config_path()?;
    if !path.exists() {
        debug!("no config file at {path:?}, using defaults");
        return Ok(VidcatConfig::default());
    }
    let content = fs::read_to_string(&path)
        .map_err(|err| VidcatError::Config(format!("failed to read config: {err}")))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> VidcatResult<VidcatConfig> {
    toml::from_str(content)
        .map_err(|err| VidcatError::Config(format!("failed to parse config: {err}")))
}

pub fn save_config(config: &VidcatConfig) -> VidcatResult<()> {
    let path = config_path()?;
    let content = toml::to_string_pretty(config)
        .map_err(|err| VidcatError::Config(format!("failed to serialize config: {err}")))?;
    write_config_file(&path, &content)
}

fn write_config_file(path: &Path, content: &str) -> VidcatResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| VidcatError::Config(format!("failed to create config dir: {err}")))?;
    }
    fs::write(path, content)
        .map_err(|err| VidcatError::Config(format!("failed to write config: {err}")))
}

/// `--db` beats `VIDCAT_DB_PATH`, which beats `storage.db_path`.
pub fn resolve_db_path(config: &VidcatConfig, explicit: Option<&Path>) -> VidcatResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(value) = env::var("VIDCAT_DB_PATH")
        && !value.trim().is_empty()
    {
        return Ok(PathBuf::from(value));
    }
    match &config.storage.db_path {
        Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => default_db_path(),
    }
}

pub fn resolve_simple_output(config: &VidcatConfig) -> Option<bool> {
    if let Ok(value) = env::var("VIDCAT_OUTPUT_SIMPLE") {
        return Some(parse_flag(&value));
    }
    config.output.simple
}

fn parse_flag(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes"
}

pub fn get_config_value(config: &VidcatConfig, key_path: &str) -> Option<String> {
    let parts: Vec<&str> = key_path.split('.').collect();

    match parts.as_slice() {
        ["storage", "db_path"] => config.storage.db_path.clone(),
        ["output", "simple"] => config.output.simple.map(|b| b.to_string()),
        _ => None,
    }
}

pub fn set_config_value(key_path: &str, value: &str) -> VidcatResult<()> {
    let path = config_path()?;
    let content = if path.exists() {
        fs::read_to_string(&path)
            .map_err(|err| VidcatError::Config(format!("failed to read config: {err}")))?
    } else {
        String::new()
    };

    let updated = set_value_in_document(&content, key_path, value)?;
    write_config_file(&path, &updated)
}

/// Writes `value` at a dotted `key_path` inside a TOML document, keeping the
/// rest of the document (comments included) untouched. Booleans are stored
/// as TOML booleans so `output.simple = true` reads back as a `bool`.
pub fn set_value_in_document(content: &str, key_path: &str, value: &str) -> VidcatResult<String> {
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|err| VidcatError::Config(format!("failed to parse config: {err}")))?;

    let parts: Vec<&str> = key_path.split('.').collect();
    let Some((last_part, parents)) = parts.split_last() else {
        return Err(VidcatError::Config("empty key path".to_string()));
    };
    if parents.is_empty() || parts.iter().any(|part| part.is_empty()) {
        return Err(VidcatError::Config(
            "key path must have at least 2 parts (e.g., 'storage.db_path')".to_string(),
        ));
    }

    let mut current = doc.as_table_mut();
    for part in parents {
        current = current
            .entry(part)
            .or_insert(toml_edit::Item::Table(Default::default()))
            .as_table_mut()
            .ok_or_else(|| {
                VidcatError::Config(format!("cannot set nested value in '{}'", key_path))
            })?;
    }

    current[*last_part] = match value.trim() {
        "true" => toml_edit::value(true),
        "false" => toml_edit::value(false),
        _ => toml_edit::value(value),
    };

    Ok(doc.to_string())
}

pub fn open_in_editor() -> VidcatResult<()> {
    let path = config_path()?;
    if !path.exists() {
        save_config(&VidcatConfig::default())?;
    }

    let editor = env::var("EDITOR").unwrap_or_else(|_| {
        if cfg!(target_os = "windows") {
            "notepad".to_string()
        } else {
            "vi".to_string()
        }
    });

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .map_err(|err| {
            VidcatError::Config(format!("failed to open editor '{}': {}", editor, err))
        })?;

    if !status.success() {
        return Err(VidcatError::Config(format!(
            "editor exited with status: {}",
            status
        )));
    }

    Ok(())
}
