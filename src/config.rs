use std::net::SocketAddr;
use std::path::PathBuf;

use crate::pipeline::import::DEFAULT_BATCH_SIZE;

/// Application-level constants
pub const APP_NAME: &str = "MdtImport";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PREVIEW_ROWS: usize = 20;
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 20;

const DB_FILE_NAME: &str = "mdt.db";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,mdt_import=debug,tower_http=info"
}

/// Get the application data directory: ~/MdtImport/.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Knobs of the import pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Records per transaction.
    pub batch_size: usize,
    /// Rows per sheet returned by a preview.
    pub preview_rows: usize,
    pub max_upload_bytes: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub import: ImportConfig,
}

impl AppConfig {
    /// Read configuration from `MDT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset or blank keys take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("MDT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(app_data_dir);
        let db_path = get("MDT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));

        let bind_raw = get("MDT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "MDT_BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let batch_size = parse_number(get("MDT_IMPORT_BATCH_SIZE"), "MDT_IMPORT_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MDT_IMPORT_BATCH_SIZE",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }
        let preview_rows = parse_number(get("MDT_PREVIEW_ROWS"), "MDT_PREVIEW_ROWS", DEFAULT_PREVIEW_ROWS)?;
        let max_upload_mb = parse_number(get("MDT_MAX_UPLOAD_MB"), "MDT_MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "MDT_MAX_UPLOAD_MB",
                value: max_upload_mb.to_string(),
                reason: "too large to express in bytes".into(),
            })?;

        Ok(Self {
            data_dir,
            db_path,
            bind_addr,
            import: ImportConfig {
                batch_size,
                preview_rows,
                max_upload_bytes,
            },
        })
    }
}

fn parse_number<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
