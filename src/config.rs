use std::env;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};

/// Environment variable holding the analysis backend base URL.
pub const API_BASE_URL_VAR: &str = "GARDEN_API_BASE_URL";
/// Optional override for the on-disk storage directory.
pub const STORAGE_DIR_VAR: &str = "GARDEN_STORAGE_DIR";

/// Load `.env` from the working directory, if there is one.
///
/// Values already present in the environment win over the file.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!("failed to read .env: {err}"),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> ApiResult<Self> {
        let base_url = env::var(API_BASE_URL_VAR).unwrap_or_default();
        if base_url.trim().is_empty() {
            return Err(ApiError::Config(format!(
                "{API_BASE_URL_VAR} is not set. Point it at the analysis backend, e.g. http://localhost:5000"
            )));
        }
        Ok(Self::new(base_url.trim()))
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let root = env::var_os(STORAGE_DIR_VAR)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_storage_dir);
        Self { root }
    }
}

/// `<data_local_dir>/gardenkit/storage`, or a relative fallback when the
/// platform has no data directory.
pub fn default_storage_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("gardenkit").join("storage");
    }

    PathBuf::from("cache").join("storage")
}
