//! Configuration module
//!
//! Backend URL, session location and polling settings.

use anyhow::{Context, Result};
use popstruct_client::{ApiClient, FileSession};
use popstruct_watch::WatchConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Session file used when no config directory can be determined
const FALLBACK_SESSION_FILE: &str = ".popstruct-session.json";

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the backend
    pub api_url: String,
    /// JSON file holding the access and refresh tokens
    pub session_file: PathBuf,
    /// Polling cadences and page size
    pub watch: WatchConfig,
}

impl Config {
    /// Builds the configuration from CLI flags and the environment
    pub fn load(api_url: String, session_file: Option<PathBuf>) -> Result<Self> {
        let watch = WatchConfig::from_env().context("Invalid polling configuration")?;

        let session_file = session_file.unwrap_or_else(default_session_file);
        debug!(
            "Using backend {} (session: {}, poll interval: {:?})",
            api_url,
            session_file.display(),
            watch.job_poll_interval
        );

        Ok(Self {
            api_url,
            session_file,
            watch,
        })
    }

    /// Client sharing the on-disk session
    pub fn client(&self) -> ApiClient {
        ApiClient::new(
            &self.api_url,
            Arc::new(FileSession::new(self.session_file.clone())),
        )
    }
}

/// `<config dir>/popstruct/session.json`
fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("popstruct").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_SESSION_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_session_file_wins() {
        let config = Config::load(
            "http://localhost:8000".to_string(),
            Some(PathBuf::from("/tmp/session.json")),
        )
        .unwrap();

        assert_eq!(config.session_file, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.client().base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_default_session_file_name() {
        assert!(default_session_file().ends_with("session.json"));
    }
}
