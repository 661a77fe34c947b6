//! Watch configuration
//!
//! Polling cadences and listing page size. Defaults follow the dashboard:
//! a single job is re-fetched every 3 seconds while it is pending or
//! running, the job list every 5 seconds.

use std::time::Duration;

/// Default delay between two fetches of the same job
pub const DEFAULT_JOB_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Default delay between two fetches of the job list
pub const DEFAULT_LIST_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Default number of rows per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Polling configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Wait after a job fetch resolves before the next one
    pub job_poll_interval: Duration,

    /// Wait between job list refreshes
    pub list_refresh_interval: Duration,

    /// Rows per listing page
    pub page_size: u32,
}

impl WatchConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - POPSTRUCT_JOB_POLL_MS (milliseconds, default: 3000)
    /// - POPSTRUCT_LIST_REFRESH_MS (milliseconds, default: 5000)
    /// - POPSTRUCT_PAGE_SIZE (default: 10)
    pub fn from_env() -> anyhow::Result<Self> {
        let job_poll_interval = env_millis("POPSTRUCT_JOB_POLL_MS")?
            .unwrap_or(DEFAULT_JOB_POLL_INTERVAL);

        let list_refresh_interval = env_millis("POPSTRUCT_LIST_REFRESH_MS")?
            .unwrap_or(DEFAULT_LIST_REFRESH_INTERVAL);

        let page_size = match std::env::var("POPSTRUCT_PAGE_SIZE") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("POPSTRUCT_PAGE_SIZE must be a number, got '{}'", raw))?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        let config = Self {
            job_poll_interval,
            list_refresh_interval,
            page_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Overrides the job poll interval
    pub fn with_job_poll_interval(mut self, interval: Duration) -> Self {
        self.job_poll_interval = interval;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.job_poll_interval.is_zero() {
            anyhow::bail!("job_poll_interval must be greater than 0");
        }

        if self.list_refresh_interval.is_zero() {
            anyhow::bail!("list_refresh_interval must be greater than 0");
        }

        if self.page_size == 0 {
            anyhow::bail!("page_size must be greater than 0");
        }

        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            job_poll_interval: DEFAULT_JOB_POLL_INTERVAL,
            list_refresh_interval: DEFAULT_LIST_REFRESH_INTERVAL,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn env_millis(name: &str) -> anyhow::Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| anyhow::anyhow!("{} must be a number of milliseconds, got '{}'", name, raw)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatchConfig::default();
        assert_eq!(config.job_poll_interval, Duration::from_secs(3));
        assert_eq!(config.list_refresh_interval, Duration::from_secs(5));
        assert_eq!(config.page_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = WatchConfig::default();

        config.job_poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.job_poll_interval = Duration::from_millis(500);
        assert!(config.validate().is_ok());

        config.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_job_poll_interval() {
        let config = WatchConfig::default().with_job_poll_interval(Duration::from_secs(1));
        assert_eq!(config.job_poll_interval, Duration::from_secs(1));
        assert_eq!(config.list_refresh_interval, DEFAULT_LIST_REFRESH_INTERVAL);
    }
}
