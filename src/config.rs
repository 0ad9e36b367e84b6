//! Configuration constants and profile loading for wardline
//!
//! Profiles are INI sections naming the API base URL, optional credentials,
//! a request timeout and the policy applied when a sync call fails.

use anyhow::{Context, Result};
use ini::Ini;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default profile file path for wardline
pub const DEFAULT_PROFILE_PATH: &str = "~/.wardline/profile";

/// Environment variable name for overriding the profile path
pub const PROFILE_PATH_ENV_VAR: &str = "WARDLINE_PROFILE_PATH";

/// Default log file; the terminal itself is in raw mode while the grid runs
pub const DEFAULT_LOG_PATH: &str = "~/.wardline/wardline.log";

/// Environment variable name for overriding the log file path
pub const LOG_FILE_ENV_VAR: &str = "WARDLINE_LOG_FILE";

/// Environment variable holding the tracing filter directives
pub const LOG_LEVEL_ENV_VAR: &str = "WARDLINE_LOG_LEVEL";

/// Base URL used when no profile is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Get the profile file path, checking environment variable first, then falling back to default
pub fn get_profile_path() -> String {
    std::env::var_os(PROFILE_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_PROFILE_PATH.to_string())
}

/// Get the log file path, checking environment variable first, then falling back to default
pub fn get_log_path() -> String {
    std::env::var_os(LOG_FILE_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string())
}

/// What to do when a create/update/delete call fails
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncFailurePolicy {
    /// Log only; the optimistic local state stays as it is
    Silent,
    /// Log and show the failure on the status line
    #[default]
    Notify,
    /// Notify, then reload schema and patients from the server
    Reload,
}

impl FromStr for SyncFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "notify" => Ok(Self::Notify),
            "reload" => Ok(Self::Reload),
            other => anyhow::bail!("unknown sync failure policy '{other}'"),
        }
    }
}

/// Connection settings for one API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridProfile {
    pub base_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<Duration>,
    pub on_sync_failure: SyncFailurePolicy,
}

impl GridProfile {
    /// Profile used when none is configured
    pub fn blank() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user: None,
            password: None,
            timeout: None,
            on_sync_failure: SyncFailurePolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_sync_failure_policy(mut self, policy: SyncFailurePolicy) -> Self {
        self.on_sync_failure = policy;
        self
    }
}

impl Default for GridProfile {
    fn default() -> Self {
        Self::blank()
    }
}

/// Profiles stored as sections of an INI file
pub struct IniProfileStore {
    path: String,
}

impl IniProfileStore {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    /// Load a profile by section name; `None` when the file or section is missing
    pub fn get_profile(&self, name: &str) -> Result<Option<GridProfile>> {
        let expanded = shellexpand::tilde(&self.path);
        let path = Path::new(expanded.as_ref());
        if !path.exists() {
            tracing::debug!("Profile file '{}' does not exist", path.display());
            return Ok(None);
        }

        let ini = Ini::load_from_file(path)
            .with_context(|| format!("failed to read profile file '{}'", path.display()))?;
        let Some(section) = ini.section(Some(name)) else {
            return Ok(None);
        };

        let mut profile = GridProfile::blank();
        if let Some(base_url) = section.get("base_url") {
            profile.base_url = base_url.to_string();
        }
        profile.user = section.get("user").map(str::to_string);
        profile.password = section.get("password").map(str::to_string);
        if let Some(timeout) = section.get("timeout_secs") {
            let secs: u64 = timeout
                .trim()
                .parse()
                .with_context(|| format!("invalid timeout_secs '{timeout}' in [{name}]"))?;
            profile.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(policy) = section.get("on_sync_failure") {
            profile.on_sync_failure = policy.parse()?;
        }

        Ok(Some(profile))
    }
}
