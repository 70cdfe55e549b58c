use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use crate::view::{DEFAULT_ROWS_PER_PAGE, SortConfig, SortDirection, SortKey};

/// Settings read from `<project>/.lotdesk/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Initial control state for the listing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: NonZeroUsize,
    #[serde(default = "default_sort_key")]
    pub sort_key: SortKey,
    #[serde(default = "default_sort_direction")]
    pub sort_direction: SortDirection,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            rows_per_page: default_rows_per_page(),
            sort_key: default_sort_key(),
            sort_direction: default_sort_direction(),
        }
    }
}

impl ViewConfig {
    #[must_use]
    pub const fn sort(&self) -> SortConfig {
        SortConfig::new(self.sort_key, self.sort_direction)
    }
}

/// Per-user settings from `<config dir>/lotdesk/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    /// Backend settings after user and environment overrides.
    pub backend: BackendConfig,
}

/// Read `<project_root>/.lotdesk/config.toml`, or defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".lotdesk/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Returns an error if the user config exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("lotdesk/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load project and user config and apply `LOTDESK_BACKEND_URL` /
/// `LOTDESK_TOKEN`.
///
/// # Errors
///
/// Returns an error if either config file is unreadable or malformed.
pub fn resolve_config(project_root: &Path) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let backend = resolve_backend(
        &project.backend,
        &user,
        env::var("LOTDESK_BACKEND_URL").ok(),
        env::var("LOTDESK_TOKEN").ok(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        backend,
    })
}

/// Precedence, highest first: environment, project file, user file.
fn resolve_backend(
    project: &BackendConfig,
    user: &UserConfig,
    env_url: Option<String>,
    env_token: Option<String>,
) -> BackendConfig {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    BackendConfig {
        url: non_empty(env_url).unwrap_or_else(|| project.url.clone()),
        token: non_empty(env_token)
            .or_else(|| non_empty(project.token.clone()))
            .or_else(|| non_empty(user.token.clone())),
        timeout_secs: project.timeout_secs,
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

const fn default_rows_per_page() -> NonZeroUsize {
    DEFAULT_ROWS_PER_PAGE
}

const fn default_sort_key() -> SortKey {
    SortKey::Score
}

const fn default_sort_direction() -> SortDirection {
    SortDirection::Desc
}
