//! Configuration for Slate.
//!
//! Settings are read from `~/.slate/config.toml`. String values may reference
//! environment variables as `${NAME}`. A handful of environment variables
//! override the file outright:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `SLATE_API_URL` | `[api] base_url` |
//! | `SLATE_TOKEN` | `[session] token` |
//! | `SLATE_USER_ID` | `[session] user_id` |
//!
//! ```toml
//! [api]
//! base_url = "https://projects.example.com"
//!
//! [session]
//! token = "${MY_IDP_TOKEN}"
//! user_id = "user_2abc"
//!
//! [app]
//! view = "list"
//! high_contrast = false
//!
//! [projects]
//! require_name = true
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use slate_types::{Credential, NamePolicy, SubjectId, UiOptions, ViewMode};

/// Backend used when neither the environment nor the config file name one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const API_URL_ENV: &str = "SLATE_API_URL";
pub const TOKEN_ENV: &str = "SLATE_TOKEN";
pub const USER_ID_ENV: &str = "SLATE_USER_ID";

#[derive(Debug, Default, Deserialize)]
pub struct SlateConfig {
    pub app: Option<AppConfig>,
    pub api: Option<ApiConfig>,
    pub session: Option<SessionConfig>,
    pub projects: Option<ProjectsConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Initial layout: "grid" or "list".
    pub view: Option<String>,
    /// Use ASCII-only glyphs for icons and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct SessionConfig {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

// Manual Debug impl to prevent leaking the token in logs.
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field(
                "token",
                &if self.token.is_some() { "[REDACTED]" } else { "None" },
            )
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectsConfig {
    /// Reject create drafts whose name is blank.
    #[serde(default)]
    pub require_name: bool,
}

/// Credential and subject as resolved from config and environment.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub credential: Option<Credential>,
    pub subject: Option<SubjectId>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_value(name: &str) -> Option<String> {
    non_blank(env::var(name).ok())
}

impl SlateConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::parse(&content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Backend base URL: `SLATE_API_URL`, then `[api] base_url`, then the local default.
    #[must_use]
    pub fn api_url(config: Option<&Self>) -> String {
        Self::api_url_with(config, env_value(API_URL_ENV))
    }

    fn api_url_with(config: Option<&Self>, env_override: Option<String>) -> String {
        let from_file = config
            .and_then(|cfg| cfg.api.as_ref())
            .and_then(|api| non_blank(api.base_url.as_deref().map(expand_env_vars)));
        env_override
            .or(from_file)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    #[must_use]
    pub fn session(config: Option<&Self>) -> SessionSettings {
        Self::session_with(config, env_value(TOKEN_ENV), env_value(USER_ID_ENV))
    }

    fn session_with(
        config: Option<&Self>,
        token_override: Option<String>,
        user_override: Option<String>,
    ) -> SessionSettings {
        let section = config.and_then(|cfg| cfg.session.as_ref());
        let token = token_override.or_else(|| {
            section.and_then(|s| non_blank(s.token.as_deref().map(expand_env_vars)))
        });
        let user = user_override.or_else(|| {
            section.and_then(|s| non_blank(s.user_id.as_deref().map(expand_env_vars)))
        });
        SessionSettings {
            credential: token.and_then(Credential::new),
            subject: user.and_then(SubjectId::new),
        }
    }

    #[must_use]
    pub fn name_policy(config: Option<&Self>) -> NamePolicy {
        let require = config
            .and_then(|cfg| cfg.projects.as_ref())
            .is_some_and(|p| p.require_name);
        NamePolicy::from_require_name(require)
    }

    #[must_use]
    pub fn view_mode(config: Option<&Self>) -> ViewMode {
        let raw = config
            .and_then(|cfg| cfg.app.as_ref())
            .and_then(|app| app.view.as_deref());
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            None => ViewMode::default(),
            Some(v) if v == "list" => ViewMode::List,
            Some(v) if v == "grid" => ViewMode::Grid,
            Some(other) => {
                tracing::warn!("Unknown view mode in config: {}", other);
                ViewMode::default()
            }
        }
    }

    #[must_use]
    pub fn ui_options(config: Option<&Self>) -> UiOptions {
        config
            .and_then(|cfg| cfg.app.as_ref())
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
            })
            .unwrap_or_default()
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".slate").join("config.toml"))
}
