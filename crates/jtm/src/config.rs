//! YAML configuration file plus environment / flag overrides

use std::path::{Path, PathBuf};

use jtm_core::document::{DocumentOptions, DEFAULT_CLASSIFICATION_LABEL};
use jtm_core::issue::{Normalizer, DEFAULT_CLASSIFICATION_FIELD};
use jtm_core::jql::SortField;
use jtm_core::table::Terminology;
use serde::Deserialize;

use crate::prelude::*;

/// File name looked up in the home directory when `--config` is not given
pub const CONFIG_FILE_NAME: &str = ".jira-cli-config.yaml";

pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Settings from `~/.jira-cli-config.yaml`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub server: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
    pub default_project: Option<String>,
    pub max_results: usize,
    pub sort_field: SortField,
    pub terminology: Terminology,
    pub classification_field: String,
    pub classification_label: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: None,
            username: None,
            api_token: None,
            default_project: None,
            max_results: DEFAULT_MAX_RESULTS,
            sort_field: SortField::default(),
            terminology: Terminology::default(),
            classification_field: DEFAULT_CLASSIFICATION_FIELD.to_string(),
            classification_label: DEFAULT_CLASSIFICATION_LABEL.to_string(),
        }
    }
}

/// Everything needed to talk to the Jira REST API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server: String,
    pub username: String,
    pub api_token: String,
}

impl AppConfig {
    /// Load the configuration file
    ///
    /// An explicit `path` must exist. Without one, `~/.jira-cli-config.yaml`
    /// is read when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if required {
                return Err(Error::Config(f!("config file not found: {}", path.display())).into());
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        log::debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(&path)
            .with_context(|| f!("Failed to read config from {}", path.display()))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text; an empty document yields defaults
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
            .map_err(|e| Error::Config(f!("failed to parse config file: {e}")).into())
    }

    /// Apply CLI / environment overrides to the configuration
    pub fn with_overrides(
        mut self,
        server: Option<String>,
        username: Option<String>,
        api_token: Option<String>,
    ) -> Self {
        if let Some(server) = server {
            self.server = Some(server);
        }
        if let Some(username) = username {
            self.username = Some(username);
        }
        if let Some(api_token) = api_token {
            self.api_token = Some(api_token);
        }
        self
    }

    /// Server URL without a trailing slash
    pub fn server(&self) -> Result<&str, Error> {
        self.server
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_end_matches('/'))
            .ok_or_else(|| {
                Error::Config(
                    "Jira server not configured (set `server` in the config file, JIRA_SERVER or --server)"
                        .to_string(),
                )
            })
    }

    pub fn credentials(&self) -> Result<Credentials, Error> {
        let server = self.server()?.to_string();
        match (non_empty(&self.username), non_empty(&self.api_token)) {
            (Some(username), Some(api_token)) => Ok(Credentials {
                server,
                username: username.to_string(),
                api_token: api_token.to_string(),
            }),
            _ => Err(Error::Config(
                "JIRA credentials not found (set `username` and `api_token` in the config file, JIRA_USERNAME/JIRA_API_TOKEN or --username/--api-token)"
                    .to_string(),
            )),
        }
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.classification_field.clone())
    }

    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            classification_label: self.classification_label.clone(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn default_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}
