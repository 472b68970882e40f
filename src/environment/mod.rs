//! Run settings and `{{variable}}` interpolation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! overrides coming from environment variables and command-line flags (clap
//! merges those two before they reach [`Settings::resolve`]).

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://qa-internship.avito.com";
pub const DEFAULT_SELLER_ID: i64 = 999_999;

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub seller_id: i64,
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            seller_id: DEFAULT_SELLER_ID,
            timeout_secs: None,
        }
    }
}

/// Settings as they appear in a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub seller_id: Option<i64>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file `{}`: {e}", path.display()))
        })?;
        Self::parse(&raw).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{msg} (in `{}`)", path.display())),
            other => other,
        })
    }

    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }
}

/// Values supplied on the command line or through `ADCHECK_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub seller_id: Option<i64>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Resolve settings with precedence defaults < file < overrides.
    pub fn resolve(file: Option<FileConfig>, overrides: &Overrides) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(file) = file {
            if let Some(base_url) = file.base_url {
                settings.base_url = base_url;
            }
            if let Some(seller_id) = file.seller_id {
                settings.seller_id = seller_id;
            }
            if file.timeout_secs.is_some() {
                settings.timeout_secs = file.timeout_secs;
            }
        }

        if let Some(base_url) = &overrides.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(seller_id) = overrides.seller_id {
            settings.seller_id = seller_id;
        }
        if overrides.timeout_secs.is_some() {
            settings.timeout_secs = overrides.timeout_secs;
        }

        if settings.base_url.trim().is_empty() {
            return Err(Error::Config("Base URL cannot be empty".to_string()));
        }
        if settings.timeout_secs == Some(0) {
            return Err(Error::Config("timeout_secs must be greater than zero".to_string()));
        }

        Ok(settings)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Variables every endpoint template may reference.
    pub fn variables(&self) -> HashMap<String, String> {
        let mut variables = HashMap::new();
        variables.insert("sellerId".to_string(), self.seller_id.to_string());
        variables
    }
}

/// Interpolate `{{key}}` placeholders. Unknown placeholders are left as-is.
pub fn interpolate(text: &str, variables: &HashMap<String, String>) -> String {
    let mut result = text.to_string();
    for (key, value) in variables {
        result = result.replace(&format!("{{{{{key}}}}}"), value);
    }
    result
}
