//! Layered configuration resolution.
//!
//! Keys resolve through three layers, first hit wins: explicit overrides,
//! process environment variables, then the `<environment>.properties` file
//! for the selected environment. A missing key resolves to blank rather
//! than failing the suite.

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Selector consulted for the active environment name
pub const ENV_SELECTOR: &str = "env";

/// Environment used when nothing selects one
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Keys must not look like paths
fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Infallible, the pattern is a literal
        #[allow(clippy::expect_used)]
        Regex::new(r"^[^/\\]*$").expect("key pattern")
    })
}

/// Resolver over overrides, process environment, and a properties file.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    environment: String,
    config_dir: PathBuf,
    overrides: HashMap<String, String>,
    file_values: HashMap<String, String>,
}

impl ConfigResolver {
    /// Load the resolver for an explicit environment.
    ///
    /// A missing or unreadable properties file degrades to an empty file
    /// layer with a warning; suites may run entirely off overrides and
    /// environment variables.
    #[must_use]
    pub fn load_env(config_dir: impl AsRef<Path>, environment: &str) -> Self {
        let config_dir = config_dir.as_ref().to_path_buf();
        let file_values = read_properties(&config_dir.join(format!("{environment}.properties")));
        Self {
            environment: environment.to_string(),
            config_dir,
            overrides: HashMap::new(),
            file_values,
        }
    }

    /// Load the resolver, selecting the environment from the `env` process
    /// variable and falling back to `dev`.
    #[must_use]
    pub fn load(config_dir: impl AsRef<Path>) -> Self {
        let environment =
            std::env::var(ENV_SELECTOR).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());
        Self::load_env(config_dir, &environment)
    }

    /// Add an override, the highest-precedence layer
    #[must_use]
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Add an override in place
    pub fn set_override(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let _ = self.overrides.insert(key.into(), value.into());
    }

    /// The environment this resolver was loaded for
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Directory the properties file was loaded from
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolve a key through override, environment variable, then file.
    ///
    /// Missing keys resolve to blank; keys containing path separators are
    /// rejected with a warning and resolve to blank.
    #[must_use]
    pub fn resolve(&self, key: &str) -> String {
        if !key_pattern().is_match(key) {
            tracing::warn!(key, "rejecting path-like configuration key");
            return String::new();
        }
        if let Some(value) = self.overrides.get(key) {
            return value.clone();
        }
        if let Ok(value) = std::env::var(key) {
            return value;
        }
        self.file_values.get(key).cloned().unwrap_or_default()
    }

    /// Resolve a key, substituting a default when it comes back blank
    #[must_use]
    pub fn resolve_or(&self, key: &str, default: &str) -> String {
        let value = self.resolve(key);
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    }
}

/// Parse a java-style properties file: `key=value` lines, `#`/`!` comments
fn read_properties(path: &Path) -> HashMap<String, String> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "no properties file loaded");
            return HashMap::new();
        }
    };

    let mut values = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) {
            let _ = values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    tracing::debug!(path = %path.display(), keys = values.len(), "properties loaded");
    values
}
