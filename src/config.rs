//! Configuration types for Reprise

use std::fmt;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fingerprint::FingerprintOptions;
use crate::identity::{IdentityProvider, NoIdentity, StaticIdentity};
use crate::{RepriseError, Result};

/// Cache directory used when none is configured
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Operating mode, fixed for the lifetime of an interceptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Always call the transport, never touch the cache
    Passthrough,
    /// Always call the transport and record successful responses, overwriting
    RecordOnly,
    /// Never call the transport; a missing entry yields 404
    ReplayOnly,
    /// Replay when an entry exists, otherwise call and record
    #[default]
    RecordAndReplay,
}

impl Mode {
    /// All modes, in declaration order
    pub const ALL: [Mode; 4] = [
        Mode::Passthrough,
        Mode::RecordOnly,
        Mode::ReplayOnly,
        Mode::RecordAndReplay,
    ];

    /// Canonical kebab-case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Passthrough => "passthrough",
            Mode::RecordOnly => "record-only",
            Mode::ReplayOnly => "replay-only",
            Mode::RecordAndReplay => "record-and-replay",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = RepriseError;

    /// Parses a mode name, case-insensitively, accepting `_` for `-`
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .ok_or_else(|| RepriseError::InvalidMode(s.to_string()))
    }
}

/// Interceptor options, immutable once handed to an interceptor
#[derive(Clone)]
pub struct Options {
    mode: Mode,
    cache_dir: PathBuf,
    working_dir: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    include_query: bool,
    include_body: bool,
    identity_provider: Arc<dyn IdentityProvider>,
}

impl Options {
    /// Options for `mode` with the default cache directory and no identity
    ///
    /// The working directory is captured here and serves as the base
    /// directory unless one is set.
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        let working_dir = std::env::current_dir().ok();
        Self {
            mode,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            base_dir: working_dir.clone(),
            working_dir,
            include_query: false,
            include_body: false,
            identity_provider: Arc::new(NoIdentity),
        }
    }

    /// Set the cache directory, relative to the base directory
    ///
    /// Backslashes are converted to the platform separator.
    #[must_use]
    pub fn with_cache_dir(mut self, cache_dir: impl AsRef<str>) -> Self {
        self.cache_dir = normalize_separators(cache_dir.as_ref());
        self
    }

    /// Resolve the cache directory against `base_dir` instead of the
    /// working directory
    ///
    /// A relative `base_dir` is joined onto the working directory captured
    /// by [`Options::new`].
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        self.base_dir = if base_dir.is_absolute() {
            Some(base_dir)
        } else {
            self.working_dir.as_ref().map(|dir| dir.join(base_dir))
        };
        self
    }

    /// Include the query string in the fingerprint
    #[must_use]
    pub fn include_query(mut self, include: bool) -> Self {
        self.include_query = include;
        self
    }

    /// Include the request body in the fingerprint
    #[must_use]
    pub fn include_body(mut self, include: bool) -> Self {
        self.include_body = include;
        self
    }

    /// Set the identity provider
    #[must_use]
    pub fn with_identity_provider(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identity_provider = Arc::new(provider);
        self
    }

    /// Operating mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Configured cache directory, before resolution
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Which request parts feed the fingerprint hash
    pub fn fingerprint(&self) -> FingerprintOptions {
        FingerprintOptions {
            include_query: self.include_query,
            include_body: self.include_body,
        }
    }

    /// Identity provider consulted once per request
    pub fn identity_provider(&self) -> &dyn IdentityProvider {
        self.identity_provider.as_ref()
    }

    /// Absolute base directory, if one could be resolved
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Absolute cache directory
    ///
    /// The same `Options` always resolves to the same directory.
    ///
    /// # Errors
    ///
    /// Returns error if the working directory was unavailable when the
    /// options were created and no absolute base directory was set
    pub fn absolute_cache_dir(&self) -> Result<PathBuf> {
        let base = self.base_dir.as_ref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "working directory unavailable and no absolute base directory set",
            )
        })?;
        Ok(base.join(&self.cache_dir))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("mode", &self.mode)
            .field("cache_dir", &self.cache_dir)
            .field("base_dir", &self.base_dir)
            .field("include_query", &self.include_query)
            .field("include_body", &self.include_body)
            .finish_non_exhaustive()
    }
}

fn normalize_separators(path: &str) -> PathBuf {
    PathBuf::from(path.replace('\\', MAIN_SEPARATOR_STR))
}

/// File configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operating mode
    #[serde(default)]
    pub mode: Mode,
    /// Cache directory, relative to `base_dir`
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Absolute base directory; the working directory when absent
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    /// Include the query string in the fingerprint
    #[serde(default)]
    pub include_query: bool,
    /// Include the request body in the fingerprint
    #[serde(default)]
    pub include_body: bool,
    /// Fixed identity mixed into every fingerprint
    #[serde(default)]
    pub identity: Option<String>,
}

fn default_cache_dir() -> String {
    DEFAULT_CACHE_DIR.to_string()
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, parsed or validated
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RepriseError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| RepriseError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.trim().is_empty() {
            return Err(RepriseError::ConfigError(
                "cache_dir cannot be empty".to_string(),
            ));
        }

        if let Some(base_dir) = &self.base_dir {
            if !base_dir.is_absolute() {
                return Err(RepriseError::ConfigError(format!(
                    "Base directory must be absolute: {}",
                    base_dir.display()
                )));
            }
            if !base_dir.is_dir() {
                return Err(RepriseError::ConfigError(format!(
                    "Base directory does not exist: {}",
                    base_dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Convert into interceptor options
    #[must_use]
    pub fn into_options(self) -> Options {
        let mut options = Options::new(self.mode)
            .with_cache_dir(&self.cache_dir)
            .include_query(self.include_query)
            .include_body(self.include_body);

        if let Some(base_dir) = self.base_dir {
            options = options.with_base_dir(base_dir);
        }
        if let Some(identity) = self.identity {
            options = options.with_identity_provider(StaticIdentity(identity));
        }

        options
    }
}
