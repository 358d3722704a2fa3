//! Runtime configuration.
//!
//! Controls the directive marker, the interpolation delimiters and the two
//! behaviors left open by the binding protocol: whether a watcher refreshes
//! its baseline after firing, and whether interpolated paths are trimmed.
//!
//! ```rust,ignore
//! let config = Config::from_json(r#"{ "directive_prefix": "x-", "baseline": "frozen" }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a watcher compares the current value after it has fired once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselinePolicy {
    /// Keep comparing against the value captured at construction.
    ///
    /// A value that returns to the original baseline is treated as unchanged,
    /// and repeated notifications with the same new value fire every time.
    Frozen,

    /// Replace the baseline with each value delivered to the callback.
    #[default]
    Refresh,
}

/// Opening and closing markers for text interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Compiler and watcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Attribute name prefix that marks a directive.
    pub directive_prefix: String,

    /// Interpolation markers.
    pub delimiters: Delimiters,

    /// Trim whitespace around the path captured between delimiters.
    pub trim_interpolation: bool,

    /// Baseline handling for every watcher created by the compiler.
    pub baseline: BaselinePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directive_prefix: "v-".to_string(),
            delimiters: Delimiters::default(),
            trim_interpolation: true,
            baseline: BaselinePolicy::default(),
        }
    }
}

impl Config {
    /// Decode a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the compiler cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.directive_prefix.is_empty() {
            return Err(Error::InvalidConfig("directive prefix is empty".into()));
        }
        if self.delimiters.open.is_empty() || self.delimiters.close.is_empty() {
            return Err(Error::InvalidConfig("interpolation delimiters are empty".into()));
        }
        Ok(())
    }

    pub fn with_directive_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.directive_prefix = prefix.into();
        self
    }

    pub fn with_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delimiters = Delimiters {
            open: open.into(),
            close: close.into(),
        };
        self
    }

    pub fn with_trim_interpolation(mut self, trim: bool) -> Self {
        self.trim_interpolation = trim;
        self
    }

    pub fn with_baseline(mut self, baseline: BaselinePolicy) -> Self {
        self.baseline = baseline;
        self
    }
}
