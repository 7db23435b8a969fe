//! Pruner configuration documents.
//!
//! Example:
//! ```yaml
//! criterion:
//!   kind: hybrid
//!   steepness: 0.5
//!   epsilon: 0.01
//! verify: checked
//! tolerance_source: remaining
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use dtprune_core::{Pruner, ToleranceSource, VerifyMode};

use crate::criterion::CriterionConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrunerConfig {
    pub criterion: CriterionConfig,
    /// Omitted: checked in debug builds, unchecked in release builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<VerifyMode>,
    #[serde(default)]
    pub tolerance_source: ToleranceSource,
}

impl PrunerConfig {
    pub fn new(criterion: CriterionConfig) -> Self {
        Self {
            criterion,
            verify: None,
            tolerance_source: ToleranceSource::default(),
        }
    }

    pub fn from_yaml_str(src: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(src)?)
    }

    pub fn from_json_str(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    /// Load from a `.yaml`/`.yml`/`.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !matches!(ext.as_str(), "yaml" | "yml" | "json") {
            return Err(Error::UnsupportedFormat(path.display().to_string()));
        }

        let src = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), "loading pruner config");

        if ext == "json" {
            Self::from_json_str(&src)
        } else {
            Self::from_yaml_str(&src)
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build the pruner. Fails before any traversal can start if a required
    /// criterion parameter is missing or invalid.
    pub fn build(&self) -> Result<Pruner> {
        let criterion = self.criterion.build()?;
        let pruner = Pruner::new(criterion)
            .with_verify(self.verify.unwrap_or_default())
            .with_tolerance_source(self.tolerance_source);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            criterion = %criterion,
            verify = %pruner.verify(),
            "pruner configured"
        );

        Ok(pruner)
    }
}
