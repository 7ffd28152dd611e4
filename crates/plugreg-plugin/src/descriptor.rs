//! Plugin descriptors read from `plugin.json` manifests.

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RegistryError;

/// File name of the manifest inside a plugin directory.
pub const MANIFEST_FILE: &str = "plugin.json";

/// Vendor prefix used for synthesized descriptor names.
pub const DEFAULT_VENDOR: &str = "local";

/// Version reported by a synthesized descriptor.
pub const SYNTHESIZED_VERSION: &str = "0.0.1";

/// Version recorded when a descriptor declares none.
pub const PLACEHOLDER_VERSION: &str = "0.0.0";

/// Autoload hints from the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoloadInfo {
    /// Module path the plugin constructor is registered under, e.g. `"acme::blog"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Read-only plugin metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Package name, e.g. `"acme/blog"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// One-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Release date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Autoload hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoload: Option<AutoloadInfo>,
    /// `true` when no manifest was found and the defaults were synthesized.
    #[serde(skip)]
    pub synthesized: bool,
}

impl PluginDescriptor {
    /// Reads the manifest in `dir`, or synthesizes one when it is absent.
    ///
    /// `clean_name` must already be sanitized.
    pub fn load(dir: &Path, clean_name: &str) -> Result<Self, RegistryError> {
        let manifest = dir.join(MANIFEST_FILE);
        if manifest.is_file() {
            let raw = std::fs::read_to_string(&manifest).map_err(|e| RegistryError::Manifest {
                path: manifest.clone(),
                reason: e.to_string(),
            })?;
            let descriptor: PluginDescriptor =
                serde_json::from_str(&raw).map_err(|e| RegistryError::Manifest {
                    path: manifest.clone(),
                    reason: e.to_string(),
                })?;
            debug!(plugin = %clean_name, path = %manifest.display(), "Manifest loaded");
            return Ok(descriptor);
        }

        Ok(Self::synthesize(dir, clean_name))
    }

    /// Builds the default descriptor for a plugin without a manifest.
    pub fn synthesize(dir: &Path, clean_name: &str) -> Self {
        Self {
            name: Some(format!("{DEFAULT_VENDOR}/{clean_name}")),
            version: Some(SYNTHESIZED_VERSION.to_string()),
            description: None,
            time: Some(directory_date(dir).format("%Y-%m-%d").to_string()),
            autoload: None,
            synthesized: true,
        }
    }

    /// Version to record on activation, falling back to the placeholder.
    pub fn version_or_placeholder(&self) -> &str {
        match self.version.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => PLACEHOLDER_VERSION,
        }
    }

    /// The declared autoload namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.autoload
            .as_ref()
            .and_then(|a| a.namespace.as_deref())
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
    }
}

/// Creation date of a directory, falling back to its modification date and then today.
fn directory_date(dir: &Path) -> NaiveDate {
    let stamp = std::fs::metadata(dir)
        .ok()
        .and_then(|meta| meta.created().or_else(|_| meta.modified()).ok());
    match stamp {
        Some(time) => DateTime::<Local>::from(time).date_naive(),
        None => Local::now().date_naive(),
    }
}
