//! Plugin discovery under the plugin root directory.
//!
//! Every subdirectory of the root is a candidate plugin. Entries starting
//! with `.` or `_` and plain files are skipped.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::RegistryError;

/// Returns `true` if a directory entry name is hidden from discovery.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// Lists candidate plugin directory names under `root`, sorted.
///
/// A missing root yields an empty list.
pub fn list_plugin_dirs(root: &Path) -> Result<Vec<String>, RegistryError> {
    if !root.is_dir() {
        debug!(root = %root.display(), "Plugin root does not exist");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(root).map_err(|e| RegistryError::Scan {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Skipping unreadable plugin entry");
                continue;
            }
        };

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(entry = ?entry.file_name(), "Skipping non UTF-8 plugin directory");
            continue;
        };

        if is_hidden(&name) || !entry.path().is_dir() {
            continue;
        }

        names.push(name);
    }

    names.sort();
    debug!(root = %root.display(), count = names.len(), "Plugin directories scanned");
    Ok(names)
}
