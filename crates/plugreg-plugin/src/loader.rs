//! Entry-file loading for plugins without a compiled-in constructor.
//!
//! A plugin directory may ship a shared library named
//! `<DLL_PREFIX>plugin<DLL_SUFFIX>` (`libplugin.so`, `plugin.dll`, ...). With
//! the `dynamic` feature the registry loads it via `libloading` and lets it
//! register constructors. The library must export:
//!
//! ```rust,ignore
//! #[unsafe(no_mangle)]
//! pub extern "C" fn plugreg_plugin_abi() -> u32 { plugreg_plugin::loader::PLUGIN_ABI_VERSION }
//!
//! #[unsafe(no_mangle)]
//! pub fn plugreg_register(factories: &mut plugreg_plugin::PluginFactories) { /* ... */ }
//! ```

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};

/// ABI revision a plugin library must report.
pub const PLUGIN_ABI_VERSION: u32 = 1;

/// Stem of the entry library inside a plugin directory.
pub const ENTRY_STEM: &str = "plugin";

/// Exported symbol reporting the library's ABI revision.
pub const ABI_SYMBOL: &[u8] = b"plugreg_plugin_abi";

/// Exported symbol registering the library's constructors.
pub const REGISTER_SYMBOL: &[u8] = b"plugreg_register";

/// Platform file name of a plugin entry library.
pub fn entry_file_name() -> String {
    format!("{DLL_PREFIX}{ENTRY_STEM}{DLL_SUFFIX}")
}

/// Path of the entry library inside `plugin_dir`.
pub fn entry_file_path(plugin_dir: &Path) -> PathBuf {
    plugin_dir.join(entry_file_name())
}

#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use tracing::{debug, info};

    use super::{ABI_SYMBOL, PLUGIN_ABI_VERSION, REGISTER_SYMBOL};
    use crate::error::{RegistryError, RegistryResult};
    use crate::factory::PluginFactories;

    /// Signature of the exported ABI probe.
    pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

    /// Signature of the exported registration function.
    pub type RegisterFn = unsafe fn(&mut PluginFactories);

    /// Loads plugin entry libraries and keeps them mapped, once per path.
    pub struct DynamicLoader {
        libraries: BTreeMap<PathBuf, libloading::Library>,
    }

    impl DynamicLoader {
        /// Creates a new dynamic loader.
        pub fn new() -> Self {
            Self {
                libraries: BTreeMap::new(),
            }
        }

        /// Loads `path` and lets it register its constructors into `factories`.
        ///
        /// Returns `true` once the library has registered, `false` if `path`
        /// was already loaded by an earlier call.
        ///
        /// # Safety
        /// Runs arbitrary code from the library. Only load trusted plugins
        /// built against the same `plugreg-plugin` with the same compiler.
        /// Plugin instances created from the library must be dropped before
        /// the loader.
        pub unsafe fn load(
            &mut self,
            name: &str,
            path: &Path,
            factories: &mut PluginFactories,
        ) -> RegistryResult<bool> {
            if self.libraries.contains_key(path) {
                debug!(plugin = %name, path = %path.display(), "Plugin library already loaded");
                return Ok(false);
            }

            let mismatch = |reason: String| RegistryError::InterfaceMismatch {
                name: name.to_string(),
                reason,
            };

            let lib = unsafe { libloading::Library::new(path) }
                .map_err(|e| mismatch(format!("cannot load {}: {e}", path.display())))?;

            let abi = unsafe {
                let probe: libloading::Symbol<AbiVersionFn> = lib
                    .get(ABI_SYMBOL)
                    .map_err(|e| mismatch(format!("missing ABI probe: {e}")))?;
                probe()
            };
            if abi != PLUGIN_ABI_VERSION {
                return Err(mismatch(format!(
                    "library reports ABI {abi}, expected {PLUGIN_ABI_VERSION}"
                )));
            }

            unsafe {
                let register: libloading::Symbol<RegisterFn> = lib
                    .get(REGISTER_SYMBOL)
                    .map_err(|e| mismatch(format!("missing registration function: {e}")))?;
                register(factories);
            }

            info!(plugin = %name, path = %path.display(), "Plugin library loaded");
            self.libraries.insert(path.to_path_buf(), lib);
            Ok(true)
        }

        /// Number of libraries currently mapped.
        pub fn loaded_count(&self) -> usize {
            self.libraries.len()
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicLoader")
                .field("loaded_count", &self.libraries.len())
                .finish()
        }
    }
}

/// Loader used when the `dynamic` feature is disabled: never loads anything.
#[cfg(not(feature = "dynamic"))]
pub mod dynamic_loader {
    use std::path::Path;

    use tracing::warn;

    use crate::error::RegistryResult;
    use crate::factory::PluginFactories;

    /// Stub dynamic loader.
    #[derive(Debug, Default)]
    pub struct DynamicLoader;

    impl DynamicLoader {
        /// Creates a stub loader.
        pub fn new() -> Self {
            Self
        }

        /// Always returns `false`; entry libraries need the `dynamic` feature.
        ///
        /// # Safety
        /// Trivially safe; `unsafe` only to match the feature-enabled signature.
        pub unsafe fn load(
            &mut self,
            name: &str,
            path: &Path,
            _factories: &mut PluginFactories,
        ) -> RegistryResult<bool> {
            warn!(
                plugin = %name,
                path = %path.display(),
                "Entry library found but dynamic loading is not enabled"
            );
            Ok(false)
        }

        /// Always zero.
        pub fn loaded_count(&self) -> usize {
            0
        }
    }
}

pub use dynamic_loader::DynamicLoader;
