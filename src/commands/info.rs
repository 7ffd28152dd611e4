//! `plugreg info`

use serde::Serialize;

use plugreg_core::error::AppError;
use plugreg_plugin::{PluginDescriptor, PluginRegistry};
use plugreg_plugin::descriptor::MANIFEST_FILE;
use plugreg_plugin::name::clean_plugin_name;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct InfoOutput {
    name: String,
    path: String,
    symbol: String,
    active: bool,
    loaded: bool,
    recorded_version: Option<String>,
    descriptor: PluginDescriptor,
}

/// Execute `info`
pub async fn execute(
    registry: &PluginRegistry,
    name: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let clean = clean_plugin_name(name);
    let descriptor = registry.descriptor(name)?;
    let record = registry
        .list_active()
        .await?
        .into_iter()
        .find(|r| r.name == clean);

    let info = InfoOutput {
        path: registry.plugin_path(&clean).display().to_string(),
        symbol: registry.resolve_symbol(&clean).await?,
        active: record.is_some(),
        loaded: registry.get_plugin(&clean).await.is_some(),
        recorded_version: record.map(|r| r.version),
        descriptor,
        name: clean,
    };

    match format {
        OutputFormat::Json => output::print_json(&info),
        OutputFormat::Table => {
            println!("{}", info.name);
            output::print_kv("Path", &info.path);
            output::print_kv("Symbol", &info.symbol);
            output::print_kv("Package", &output::or_dash(info.descriptor.name.as_deref()));
            output::print_kv("Version", info.descriptor.version_or_placeholder());
            output::print_kv(
                "Description",
                &output::or_dash(info.descriptor.description.as_deref()),
            );
            output::print_kv("Released", &output::or_dash(info.descriptor.time.as_deref()));
            let manifest = if info.descriptor.synthesized {
                "synthesized"
            } else {
                MANIFEST_FILE
            };
            output::print_kv("Manifest", manifest);
            output::print_kv("Active", if info.active { "yes" } else { "no" });
            output::print_kv("Loaded", if info.loaded { "yes" } else { "no" });
            output::print_kv(
                "Recorded version",
                &output::or_dash(info.recorded_version.as_deref()),
            );
        }
    }
    Ok(())
}
