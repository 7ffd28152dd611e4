//! `plugreg status|activate|deactivate`

use serde::Serialize;

use plugreg_core::error::AppError;
use plugreg_plugin::PluginRegistry;
use plugreg_plugin::name::clean_plugin_name;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct StatusOutput {
    name: String,
    active: bool,
}

/// Execute `status`
pub async fn status(
    registry: &PluginRegistry,
    name: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let active = registry.is_active(name).await?;
    let status = StatusOutput {
        name: clean_plugin_name(name),
        active,
    };

    match format {
        OutputFormat::Json => output::print_json(&status),
        OutputFormat::Table => {
            let state = if status.active { "active" } else { "inactive" };
            println!("{}: {}", status.name, state);
        }
    }
    Ok(())
}

/// Execute `activate`
pub async fn activate(
    registry: &PluginRegistry,
    name: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let plugin = registry.activate(name).await?;
    report(format, plugin.name(), true, "activated");
    Ok(())
}

/// Execute `deactivate`
pub async fn deactivate(
    registry: &PluginRegistry,
    name: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    registry.deactivate(name).await?;
    report(format, &clean_plugin_name(name), false, "deactivated");
    Ok(())
}

fn report(format: OutputFormat, name: &str, active: bool, verb: &str) {
    match format {
        OutputFormat::Json => output::print_json(&StatusOutput {
            name: name.to_string(),
            active,
        }),
        OutputFormat::Table => output::print_success(&format!("Plugin '{}' {}", name, verb)),
    }
}
