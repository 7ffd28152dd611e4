//! `plugreg list`

use serde::Serialize;
use tabled::Tabled;

use plugreg_core::error::AppError;
use plugreg_plugin::{PluginRegistry, PluginSummary};

use crate::output::{self, OutputFormat};

/// Plugin display row
#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    /// Clean name
    name: String,
    /// Directory present
    installed: String,
    /// Activation record present
    active: String,
    /// Instance held
    loaded: String,
    /// Recorded version
    version: String,
    /// Activation time
    activated: String,
}

impl From<&PluginSummary> for PluginRow {
    fn from(s: &PluginSummary) -> Self {
        Self {
            name: s.name.clone(),
            installed: yes_no(s.installed),
            active: yes_no(s.active),
            loaded: yes_no(s.loaded),
            version: output::or_dash(s.recorded_version.as_deref()),
            activated: output::or_dash(s.activated_at.map(|t| t.format("%Y-%m-%d %H:%M:%S"))),
        }
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

/// Execute `list`
pub async fn execute(registry: &PluginRegistry, format: OutputFormat) -> Result<(), AppError> {
    let summaries = registry.summaries().await?;

    match format {
        OutputFormat::Json => output::print_json(&summaries),
        OutputFormat::Table => {
            let rows: Vec<PluginRow> = summaries.iter().map(PluginRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
