//! Plugin name sanitization and default symbol derivation.

/// Symbol suffix every plugin constructor is registered under.
pub const STARTUP_SYMBOL: &str = "Plugin";

/// Strips any path prefix and every character outside `[A-Za-z0-9_-]`.
///
/// `"vendor/ems-plugin-blog"` and `"ems-plugin-blog"` clean to the same
/// token. Applying it twice yields the same result as applying it once.
pub fn clean_plugin_name(name: &str) -> String {
    let tail = match name.rfind('/') {
        Some(pos) => &name[pos + 1..],
        None => name,
    };
    tail.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Default constructor symbol for a plugin that declares no namespace.
///
/// The name is lowercased, every character outside `[a-z0-9]` becomes a
/// separator, and the last segment names the module:
/// `"ems-plugin-blog"` resolves to `"blog::Plugin"`.
pub fn default_symbol(name: &str) -> String {
    let normalized: String = clean_plugin_name(name)
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let module = match normalized.rfind('-') {
        Some(pos) => &normalized[pos + 1..],
        None => normalized.as_str(),
    };
    format!("{module}::{STARTUP_SYMBOL}")
}

/// Constructor symbol for a declared namespace (`"acme::blog"` → `"acme::blog::Plugin"`).
pub fn namespace_symbol(namespace: &str) -> String {
    let namespace = namespace.trim().trim_end_matches("::").trim_end_matches('\\');
    format!("{}::{STARTUP_SYMBOL}", namespace.replace('\\', "::"))
}
