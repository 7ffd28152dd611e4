//! Registry lifecycle across restarts, with the audit trail plugin.

mod helpers;

use helpers::TestApp;
use plugreg_plugin::{PluginStore, RegistryError};

#[tokio::test]
async fn test_activation_survives_restart() {
    let app = TestApp::new(&["audit-trail", "_drafts"]);
    app.manifest(
        "audit-trail",
        r#"{ "name": "plugreg/audit-trail", "version": "1.2.0", "description": "Lifecycle log" }"#,
    );

    let registry = app.open().await;
    assert_eq!(registry.list_available().unwrap(), vec!["audit-trail"]);

    let plugin = registry.activate("plugreg/audit-trail").await.unwrap();
    assert_eq!(plugin.name(), "audit-trail");
    assert_eq!(plugin.info().version.as_deref(), Some("1.2.0"));
    drop(plugin);
    drop(registry);

    let registry = app.open().await;
    assert!(registry.is_active("audit-trail").await.unwrap());
    assert_eq!(registry.active_names().await, vec!["audit-trail"]);

    let record = app.store.find_by_name("audit-trail").await.unwrap().unwrap();
    assert_eq!(record.version, "1.2.0");

    registry.deactivate("audit-trail").await.unwrap();
    assert!(registry.list_active().await.unwrap().is_empty());

    let actions: Vec<String> = app
        .trail
        .entries_for("audit-trail")
        .await
        .into_iter()
        .map(|e| format!("{}:{}", e.source, e.action))
        .collect();
    assert_eq!(
        actions,
        vec![
            "registry:plugin.activate",
            "plugin:activate",
            "plugin:init",
            "registry:plugin.init",
            "registry:plugin.deactivate",
            "plugin:deactivate",
        ]
    );
}

#[tokio::test]
async fn test_failed_activation_is_rolled_back() {
    let app = TestApp::new(&["site-broken"]);
    let registry = app.open().await;

    let err = registry.activate("site-broken").await.unwrap_err();
    assert!(
        matches!(err, RegistryError::ActivationFailed { ref reason, .. } if reason == "missing configuration")
    );
    assert!(!registry.is_active("site-broken").await.unwrap());
    assert!(registry.get_plugin("site-broken").await.is_none());
    assert!(app.store.names().await.is_empty());
}

#[tokio::test]
async fn test_unknown_plugin_without_entry_file() {
    let app = TestApp::new(&["mystery"]);
    let registry = app.open().await;

    let err = registry.activate("mystery").await.unwrap_err();
    assert!(matches!(err, RegistryError::MissingEntryFile { .. }));
    assert!(!registry.is_active("mystery").await.unwrap());
}

#[tokio::test]
async fn test_install_event_recorded_once() {
    let app = TestApp::new(&[]);
    app.open().await;
    app.open().await;

    let installs = app
        .trail
        .entries()
        .await
        .into_iter()
        .filter(|e| e.action == "plugin.install")
        .count();
    assert_eq!(installs, 1);
}
