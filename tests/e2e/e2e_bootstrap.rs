//! Router class bootstrap through the front end.

use std::sync::Arc;
use std::time::Duration;

use grove::{BootstrapState, Environment, LoadError, ModuleTable};
use serde_json::json;

use crate::fixture::{config, frontend, CountingSource, GatedSource};

fn router_table(production: bool, development: bool) -> ModuleTable {
    let mut table = ModuleTable::new();
    if production {
        table.insert_default("lib/router.min.js", json!({"build": "production"}));
    }
    if development {
        table.insert_default("lib/router.js", json!({"build": "development"}));
    }
    table
}

#[tokio::test]
async fn test_concurrent_bootstraps_share_one_attempt() {
    let source = CountingSource::new(router_table(true, true), Duration::from_millis(20));
    let front = frontend(config(true, Environment::Production), Arc::clone(&source));

    let (a, b) = tokio::join!(front.router_class(), front.router_class());
    let a = a.unwrap();

    assert!(Arc::ptr_eq(&a, &b.unwrap()));
    assert_eq!(a.body["build"], "production");
    assert_eq!(source.total_calls(), 1);
    assert_eq!(front.router_state(), BootstrapState::Loaded);
}

#[tokio::test]
async fn test_fallback_to_development_build() {
    let source = CountingSource::new(router_table(false, true), Duration::ZERO);
    let front = frontend(config(true, Environment::Production), Arc::clone(&source));

    let router = front.router_class().await.unwrap();

    assert_eq!(router.body["build"], "development");
    assert_eq!(source.calls_for("lib/router.min.js"), 1);
    assert_eq!(source.calls_for("lib/router.js"), 1);

    // Memoized for the rest of the instance's life.
    front.router_class().await.unwrap();
    assert_eq!(source.total_calls(), 2);
}

#[tokio::test]
async fn test_state_visible_during_fallback() {
    let source = GatedSource::new(router_table(false, true));
    let front = frontend(config(true, Environment::Production), Arc::clone(&source));

    assert_eq!(front.router_state(), BootstrapState::Unloaded);

    let (router, states) = tokio::join!(front.router_class(), async {
        source.entered().await;
        let primary = front.router_state();
        source.release();

        source.entered().await;
        let fallback = front.router_state();
        source.release();
        (primary, fallback)
    });
    router.unwrap();

    assert_eq!(states.0, BootstrapState::Loading);
    assert_eq!(states.1, BootstrapState::FallbackLoading);
    assert_eq!(front.router_state(), BootstrapState::Loaded);
}

#[tokio::test]
async fn test_both_builds_missing() {
    let source = CountingSource::new(router_table(false, false), Duration::ZERO);
    let front = frontend(config(true, Environment::Production), Arc::clone(&source));

    let err = front.router_class().await.unwrap_err();

    assert!(matches!(err, LoadError::NotFound { ref path, .. } if path.as_str() == "lib/router.js"));
    assert_eq!(source.total_calls(), 2);
    assert_eq!(front.router_state(), BootstrapState::Failed);
}

#[tokio::test]
async fn test_development_uses_development_build_only() {
    let source = CountingSource::new(router_table(true, false), Duration::ZERO);
    let front = frontend(config(true, Environment::Development), Arc::clone(&source));

    assert!(front.router_class().await.is_err());
    assert_eq!(source.calls_for("lib/router.min.js"), 0);
    assert_eq!(source.calls_for("lib/router.js"), 1);
}

#[tokio::test]
async fn test_independent_instances_do_not_share_state() {
    let source = CountingSource::new(router_table(true, true), Duration::ZERO);
    let first = frontend(config(true, Environment::Production), Arc::clone(&source));
    let second = frontend(config(true, Environment::Production), Arc::clone(&source));

    first.router_class().await.unwrap();
    assert_eq!(second.router_state(), BootstrapState::Unloaded);

    second.router_class().await.unwrap();
    assert_eq!(source.total_calls(), 2);
}
