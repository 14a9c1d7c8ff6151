//! Loading module documents from disk.

use std::fs;
use std::sync::Arc;

use grove::{Environment, Frontend, FsSource, LoadError, LoaderConfig};

fn write(root: &std::path::Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn frontend_at(root: &std::path::Path) -> Frontend {
    let config = LoaderConfig {
        base_path: "components".into(),
        environment: Some(Environment::Production),
        ..Default::default()
    };
    Frontend::new(config, Arc::new(FsSource::new(root))).unwrap()
}

#[tokio::test]
async fn test_load_component_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "components/Button.js",
        r#"{"default": {"template": "<button><slot/></button>", "style": ".btn{}"}}"#,
    );

    let front = frontend_at(dir.path());
    let record = front.load_component("Button").await.unwrap();

    assert_eq!(record.name, "Button");
    assert_eq!(record.style.as_deref(), Some(".btn{}"));
    assert_eq!(record.body["template"], "<button><slot/></button>");
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let front = frontend_at(dir.path());

    let err = front.load_component("Ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_document_without_default_is_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "components/Odd.js", r#"{"helpers": {}}"#);

    let err = frontend_at(dir.path()).load_component("Odd").await.unwrap_err();
    assert!(matches!(err, LoadError::Shape { .. }));
}

#[tokio::test]
async fn test_invalid_document_is_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "components/Broken.js", "export default {");

    let err = frontend_at(dir.path()).load_component("Broken").await.unwrap_err();
    assert!(matches!(err, LoadError::Fetch { .. }));
}

#[tokio::test]
async fn test_router_fallback_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib/router.js", r#"{"default": {"mode": "hash"}}"#);

    let front = frontend_at(dir.path());
    let router = front.router_class().await.unwrap();
    assert_eq!(router.path.as_str(), "lib/router.js");
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "grove.json",
        r#"{"basePath": "/c", "globalComponents": ["Button"], "environment": "production"}"#,
    );

    let config = LoaderConfig::from_file(dir.path().join("grove.json")).unwrap();
    assert_eq!(config.base_path, "/c");
    assert_eq!(config.global_components, vec!["Button"]);
    assert_eq!(config.resolve_environment().unwrap(), Environment::Production);
}
