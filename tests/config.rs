//! Loading a route table from TOML.

use dfa_router::config::{load_config, ConfigError, ValidationError};
use dfa_router::routing::Router;

mod common;
use common::config_file;

const ROUTES: &str = r#"
[matcher]
regex_timeout_ms = 500

[observability]
log_level = "debug"
metrics_enabled = false

[[routes]]
name = "home"
template = ""

[[routes]]
name = "product"
template = "products/{id:int}"
method = "GET"
metadata = ["catalog"]

[[routes]]
name = "product-slug"
template = "products/{slug:regex(^[a-z-]+$)}"
order = 1

[[routes]]
name = "archive"
template = "archive/{year}/{*path}"
defaults = { section = "news" }
constraints = [{ parameter = "year", constraint = "range(1990,2100)" }]
"#;

#[test]
fn test_load_and_match() {
    let file = config_file(ROUTES);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.routes.len(), 4);
    assert_eq!(config.matcher.regex_timeout_ms, 500);
    assert!(!config.observability.metrics_enabled);

    let router = Router::new(config.constraint_map());
    router.rebuild(config.endpoints().unwrap()).unwrap();

    let found = router.match_path("/products/12", "GET").unwrap();
    assert_eq!(found.endpoint.display_name(), "product");
    assert_eq!(found.endpoint.metadata(), &["catalog".to_string()]);

    let found = router.match_path("/products/red-shoes", "GET").unwrap();
    assert_eq!(found.endpoint.display_name(), "product-slug");

    let found = router.match_path("/archive/2001/a/b", "GET").unwrap();
    assert_eq!(found.values.get("path"), Some("a/b"));
    assert_eq!(found.values.get("section"), Some("news"));
    assert!(router.match_path("/archive/1800/a", "GET").is_none());

    assert_eq!(
        router.match_path("/", "GET").map(|m| m.endpoint.display_name().to_string()),
        Some("home".to_string())
    );
}

#[test]
fn test_match_result_serializes() {
    let file = config_file(ROUTES);
    let config = load_config(file.path()).unwrap();

    let router = Router::new(config.constraint_map());
    router.rebuild_from(&config).unwrap();
    let found = router.match_path("/products/12", "GET").unwrap();

    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(json["route"], "product");
    assert_eq!(json["method"], "GET");
    assert_eq!(json["values"]["id"], "12");
}

#[test]
fn test_invalid_config_reports_every_error() {
    let file = config_file(
        r#"
[observability]
log_level = "chatty"

[[routes]]
name = "dup"
template = "a/{id"

[[routes]]
name = "dup"
template = "b"
"#,
    );
    let err = load_config(file.path()).unwrap_err();

    let ConfigError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors.contains(&ValidationError::UnknownLogLevel("chatty".to_string())));
    assert!(errors.contains(&ValidationError::DuplicateRouteName("dup".to_string())));
}

#[test]
fn test_config_file_removed_on_drop() {
    let file = config_file(ROUTES);
    let path = file.path().to_path_buf();
    assert!(load_config(&path).is_ok());

    drop(file);
    assert!(!path.exists());
    assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
}
