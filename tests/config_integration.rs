//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that `ferrule.toml` settings reach the compiler.

use std::sync::Arc;

use bson::doc;
use ferrule::prelude::*;
use ferrule::query::ErrorCode;
use ferrule::schema::{LocalizationConfig, SchemaError};
use pretty_assertions::assert_eq;
use serde_json::json;

fn provider() -> Arc<StaticSchemaProvider> {
    let posts = CollectionSchema::collection("posts").fields(vec![FieldDef::text("title").localized()]);
    Arc::new(StaticSchemaProvider::from_schemas([&posts]).unwrap())
}

/// Test minimal configuration
#[test]
fn test_config_minimal() {
    let config = FerruleConfig::from_str("").unwrap();
    assert_eq!(config.localization, LocalizationConfig::default());
    assert_eq!(config.query.max_depth, 32);
    assert!(!config.debug.log_queries);
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config = FerruleConfig::from_str(
        r#"
        [localization]
        locales = ["en", "es", "de"]

        [query]
        max_depth = 12

        [debug]
        log_queries = true

        [environments.test.query]
        max_depth = 2
    "#,
    )
    .unwrap();

    assert_eq!(config.localization.locales, vec!["en", "es", "de"]);
    assert_eq!(config.query.max_depth, 12);
    assert!(config.debug.log_queries);
    assert!(config.environments.contains_key("test"));
}

/// Test validation errors
#[test]
fn test_config_validation() {
    for toml in [
        "[query]\nmax_depth = 0",
        "[localization]\nlocales = [\"en.us\"]",
        "[localization]\nlocales = [\"all\"]",
    ] {
        let err = FerruleConfig::from_str(toml).unwrap_err();
        assert!(matches!(err, SchemaError::ConfigError { .. }), "{toml}");
    }
}

/// Test configuration errors convert to query errors
#[test]
fn test_config_error_codes() {
    let err: QueryError = FerruleConfig::from_file("does/not/exist/ferrule.toml")
        .unwrap_err()
        .into();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);

    let err: QueryError = FerruleConfig::from_str("[localization\n").unwrap_err().into();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}

/// Test that locales from the config drive path fan-out
#[tokio::test]
async fn test_config_locales_reach_compiler() {
    let config = FerruleConfig::from_str("[localization]\nlocales = [\"fr\", \"it\"]").unwrap();
    let compiler = WhereCompiler::new(provider(), &config);

    let filter = compiler
        .compile(
            &json!({ "title": { "equals": "Bonjour" } }),
            &QueryTarget::collection("posts"),
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        filter,
        doc! { "$and": [ { "$or": [ { "title.fr": "Bonjour" }, { "title.it": "Bonjour" } ] } ] }
    );
}

/// Test that disabling localization keeps bare paths
#[tokio::test]
async fn test_config_without_localization() {
    let compiler = WhereCompiler::new(provider(), &FerruleConfig::default());

    let filter = compiler
        .compile(
            &json!({ "title": { "equals": "Hello" } }),
            &QueryTarget::collection("posts"),
            Some("en"),
        )
        .await
        .unwrap();

    assert_eq!(filter, doc! { "title": "Hello" });
}

/// Test environment overrides of the depth guard
#[tokio::test]
async fn test_environment_max_depth() {
    let config = FerruleConfig::from_str(
        r#"
        [environments.strict.query]
        max_depth = 1
    "#,
    )
    .unwrap()
    .with_environment("strict");
    let compiler = WhereCompiler::new(provider(), &config);

    let clause = json!({ "or": [ { "or": [ { "title": { "exists": true } } ] } ] });
    let filter = compiler
        .compile(&clause, &QueryTarget::collection("posts"), None)
        .await
        .unwrap();
    assert!(filter.is_empty());

    let relaxed = WhereCompiler::new(provider(), &FerruleConfig::default());
    let filter = relaxed
        .compile(&clause, &QueryTarget::collection("posts"), None)
        .await
        .unwrap();
    assert_eq!(filter, doc! { "$or": [ { "$or": [ { "title": { "$exists": true } } ] } ] });
}
