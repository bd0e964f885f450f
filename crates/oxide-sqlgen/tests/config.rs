//! Deserializing naming configuration.

mod common;

use common::{entities_with, Boy};
use oxide_sqlgen::{EntityProvider, EntityType, NamingStrategy, OomConfig};

#[test]
fn test_empty_document_is_default() {
    let config: OomConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, OomConfig::default());
    assert!(config.table_naming.split_camel_case);
    assert!(!config.column_naming.uppercase);
}

#[test]
fn test_partial_document() {
    let config: OomConfig = serde_json::from_str(
        r#"{
            "schema": "school",
            "table_naming": { "prefix": "t_", "uppercase": true },
            "column_naming": { "split_camel_case": false }
        }"#,
    )
    .unwrap();

    assert_eq!(config.schema.as_deref(), Some("school"));
    assert_eq!(
        config.table_naming,
        NamingStrategy::new().prefix("t_").uppercase(true)
    );
    assert_eq!(
        config.column_naming,
        NamingStrategy::new().split_camel_case(false)
    );
}

#[test]
fn test_deserialized_config_drives_naming() {
    let config: OomConfig =
        serde_json::from_str(r#"{ "table_naming": { "suffix": "s", "uppercase": true } }"#)
            .unwrap();
    let entities = entities_with(config);
    let boy = entities.lookup_type(EntityType::of::<Boy>()).unwrap();
    assert_eq!(boy.table_name(), "BOYs");
    assert_eq!(entities.lookup_name("BadBoy").unwrap().table_name(), "BAD_BOYs");
    assert_eq!(entities.lookup_name("Girl").unwrap().table_name(), "GIRLS");
}

#[test]
fn test_unknown_type_is_rejected() {
    let result: Result<OomConfig, _> = serde_json::from_str(r#"{ "schema": 5 }"#);
    assert!(result.is_err());
}
