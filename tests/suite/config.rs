//! Config file loading and resolution.

use std::fs;

use slate_config::{ConfigError, SlateConfig};
use slate_types::{NamePolicy, ViewMode};
use tempfile::tempdir;

#[test]
fn load_from_reads_every_section() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[api]
base_url = "https://projects.example.com"

[session]
token = "secret"
user_id = "user_9"

[app]
view = "list"
ascii_only = true

[projects]
require_name = true
"#,
    )
    .unwrap();

    let config = SlateConfig::load_from(&path).unwrap();
    assert_eq!(SlateConfig::view_mode(Some(&config)), ViewMode::List);
    assert_eq!(
        SlateConfig::name_policy(Some(&config)),
        NamePolicy::RequireName
    );
    assert!(SlateConfig::ui_options(Some(&config)).ascii_only);
    assert!(!format!("{:?}", config.session).contains("secret"));
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let config = SlateConfig::parse("").unwrap();
    assert_eq!(SlateConfig::view_mode(Some(&config)), ViewMode::Grid);
    assert_eq!(
        SlateConfig::name_policy(Some(&config)),
        NamePolicy::AllowEmpty
    );
    assert_eq!(SlateConfig::name_policy(None), NamePolicy::AllowEmpty);
}

#[test]
fn invalid_toml_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[api\nbase_url = 1").unwrap();

    let err = SlateConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), &path);
}

#[test]
fn unreadable_file_is_a_read_error() {
    let dir = tempdir().unwrap();
    let err = SlateConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
