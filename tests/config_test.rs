//! Integration tests for layered settings.
//!
//! These tests use temp directories for both the global file and the local
//! directory, so the user's real config never interferes. None of them set
//! `DECTREE_*` variables.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use dectree::application::ApplicationError;
use dectree::config::{local_config_path, Settings};
use dectree::domain::EmptyLeafPolicy;

#[test]
fn given_no_config_files_when_load_from_then_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load_from(None, Some(dir.path())).expect("load settings");

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.data_file, PathBuf::from("data.json"));
    assert_eq!(settings.root_id, 1);
    assert_eq!(settings.layout.char_width, 6.0);
    assert_eq!(settings.viewport.max_scale, 3.0);
}

#[test]
fn given_global_and_local_when_load_from_then_local_wins_per_field() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("dectree.toml");
    fs::write(
        &global,
        r#"
root_id = 7
empty_leaf = "not_a_number"

[layout]
char_width = 8.0
level_factor = 5.0
"#,
    )
    .unwrap();

    let local_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(local_dir.path()),
        r#"
root_id = 9

[layout]
char_width = 10.0
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(Some(global.as_path()), Some(local_dir.path())).unwrap();

    // Assert
    assert_eq!(settings.root_id, 9, "local overrides global");
    assert_eq!(settings.empty_leaf, EmptyLeafPolicy::NotANumber, "global kept");
    assert_eq!(settings.layout.char_width, 10.0);
    assert_eq!(settings.layout.level_factor, 5.0);
    assert_eq!(settings.layout.pass_bar_width, 25.0, "default kept");
}

#[test]
fn given_missing_global_file_when_load_from_then_it_is_skipped() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("nope.toml");

    let settings = Settings::load_from(Some(absent.as_path()), None).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_explicit_missing_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("nope.toml");

    let err = Settings::load(Some(absent.as_path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_invalid_toml_when_load_from_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "root_id = [").unwrap();

    let err = Settings::load_from(None, Some(dir.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_empty_scale_range_when_load_from_then_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[viewport]\nmin_scale = 2.0\nmax_scale = 1.0\n",
    )
    .unwrap();

    let err = Settings::load_from(None, Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains("scale range"));
}

#[test]
fn given_tilde_data_file_when_load_from_then_path_is_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "data_file = \"~/trees/data.json\"\n").unwrap();

    let settings = Settings::load_from(None, Some(dir.path())).unwrap();

    assert!(!settings.data_file.to_string_lossy().starts_with('~'));
    assert!(settings.data_file.ends_with("trees/data.json"));
}

#[test]
fn given_template_when_parsed_then_yields_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), Settings::template()).unwrap();

    let settings = Settings::load_from(None, Some(dir.path())).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_settings_when_to_toml_then_it_loads_back() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.root_id = 3;
    settings.layout.char_width = 7.5;
    fs::write(local_config_path(dir.path()), settings.to_toml().unwrap()).unwrap();

    let loaded = Settings::load_from(None, Some(dir.path())).unwrap();

    assert_eq!(loaded, settings);
}
