//! Integration tests for loading node records from JSON files.

use std::fs;

use tempfile::TempDir;

use dectree::infrastructure::source::JsonFileSource;
use dectree::infrastructure::traits::RecordSource;
use dectree::infrastructure::InfraError;

const RECORDS: &str = r#"[
  {"nodeNumber": 1, "title": "root", "leftChild": 2, "rightChild": 3, "passMark": 0.5},
  {"nodeNumber": 2, "title": "A", "leftChild": null, "rightChild": null, "passed": 4, "failed": 1},
  {"nodeNumber": 3, "title": "B", "passed": 2, "failed": 2}
]"#;

#[test]
fn given_json_file_when_load_then_records_are_parsed() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    fs::write(&path, RECORDS).unwrap();
    let source = JsonFileSource::new(&path);

    // Act
    let records = source.load().expect("load records");

    // Assert
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].left_child, Some(2));
    assert_eq!(records[0].pass_mark, Some(0.5));
    assert!(records[1].is_leaf());
    assert_eq!(records[2].passed, Some(2));
    assert_eq!(source.describe(), path.display().to_string());
}

#[test]
fn given_missing_file_when_load_then_data_load_error() {
    let dir = TempDir::new().unwrap();
    let source = JsonFileSource::new(dir.path().join("absent.json"));

    let err = source.load().unwrap_err();

    assert!(matches!(err, InfraError::DataLoad { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn given_invalid_json_when_load_then_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"[{"nodeNumber": "one"}]"#).unwrap();

    let err = JsonFileSource::new(&path).load().unwrap_err();

    assert!(matches!(err, InfraError::Parse { .. }));
}

#[test]
fn given_stdin_path_when_describe_then_stdin() {
    assert_eq!(JsonFileSource::new("-").describe(), "<stdin>");
}
