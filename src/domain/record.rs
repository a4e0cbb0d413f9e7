//! Raw node records as delivered by the data file.

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// One entry of the flat node collection.
///
/// Children are referenced by `node_number`. A record is a leaf iff
/// `left_child` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodeRecord {
    pub node_number: i64,
    pub title: String,
    #[serde(default)]
    pub left_child: Option<i64>,
    #[serde(default)]
    pub right_child: Option<i64>,
    /// Split threshold, internal nodes only
    #[serde(default)]
    pub pass_mark: Option<f64>,
    /// Observed passes, leaves only
    #[serde(default)]
    pub passed: Option<u64>,
    /// Observed failures, leaves only
    #[serde(default)]
    pub failed: Option<u64>,
}

/// Validated shape of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordShape {
    Internal { left: i64, right: i64, pass_mark: f64 },
    Leaf { passed: u64, failed: u64 },
}

impl RawNodeRecord {
    /// Convenience constructor for an internal record.
    pub fn internal(node_number: i64, title: &str, left: i64, right: i64, pass_mark: f64) -> Self {
        Self {
            node_number,
            title: title.to_string(),
            left_child: Some(left),
            right_child: Some(right),
            pass_mark: Some(pass_mark),
            passed: None,
            failed: None,
        }
    }

    /// Convenience constructor for a leaf record.
    pub fn leaf(node_number: i64, title: &str, passed: u64, failed: u64) -> Self {
        Self {
            node_number,
            title: title.to_string(),
            left_child: None,
            right_child: None,
            pass_mark: None,
            passed: Some(passed),
            failed: Some(failed),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none()
    }

    /// Check the leaf/internal invariants and return the record's shape.
    pub fn shape(&self) -> DomainResult<RecordShape> {
        let malformed = |reason: &str| DomainError::MalformedRecord {
            node: self.node_number,
            reason: reason.to_string(),
        };

        match (self.left_child, self.right_child) {
            (Some(left), Some(right)) => {
                let pass_mark = self
                    .pass_mark
                    .ok_or_else(|| malformed("internal node without passMark"))?;
                Ok(RecordShape::Internal {
                    left,
                    right,
                    pass_mark,
                })
            }
            (Some(_), None) => Err(malformed("leftChild set but rightChild is null")),
            (None, Some(_)) => Err(malformed("rightChild set on a leaf")),
            (None, None) => {
                let passed = self
                    .passed
                    .ok_or_else(|| malformed("leaf without passed count"))?;
                let failed = self
                    .failed
                    .ok_or_else(|| malformed("leaf without failed count"))?;
                Ok(RecordShape::Leaf { passed, failed })
            }
        }
    }
}
