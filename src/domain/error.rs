//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed input data or invalid tree references.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(i64),

    #[error("duplicate node number: {0}")]
    DuplicateNode(i64),

    #[error("malformed node {node}: {reason}")]
    MalformedRecord { node: i64, reason: String },

    #[error("leaf node {node} has no observations (passed + failed == 0)")]
    DivisionByZero { node: i64 },

    #[error("node {0} is referenced more than once in the hierarchy")]
    CycleDetected(i64),

    #[error("node key does not belong to this tree")]
    UnknownNode,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
