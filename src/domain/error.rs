//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid rule or view-state data.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid view state: {message}")]
    InvalidState { message: String },

    #[error("invalid rules file: {message}")]
    InvalidRules { message: String },

    #[error("rule not found: {0}")]
    RuleNotFound(String),

    #[error("rule name must not be empty")]
    EmptyRuleName,
}
