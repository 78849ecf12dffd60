//! Application-level errors (wraps domain and tree view errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Programmer errors raised by a tree view or its row delegate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeViewError {
    /// A column index reached a code path that has no handling for it.
    #[error("column {0} is not implemented by this view")]
    ColumnNotImplemented(usize),
}

/// Result type for tree view operations.
pub type TreeViewResult<T> = Result<T, TreeViewError>;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    TreeView(#[from] TreeViewError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
