//! Error types for the table and the record layer

use thiserror::Error;

/// Failures raised while building a [`ChainedHashTable`](crate::ChainedHashTable).
///
/// Lookup misses are not errors: they surface as `None` or `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The requested bucket count cannot hold any entry.
    #[error("bucket count must be positive, got {buckets}")]
    InvalidConfiguration {
        /// The rejected bucket count
        buckets: usize,
    },
}

/// Failures raised by [`Roster`](crate::Roster) operations and record validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required field was empty after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// Age was not an integer in `1..=120`.
    #[error("age must be a valid positive integer, got {0:?}")]
    InvalidAge(String),
    /// No record is stored under the id.
    #[error("no student found with ID {0}")]
    NotFound(String),
    /// The backing table could not be built.
    #[error(transparent)]
    Table(#[from] TableError),
}
