//! # Roster
//!
//! Student record management backed by a hand-written separate-chaining hash table.
//!
//! This crate provides:
//!
//! - `ChainedHashTable`: a text-keyed hash table using a polynomial rolling hash, chained
//!   buckets and load-factor driven growth
//! - `Roster`: the record layer (validation, upserts, search and sorting) built on top of it
//!
//! The table grows to `buckets * 2 + 1` whenever an insertion pushes the load factor above
//! 0.75, and never shrinks.
//!
//! ## Basic Usage
//!
//! ```rust
//! use roster::ChainedHashTable;
//!
//! // Create a table with five buckets
//! let mut table = ChainedHashTable::with_buckets(5)?;
//!
//! // Insert values
//! table.set("S1", "Ada");
//! table.set("S2", "Grace");
//!
//! // Retrieve values
//! assert_eq!(table.get("S1"), Some(&"Ada"));
//!
//! // Update values
//! table.set("S1", "Ada Lovelace");
//! assert_eq!(table.get("S1"), Some(&"Ada Lovelace"));
//! assert_eq!(table.len(), 2);
//!
//! // Remove values
//! assert!(table.remove("S1"));
//! assert_eq!(table.get("S1"), None);
//! # Ok::<(), roster::TableError>(())
//! ```
//!
//! ## Managing Records
//!
//! ```rust
//! use roster::{ListQuery, Roster, SortKey, StudentRecord, Upsert};
//!
//! let mut roster = Roster::with_buckets(17)?;
//! let ada = StudentRecord::from_fields("S1", "Ada", "20", "Senior", "Mathematics")?;
//! assert_eq!(roster.add(ada), Upsert::Added);
//!
//! let query = ListQuery { search: Some("math".into()), sort_by: SortKey::Name, ..Default::default() };
//! assert_eq!(roster.list(&query).len(), 1);
//! # Ok::<(), roster::RecordError>(())
//! ```

/// Module implementing the separate-chaining hash table
mod chained_table;
/// Session settings
pub mod config;
/// Error types
mod error;
/// Logger setup
pub mod logger;
/// The student record value type
mod record;
/// Record management on top of the table
mod roster;
/// Utility traits for the table
mod utils;

pub use chained_table::{ChainedHashTable, DEFAULT_BUCKETS, Iter, polynomial_hash};
pub use config::Config;
pub use error::{RecordError, TableError};
pub use record::{MAX_AGE, MIN_AGE, StudentRecord};
pub use roster::{ListQuery, Roster, SortKey, SortOrder, TableStats, Upsert};
pub use utils::TableExtensions;
