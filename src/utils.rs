//! Utility functions and traits for `ChainedHashTable`

use crate::ChainedHashTable;

/// Extension trait for tables that provides additional utility methods
pub trait TableExtensions<V> {
    /// Returns the keys of the table as a Vec, in bucket order
    fn keys(&self) -> Vec<String>;

    /// Returns clones of the values of the table as a Vec, in bucket order
    fn values(&self) -> Vec<V>;

    /// Returns the length of the longest chain, zero for an empty table
    fn longest_chain(&self) -> usize;
}

impl<V> TableExtensions<V> for ChainedHashTable<V>
where
    V: Clone,
{
    fn keys(&self) -> Vec<String> {
        self.iter().map(|(k, _)| k.to_string()).collect()
    }

    fn values(&self) -> Vec<V> {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    fn longest_chain(&self) -> usize {
        self.chain_lengths().into_iter().max().unwrap_or(0)
    }
}
