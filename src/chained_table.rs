use std::{mem, slice};

use log::debug;

use crate::TableError;

/// Bucket count used by [`ChainedHashTable::new`]
pub const DEFAULT_BUCKETS: usize = 17;

/// Multiplier of the polynomial rolling hash
const HASH_BASE: u128 = 53;

/// Subtracted from every code point before it is weighted
const CHAR_OFFSET: i128 = 31;

/// Growth is triggered once `size / buckets` exceeds `NUMERATOR / DENOMINATOR`
const LOAD_FACTOR_NUMERATOR: usize = 3;
/// See [`LOAD_FACTOR_NUMERATOR`]
const LOAD_FACTOR_DENOMINATOR: usize = 4;

/// Computes the bucket index of `key` for a table of `buckets` slots.
///
/// The hash is a polynomial over the key's code points, `sum((c - 31) * 53^i) mod buckets`,
/// evaluated with floor modulo so that control characters (code point below 31) still land in
/// `0..buckets`. The result only depends on `key` and `buckets`.
///
/// Returns `None` when `buckets` is zero.
///
/// ```rust
/// use roster::polynomial_hash;
///
/// assert_eq!(polynomial_hash("S1", 5), Some(1));
/// assert_eq!(polynomial_hash("anything", 1), Some(0));
/// assert_eq!(polynomial_hash("S1", 0), None);
/// ```
#[must_use]
#[allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn polynomial_hash(key: &str, buckets: usize) -> Option<usize> {
    if buckets == 0 {
        return None;
    }

    // Every operand stays below `modulus`, so products fit in 128 bits for any usize modulus
    let modulus = buckets as u128;
    let mut hash: u128 = 0;
    let mut power: u128 = 1;

    for ch in key.chars() {
        let term = (i128::from(u32::from(ch)) - CHAR_OFFSET).rem_euclid(modulus as i128) as u128;
        hash = (hash + term * power) % modulus;
        power = (power * HASH_BASE) % modulus;
    }

    Some((hash % modulus) as usize)
}

/// A single key-value pair stored in a chain
#[derive(Debug, Clone)]
struct Entry<V> {
    /// The key, unique across the whole table
    key: String,
    /// The value associated with the key
    value: V,
}

/// A chain of entries sharing one hash slot, kept in insertion order
type Chain<V> = Vec<Entry<V>>;

/// A hash table keyed by text that resolves collisions by separate chaining.
///
/// Every bucket is a chain of entries in insertion order. Inserting a new key that pushes the
/// load factor above 0.75 grows the table to `buckets * 2 + 1` and rehashes every entry once.
/// The table never shrinks.
///
/// Values are handed out as shared or exclusive borrows; nothing outside the table can hold on
/// to a chain.
///
/// Note: This implementation is not thread-safe. Wrap it in a lock if several threads need it.
#[derive(Debug, Clone)]
pub struct ChainedHashTable<V> {
    /// The chains; the length is the bucket count and is never zero
    buckets: Vec<Chain<V>>,
    /// Current number of entries across all chains
    size: usize,
}

impl<V> Default for ChainedHashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Extend<(K, V)> for ChainedHashTable<V>
where
    K: Into<String>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashTable<V>
where
    K: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<V> ChainedHashTable<V> {
    /// Creates an empty table with [`DEFAULT_BUCKETS`] buckets
    #[must_use]
    pub fn new() -> Self {
        Self { buckets: Self::empty_chains(DEFAULT_BUCKETS), size: 0 }
    }

    /// Creates an empty table with exactly `buckets` buckets.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfiguration`] when `buckets` is zero.
    pub fn with_buckets(buckets: usize) -> Result<Self, TableError> {
        if buckets == 0 {
            return Err(TableError::InvalidConfiguration { buckets });
        }

        Ok(Self { buckets: Self::empty_chains(buckets), size: 0 })
    }

    /// Allocates `count` empty chains
    fn empty_chains(count: usize) -> Vec<Chain<V>> {
        let mut chains = Vec::with_capacity(count);
        chains.resize_with(count, Vec::new);
        chains
    }

    /// Returns the bucket `key` currently hashes to
    #[must_use]
    pub fn bucket_index(&self, key: &str) -> usize {
        polynomial_hash(key, self.buckets.len()).unwrap_or(0)
    }

    /// Inserts or replaces the value stored under `key`.
    ///
    /// Returns the replaced value when the key was already present. Only insertions of new keys
    /// can grow the table.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let previous = self.place(key.into(), value);

        if previous.is_none() && self.exceeds_load_factor() {
            let grown = self.buckets.len().saturating_mul(2).saturating_add(1);
            self.resize(grown);
        }

        previous
    }

    /// Puts the pair into its chain without checking the load factor
    fn place(&mut self, key: String, value: V) -> Option<V> {
        let index = self.bucket_index(&key);
        let chain = self.buckets.get_mut(index)?;

        if let Some(entry) = chain.iter_mut().find(|entry| entry.key == key) {
            return Some(mem::replace(&mut entry.value, value));
        }

        chain.push(Entry { key, value });
        self.size = self.size.saturating_add(1);
        None
    }

    /// True once `size / buckets > 0.75`, compared without rounding
    fn exceeds_load_factor(&self) -> bool {
        self.size.saturating_mul(LOAD_FACTOR_DENOMINATOR) >
            self.buckets.len().saturating_mul(LOAD_FACTOR_NUMERATOR)
    }

    /// Rehashes every entry into `new_bucket_count` fresh chains.
    ///
    /// Entries are re-placed without the load factor check: `old * 2 + 1` buckets always leave
    /// the table below the threshold, so a resize never cascades.
    fn resize(&mut self, new_bucket_count: usize) {
        let old_chains = mem::replace(&mut self.buckets, Self::empty_chains(new_bucket_count));
        let old_bucket_count = old_chains.len();
        self.size = 0;

        for entry in old_chains.into_iter().flatten() {
            self.place(entry.key, entry.value);
        }

        debug!(
            "Resized table from {old_bucket_count} to {new_bucket_count} buckets with {} entries",
            self.size
        );
    }

    /// Retrieves the value stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.buckets
            .get(self.bucket_index(key))?
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Retrieves a mutable reference to the value stored under `key`
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.bucket_index(key);
        self.buckets
            .get_mut(index)?
            .iter_mut()
            .find(|entry| entry.key == key)
            .map(|entry| &mut entry.value)
    }

    /// Returns true if a value is stored under `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key` and hands back its value.
    ///
    /// The remaining entries of the chain keep their relative order.
    pub fn take(&mut self, key: &str) -> Option<V> {
        let index = self.bucket_index(key);
        let chain = self.buckets.get_mut(index)?;
        let position = chain.iter().position(|entry| entry.key == key)?;
        let entry = chain.remove(position);
        self.size = self.size.saturating_sub(1);
        Some(entry.value)
    }

    /// Removes `key`, returning whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        self.take(key).is_some()
    }

    /// Snapshot of every stored value.
    ///
    /// Values come out in bucket order, then insertion order within a bucket. That order follows
    /// from hash placement; callers that need a specific order must sort.
    #[must_use]
    pub fn items(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Returns an iterator over the key-value pairs in bucket order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { chains: self.buckets.iter(), chain: slice::Iter::default(), remaining: self.size }
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `len / bucket_count`
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    /// Returns the length of every chain, indexed by bucket
    #[must_use]
    pub fn chain_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    /// Drops every entry and keeps the current bucket count
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.size = 0;
    }
}

impl<'a, V> IntoIterator for &'a ChainedHashTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the key-value pairs of a [`ChainedHashTable`]
#[derive(Debug, Clone)]
pub struct Iter<'a, V> {
    /// Chains not yet visited
    chains: slice::Iter<'a, Chain<V>>,
    /// Entries left in the current chain
    chain: slice::Iter<'a, Entry<V>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((entry.key.as_str(), &entry.value));
            }
            self.chain = self.chains.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Student {
        name: String,
        department: String,
        gpa: f64,
    }

    fn student(name: &str, department: &str, gpa: f64) -> Student {
        Student { name: name.to_string(), department: department.to_string(), gpa }
    }

    #[test]
    fn test_hash_known_values() {
        assert_eq!(polynomial_hash("S1", 5), Some(1));
        assert_eq!(polynomial_hash("ab", 17), Some(13));
        assert_eq!(polynomial_hash("", 17), Some(0));
        // '\t' weighs 9 - 31 = -22, and -22 mod 7 is 6
        assert_eq!(polynomial_hash("\t", 7), Some(6));
    }

    #[test]
    fn test_hash_is_deterministic_and_in_range() {
        for buckets in [1, 2, 3, 17, 35, 1021] {
            for key in ["S1", "student-42", "Ünïcödé", "\u{0}\u{1}", "🦀"] {
                let first = polynomial_hash(key, buckets);
                assert_eq!(first, polynomial_hash(key, buckets));
                assert!(first.is_some_and(|index| index < buckets));
            }
        }
    }

    #[test]
    fn test_zero_buckets_rejected() {
        assert_eq!(polynomial_hash("S1", 0), None);
        assert_eq!(
            ChainedHashTable::<i32>::with_buckets(0).err(),
            Some(TableError::InvalidConfiguration { buckets: 0 })
        );
    }

    #[test]
    fn test_default_bucket_count() {
        let table: ChainedHashTable<i32> = ChainedHashTable::new();
        assert_eq!(table.bucket_count(), DEFAULT_BUCKETS);
        assert!(table.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut table = ChainedHashTable::with_buckets(5).unwrap();
        table.set("S1", student("A", "CS", 8.0));

        assert_eq!(table.get("S1").map(|s| s.name.as_str()), Some("A"));
        assert!(table.contains("S1"));
        assert!(!table.contains("S2"));
        assert_eq!(table.get("S2"), None);
    }

    #[test]
    fn test_update_value() {
        let mut table = ChainedHashTable::with_buckets(5).unwrap();
        assert_eq!(table.set("S1", student("A", "CS", 8.0)), None);
        let replaced = table.set("S1", student("B", "IT", 9.0));

        assert_eq!(replaced, Some(student("A", "CS", 8.0)));
        let value = table.get("S1").unwrap();
        assert_eq!(value.name, "B");
        assert_eq!(value.department, "IT");
        assert!((value.gpa - 9.0).abs() < f64::EPSILON);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut table = ChainedHashTable::with_buckets(5).unwrap();
        table.set("S1", student("A", "CS", 8.0));

        assert!(table.remove("S1"));
        assert_eq!(table.get("S1"), None);
        assert!(!table.remove("S1"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_missing_leaves_table_unchanged() {
        let mut table = ChainedHashTable::with_buckets(5).unwrap();
        table.set("S1", 1);
        table.set("S2", 2);

        assert!(!table.remove("S3"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.bucket_count(), 5);
    }

    #[test]
    fn test_resize_load_factor() {
        let mut table = ChainedHashTable::with_buckets(3).unwrap();
        for i in 0..10 {
            table.set(format!("S{i}"), student(&format!("N{i}"), "CS", 7.5));
        }

        assert_eq!(table.len(), 10);
        assert!(table.bucket_count() > 3);
        // 3 -> 7 at the third key, 7 -> 15 at the sixth
        assert_eq!(table.bucket_count(), 15);
        for i in 0..10 {
            assert_eq!(table.get(&format!("S{i}")).map(|s| s.name.clone()), Some(format!("N{i}")));
        }
    }

    #[test]
    fn test_resize_happens_exactly_once() {
        let mut table = ChainedHashTable::with_buckets(4).unwrap();
        table.set("a", 1);
        table.set("b", 2);
        table.set("c", 3);
        assert_eq!(table.bucket_count(), 4);

        // 4 / 4 > 0.75, a cascade would go past 9
        table.set("d", 4);
        assert_eq!(table.bucket_count(), 9);
        assert!(table.load_factor() <= 0.75);
        assert_eq!(table.chain_lengths().iter().sum::<usize>(), 4);
    }

    #[test]
    fn test_update_never_resizes() {
        let mut table = ChainedHashTable::with_buckets(4).unwrap();
        for key in ["a", "b", "c"] {
            table.set(key, 0);
        }
        for round in 0..10 {
            table.set("a", round);
        }

        assert_eq!(table.bucket_count(), 4);
        assert_eq!(table.get("a"), Some(&9));
    }

    #[test]
    fn test_remove_never_shrinks() {
        let mut table = ChainedHashTable::with_buckets(3).unwrap();
        for i in 0..10 {
            table.set(format!("S{i}"), i);
        }
        for i in 0..10 {
            assert!(table.remove(&format!("S{i}")));
        }

        assert!(table.is_empty());
        assert_eq!(table.bucket_count(), 15);
    }

    #[test]
    fn test_single_bucket_collisions() {
        let mut table = ChainedHashTable::with_buckets(1).unwrap();
        assert_eq!(table.bucket_index("S1"), 0);
        assert_eq!(table.bucket_index("S2"), 0);

        for i in 0..20 {
            table.set(format!("S{i}"), i);
        }
        assert_eq!(table.len(), 20);
        for i in 0..20 {
            assert_eq!(table.get(&format!("S{i}")), Some(&i));
        }

        assert!(table.remove("S7"));
        assert!(!table.remove("S7"));
        assert_eq!(table.get("S7"), None);
        assert_eq!(table.len(), 19);
    }

    #[test]
    fn test_chain_keeps_order_after_remove() {
        let mut table = ChainedHashTable::with_buckets(100).unwrap();
        // All three land in one chain of a table large enough not to grow
        let keys: Vec<String> = (0..1000)
            .map(|i| format!("k{i}"))
            .filter(|key| table.bucket_index(key) == 0)
            .take(3)
            .collect();
        assert_eq!(keys.len(), 3);

        for (i, key) in keys.iter().enumerate() {
            table.set(key.as_str(), i);
        }
        assert!(table.remove(&keys[1]));

        let order: Vec<&str> = table.iter().map(|(key, _)| key).collect();
        assert_eq!(order, vec![keys[0].as_str(), keys[2].as_str()]);
    }

    #[test]
    fn test_items_in_bucket_order() {
        let mut table = ChainedHashTable::with_buckets(17).unwrap();
        for i in 0..8 {
            table.set(format!("S{i}"), i);
        }

        let mut expected: Vec<(usize, i32)> =
            (0..8).map(|i| (table.bucket_index(&format!("S{i}")), i)).collect();
        expected.sort_by_key(|&(bucket, _)| bucket);

        let items: Vec<i32> = table.items().into_iter().copied().collect();
        assert_eq!(items, expected.into_iter().map(|(_, value)| value).collect::<Vec<_>>());
        assert_eq!(table.iter().len(), 8);
    }

    #[test]
    fn test_iter_empty_and_after_clear() {
        let mut table: ChainedHashTable<i32> = ChainedHashTable::new();
        assert_eq!(table.iter().len(), 0);
        assert_eq!(table.iter().next(), None);

        table.set("S1", 1);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![("S1", &1)]);

        table.clear();
        assert_eq!(table.iter().next(), None);
        assert!(table.items().is_empty());
    }

    #[test]
    fn test_get_mut() {
        let mut table = ChainedHashTable::new();
        table.set("S1", 1);

        if let Some(value) = table.get_mut("S1") {
            *value += 10;
        }

        assert_eq!(table.get("S1"), Some(&11));
        assert_eq!(table.get_mut("S2"), None);
    }

    #[test]
    fn test_take() {
        let mut table = ChainedHashTable::new();
        table.set("S1", "value".to_string());

        assert_eq!(table.take("S1"), Some("value".to_string()));
        assert_eq!(table.take("S1"), None);
    }

    #[test]
    fn test_clear() {
        let mut table = ChainedHashTable::with_buckets(3).unwrap();
        for i in 0..5 {
            table.set(format!("S{i}"), i);
        }
        let buckets = table.bucket_count();

        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.bucket_count(), buckets);
        assert_eq!(table.get("S1"), None);
    }

    #[test]
    fn test_from_iter_and_extend() {
        let mut table: ChainedHashTable<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        table.extend(vec![("c".to_string(), 3), ("a".to_string(), 10)]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("a"), Some(&10));
        assert_eq!(table.get("c"), Some(&3));
    }

    #[test]
    fn test_case_sensitive_keys() {
        let mut table = ChainedHashTable::new();
        table.set("s1", 1);
        table.set("S1", 2);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("s1"), Some(&1));
        assert_eq!(table.get("S1"), Some(&2));
    }
}
