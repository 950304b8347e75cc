//! Record management over a [`ChainedHashTable`]
//!
//! The roster is the only caller of the table in this crate. It validates input, turns lookup
//! misses into [`RecordError::NotFound`], and layers search and sorting on top of the table's
//! unordered enumeration.

use std::{cmp::Ordering, str::FromStr};

use log::info;

use crate::{ChainedHashTable, RecordError, StudentRecord};

/// Field a listing is sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Student id, case-sensitive
    #[default]
    Id,
    /// Name, ignoring case
    Name,
    /// Age, numerically
    Age,
    /// Grade, case-sensitive
    Grade,
    /// Major, ignoring case
    Major,
}

impl SortKey {
    /// Parses a sort key, falling back to [`SortKey::Id`] for anything unknown
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Compares two records on this field
    fn compare(self, a: &StudentRecord, b: &StudentRecord) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Age => a.age.cmp(&b.age),
            Self::Grade => a.grade.cmp(&b.grade),
            Self::Major => a.major.to_lowercase().cmp(&b.major.to_lowercase()),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" | "student_id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "age" => Ok(Self::Age),
            "grade" => Ok(Self::Grade),
            "major" => Ok(Self::Major),
            other => Err(format!("unknown sort key {other:?}")),
        }
    }
}

/// Direction of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl SortOrder {
    /// `"desc"` is descending, anything else ascending
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        if value == "desc" { Self::Descending } else { Self::Ascending }
    }
}

/// Filter and ordering for [`Roster::list`]
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Optional search term; blank means no filtering
    pub search: Option<String>,
    /// Field to sort by
    pub sort_by: SortKey,
    /// Sort direction
    pub order: SortOrder,
}

/// Whether [`Roster::add`] inserted or replaced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No record existed under the id
    Added,
    /// An existing record was replaced
    Updated,
}

/// Size figures of the backing table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    /// Stored records
    pub size: usize,
    /// Buckets in the table
    pub buckets: usize,
    /// `size / buckets`
    pub load_factor: f64,
}

/// In-memory student roster keyed by student id
#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// Records keyed by id
    table: ChainedHashTable<StudentRecord>,
}

impl Roster {
    /// Creates an empty roster whose table starts with `buckets` buckets.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Table`] when `buckets` is zero.
    pub fn with_buckets(buckets: usize) -> Result<Self, RecordError> {
        Ok(Self { table: ChainedHashTable::with_buckets(buckets)? })
    }

    /// Stores `record`, replacing any record with the same id
    pub fn add(&mut self, record: StudentRecord) -> Upsert {
        let id = record.id.clone();
        if self.table.set(id.as_str(), record).is_some() {
            info!("Updated student_id={id}");
            Upsert::Updated
        } else {
            info!("Added student_id={id}");
            Upsert::Added
        }
    }

    /// Replaces the fields of an existing record, keeping its id.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`] if no record has `id`, otherwise any validation error of
    /// [`StudentRecord::from_fields`].
    pub fn edit(
        &mut self,
        id: &str,
        name: &str,
        age: &str,
        grade: &str,
        major: &str,
    ) -> Result<(), RecordError> {
        let id = id.trim();
        if !self.table.contains(id) {
            return Err(RecordError::NotFound(id.to_string()));
        }

        let record = StudentRecord::from_fields(id, name, age, grade, major)?;
        self.table.set(id, record);
        info!("Edited student_id={id}");
        Ok(())
    }

    /// Looks up the record stored under `id`.
    ///
    /// # Errors
    ///
    /// [`RecordError::MissingField`] for a blank id, [`RecordError::NotFound`] on a miss.
    pub fn find(&self, id: &str) -> Result<&StudentRecord, RecordError> {
        let id = non_blank_id(id)?;
        let record = self.table.get(id).ok_or_else(|| RecordError::NotFound(id.to_string()))?;
        info!("Searched student_id={id} found=true");
        Ok(record)
    }

    /// Deletes the record stored under `id`.
    ///
    /// # Errors
    ///
    /// [`RecordError::MissingField`] for a blank id, [`RecordError::NotFound`] on a miss.
    pub fn delete(&mut self, id: &str) -> Result<(), RecordError> {
        let id = non_blank_id(id)?;
        if !self.table.remove(id) {
            return Err(RecordError::NotFound(id.to_string()));
        }
        info!("Deleted student_id={id}");
        Ok(())
    }

    /// Returns the records matching `query.search`, sorted as requested
    #[must_use]
    pub fn list(&self, query: &ListQuery) -> Vec<StudentRecord> {
        let term = query.search.as_deref().map(str::trim).unwrap_or_default().to_lowercase();

        let mut records: Vec<StudentRecord> = self
            .table
            .items()
            .into_iter()
            .filter(|record| term.is_empty() || record.matches(&term))
            .cloned()
            .collect();

        // Stable in both directions, ties keep table order
        records.sort_by(|a, b| match query.order {
            SortOrder::Ascending => query.sort_by.compare(a, b),
            SortOrder::Descending => query.sort_by.compare(b, a),
        });
        records
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True if no record is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Size, bucket count and load factor of the backing table
    #[must_use]
    pub fn stats(&self) -> TableStats {
        TableStats {
            size: self.table.len(),
            buckets: self.table.bucket_count(),
            load_factor: self.table.load_factor(),
        }
    }
}

/// Trims `id`, rejecting a blank one
fn non_blank_id(id: &str) -> Result<&str, RecordError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(RecordError::MissingField("student_id"));
    }
    Ok(id)
}
