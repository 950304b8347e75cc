//! The student record stored in the roster

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RecordError;

/// Youngest accepted age
pub const MIN_AGE: u8 = 1;
/// Oldest accepted age
pub const MAX_AGE: u8 = 120;

/// One student. `id` doubles as the table key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Unique student id
    pub id: String,
    /// Full name
    pub name: String,
    /// Age in years, within `MIN_AGE..=MAX_AGE`
    pub age: u8,
    /// Academic grade or level
    pub grade: String,
    /// Major or department
    pub major: String,
}

impl StudentRecord {
    /// Builds a record from raw text fields as typed by a user.
    ///
    /// Every field is trimmed and must be non-empty; `age` must parse as an integer in
    /// `1..=120`.
    ///
    /// # Errors
    ///
    /// [`RecordError::MissingField`] names the first empty field, [`RecordError::InvalidAge`]
    /// carries the rejected age text.
    pub fn from_fields(
        id: &str,
        name: &str,
        age: &str,
        grade: &str,
        major: &str,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            id: required("student_id", id)?,
            name: required("name", name)?,
            age: parse_age(age)?,
            grade: required("grade", grade)?,
            major: required("major", major)?,
        })
    }

    /// True if `term` occurs in any text field, ignoring case, or equals the age.
    ///
    /// `term` must already be lowercase.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        [&self.id, &self.name, &self.grade, &self.major]
            .iter()
            .any(|field| field.to_lowercase().contains(term)) ||
            self.age.to_string() == term
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10} {:<20} {:>3} {:<12} {}", self.id, self.name, self.age, self.grade, self.major)
    }
}

/// Trims `value`, rejecting it when nothing is left
fn required(field: &'static str, value: &str) -> Result<String, RecordError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RecordError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Parses an age within `MIN_AGE..=MAX_AGE`
fn parse_age(value: &str) -> Result<u8, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::MissingField("age"));
    }

    trimmed
        .parse::<u8>()
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
        .ok_or_else(|| RecordError::InvalidAge(trimmed.to_string()))
}
