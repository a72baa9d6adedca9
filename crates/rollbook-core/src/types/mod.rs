//! # Core Type Definitions
//!
//! Record identifiers and the error type shared by the whole workspace.
//!
//! Identifiers are the backend's primary keys. They serialize as bare JSON
//! integers so request payloads match what the backend expects for foreign
//! keys (`"course": 3`, `"student": 12`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// RECORD IDENTIFIERS
// =============================================================================

/// Primary key of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub u64);

/// Primary key of a class section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub u64);

/// Primary key of a student.
///
/// Not to be confused with `Student::student_id`, the human-facing student code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub u64);

/// Primary key of a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeId(pub u64);

macro_rules! display_as_integer {
    ($($id:ty),*) => {$(
        impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    )*};
}

display_as_integer!(CourseId, SectionId, StudentId, GradeId);

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while shaping records, forms and page state.
///
/// Network failures live in the app crate; nothing here talks to the backend.
#[derive(Debug, Error)]
pub enum RollbookError {
    /// The record is not part of the list the page last fetched.
    #[error("{resource} {id} is not in the current list")]
    RecordNotFound { resource: &'static str, id: String },

    /// A submit was attempted with no form open.
    #[error("No form is open")]
    EditorClosed,

    /// A grade operation needs a class section and none is selected.
    #[error("No class section selected")]
    NoSectionSelected,

    /// A form has no field with this name.
    #[error("Unknown field '{field}' (expected one of: {expected})")]
    UnknownField { field: String, expected: String },

    /// A decimal field from the backend could not be read.
    #[error("Invalid decimal value: {0:?}")]
    InvalidDecimal(String),
}

// =============================================================================
// TESTS
// =============================================================================
