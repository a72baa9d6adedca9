//! # rollbook-core
//!
//! Records, forms and page state for the Rollbook academic records client.
//!
//! Everything in here is a transient, refetchable copy of state owned by the
//! records backend. The crate does no I/O: the app layer fetches, this crate
//! shapes what was fetched and what will be sent.
//!
//! ## Modules
//!
//! - `types` → record identifiers and `RollbookError`
//! - `formats` → wire formats the backend uses (decimal strings)
//! - `records` → course, section, student and grade records plus request payloads
//! - `forms` → text-field form state and numeric coercion
//! - `gradebook` → bulk grade entry for one class section
//! - `view` → list view and modal editor state

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod forms;
pub mod gradebook;
pub mod records;
pub mod types;
pub mod view;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{CourseId, GradeId, RollbookError, SectionId, StudentId};

// =============================================================================
// RE-EXPORTS: Records & Payloads
// =============================================================================

pub use records::{
    ClassSection, Course, CoursePayload, EnrollRequest, Grade, GradePayload, Record,
    SectionPayload, Student, StudentGradeReport, StudentPayload,
};

// =============================================================================
// RE-EXPORTS: Forms, Grade Sheet, Page State
// =============================================================================

pub use forms::{
    CourseForm, EnrollForm, GradeForm, RecordForm, SectionForm, StudentForm, coerce_float,
    coerce_int,
};
pub use gradebook::{BulkGradeSheet, SCORE_MAX, SCORE_MIN, SCORE_STEP};
pub use view::{Editor, ListView};
