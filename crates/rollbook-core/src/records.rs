//! # Records & Payloads
//!
//! Mirrors of the four backend resources and the request bodies sent to
//! create or update them.
//!
//! Records carry the denormalized display names the backend attaches
//! (`course_name` on a section, `student_name` on a grade). Those names are
//! read-only: payloads never include them.
//!
//! Payload numbers are `Option`. A form value that does not coerce to a number
//! goes out as JSON `null` and the backend decides what to do with it.

use crate::formats::decimal;
use crate::{CourseId, GradeId, SectionId, StudentId};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

// =============================================================================
// RECORD TRAIT
// =============================================================================

/// A row fetched from one of the backend's list endpoints.
pub trait Record: Clone {
    /// Typed primary key.
    type Id: Copy + Eq + Display;

    /// Singular noun used in prompts and log lines.
    const NOUN: &'static str;

    fn id(&self) -> Self::Id;

    /// Short human description for prompts, e.g. `CS101 Intro`.
    fn label(&self) -> String;
}

// =============================================================================
// COURSE
// =============================================================================

/// A course in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    /// Human course code, e.g. `CS101`.
    pub course_id: String,
    pub course_name: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub credits: f64,
    /// Contact hours.
    pub hours: i64,
}

impl Record for Course {
    type Id = CourseId;
    const NOUN: &'static str = "course";

    fn id(&self) -> CourseId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}", self.course_id, self.course_name)
    }
}

/// Create/update body for a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePayload {
    pub course_id: String,
    pub course_name: String,
    pub credits: Option<f64>,
    pub hours: Option<i64>,
}

// =============================================================================
// CLASS SECTION
// =============================================================================

/// A scheduled offering of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSection {
    pub id: SectionId,
    pub section_id: String,
    pub section_name: String,
    pub semester: String,
    pub location: String,
    pub course: CourseId,
    #[serde(default)]
    pub course_name: String,
}

impl ClassSection {
    /// Label used by section pickers: `"<course> - <section>"`.
    pub fn picker_label(&self) -> String {
        format!("{} - {}", self.course_name, self.section_name)
    }
}

impl Record for ClassSection {
    type Id = SectionId;
    const NOUN: &'static str = "section";

    fn id(&self) -> SectionId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}", self.section_id, self.picker_label())
    }
}

/// Create/update body for a class section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPayload {
    pub section_id: String,
    pub section_name: String,
    pub semester: String,
    pub location: String,
    pub course: Option<CourseId>,
}

// =============================================================================
// STUDENT
// =============================================================================

/// A student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// Student code printed on rosters.
    pub student_id: String,
    pub name: String,
}

impl Record for Student {
    type Id = StudentId;
    const NOUN: &'static str = "student";

    fn id(&self) -> StudentId {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}", self.student_id, self.name)
    }
}

/// Create/update body for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPayload {
    pub student_id: String,
    pub name: String,
}

/// Body of `POST /students/enroll/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollRequest {
    pub student: StudentId,
    pub class_section: SectionId,
}

/// A student together with every grade they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGradeReport {
    pub id: StudentId,
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub grades: Vec<Grade>,
}

// =============================================================================
// GRADE
// =============================================================================

/// One student's score in one class section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub student: StudentId,
    #[serde(default)]
    pub student_name: String,
    pub class_section: SectionId,
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub score: f64,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Record for Grade {
    type Id = GradeId;
    const NOUN: &'static str = "grade";

    fn id(&self) -> GradeId {
        self.id
    }

    fn label(&self) -> String {
        format!(
            "{} in {} - {} ({})",
            self.student_name,
            self.course_name,
            self.section_name,
            crate::formats::format_decimal(self.score)
        )
    }
}

/// Create/update body for a grade; also one element of a bulk batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradePayload {
    pub student: Option<StudentId>,
    pub class_section: Option<SectionId>,
    pub score: Option<f64>,
}

// =============================================================================
// TESTS
// =============================================================================
