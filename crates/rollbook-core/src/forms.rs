//! # Forms
//!
//! Form state for the create/edit dialogs. Every field is held as the raw
//! text a form control would hold; numbers are only coerced when the request
//! body is built.
//!
//! ## Coercion
//!
//! Numeric fields use prefix coercion: leading whitespace is skipped and the
//! longest numeric prefix is read, so `"48.9"` is 48 as an integer and
//! `"3.5kg"` is 3.5 as a float. Text with no numeric prefix coerces to `None`
//! and is sent as `null`. Nothing is range-checked.

use crate::formats::format_decimal;
use crate::records::{
    ClassSection, Course, CoursePayload, EnrollRequest, Grade, GradePayload, Record,
    SectionPayload, Student, StudentPayload,
};
use crate::{CourseId, RollbookError, SectionId, StudentId};
use serde::Serialize;

// =============================================================================
// COERCION
// =============================================================================

/// Length of the optionally signed run of ASCII digits at the start of `s`,
/// or `None` if there are no digits.
fn signed_digits_len(s: &[u8]) -> Option<usize> {
    let sign = usize::from(matches!(s.first(), Some(b'+' | b'-')));
    let digits = s[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    (digits > 0).then_some(sign + digits)
}

/// Coerce form text to an integer.
pub fn coerce_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let end = signed_digits_len(s.as_bytes())?;
    s[..end].parse().ok()
}

/// Coerce form text to a float.
pub fn coerce_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // An exponent only counts when digits follow it.
    if matches!(bytes.get(end), Some(b'e' | b'E'))
        && let Some(exp_len) = signed_digits_len(&bytes[end + 1..])
    {
        end += 1 + exp_len;
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// FORM TRAIT
// =============================================================================

/// A create/edit dialog's field state for one record type.
///
/// `Default` is the blank form shown for "create".
pub trait RecordForm: Clone + Default {
    type Record: Record;
    type Payload: Serialize;

    /// Field names accepted by [`RecordForm::set_field`], in display order.
    const FIELDS: &'static [&'static str];

    /// Empty form for "create".
    fn blank() -> Self {
        Self::default()
    }

    /// Form pre-filled with every field of an existing record.
    fn from_record(record: &Self::Record) -> Self;

    /// Request body built from the current field text.
    fn to_payload(&self) -> Self::Payload;

    /// Mutable handle to a field by name.
    fn field_mut(&mut self, name: &str) -> Option<&mut String>;

    /// Replace one field's text.
    fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), RollbookError> {
        match self.field_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(RollbookError::UnknownField {
                field: name.to_string(),
                expected: Self::FIELDS.join(", "),
            }),
        }
    }
}

// =============================================================================
// COURSE FORM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseForm {
    pub course_id: String,
    pub course_name: String,
    pub credits: String,
    pub hours: String,
}

impl RecordForm for CourseForm {
    type Record = Course;
    type Payload = CoursePayload;

    const FIELDS: &'static [&'static str] = &["course_id", "course_name", "credits", "hours"];

    fn from_record(course: &Course) -> Self {
        Self {
            course_id: course.course_id.clone(),
            course_name: course.course_name.clone(),
            credits: format_decimal(course.credits),
            hours: course.hours.to_string(),
        }
    }

    fn to_payload(&self) -> CoursePayload {
        CoursePayload {
            course_id: self.course_id.clone(),
            course_name: self.course_name.clone(),
            credits: coerce_float(&self.credits),
            hours: coerce_int(&self.hours),
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "course_id" => Some(&mut self.course_id),
            "course_name" => Some(&mut self.course_name),
            "credits" => Some(&mut self.credits),
            "hours" => Some(&mut self.hours),
            _ => None,
        }
    }
}

// =============================================================================
// SECTION FORM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionForm {
    pub section_id: String,
    pub section_name: String,
    pub semester: String,
    pub location: String,
    /// Selected course primary key, as text.
    pub course: String,
}

impl RecordForm for SectionForm {
    type Record = ClassSection;
    type Payload = SectionPayload;

    const FIELDS: &'static [&'static str] =
        &["section_id", "section_name", "semester", "location", "course"];

    fn from_record(section: &ClassSection) -> Self {
        Self {
            section_id: section.section_id.clone(),
            section_name: section.section_name.clone(),
            semester: section.semester.clone(),
            location: section.location.clone(),
            course: section.course.to_string(),
        }
    }

    fn to_payload(&self) -> SectionPayload {
        SectionPayload {
            section_id: self.section_id.clone(),
            section_name: self.section_name.clone(),
            semester: self.semester.clone(),
            location: self.location.clone(),
            course: coerce_id(&self.course).map(CourseId),
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "section_id" => Some(&mut self.section_id),
            "section_name" => Some(&mut self.section_name),
            "semester" => Some(&mut self.semester),
            "location" => Some(&mut self.location),
            "course" => Some(&mut self.course),
            _ => None,
        }
    }
}

// =============================================================================
// STUDENT FORM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub student_id: String,
    pub name: String,
}

impl RecordForm for StudentForm {
    type Record = Student;
    type Payload = StudentPayload;

    const FIELDS: &'static [&'static str] = &["student_id", "name"];

    fn from_record(student: &Student) -> Self {
        Self {
            student_id: student.student_id.clone(),
            name: student.name.clone(),
        }
    }

    fn to_payload(&self) -> StudentPayload {
        StudentPayload {
            student_id: self.student_id.clone(),
            name: self.name.clone(),
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "student_id" => Some(&mut self.student_id),
            "name" => Some(&mut self.name),
            _ => None,
        }
    }
}

// =============================================================================
// GRADE FORM
// =============================================================================

/// Single-grade dialog. Bulk entry uses `BulkGradeSheet` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeForm {
    pub student: String,
    pub class_section: String,
    pub score: String,
}

impl RecordForm for GradeForm {
    type Record = Grade;
    type Payload = GradePayload;

    const FIELDS: &'static [&'static str] = &["student", "class_section", "score"];

    fn from_record(grade: &Grade) -> Self {
        Self {
            student: grade.student.to_string(),
            class_section: grade.class_section.to_string(),
            score: format_decimal(grade.score),
        }
    }

    fn to_payload(&self) -> GradePayload {
        GradePayload {
            student: coerce_id(&self.student).map(StudentId),
            class_section: coerce_id(&self.class_section).map(SectionId),
            score: coerce_float(&self.score),
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "student" => Some(&mut self.student),
            "class_section" => Some(&mut self.class_section),
            "score" => Some(&mut self.score),
            _ => None,
        }
    }
}

// =============================================================================
// ENROLL FORM
// =============================================================================

/// Enrollment dialog: a chosen student and a section picked from a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollForm {
    pub student: Option<StudentId>,
    /// Selected section primary key, as text. Empty until a section is picked.
    pub class_section: String,
}

impl EnrollForm {
    pub fn for_student(student: StudentId) -> Self {
        Self {
            student: Some(student),
            class_section: String::new(),
        }
    }

    /// The enroll request, or `None` while the student or section is missing.
    pub fn to_request(&self) -> Option<EnrollRequest> {
        let student = self.student?;
        let class_section = coerce_id(&self.class_section).map(SectionId)?;
        Some(EnrollRequest {
            student,
            class_section,
        })
    }
}

/// Primary keys are never negative; a negative selection is treated as none.
fn coerce_id(text: &str) -> Option<u64> {
    coerce_int(text).and_then(|v| u64::try_from(v).ok())
}

// =============================================================================
// TESTS
// =============================================================================
