//! # Bulk Grade Entry
//!
//! Score edits for one class section, collected into a single batch write.
//!
//! The sheet holds one score control per student, keyed by student primary
//! key. It starts from the section's existing grades and edits replace
//! control text. Submitting turns each visible student whose control was
//! changed to something non-blank into one `GradePayload`; untouched
//! pre-filled scores are already stored and are not sent again. The batch is
//! sent as a whole and the backend's answer is all-or-nothing from the
//! client's side. Nothing is validated: the range constants below are display
//! hints only.

use crate::forms::coerce_float;
use crate::formats::format_decimal;
use crate::records::{Grade, GradePayload, Student};
use crate::{SectionId, StudentId};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Lowest score the score control suggests.
pub const SCORE_MIN: f64 = 0.0;

/// Highest score the score control suggests.
pub const SCORE_MAX: f64 = 100.0;

/// Step of the score control.
pub const SCORE_STEP: f64 = 0.1;

// =============================================================================
// BULK GRADE SHEET
// =============================================================================

/// Editable scores for one class section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkGradeSheet {
    section: SectionId,
    scores: BTreeMap<StudentId, String>,
    prefilled: BTreeMap<StudentId, String>,
}

impl BulkGradeSheet {
    /// An empty sheet: every control blank.
    pub fn new(section: SectionId) -> Self {
        Self {
            section,
            scores: BTreeMap::new(),
            prefilled: BTreeMap::new(),
        }
    }

    /// A sheet pre-populated from the section's existing grades.
    ///
    /// When a student has more than one grade the most recently updated one
    /// fills the control; on equal timestamps the later grade in the list wins.
    pub fn from_grades(section: SectionId, grades: &[Grade]) -> Self {
        let mut latest: BTreeMap<StudentId, &Grade> = BTreeMap::new();
        for grade in grades {
            match latest.entry(grade.student) {
                Entry::Vacant(slot) => {
                    slot.insert(grade);
                }
                Entry::Occupied(mut slot) => {
                    if grade.updated_at >= slot.get().updated_at {
                        slot.insert(grade);
                    }
                }
            }
        }

        let scores: BTreeMap<StudentId, String> = latest
            .into_iter()
            .map(|(student, grade)| (student, format_decimal(grade.score)))
            .collect();
        Self {
            section,
            prefilled: scores.clone(),
            scores,
        }
    }

    pub fn section(&self) -> SectionId {
        self.section
    }

    /// Current text of a student's score control; blank if never set.
    pub fn score_text(&self, student: StudentId) -> &str {
        self.scores.get(&student).map(String::as_str).unwrap_or("")
    }

    /// Replace a student's score control text.
    pub fn set_score(&mut self, student: StudentId, text: impl Into<String>) {
        self.scores.insert(student, text.into());
    }

    /// Number of students with a non-blank control.
    pub fn filled_count(&self) -> usize {
        self.scores.values().filter(|s| !s.trim().is_empty()).count()
    }

    /// Whether a student's control holds a value that still has to be sent:
    /// non-blank and different from what the sheet was pre-filled with.
    pub fn is_pending(&self, student: StudentId) -> bool {
        let text = self.score_text(student);
        !text.trim().is_empty()
            && self.prefilled.get(&student).map(String::as_str) != Some(text)
    }

    /// One payload per visible student with a pending control, in table order.
    ///
    /// Non-numeric text still goes out, as a `null` score.
    pub fn build_batch(&self, visible: &[Student]) -> Vec<GradePayload> {
        visible
            .iter()
            .filter(|student| self.is_pending(student.id))
            .map(|student| GradePayload {
                student: Some(student.id),
                class_section: Some(self.section),
                score: coerce_float(self.score_text(student.id)),
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
