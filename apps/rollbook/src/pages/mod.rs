//! # Pages
//!
//! One page per screen of the records admin: Courses, Sections, Students and
//! Grades. A page owns the rows it fetched and its dialog state; nothing is
//! shared between pages except the HTTP client.
//!
//! Every network operation follows the same shape: send, and on success
//! refetch the affected list. A failed request is logged and the page stays
//! exactly as it was. Operations report an [`Outcome`] instead of an error.

mod crud;
mod grades;
mod sections;
mod students;

pub use crud::CrudPage;
pub use grades::GradesPage;
pub use sections::SectionsPage;
pub use students::StudentsPage;

use crate::client::{Courses, Grades};
use std::fmt::Display;

/// Courses page: the plain CRUD page.
pub type CoursesPage = CrudPage<Courses>;

/// Single-grade records (create/edit/delete one grade at a time).
pub type GradeRecordsPage = CrudPage<Grades>;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of one page operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request succeeded and the page was refreshed.
    Done,
    /// Nothing was sent: the prompt was declined or the dialog was incomplete.
    Declined,
    /// The request failed; the error was logged and state is unchanged.
    Failed,
}

impl Outcome {
    pub fn is_done(self) -> bool {
        self == Self::Done
    }

    /// The worse of two outcomes, for operations made of several requests.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Failed, _) | (_, Self::Failed) => Self::Failed,
            (Self::Declined, _) | (_, Self::Declined) => Self::Declined,
            _ => Self::Done,
        }
    }
}

/// Log a failed operation.
fn failed(action: &str, err: impl Display) -> Outcome {
    tracing::error!("Error {}: {}", action, err);
    Outcome::Failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_dominates() {
        assert_eq!(Outcome::Done.and(Outcome::Failed), Outcome::Failed);
        assert_eq!(Outcome::Declined.and(Outcome::Failed), Outcome::Failed);
        assert_eq!(Outcome::Done.and(Outcome::Declined), Outcome::Declined);
        assert_eq!(Outcome::Done.and(Outcome::Done), Outcome::Done);
    }
}
