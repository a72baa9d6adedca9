//! # Sections Page
//!
//! Class sections, plus the course list that feeds the form's course picker.

use super::{CrudPage, Outcome, failed};
use crate::client::{RollbookClient, Sections};
use rollbook_core::{Course, ListView};

#[derive(Default)]
pub struct SectionsPage {
    pub crud: CrudPage<Sections>,
    courses: ListView<Course>,
}

impl SectionsPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load sections and the course picker.
    pub async fn mount(&mut self, client: &RollbookClient) -> Outcome {
        let sections = self.crud.refresh(client).await;
        sections.and(self.refresh_courses(client).await)
    }

    pub async fn refresh_courses(&mut self, client: &RollbookClient) -> Outcome {
        match self.courses.apply(client.courses().list().await) {
            Ok(()) => Outcome::Done,
            Err(e) => failed("fetching courses", e),
        }
    }

    /// Courses offered by the form's course picker.
    pub fn course_choices(&self) -> &[Course] {
        self.courses.rows()
    }
}
