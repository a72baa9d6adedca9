//! # Grades Page
//!
//! Pick a class section, see its grades, and enter scores for its students
//! in one batch.
//!
//! ```text
//! mount ─► select_section ─► open_bulk ─► set_score … ─► submit_bulk
//!               ▲                                            │
//!               └────────── refetch section grades ◄─────────┘
//! ```

use super::{Outcome, failed};
use crate::client::RollbookClient;
use rollbook_core::{
    BulkGradeSheet, ClassSection, Grade, ListView, RollbookError, SectionId, Student, StudentId,
};

#[derive(Default)]
pub struct GradesPage {
    sections: ListView<ClassSection>,
    students: ListView<Student>,
    selected: Option<SectionId>,
    grades: ListView<Grade>,
    sheet: Option<BulkGradeSheet>,
    bulk_open: bool,
}

impl GradesPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the section picker and the student roster.
    pub async fn mount(&mut self, client: &RollbookClient) -> Outcome {
        let sections = match self.sections.apply(client.sections().list().await) {
            Ok(()) => Outcome::Done,
            Err(e) => failed("fetching sections", e),
        };
        let students = match self.students.apply(client.students().list().await) {
            Ok(()) => Outcome::Done,
            Err(e) => failed("fetching students", e),
        };
        sections.and(students)
    }

    pub fn sections(&self) -> &[ClassSection] {
        self.sections.rows()
    }

    /// Students shown in the bulk entry table.
    pub fn students(&self) -> &[Student] {
        self.students.rows()
    }

    pub fn selected(&self) -> Option<SectionId> {
        self.selected
    }

    pub fn selected_section(&self) -> Option<&ClassSection> {
        self.selected.and_then(|id| self.sections.get(id))
    }

    /// Grades of the selected section, as last fetched.
    pub fn grades(&self) -> &[Grade] {
        self.grades.rows()
    }

    pub fn sheet(&self) -> Option<&BulkGradeSheet> {
        self.sheet.as_ref()
    }

    pub fn is_bulk_open(&self) -> bool {
        self.bulk_open
    }

    /// Select a section and fetch only its grades.
    ///
    /// The selection moves only once the fetch succeeds; on failure the page
    /// keeps the previous section with its grades and sheet.
    pub async fn select_section(&mut self, client: &RollbookClient, section: SectionId) -> Outcome {
        self.load_grades(client, section).await
    }

    /// Refetch the selected section's grades and rebuild the score sheet.
    pub async fn refresh_grades(&mut self, client: &RollbookClient) -> Outcome {
        let Some(section) = self.selected else {
            return failed("fetching grades", RollbookError::NoSectionSelected);
        };
        self.load_grades(client, section).await
    }

    async fn load_grades(&mut self, client: &RollbookClient, section: SectionId) -> Outcome {
        match self
            .grades
            .apply(client.grades().section_grades(section).await)
        {
            Ok(()) => {
                self.selected = Some(section);
                self.sheet = Some(BulkGradeSheet::from_grades(section, self.grades.rows()));
                Outcome::Done
            }
            Err(e) => failed(&format!("fetching grades of section {section}"), e),
        }
    }

    /// The sheet, if it belongs to the selected section.
    fn current_sheet(&self) -> Option<&BulkGradeSheet> {
        let section = self.selected?;
        self.sheet.as_ref().filter(|sheet| sheet.section() == section)
    }

    // =========================================================================
    // BULK ENTRY
    // =========================================================================

    pub fn open_bulk(&mut self) -> Result<(), RollbookError> {
        let section = self.selected.ok_or(RollbookError::NoSectionSelected)?;
        if self.current_sheet().is_none() {
            self.sheet = Some(BulkGradeSheet::new(section));
        }
        self.bulk_open = true;
        Ok(())
    }

    pub fn close_bulk(&mut self) {
        self.bulk_open = false;
    }

    /// Edit one student's score control.
    pub fn set_score(
        &mut self,
        student: StudentId,
        text: impl Into<String>,
    ) -> Result<(), RollbookError> {
        let sheet = self.sheet.as_mut().ok_or(RollbookError::NoSectionSelected)?;
        sheet.set_score(student, text);
        Ok(())
    }

    /// Send the edited scores of visible students as one batch, then refetch.
    pub async fn submit_bulk(&mut self, client: &RollbookClient) -> Outcome {
        let Some(sheet) = self.current_sheet() else {
            return failed("saving grades", RollbookError::NoSectionSelected);
        };
        let batch = sheet.build_batch(self.students.rows());

        match client.grades().bulk_create(&batch).await {
            Ok(saved) => {
                tracing::info!(
                    "Saved {} grades for section {}",
                    saved.len(),
                    sheet.section()
                );
                self.refresh_grades(client).await;
                self.close_bulk();
                Outcome::Done
            }
            Err(e) => failed("saving grades", e),
        }
    }
}
