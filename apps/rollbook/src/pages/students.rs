//! # Students Page
//!
//! Students, the enrollment dialog and per-student grade reports.

use super::{CrudPage, Outcome, failed};
use crate::client::{RollbookClient, Students};
use rollbook_core::{
    ClassSection, EnrollForm, ListView, RollbookError, StudentGradeReport, StudentId,
};

#[derive(Default)]
pub struct StudentsPage {
    pub crud: CrudPage<Students>,
    sections: ListView<ClassSection>,
    enroll: Option<EnrollForm>,
    report: Option<StudentGradeReport>,
}

impl StudentsPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load students and the section picker.
    pub async fn mount(&mut self, client: &RollbookClient) -> Outcome {
        let students = self.crud.refresh(client).await;
        let sections = match self.sections.apply(client.sections().list().await) {
            Ok(()) => Outcome::Done,
            Err(e) => failed("fetching sections", e),
        };
        students.and(sections)
    }

    /// Sections offered by the enrollment dialog.
    pub fn section_choices(&self) -> &[ClassSection] {
        self.sections.rows()
    }

    // =========================================================================
    // ENROLLMENT
    // =========================================================================

    /// Open the enrollment dialog for a listed student, no section picked.
    pub fn open_enroll(&mut self, student: StudentId) -> Result<(), RollbookError> {
        self.crud.list().require(student)?;
        self.enroll = Some(EnrollForm::for_student(student));
        Ok(())
    }

    /// Pick the section in the open enrollment dialog.
    pub fn pick_section(&mut self, section: impl Into<String>) -> Result<(), RollbookError> {
        let form = self.enroll.as_mut().ok_or(RollbookError::EditorClosed)?;
        form.class_section = section.into();
        Ok(())
    }

    pub fn enroll_form(&self) -> Option<&EnrollForm> {
        self.enroll.as_ref()
    }

    pub fn close_enroll(&mut self) {
        self.enroll = None;
    }

    /// Send the enrollment, then close the dialog and refetch students.
    ///
    /// With no student or section picked nothing is sent.
    pub async fn submit_enroll(&mut self, client: &RollbookClient) -> Outcome {
        let Some(request) = self.enroll.as_ref().and_then(EnrollForm::to_request) else {
            tracing::debug!("Enrollment incomplete, nothing sent");
            return Outcome::Declined;
        };

        match client
            .students()
            .enroll(request.student, request.class_section)
            .await
        {
            Ok(ack) => {
                tracing::info!(
                    "Enrolled student {} in section {}: {}",
                    request.student,
                    request.class_section,
                    ack.message
                );
                self.close_enroll();
                self.crud.refresh(client).await;
                Outcome::Done
            }
            Err(e) => failed("enrolling student", e),
        }
    }

    // =========================================================================
    // GRADE REPORT
    // =========================================================================

    /// Fetch a student's grade report.
    pub async fn load_report(&mut self, client: &RollbookClient, student: StudentId) -> Outcome {
        match client.students().grade_report(student).await {
            Ok(report) => {
                self.report = Some(report);
                Outcome::Done
            }
            Err(e) => failed(&format!("fetching grades of student {student}"), e),
        }
    }

    pub fn report(&self) -> Option<&StudentGradeReport> {
        self.report.as_ref()
    }
}
