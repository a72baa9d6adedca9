//! # CLI Command Implementations
//!
//! Every mutating command ends by printing the list the page refetched, the
//! way the screen would show it after the dialog closes.

use super::{
    Assignments, CliError, Context, CourseAction, GradeAction, SectionAction, StudentAction,
};
use crate::client::{Courses, Grades, RecordId, Resource, Sections, Students};
use crate::pages::{
    CoursesPage, CrudPage, GradeRecordsPage, GradesPage, Outcome, SectionsPage, StudentsPage,
};
use crate::render::{self, Table};
use rollbook_core::{
    ClassSection, Course, CourseId, Grade, GradeId, Record, RecordForm, RollbookError, SectionId,
    Student, StudentId,
};
use serde::Serialize;

type Renderer<'a, T> = &'a dyn Fn(&[T]) -> Table;

// =============================================================================
// SHARED CRUD FLOW
// =============================================================================

fn apply_fields<F: RecordForm>(form: &mut F, fields: Assignments) -> Result<(), RollbookError> {
    for (name, value) in fields {
        form.set_field(name, value)?;
    }
    Ok(())
}

async fn list_rows<R>(
    ctx: &Context,
    page: &mut CrudPage<R>,
    render: Renderer<'_, R::Record>,
) -> Result<Outcome, CliError>
where
    R: Resource,
    R::Record: Serialize,
{
    let outcome = page.refresh(&ctx.client).await;
    if outcome.is_done() {
        ctx.emit(page.rows(), || render(page.rows()).to_string())?;
    }
    Ok(outcome)
}

async fn show_record<R>(
    ctx: &Context,
    id: RecordId<R>,
    render: Renderer<'_, R::Record>,
) -> Result<Outcome, CliError>
where
    R: Resource,
    R::Record: Serialize,
{
    match ctx.client.endpoint::<R>().get(id).await {
        Ok(record) => {
            ctx.emit(&record, || {
                render(std::slice::from_ref(&record)).to_string()
            })?;
            Ok(Outcome::Done)
        }
        Err(e) => {
            tracing::error!(
                "Error fetching {} {}: {}",
                <R::Record as Record>::NOUN,
                id,
                e
            );
            Ok(Outcome::Failed)
        }
    }
}

async fn add_record<R>(
    ctx: &Context,
    page: &mut CrudPage<R>,
    fields: Assignments,
    render: Renderer<'_, R::Record>,
) -> Result<Outcome, CliError>
where
    R: Resource,
    R::Record: Serialize,
{
    page.open_create();
    if let Some(form) = page.form_mut() {
        apply_fields(form, fields)?;
    }
    finish(ctx, page, render).await
}

async fn edit_record<R>(
    ctx: &Context,
    page: &mut CrudPage<R>,
    id: RecordId<R>,
    fields: Assignments,
    render: Renderer<'_, R::Record>,
) -> Result<Outcome, CliError>
where
    R: Resource,
    R::Record: Serialize,
{
    // The form is pre-filled from the listed row, so the list comes first.
    let loaded = page.refresh(&ctx.client).await;
    if !loaded.is_done() {
        return Ok(loaded);
    }
    page.open_edit(id)?;
    if let Some(form) = page.form_mut() {
        apply_fields(form, fields)?;
    }
    finish(ctx, page, render).await
}

async fn finish<R>(
    ctx: &Context,
    page: &mut CrudPage<R>,
    render: Renderer<'_, R::Record>,
) -> Result<Outcome, CliError>
where
    R: Resource,
    R::Record: Serialize,
{
    let outcome = page.submit(&ctx.client).await;
    if outcome.is_done() {
        ctx.emit(page.rows(), || render(page.rows()).to_string())?;
    }
    Ok(outcome)
}

async fn delete_record<R>(
    ctx: &Context,
    page: &mut CrudPage<R>,
    id: RecordId<R>,
    render: Renderer<'_, R::Record>,
) -> Result<Outcome, CliError>
where
    R: Resource,
    R::Record: Serialize,
{
    // Only used to label the prompt; a failed fetch still lets the delete go.
    page.refresh(&ctx.client).await;
    let mut confirm = ctx.confirmer();
    let outcome = page.delete(&ctx.client, id, confirm.as_mut()).await;
    if outcome.is_done() {
        ctx.emit(page.rows(), || render(page.rows()).to_string())?;
    }
    Ok(outcome)
}

// =============================================================================
// COURSES
// =============================================================================

pub async fn cmd_courses(ctx: &Context, action: CourseAction) -> Result<Outcome, CliError> {
    let mut page = CoursesPage::new();
    let table: Renderer<'_, Course> = &render::courses;

    match action {
        CourseAction::List { course_id, name } => {
            page.set_filter("course_id", course_id);
            page.set_filter("course_name", name);
            list_rows(ctx, &mut page, table).await
        }
        CourseAction::Show { id } => show_record::<Courses>(ctx, CourseId(id), table).await,
        CourseAction::Add(fields) => add_record(ctx, &mut page, fields.assignments(), table).await,
        CourseAction::Edit { id, fields } => {
            edit_record(ctx, &mut page, CourseId(id), fields.assignments(), table).await
        }
        CourseAction::Delete { id } => delete_record(ctx, &mut page, CourseId(id), table).await,
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Warn when the chosen course is not one the picker would offer.
fn check_course_choice(page: &SectionsPage, fields: &Assignments) {
    let Some((_, course)) = fields.iter().find(|(name, _)| *name == "course") else {
        return;
    };
    let offered = page
        .course_choices()
        .iter()
        .any(|c| c.id.to_string() == course.trim());
    if !offered {
        tracing::warn!("Course {} is not in the course list", course);
    }
}

pub async fn cmd_sections(ctx: &Context, action: SectionAction) -> Result<Outcome, CliError> {
    let mut page = SectionsPage::new();
    let table: Renderer<'_, ClassSection> = &render::sections;

    match action {
        SectionAction::List { course, semester } => {
            page.crud.set_filter("course", course);
            page.crud.set_filter("semester", semester);
            list_rows(ctx, &mut page.crud, table).await
        }
        SectionAction::Show { id } => {
            show_record::<Sections>(ctx, SectionId(id), table).await
        }
        SectionAction::Add(fields) => {
            let fields = fields.assignments();
            page.refresh_courses(&ctx.client).await;
            check_course_choice(&page, &fields);
            add_record(ctx, &mut page.crud, fields, table).await
        }
        SectionAction::Edit { id, fields } => {
            let fields = fields.assignments();
            page.refresh_courses(&ctx.client).await;
            check_course_choice(&page, &fields);
            edit_record(ctx, &mut page.crud, SectionId(id), fields, table).await
        }
        SectionAction::Delete { id } => {
            delete_record(ctx, &mut page.crud, SectionId(id), table).await
        }
    }
}

// =============================================================================
// STUDENTS
// =============================================================================

pub async fn cmd_students(ctx: &Context, action: StudentAction) -> Result<Outcome, CliError> {
    let mut page = StudentsPage::new();
    let table: Renderer<'_, Student> = &render::students;

    match action {
        StudentAction::List => list_rows(ctx, &mut page.crud, table).await,
        StudentAction::Show { id } => {
            show_record::<Students>(ctx, StudentId(id), table).await
        }
        StudentAction::Add(fields) => {
            add_record(ctx, &mut page.crud, fields.assignments(), table).await
        }
        StudentAction::Edit { id, fields } => {
            edit_record(ctx, &mut page.crud, StudentId(id), fields.assignments(), table).await
        }
        StudentAction::Delete { id } => {
            delete_record(ctx, &mut page.crud, StudentId(id), table).await
        }
        StudentAction::Enroll { student, section } => {
            cmd_enroll(ctx, &mut page, StudentId(student), SectionId(section)).await
        }
        StudentAction::Report { id } => {
            let outcome = page.load_report(&ctx.client, StudentId(id)).await;
            if let Some(report) = page.report() {
                ctx.emit(report, || render::report(report))?;
            }
            Ok(outcome)
        }
    }
}

async fn cmd_enroll(
    ctx: &Context,
    page: &mut StudentsPage,
    student: StudentId,
    section: SectionId,
) -> Result<Outcome, CliError> {
    let mounted = page.mount(&ctx.client).await;
    if !mounted.is_done() {
        return Ok(mounted);
    }
    if !page.section_choices().iter().any(|s| s.id == section) {
        tracing::warn!("Section {} is not in the section list", section);
    }

    page.open_enroll(student)?;
    page.pick_section(section.to_string())?;
    let outcome = page.submit_enroll(&ctx.client).await;
    if outcome.is_done() {
        let rows = page.crud.rows();
        ctx.emit(rows, || render::students(rows).to_string())?;
    }
    Ok(outcome)
}

// =============================================================================
// GRADES
// =============================================================================

pub async fn cmd_grades(ctx: &Context, action: GradeAction) -> Result<Outcome, CliError> {
    match action {
        GradeAction::Section { id } => cmd_section_grades(ctx, SectionId(id)).await,
        GradeAction::Bulk {
            section,
            scores,
            dry_run,
        } => cmd_bulk(ctx, SectionId(section), scores, dry_run).await,
        action => cmd_grade_records(ctx, action).await,
    }
}

/// Single-grade CRUD. The table shows student codes, so the roster is loaded
/// alongside.
async fn cmd_grade_records(ctx: &Context, action: GradeAction) -> Result<Outcome, CliError> {
    let mut roster = StudentsPage::new();
    roster.crud.refresh(&ctx.client).await;
    let students = roster.crud.rows();
    let table: Renderer<'_, Grade> = &|rows: &[Grade]| render::grades(rows, students);

    let mut page = GradeRecordsPage::new();
    match action {
        GradeAction::List => list_rows(ctx, &mut page, table).await,
        GradeAction::Show { id } => {
            show_record::<Grades>(ctx, GradeId(id), table).await
        }
        GradeAction::Add(fields) => add_record(ctx, &mut page, fields.assignments(), table).await,
        GradeAction::Edit { id, fields } => {
            edit_record(ctx, &mut page, GradeId(id), fields.assignments(), table).await
        }
        GradeAction::Delete { id } => delete_record(ctx, &mut page, GradeId(id), table).await,
        GradeAction::Section { .. } | GradeAction::Bulk { .. } => Ok(Outcome::Declined),
    }
}

fn section_heading(section: Option<&ClassSection>, id: SectionId) -> String {
    match section {
        Some(s) => format!("{}\n\n", s.picker_label()),
        None => format!("Section #{id}\n\n"),
    }
}

async fn cmd_section_grades(ctx: &Context, section: SectionId) -> Result<Outcome, CliError> {
    let mut page = GradesPage::new();
    page.mount(&ctx.client).await;
    let outcome = page.select_section(&ctx.client, section).await;
    if outcome.is_done() {
        ctx.emit(page.grades(), || {
            section_heading(page.selected_section(), section)
                + &render::grades(page.grades(), page.students()).to_string()
        })?;
    }
    Ok(outcome)
}

async fn cmd_bulk(
    ctx: &Context,
    section: SectionId,
    scores: Vec<(StudentId, String)>,
    dry_run: bool,
) -> Result<Outcome, CliError> {
    let mut page = GradesPage::new();
    let mounted = page.mount(&ctx.client).await;
    if !mounted.is_done() {
        return Ok(mounted);
    }
    let selected = page.select_section(&ctx.client, section).await;
    if !selected.is_done() {
        return Ok(selected);
    }

    page.open_bulk()?;
    for (student, score) in scores {
        if !page.students().iter().any(|s| s.id == student) {
            tracing::warn!("Student {} is not in the roster; score ignored", student);
        }
        page.set_score(student, score)?;
    }

    if dry_run {
        if let Some(sheet) = page.sheet() {
            let batch = sheet.build_batch(page.students());
            ctx.emit(&batch, || {
                section_heading(page.selected_section(), section)
                    + &render::bulk_sheet(page.students(), sheet).to_string()
            })?;
        }
        return Ok(Outcome::Declined);
    }

    let outcome = page.submit_bulk(&ctx.client).await;
    if outcome.is_done() {
        ctx.emit(page.grades(), || {
            section_heading(page.selected_section(), section)
                + &render::grades(page.grades(), page.students()).to_string()
        })?;
    }
    Ok(outcome)
}
