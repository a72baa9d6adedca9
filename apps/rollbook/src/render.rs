//! # Table Rendering
//!
//! Plain-text tables for the terminal. `--json` output bypasses this module
//! and prints the records themselves.

use rollbook_core::formats::format_decimal;
use rollbook_core::{
    BulkGradeSheet, ClassSection, Course, Grade, SCORE_MAX, SCORE_MIN, SCORE_STEP, Student,
    StudentGradeReport,
};
use std::fmt;

// =============================================================================
// TABLE
// =============================================================================

/// Column-aligned text table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line = widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{cell:<w$}")
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(f, "{}", line.trim_end())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_line(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(f, &rule, &widths)?;
        for row in &self.rows {
            write_line(f, row, &widths)?;
        }
        if self.rows.is_empty() {
            writeln!(f, "(none)")?;
        }
        Ok(())
    }
}

// =============================================================================
// RECORD TABLES
// =============================================================================

pub fn courses(rows: &[Course]) -> Table {
    let mut table = Table::new(&["ID", "Code", "Name", "Credits", "Hours"]);
    for c in rows {
        table.push(vec![
            c.id.to_string(),
            c.course_id.clone(),
            c.course_name.clone(),
            format_decimal(c.credits),
            c.hours.to_string(),
        ]);
    }
    table
}

pub fn sections(rows: &[ClassSection]) -> Table {
    let mut table = Table::new(&["ID", "Code", "Name", "Semester", "Location", "Course"]);
    for s in rows {
        table.push(vec![
            s.id.to_string(),
            s.section_id.clone(),
            s.section_name.clone(),
            s.semester.clone(),
            s.location.clone(),
            s.course_name.clone(),
        ]);
    }
    table
}

pub fn students(rows: &[Student]) -> Table {
    let mut table = Table::new(&["ID", "Code", "Name"]);
    for s in rows {
        table.push(vec![s.id.to_string(), s.student_id.clone(), s.name.clone()]);
    }
    table
}

/// Grades with the student code looked up from `roster` when available.
pub fn grades(rows: &[Grade], roster: &[Student]) -> Table {
    let mut table = Table::new(&[
        "ID", "Student", "Name", "Course", "Section", "Score", "Updated",
    ]);
    for g in rows {
        let code = roster
            .iter()
            .find(|s| s.id == g.student)
            .map(|s| s.student_id.clone())
            .unwrap_or_else(|| g.student.to_string());
        table.push(vec![
            g.id.to_string(),
            code,
            g.student_name.clone(),
            g.course_name.clone(),
            g.section_name.clone(),
            format_decimal(g.score),
            g.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table
}

/// The bulk entry table: one row per visible student with its score control.
pub fn bulk_sheet(students: &[Student], sheet: &BulkGradeSheet) -> Table {
    let score = format!(
        "Score ({}-{}, step {})",
        format_decimal(SCORE_MIN),
        format_decimal(SCORE_MAX),
        format_decimal(SCORE_STEP)
    );
    let mut table = Table::new(&["ID", "Code", "Name", score.as_str()]);
    for s in students {
        table.push(vec![
            s.id.to_string(),
            s.student_id.clone(),
            s.name.clone(),
            sheet.score_text(s.id).to_string(),
        ]);
    }
    table
}

pub fn report(report: &StudentGradeReport) -> String {
    let mut table = Table::new(&["Course", "Section", "Score", "Updated"]);
    for g in &report.grades {
        table.push(vec![
            g.course_name.clone(),
            g.section_name.clone(),
            format_decimal(g.score),
            g.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    format!("{} ({})\n\n{}", report.name, report.student_id, table)
}
