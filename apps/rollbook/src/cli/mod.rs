//! # Rollbook CLI Module
//!
//! Command-line front end over the pages. Each invocation mounts the page it
//! needs, performs one action and prints the refreshed rows.
//!
//! ## Available Commands
//!
//! - `courses`  - list, show, add, edit, delete courses
//! - `sections` - list, show, add, edit, delete class sections
//! - `students` - list, show, add, edit, delete students; `enroll`, `report`
//! - `grades`   - list, show, add, edit, delete grades; `section`, `bulk`
//!
//! Without a subcommand, `rollbook` lists courses.

mod commands;

use crate::client::RollbookClient;
use crate::config::Config;
use crate::confirm::{self, AssumeYes, Confirm};
use crate::pages::Outcome;
use clap::{Args, Parser, Subcommand};
use rollbook_core::{RollbookError, StudentId};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Rollbook - academic records admin
///
/// Manage courses, class sections, students and grades held by a records
/// REST backend.
#[derive(Parser, Debug)]
#[command(name = "rollbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the records API (overrides config and ROLLBOOK_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Path to a rollbook.toml config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Answer yes to delete prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage courses
    Courses {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Manage class sections
    Sections {
        #[command(subcommand)]
        action: SectionAction,
    },

    /// Manage students and enrollments
    Students {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Manage grades
    Grades {
        #[command(subcommand)]
        action: GradeAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseAction {
    /// List courses
    List {
        /// Only courses whose code contains this text
        #[arg(long)]
        course_id: Option<String>,

        /// Only courses whose name contains this text
        #[arg(long)]
        name: Option<String>,
    },
    /// Show one course
    Show { id: u64 },
    /// Create a course
    Add(CourseFields),
    /// Update a course; omitted fields keep their current value
    Edit {
        id: u64,
        #[command(flatten)]
        fields: CourseFields,
    },
    /// Delete a course
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum SectionAction {
    /// List class sections
    List {
        /// Only sections whose course code or name contains this text
        #[arg(long)]
        course: Option<String>,

        /// Only sections in this semester
        #[arg(long)]
        semester: Option<String>,
    },
    /// Show one class section
    Show { id: u64 },
    /// Create a class section
    Add(SectionFields),
    /// Update a class section; omitted fields keep their current value
    Edit {
        id: u64,
        #[command(flatten)]
        fields: SectionFields,
    },
    /// Delete a class section
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum StudentAction {
    /// List students
    List,
    /// Show one student
    Show { id: u64 },
    /// Create a student
    Add(StudentFields),
    /// Update a student; omitted fields keep their current value
    Edit {
        id: u64,
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Delete a student
    Delete { id: u64 },
    /// Enroll a student in a class section
    Enroll {
        /// Student primary key
        student: u64,

        /// Class section primary key
        #[arg(short, long)]
        section: u64,
    },
    /// Show every grade a student holds
    Report { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum GradeAction {
    /// List all grades
    List,
    /// Show one grade
    Show { id: u64 },
    /// Show the grades of one class section
    Section { id: u64 },
    /// Enter scores for students of a class section in one batch
    Bulk {
        /// Class section primary key
        section: u64,

        /// Score for one student, by student primary key (repeatable)
        #[arg(long = "set", value_name = "STUDENT=SCORE", value_parser = parse_assignment)]
        scores: Vec<(StudentId, String)>,

        /// Print the filled sheet without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Create a single grade
    Add(GradeFields),
    /// Update a single grade; omitted fields keep their current value
    Edit {
        id: u64,
        #[command(flatten)]
        fields: GradeFields,
    },
    /// Delete a grade
    Delete { id: u64 },
}

// =============================================================================
// FORM FIELDS
// =============================================================================

#[derive(Args, Debug, Default)]
pub struct CourseFields {
    /// Course code, e.g. CS101
    #[arg(long)]
    pub course_id: Option<String>,
    #[arg(long)]
    pub course_name: Option<String>,
    #[arg(long)]
    pub credits: Option<String>,
    /// Contact hours
    #[arg(long)]
    pub hours: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct SectionFields {
    #[arg(long)]
    pub section_id: Option<String>,
    #[arg(long)]
    pub section_name: Option<String>,
    #[arg(long)]
    pub semester: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Course primary key
    #[arg(long)]
    pub course: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct StudentFields {
    /// Student code
    #[arg(long)]
    pub student_id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct GradeFields {
    /// Student primary key
    #[arg(long)]
    pub student: Option<String>,
    /// Class section primary key
    #[arg(long = "section")]
    pub class_section: Option<String>,
    #[arg(long)]
    pub score: Option<String>,
}

/// Form field names paired with the values given on the command line.
pub type Assignments = Vec<(&'static str, String)>;

fn given(pairs: Vec<(&'static str, Option<String>)>) -> Assignments {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
}

impl CourseFields {
    pub fn assignments(self) -> Assignments {
        given(vec![
            ("course_id", self.course_id),
            ("course_name", self.course_name),
            ("credits", self.credits),
            ("hours", self.hours),
        ])
    }
}

impl SectionFields {
    pub fn assignments(self) -> Assignments {
        given(vec![
            ("section_id", self.section_id),
            ("section_name", self.section_name),
            ("semester", self.semester),
            ("location", self.location),
            ("course", self.course),
        ])
    }
}

impl StudentFields {
    pub fn assignments(self) -> Assignments {
        given(vec![("student_id", self.student_id), ("name", self.name)])
    }
}

impl GradeFields {
    pub fn assignments(self) -> Assignments {
        given(vec![
            ("student", self.student),
            ("class_section", self.class_section),
            ("score", self.score),
        ])
    }
}

/// Parse `STUDENT=SCORE`. The score stays text; it is coerced when the batch
/// is built, like any other score control.
pub fn parse_assignment(arg: &str) -> Result<(StudentId, String), String> {
    let (student, score) = arg
        .split_once('=')
        .ok_or_else(|| format!("'{arg}' is not STUDENT=SCORE"))?;
    let student = student
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("'{}' is not a student primary key", student.trim()))?;
    Ok((StudentId(student), score.trim().to_string()))
}

// =============================================================================
// ERRORS & CONTEXT
// =============================================================================

/// Errors that stop a command before or after it reaches the backend.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Rollbook(#[from] RollbookError),

    #[error("Cannot write JSON output: {0}")]
    Output(#[from] serde_json::Error),
}

/// What every command runs with.
pub struct Context {
    pub client: RollbookClient,
    pub json: bool,
    pub assume_yes: bool,
}

impl Context {
    /// Resolve flags over the loaded config.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let base_url = cli
            .url
            .clone()
            .unwrap_or_else(|| config.api.base_url.clone());
        Self {
            client: RollbookClient::new(base_url),
            json: cli.json || config.output.json,
            assume_yes: cli.yes,
        }
    }

    fn confirmer(&self) -> Box<dyn Confirm> {
        if self.assume_yes {
            Box::new(AssumeYes)
        } else {
            Box::new(confirm::terminal())
        }
    }

    /// Print `value` as pretty JSON, or the table text otherwise.
    fn emit<T: Serialize + ?Sized>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli, config: &Config) -> Result<Outcome, CliError> {
    let ctx = Context::new(&cli, config);
    tracing::debug!("Using records API at {}", ctx.client.base_url());

    let command = cli.command.unwrap_or(Commands::Courses {
        action: CourseAction::List {
            course_id: None,
            name: None,
        },
    });

    match command {
        Commands::Courses { action } => cmd_courses(&ctx, action).await,
        Commands::Sections { action } => cmd_sections(&ctx, action).await,
        Commands::Students { action } => cmd_students(&ctx, action).await,
        Commands::Grades { action } => cmd_grades(&ctx, action).await,
    }
}
