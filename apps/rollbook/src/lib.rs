//! # Rollbook
//!
//! Administrative client for an academic records REST backend: courses,
//! class sections, students, enrollments and grades.
//!
//! ## Layout
//!
//! - `client`  → typed HTTP client (reqwest)
//! - `pages`   → per-screen state: lists, edit dialogs, bulk grade entry
//! - `confirm` → yes/no prompts guarding deletes
//! - `render`  → text tables
//! - `config`  → `rollbook.toml` + environment
//! - `cli`     → clap commands driving the pages
//!
//! Records, forms and the bulk grade sheet live in `rollbook-core`, which does
//! no I/O.

pub mod cli;
pub mod client;
pub mod config;
pub mod confirm;
pub mod pages;
pub mod render;

pub use client::{ClientError, RollbookClient};
pub use pages::Outcome;
