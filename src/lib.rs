//! Grade Transcriber - CSV grade exports into a pre-formatted Excel gradebook
//!
//! Reads a Shift_JIS CSV export with a two-row header (subject / category),
//! writes each student's scores into the matching term sheets of an existing
//! workbook, and generates a grade-only summary and a per-subject attendance
//! summary.
//!
//! # Features
//!
//! - Header-driven column discovery, including merged subject headers
//! - Update-in-place by student ID, append for new students
//! - Live `COUNT` formula for the retest count
//! - Single save per run; a failed run leaves the file untouched
//!
//! # Example
//!
//! ```no_run
//! use grade_transcriber::config::Settings;
//! use grade_transcriber::runner::{run, RunOptions, TaskSelection};
//!
//! let options = RunOptions {
//!     csv_path: "grades.csv".into(),
//!     workbook_path: "gradebook.xlsx".into(),
//!     terms: vec!["前期".to_string()],
//!     tasks: TaskSelection::default(),
//! };
//! let report = run(&options, &Settings::default())?;
//! println!("{} students", report.records);
//! # Ok::<(), grade_transcriber::error::GradebookError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod loader;
pub mod logging;
pub mod runner;
pub mod summary;
pub mod types;

// Re-export commonly used types
pub use error::{GradebookError, GradebookResult};
pub use types::{CellValue, SourceColumn, StudentRecord};
