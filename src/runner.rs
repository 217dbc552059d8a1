//! Run coordinator: load → open → transcribe → summaries → save
//!
//! Every step propagates its error unchanged; the caller classifies it with
//! `GradebookError::kind` / `user_message`. Missing term sheets and empty
//! summaries are reported as skips, not failures. The workbook is saved once,
//! after every selected task has succeeded.

use crate::config::Settings;
use crate::error::GradebookResult;
use crate::excel::{transcribe_term, write_summary_sheet, GradeWorkbook, SheetOutcome};
use crate::loader::load_students;
use crate::summary::{build_attendance_summary, build_grade_summary};
use std::path::PathBuf;
use tracing::{info, warn};

/// Which tasks a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSelection {
    pub transcribe: bool,
    pub grade_summary: bool,
    pub attendance_summary: bool,
}

impl Default for TaskSelection {
    fn default() -> Self {
        Self {
            transcribe: true,
            grade_summary: true,
            attendance_summary: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub csv_path: PathBuf,
    pub workbook_path: PathBuf,
    pub terms: Vec<String>,
    pub tasks: TaskSelection,
}

/// Result of building one summary sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Written { sheet: String, rows: usize },
    /// The CSV had no columns feeding this summary
    Skipped { sheet: String },
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub output: PathBuf,
    pub records: usize,
    pub sheets: Vec<SheetOutcome>,
    pub summaries: Vec<SummaryOutcome>,
    /// Transcription was selected but no term was given
    pub no_terms: bool,
}

/// Execute every selected task and save the workbook
pub fn run(options: &RunOptions, settings: &Settings) -> GradebookResult<RunReport> {
    info!("step 1/4: loading students from CSV");
    let loaded = load_students(&options.csv_path, settings)?;

    info!("step 2/4: opening workbook");
    let mut workbook = GradeWorkbook::open(&options.workbook_path)?;

    info!("step 3/4: processing");
    let mut report = RunReport {
        output: options.workbook_path.clone(),
        records: loaded.records.len(),
        ..RunReport::default()
    };

    if options.tasks.transcribe {
        if options.terms.is_empty() {
            warn!("no term selected, grades sheets not updated");
            report.no_terms = true;
        }
        for term in &options.terms {
            let outcome = transcribe_term(&mut workbook, term, &loaded.records, settings)?;
            report.sheets.push(outcome);
        }
    }

    if options.tasks.grade_summary {
        let sheet = settings.sheets.grade_summary.clone();
        match build_grade_summary(&loaded.records, &loaded.columns, settings) {
            Some(table) => {
                write_summary_sheet(&mut workbook, &sheet, &table, &settings.style)?;
                report.summaries.push(SummaryOutcome::Written {
                    sheet,
                    rows: table.rows.len(),
                });
            }
            None => {
                warn!(sheet = %sheet, "no subject has a grade column, skipping");
                report.summaries.push(SummaryOutcome::Skipped { sheet });
            }
        }
    }

    if options.tasks.attendance_summary {
        let sheet = settings.sheets.attendance_summary.clone();
        match build_attendance_summary(&loaded.records, &loaded.columns, settings) {
            Some(table) => {
                write_summary_sheet(&mut workbook, &sheet, &table, &settings.style)?;
                report.summaries.push(SummaryOutcome::Written {
                    sheet,
                    rows: table.rows.len(),
                });
            }
            None => {
                warn!(sheet = %sheet, "no attendance columns found, skipping");
                report.summaries.push(SummaryOutcome::Skipped { sheet });
            }
        }
    }

    info!("step 4/4: saving workbook");
    workbook.save()?;
    Ok(report)
}
