//! Destination workbook access
//!
//! - `GradeWorkbook`: the single mutable document handle for a run
//! - `ColumnMap`: header-driven column discovery on a term's grades sheet
//! - `transcribe_term`: update-or-append reconciliation of student rows
//! - `write_summary_sheet`: styled rendering of generated summaries

mod column_map;
mod summary_sheet;
mod transcribe;
mod workbook;

pub use column_map::{
    column_letter, resolve_merged, ColumnMap, CATEGORY_ROW, FIRST_DATA_ROW, ID_COLUMN,
    NAME_COLUMN, SUBJECT_ROW,
};
pub use summary_sheet::{display_width, write_summary_sheet};
pub use transcribe::{retest_count_formula, transcribe_term, SheetOutcome, SkipReason};
pub use workbook::GradeWorkbook;
