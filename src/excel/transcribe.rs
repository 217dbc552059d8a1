//! Grades sheet writer - reconciles student records against a term sheet
//!
//! Existing students (matched by ID in column A) are updated in place; new
//! students are appended below the last populated row. The retest-count
//! column receives a live `COUNT` formula over the row's retest cells.

use super::column_map::{column_letter, ColumnMap, FIRST_DATA_ROW, ID_COLUMN, NAME_COLUMN};
use super::workbook::GradeWorkbook;
use crate::config::Settings;
use crate::error::GradebookResult;
use crate::types::{CellValue, StudentRecord};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use umya_spreadsheet::Worksheet;

/// Why a term sheet was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    SheetNotFound,
    /// Fewer rows than the four-row header block
    HeaderTooShort { rows: u32 },
}

/// Result of transcribing one term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOutcome {
    Updated {
        sheet: String,
        updated: usize,
        inserted: usize,
    },
    Skipped {
        sheet: String,
        reason: SkipReason,
    },
}

/// Write `records` into the grades sheet for `term`
pub fn transcribe_term(
    workbook: &mut GradeWorkbook,
    term: &str,
    records: &[StudentRecord],
    settings: &Settings,
) -> GradebookResult<SheetOutcome> {
    let sheet_name = settings.grades_sheet_name(term);
    let Some(sheet) = workbook.sheet_mut(&sheet_name) else {
        warn!(sheet = %sheet_name, "sheet not found, skipping");
        return Ok(SheetOutcome::Skipped {
            sheet: sheet_name,
            reason: SkipReason::SheetNotFound,
        });
    };

    let Some(columns) = ColumnMap::scan(sheet, &settings.keywords) else {
        let rows = sheet.get_highest_row();
        warn!(sheet = %sheet_name, rows, "header block has fewer than 4 rows, skipping");
        return Ok(SheetOutcome::Skipped {
            sheet: sheet_name,
            reason: SkipReason::HeaderTooShort { rows },
        });
    };

    info!(sheet = %sheet_name, "updating grades sheet");
    let (updated, inserted) = write_records(sheet, &columns, records, settings);
    info!(sheet = %sheet_name, updated, inserted, "grades sheet updated");

    Ok(SheetOutcome::Updated {
        sheet: sheet_name,
        updated,
        inserted,
    })
}

/// Index existing students: trimmed ID → row
fn index_existing_rows(sheet: &Worksheet) -> HashMap<String, u32> {
    (FIRST_DATA_ROW..=sheet.get_highest_row())
        .filter_map(|row| {
            let id = sheet.get_value((ID_COLUMN, row)).trim().to_string();
            (!id.is_empty()).then_some((id, row))
        })
        .collect()
}

fn write_records(
    sheet: &mut Worksheet,
    columns: &ColumnMap,
    records: &[StudentRecord],
    settings: &Settings,
) -> (usize, usize) {
    let keywords = &settings.keywords;
    let mut row_index = index_existing_rows(sheet);
    let mut next_row = row_index
        .values()
        .max()
        .map(|row| row + 1)
        .unwrap_or(FIRST_DATA_ROW);

    let retest_count_col = columns.aggregate_column(&keywords.retest_count);
    let retest_cols = columns.columns_for_category(&keywords.exams.retest);

    let (mut updated, mut inserted) = (0, 0);
    for record in records {
        let row = match row_index.get(record.id()) {
            Some(&row) => {
                updated += 1;
                row
            }
            None => {
                let row = next_row;
                next_row += 1;
                // Later duplicates of this ID land on the same row
                row_index.insert(record.id().to_string(), row);
                inserted += 1;
                row
            }
        };
        debug!(id = record.id(), row, "writing student");

        write_value(sheet, ID_COLUMN, row, &CellValue::from(record.id()));
        write_value(sheet, NAME_COLUMN, row, &CellValue::from(record.name()));

        for ((subject, category), value) in &record.scores {
            if let Some(col) = columns.subject_column(subject, category) {
                write_value(sheet, col, row, value);
            }
        }

        for (field, value) in &record.aggregates {
            if *field == keywords.retest_count {
                continue;
            }
            if let Some(col) = columns.aggregate_column(field) {
                write_value(sheet, col, row, value);
            }
        }

        if let Some(col) = retest_count_col {
            if let Some(formula) = retest_count_formula(&retest_cols, row) {
                sheet.get_cell_mut((col, row)).set_formula(formula);
            }
        }
    }
    (updated, inserted)
}

/// `COUNT(D5,G5,...)` over the retest cells of `row`
pub fn retest_count_formula(retest_cols: &[u32], row: u32) -> Option<String> {
    if retest_cols.is_empty() {
        return None;
    }
    let refs: Vec<String> = retest_cols
        .iter()
        .map(|col| format!("{}{}", column_letter(*col), row))
        .collect();
    Some(format!("COUNT({})", refs.join(",")))
}

pub(crate) fn write_value(sheet: &mut Worksheet, col: u32, row: u32, value: &CellValue) {
    let cell = sheet.get_cell_mut((col, row));
    match value {
        CellValue::Number(n) => {
            cell.set_value_number(*n);
        }
        CellValue::Text(s) => {
            cell.set_value_string(s.as_str());
        }
    }
}
