//! Summary builders - presentation tables derived from the loaded records
//!
//! Both builders follow the CSV's own subject order rather than the
//! destination sheet's layout.

use crate::config::Settings;
use crate::types::{CellValue, SourceColumn, StudentRecord};

/// Horizontal merge of header cells, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSpan {
    pub row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

/// A fully built summary sheet, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    /// Header rows, top to bottom
    pub header_rows: Vec<Vec<String>>,
    pub rows: Vec<Vec<CellValue>>,
    pub merges: Vec<MergeSpan>,
}

impl SummaryTable {
    pub fn column_count(&self) -> usize {
        self.header_rows
            .iter()
            .map(Vec::len)
            .chain(self.rows.iter().map(Vec::len))
            .max()
            .unwrap_or(0)
    }
}

/// Grade-only matrix: one column per subject that has a grade column.
/// `None` when no subject does.
pub fn build_grade_summary(
    records: &[StudentRecord],
    columns: &[SourceColumn],
    settings: &Settings,
) -> Option<SummaryTable> {
    let grade = &settings.keywords.exams.grade;
    let mut subjects: Vec<&str> = Vec::new();
    for col in columns.iter().filter(|c| c.secondary == *grade) {
        if !subjects.contains(&col.primary.as_str()) {
            subjects.push(&col.primary);
        }
    }
    if subjects.is_empty() {
        return None;
    }

    let labels = &settings.labels;
    let mut header = vec![labels.student_id.clone(), labels.student_name.clone()];
    header.extend(subjects.iter().map(|s| s.to_string()));

    let rows = records
        .iter()
        .map(|record| {
            let mut row = identity_cells(record);
            row.extend(subjects.iter().map(|subject| {
                record
                    .score(subject, grade)
                    .cloned()
                    .unwrap_or_else(CellValue::empty)
            }));
            row
        })
        .collect();

    Some(SummaryTable {
        header_rows: vec![header],
        rows,
        merges: Vec::new(),
    })
}

/// Attendance matrix with a subject row above a category row.
/// `None` when the CSV has no attendance columns.
pub fn build_attendance_summary(
    records: &[StudentRecord],
    columns: &[SourceColumn],
    settings: &Settings,
) -> Option<SummaryTable> {
    let keywords = &settings.keywords;
    let keys: Vec<&SourceColumn> = columns
        .iter()
        .filter(|c| keywords.is_attendance(&c.secondary))
        .collect();
    if keys.is_empty() {
        return None;
    }

    let labels = &settings.labels;
    let mut subject_row = vec![labels.subject.clone(), String::new()];
    let mut category_row = vec![labels.student_id.clone(), labels.student_name.clone()];
    for key in &keys {
        subject_row.push(key.primary.clone());
        category_row.push(keywords.attendance_label(&key.secondary).to_string());
    }

    let rows = records
        .iter()
        .map(|record| {
            let mut row = identity_cells(record);
            row.extend(keys.iter().map(|key| {
                record
                    .attendance_for(&key.primary, &key.secondary)
                    .cloned()
                    .unwrap_or_else(CellValue::empty)
            }));
            row
        })
        .collect();

    let merges = merge_runs(&subject_row, 3)
        .into_iter()
        .map(|(first_col, last_col)| MergeSpan {
            row: 1,
            first_col,
            last_col,
        })
        .collect();

    Some(SummaryTable {
        header_rows: vec![subject_row, category_row],
        rows,
        merges,
    })
}

/// Runs of equal adjacent labels from `start_col` (1-based) onward that span
/// more than one column, as inclusive (first, last) column pairs. A
/// `start_col` of 0 is not a column and yields no runs.
pub fn merge_runs(labels: &[String], start_col: u32) -> Vec<(u32, u32)> {
    let mut runs = Vec::new();
    if start_col == 0 || labels.len() < start_col as usize {
        return runs;
    }

    let mut run_start = start_col;
    for col in (start_col + 1)..=(labels.len() as u32 + 1) {
        let ended = col as usize > labels.len()
            || labels[col as usize - 1] != labels[run_start as usize - 1];
        if ended {
            if col - 1 > run_start {
                runs.push((run_start, col - 1));
            }
            run_start = col;
        }
    }
    runs
}

fn identity_cells(record: &StudentRecord) -> Vec<CellValue> {
    vec![
        CellValue::from(record.id()),
        CellValue::from(record.name()),
    ]
}
