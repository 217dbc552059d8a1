//! Header scan of a term's grades sheet → (subject, category) and aggregate
//! column lookups.
//!
//! Destination header block:
//!
//! ```text
//! row 1   subject names (often merged across their category columns),
//!         aggregate field names (総点, 再試数, ...)
//! row 2-3 free-form
//! row 4   exam category per column (本試 / 再試 / 評)
//! row 5+  one student per row, ID in column A, name in column B
//! ```

use crate::config::Keywords;
use crate::types::SubjectKey;
use std::collections::HashMap;
use umya_spreadsheet::Worksheet;

/// Row holding subject and aggregate names
pub const SUBJECT_ROW: u32 = 1;
/// Row holding exam category keywords
pub const CATEGORY_ROW: u32 = 4;
/// First student row
pub const FIRST_DATA_ROW: u32 = 5;
pub const ID_COLUMN: u32 = 1;
pub const NAME_COLUMN: u32 = 2;

/// Lookup tables built fresh for one destination sheet (1-based columns)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    subjects: HashMap<SubjectKey, u32>,
    aggregates: HashMap<String, u32>,
}

impl ColumnMap {
    /// Scan the header block; `None` when the sheet has fewer than
    /// `CATEGORY_ROW` rows and cannot be written to.
    pub fn scan(sheet: &Worksheet, keywords: &Keywords) -> Option<Self> {
        if sheet.get_highest_row() < CATEGORY_ROW {
            return None;
        }
        let last_col = sheet.get_highest_column();
        let mut map = ColumnMap::default();

        for col in 1..=last_col {
            let category = header_text(sheet, col, CATEGORY_ROW);
            if keywords.exams.contains(&category) {
                if let Some(subject) = resolve_merged(sheet, SUBJECT_ROW, col) {
                    map.subjects.insert((subject, category), col);
                }
            }

            let label = header_text(sheet, col, SUBJECT_ROW);
            if keywords.is_aggregate(&label) {
                map.aggregates.insert(label, col);
            }
        }
        Some(map)
    }

    pub fn subject_column(&self, subject: &str, category: &str) -> Option<u32> {
        self.subjects
            .get(&(subject.to_string(), category.to_string()))
            .copied()
    }

    pub fn aggregate_column(&self, field: &str) -> Option<u32> {
        self.aggregates.get(field).copied()
    }

    /// Columns mapped to `category`, left to right
    pub fn columns_for_category(&self, category: &str) -> Vec<u32> {
        let mut cols: Vec<u32> = self
            .subjects
            .iter()
            .filter(|((_, cat), _)| cat == category)
            .map(|(_, col)| *col)
            .collect();
        cols.sort_unstable();
        cols
    }

    /// (subject, category, column) sorted by column
    pub fn subject_entries(&self) -> Vec<(&str, &str, u32)> {
        let mut entries: Vec<(&str, &str, u32)> = self
            .subjects
            .iter()
            .map(|((subject, category), col)| (subject.as_str(), category.as_str(), *col))
            .collect();
        entries.sort_by_key(|(_, _, col)| *col);
        entries
    }

    /// (field, column) sorted by column
    pub fn aggregate_entries(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self
            .aggregates
            .iter()
            .map(|(field, col)| (field.as_str(), *col))
            .collect();
        entries.sort_by_key(|(_, col)| *col);
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty() && self.aggregates.is_empty()
    }
}

fn header_text(sheet: &Worksheet, col: u32, row: u32) -> String {
    sheet.get_value((col, row)).trim().to_string()
}

/// Effective value of a header cell, walking left past blanks left by merges
pub fn resolve_merged(sheet: &Worksheet, row: u32, col: u32) -> Option<String> {
    (1..=col)
        .rev()
        .map(|c| header_text(sheet, c, row))
        .find(|value| !value.is_empty())
}

/// 1-based column index → Excel column letters (1 → A, 27 → AA)
pub fn column_letter(col: u32) -> String {
    let mut result = String::new();
    let mut idx = col;

    while idx > 0 {
        let remainder = (idx - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        idx = (idx - 1) / 26;
    }

    result
}
