//! CSV loader - Shift_JIS two-row-header export → student records
//!
//! Physical layout of the export:
//!
//! ```text
//! line 1   first-level header  (subject / aggregate field name)
//! line 2   metadata            (skipped)
//! line 3   metadata            (skipped)
//! line 4   second-level header (category keyword, 氏名, ...)
//! line 5+  one student per line
//! ```
//!
//! Column 1 is always the student ID, whatever its label says.

use crate::config::Settings;
use crate::error::{GradebookError, GradebookResult};
use crate::types::{CellValue, SourceColumn, StudentRecord};
use encoding_rs::SHIFT_JIS;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Line holding the first-level header
const PRIMARY_HEADER_LINE: u64 = 1;
/// Last metadata line skipped between the two header rows
const LAST_METADATA_LINE: u64 = 3;
/// Line holding the second-level header; data follows it
const SECONDARY_HEADER_LINE: u64 = LAST_METADATA_LINE + 1;

/// Records plus the header in its original order
#[derive(Debug, Clone)]
pub struct LoadedCsv {
    pub records: Vec<StudentRecord>,
    pub columns: Vec<SourceColumn>,
}

/// What a CSV column feeds into
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnRole {
    Id,
    Name,
    Score { subject: String, category: String },
    Attendance { subject: String, code: String },
    Aggregate(String),
    Ignored,
}

/// Load a CSV export from disk
pub fn load_students(path: &Path, settings: &Settings) -> GradebookResult<LoadedCsv> {
    let bytes = read_all(path)?;
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(&bytes);
    if had_errors {
        return Err(GradebookError::Encoding(path.to_path_buf()));
    }
    let loaded = parse_students(&text, settings)?;
    info!(
        path = %path.display(),
        records = loaded.records.len(),
        columns = loaded.columns.len(),
        "loaded CSV"
    );
    Ok(loaded)
}

fn read_all(path: &Path) -> GradebookResult<Vec<u8>> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GradebookError::InputNotFound(path.to_path_buf()),
        _ => GradebookError::Io(e),
    })?;
    let len = file.metadata()?.len();
    let len = usize::try_from(len)
        .map_err(|_| GradebookError::MemoryExhausted(path.to_path_buf()))?;

    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| GradebookError::MemoryExhausted(path.to_path_buf()))?;
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Parse already-decoded CSV text. CRLF and LF line endings are equivalent.
pub fn parse_students(text: &str, settings: &Settings) -> GradebookResult<LoadedCsv> {
    let text = text.replace("\r\n", "\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut lines = LineTracker::new(&text);

    let mut primary: Option<csv::StringRecord> = None;
    let mut secondary: Option<csv::StringRecord> = None;
    let mut columns: Vec<SourceColumn> = Vec::new();
    let mut roles: Vec<ColumnRole> = Vec::new();
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|pos| lines.line_at(pos.byte()));
            match line {
                Some(line) if line > SECONDARY_HEADER_LINE => GradebookError::Row {
                    line: line as usize,
                    reason: e.to_string(),
                },
                _ => GradebookError::StructuralHeader(e.to_string()),
            }
        })?;
        let line = match record.position() {
            Some(pos) => lines.line_at(pos.byte()),
            None => lines.current(),
        };

        if secondary.is_none() {
            if line == PRIMARY_HEADER_LINE {
                primary = Some(record);
            } else if line >= SECONDARY_HEADER_LINE {
                let first = primary.take().ok_or_else(|| {
                    GradebookError::StructuralHeader(
                        "first header row (line 1) is missing".to_string(),
                    )
                })?;
                columns = build_columns(&first, &record)?;
                roles = classify_columns(&columns, settings)?;
                secondary = Some(record);
            }
            // Anything else is one of the metadata lines
            continue;
        }

        if let Some(student) = build_record(&record, &roles, line as usize)? {
            debug!(id = student.id(), line, "parsed student row");
            records.push(student);
        }
    }

    if secondary.is_none() {
        return Err(GradebookError::StructuralHeader(format!(
            "a two-row header is required (lines {} and {})",
            PRIMARY_HEADER_LINE, SECONDARY_HEADER_LINE
        )));
    }

    Ok(LoadedCsv { records, columns })
}

/// Maps reader byte offsets onto 1-based physical lines of LF-terminated
/// text. A record's offset may point at blank lines the reader skips over
/// before the record itself; those count towards the line number.
struct LineTracker<'a> {
    bytes: &'a [u8],
    offset: usize,
    newlines: u64,
}

impl<'a> LineTracker<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            newlines: 0,
        }
    }

    /// Offsets must be non-decreasing across calls
    fn line_at(&mut self, byte: u64) -> u64 {
        let mut start = usize::try_from(byte)
            .unwrap_or(usize::MAX)
            .min(self.bytes.len());
        while self.bytes.get(start) == Some(&b'\n') {
            start += 1;
        }
        if start > self.offset {
            self.newlines += self.bytes[self.offset..start]
                .iter()
                .filter(|&&b| b == b'\n')
                .count() as u64;
            self.offset = start;
        }
        self.current()
    }

    fn current(&self) -> u64 {
        self.newlines + 1
    }
}

/// Header labels are trimmed, matching how destination headers are read
fn build_columns(
    primary: &csv::StringRecord,
    secondary: &csv::StringRecord,
) -> GradebookResult<Vec<SourceColumn>> {
    let width = primary.len().max(secondary.len());
    let only_blank = primary.iter().chain(secondary.iter()).all(str::is_empty);
    if width == 0 || only_blank {
        return Err(GradebookError::StructuralHeader(
            "the header has no columns".to_string(),
        ));
    }
    Ok((0..width)
        .map(|i| {
            SourceColumn::new(
                primary.get(i).unwrap_or_default().trim(),
                secondary.get(i).unwrap_or_default().trim(),
            )
        })
        .collect())
}

fn classify_columns(
    columns: &[SourceColumn],
    settings: &Settings,
) -> GradebookResult<Vec<ColumnRole>> {
    let keywords = &settings.keywords;
    let name_idx = columns
        .iter()
        .position(|c| c.secondary == keywords.name)
        .ok_or_else(|| GradebookError::MissingColumn(keywords.name.clone()))?;

    Ok(columns
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            if idx == 0 {
                ColumnRole::Id
            } else if idx == name_idx {
                ColumnRole::Name
            } else if keywords.exams.contains(&col.secondary) {
                ColumnRole::Score {
                    subject: col.primary.clone(),
                    category: col.secondary.clone(),
                }
            } else if keywords.is_attendance(&col.secondary) {
                ColumnRole::Attendance {
                    subject: col.primary.clone(),
                    code: col.secondary.clone(),
                }
            } else if keywords.is_aggregate(&col.primary) {
                ColumnRole::Aggregate(col.primary.clone())
            } else {
                ColumnRole::Ignored
            }
        })
        .collect())
}

/// Build one student; `None` when the ID cell is blank
fn build_record(
    row: &csv::StringRecord,
    roles: &[ColumnRole],
    line: usize,
) -> GradebookResult<Option<StudentRecord>> {
    if row.len() > roles.len() {
        return Err(GradebookError::Row {
            line,
            reason: format!("expected {} fields, found {}", roles.len(), row.len()),
        });
    }

    let id = row.get(0).unwrap_or_default().trim();
    if id.is_empty() {
        return Ok(None);
    }
    let name = roles
        .iter()
        .position(|r| *r == ColumnRole::Name)
        .and_then(|idx| row.get(idx))
        .map(str::trim)
        .unwrap_or_default();

    let mut student = StudentRecord::new(id, name);
    for (idx, role) in roles.iter().enumerate() {
        let raw = row.get(idx).unwrap_or_default();
        match role {
            ColumnRole::Score { subject, category } => {
                student.add_score(subject, category, CellValue::parse(raw))
            }
            ColumnRole::Attendance { subject, code } => {
                student.add_attendance(subject, code, CellValue::parse(raw))
            }
            ColumnRole::Aggregate(field) => student.set_aggregate(field, CellValue::parse(raw)),
            ColumnRole::Id | ColumnRole::Name | ColumnRole::Ignored => {}
        }
    }
    Ok(Some(student))
}
