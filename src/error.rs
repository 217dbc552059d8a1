use std::path::{Path, PathBuf};
use thiserror::Error;

pub type GradebookResult<T> = Result<T, GradebookError>;

/// Why a destination workbook could not be saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// Locked by another program or not writable
    Locked,
    /// No space left on the device
    DiskFull,
    Other,
}

/// Taxonomy used by the coordinator when reporting a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Encoding,
    StructuralHeader,
    MissingColumn,
    RowProcessing,
    MemoryExhaustion,
    InputNotFound,
    DestinationNotFound,
    DestinationFormat,
    DestinationWrite,
    Settings,
    Unclassified,
}

#[derive(Error, Debug)]
pub enum GradebookError {
    #[error("CSV file is not Shift_JIS (cp932) encoded: {}", .0.display())]
    Encoding(PathBuf),

    #[error("CSV header error: {0}")]
    StructuralHeader(String),

    #[error("Required column '{0}' not found in the second CSV header row")]
    MissingColumn(String),

    #[error("CSV line {line}: {reason}")]
    Row { line: usize, reason: String },

    #[error("Out of memory while loading {}", .0.display())]
    MemoryExhausted(PathBuf),

    #[error("CSV file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Excel file not found: {}", .0.display())]
    DestinationNotFound(PathBuf),

    #[error("Cannot open Excel file {}: {reason}", .path.display())]
    DestinationFormat { path: PathBuf, reason: String },

    #[error("Cannot save Excel file {}: {reason}", .path.display())]
    DestinationWrite {
        path: PathBuf,
        failure: WriteFailure,
        reason: String,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unclassified(String),
}

impl GradebookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GradebookError::Encoding(_) => ErrorKind::Encoding,
            GradebookError::StructuralHeader(_) => ErrorKind::StructuralHeader,
            GradebookError::MissingColumn(_) => ErrorKind::MissingColumn,
            GradebookError::Row { .. } => ErrorKind::RowProcessing,
            GradebookError::MemoryExhausted(_) => ErrorKind::MemoryExhaustion,
            GradebookError::InputNotFound(_) => ErrorKind::InputNotFound,
            GradebookError::DestinationNotFound(_) => ErrorKind::DestinationNotFound,
            GradebookError::DestinationFormat { .. } => ErrorKind::DestinationFormat,
            GradebookError::DestinationWrite { .. } => ErrorKind::DestinationWrite,
            GradebookError::Settings(_) => ErrorKind::Settings,
            GradebookError::Io(_) | GradebookError::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    /// Human-readable explanation with enough context to fix the input
    /// without looking at logs.
    pub fn user_message(&self) -> String {
        match self {
            GradebookError::Encoding(path) => format!(
                "The CSV file could not be decoded.\nSave it as Shift_JIS (cp932) and try again.\nFile: {}",
                file_label(path)
            ),
            GradebookError::StructuralHeader(detail) => format!(
                "The CSV header is malformed: {detail}.\nLine 1 and line 4 must form a two-row header (lines 2-3 are skipped)."
            ),
            GradebookError::MissingColumn(keyword) => format!(
                "Required column '{keyword}' was not found in the second header row of the CSV file."
            ),
            GradebookError::Row { line, reason } => format!(
                "Processing stopped at CSV line {line}.\nCheck the data on that line.\nDetail: {reason}"
            ),
            GradebookError::MemoryExhausted(path) => format!(
                "Not enough memory to process {}.\nThe file may be too large.",
                file_label(path)
            ),
            GradebookError::InputNotFound(path) => {
                format!("CSV file not found: {}", path.display())
            }
            GradebookError::DestinationNotFound(path) => {
                format!("Excel file not found: {}", path.display())
            }
            GradebookError::DestinationFormat { path, reason } => format!(
                "The Excel file cannot be opened.\nIt may be corrupt or in an unsupported format (e.g. .xls).\nFile: {}\nDetail: {reason}",
                file_label(path)
            ),
            GradebookError::DestinationWrite {
                path,
                failure,
                reason,
            } => match failure {
                WriteFailure::Locked => format!(
                    "Saving failed.\nMake sure the file is not open in another program and is writable.\nFile: {}",
                    path.display()
                ),
                WriteFailure::DiskFull => format!(
                    "Saving failed because the disk is full.\nFile: {}",
                    path.display()
                ),
                WriteFailure::Other => format!(
                    "Saving failed.\nFile: {}\nDetail: {reason}",
                    path.display()
                ),
            },
            GradebookError::Settings(detail) => format!("Invalid settings: {detail}"),
            GradebookError::Io(e) => format!("An unexpected I/O error occurred.\nDetail: {e}"),
            GradebookError::Unclassified(detail) => {
                format!("An unexpected error occurred.\nDetail: {detail}")
            }
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_unclassified() {
        let err: GradebookError = std::io::Error::other("boom").into();
        assert_eq!(err.kind(), ErrorKind::Unclassified);
        assert!(err.user_message().contains("boom"));
    }

    #[test]
    fn test_row_error_mentions_line() {
        let err = GradebookError::Row {
            line: 7,
            reason: "expected 4 fields, found 5".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::RowProcessing);
        assert!(err.user_message().contains("line 7"));
    }

    #[test]
    fn test_encoding_message_uses_file_name() {
        let err = GradebookError::Encoding(PathBuf::from("/tmp/in/grades.csv"));
        let msg = err.user_message();
        assert!(msg.contains("grades.csv"));
        assert!(!msg.contains("/tmp/in"));
    }

    #[test]
    fn test_locked_write_hint() {
        let err = GradebookError::DestinationWrite {
            path: PathBuf::from("book.xlsx"),
            failure: WriteFailure::Locked,
            reason: "permission denied".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::DestinationWrite);
        assert!(err.user_message().contains("another program"));
    }
}
