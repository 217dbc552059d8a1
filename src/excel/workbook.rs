//! Destination workbook handle - opened once, mutated by each task, saved once

use crate::error::{GradebookError, GradebookResult, WriteFailure};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use umya_spreadsheet::reader::xlsx::XlsxError as ReadError;
use umya_spreadsheet::writer::xlsx::XlsxError as WriteError;
use umya_spreadsheet::{Spreadsheet, Worksheet};

/// In-memory destination workbook bound to the path it is saved back to
pub struct GradeWorkbook {
    path: PathBuf,
    book: Spreadsheet,
}

impl GradeWorkbook {
    /// Open an existing .xlsx file
    pub fn open<P: AsRef<Path>>(path: P) -> GradebookResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(GradebookError::DestinationNotFound(path));
        }
        let book = umya_spreadsheet::reader::xlsx::read(&path).map_err(|e| match e {
            ReadError::Io(ref io) if io.kind() == io::ErrorKind::NotFound => {
                GradebookError::DestinationNotFound(path.clone())
            }
            other => GradebookError::DestinationFormat {
                path: path.clone(),
                reason: other.to_string(),
            },
        })?;
        info!(path = %path.display(), sheets = book.get_sheet_collection().len(), "opened workbook");
        Ok(Self { path, book })
    }

    /// Wrap a workbook already in memory; `save` writes it to `path`
    pub fn from_spreadsheet<P: AsRef<Path>>(path: P, book: Spreadsheet) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            book,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(|ws| ws.get_name().to_string())
            .collect()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.book.get_sheet_by_name(name).is_some()
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.book.get_sheet_by_name(name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.book.get_sheet_by_name_mut(name)
    }

    /// Drop any sheet called `name` and append a fresh, empty one
    pub fn replace_sheet(&mut self, name: &str) -> GradebookResult<&mut Worksheet> {
        if self.has_sheet(name) {
            self.book
                .remove_sheet_by_name(name)
                .map_err(|e| GradebookError::Unclassified(format!("cannot remove sheet '{name}': {e}")))?;
        }
        self.book
            .new_sheet(name)
            .map_err(|e| GradebookError::Unclassified(format!("cannot create sheet '{name}': {e}")))
    }

    pub fn spreadsheet(&self) -> &Spreadsheet {
        &self.book
    }

    /// Write every change back to the original path
    pub fn save(&self) -> GradebookResult<()> {
        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path)
            .map_err(|e| classify_save_error(&self.path, e))?;
        info!(path = %self.path.display(), "saved workbook");
        Ok(())
    }
}

fn classify_save_error(path: &Path, err: WriteError) -> GradebookError {
    let failure = match &err {
        WriteError::Io(io) => match io.kind() {
            io::ErrorKind::PermissionDenied => WriteFailure::Locked,
            io::ErrorKind::StorageFull => WriteFailure::DiskFull,
            _ => WriteFailure::Other,
        },
        _ => WriteFailure::Other,
    };
    GradebookError::DestinationWrite {
        path: path.to_path_buf(),
        failure,
        reason: err.to_string(),
    }
}
