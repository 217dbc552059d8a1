//! Run settings: sheet names, header keywords and summary styling.
//!
//! Every field has a default matching the standard school export format, so a
//! settings file only needs the keys that differ:
//!
//! ```yaml
//! sheets:
//!   grades_template: "成績一覧 ({term})"
//! terms: ["前期"]
//! ```

use crate::error::{GradebookError, GradebookResult};
use serde::Deserialize;
use std::path::Path;

/// Placeholder substituted with the term name in the grades sheet template
pub const TERM_PLACEHOLDER: &str = "{term}";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sheets: SheetNames,
    pub keywords: Keywords,
    pub labels: SummaryLabels,
    pub style: HeaderStyle,
    pub terms: TermList,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub grades_template: String,
    pub grade_summary: String,
    pub attendance_summary: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            grades_template: "成績一覧 ({term})".to_string(),
            grade_summary: "評定一覧".to_string(),
            attendance_summary: "科目別個人出席状況".to_string(),
        }
    }
}

/// Exam categories in their fixed order: primary, retest, grade
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExamKeywords {
    pub primary: String,
    pub retest: String,
    pub grade: String,
}

impl Default for ExamKeywords {
    fn default() -> Self {
        Self {
            primary: "本試".to_string(),
            retest: "再試".to_string(),
            grade: "評".to_string(),
        }
    }
}

impl ExamKeywords {
    pub fn all(&self) -> [&str; 3] {
        [&self.primary, &self.retest, &self.grade]
    }

    pub fn contains(&self, label: &str) -> bool {
        self.all().contains(&label)
    }
}

/// Attendance category: short code used in the CSV, full label for summaries
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceCategory {
    pub code: String,
    pub label: String,
}

impl AttendanceCategory {
    fn new(code: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Keywords {
    /// Second-level label of the student name column
    pub name: String,
    pub exams: ExamKeywords,
    pub attendance: Vec<AttendanceCategory>,
    /// Row-level aggregate columns, matched against first-level labels
    pub aggregates: Vec<String>,
    /// Aggregate written as a live formula instead of a copied value
    pub retest_count: String,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            name: "氏名".to_string(),
            exams: ExamKeywords::default(),
            attendance: vec![
                AttendanceCategory::new("欠", "欠席"),
                AttendanceCategory::new("遅", "遅刻"),
                AttendanceCategory::new("早", "早退"),
            ],
            aggregates: ["備考", "科目数", "総点", "平均点", "欠課合計", "順位", "再試数"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            retest_count: "再試数".to_string(),
        }
    }
}

impl Keywords {
    pub fn is_attendance(&self, label: &str) -> bool {
        self.attendance.iter().any(|a| a.code == label)
    }

    pub fn is_aggregate(&self, label: &str) -> bool {
        self.aggregates.iter().any(|a| a == label)
    }

    /// Display label for an attendance code, falling back to the code itself
    pub fn attendance_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.attendance
            .iter()
            .find(|a| a.code == code)
            .map(|a| a.label.as_str())
            .unwrap_or(code)
    }
}

/// Fixed labels written into generated summary headers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryLabels {
    pub student_id: String,
    pub student_name: String,
    pub subject: String,
}

impl Default for SummaryLabels {
    fn default() -> Self {
        Self {
            student_id: "学籍番号".to_string(),
            student_name: "氏名".to_string(),
            subject: "科目名".to_string(),
        }
    }
}

/// RGB hex colours (no leading '#') for summary header rows
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderStyle {
    pub font_color: String,
    pub fill_color: String,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            font_color: "000000".to_string(),
            fill_color: "CEE6C1".to_string(),
        }
    }
}

impl HeaderStyle {
    pub fn font_argb(&self) -> String {
        format!("FF{}", self.font_color.trim_start_matches('#'))
    }

    pub fn fill_argb(&self) -> String {
        format!("FF{}", self.fill_color.trim_start_matches('#'))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct TermList(pub Vec<String>);

impl Default for TermList {
    fn default() -> Self {
        Self(vec!["前期".to_string(), "通期".to_string()])
    }
}

impl Settings {
    /// Load settings from a YAML file; absent keys keep their defaults
    pub fn load(path: &Path) -> GradebookResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GradebookError::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        let settings: Settings = serde_yaml::from_str(&content).map_err(|e| {
            GradebookError::Settings(format!("cannot parse {}: {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> GradebookResult<()> {
        if !self.sheets.grades_template.contains(TERM_PLACEHOLDER) {
            return Err(GradebookError::Settings(format!(
                "sheets.grades_template must contain '{}'",
                TERM_PLACEHOLDER
            )));
        }
        if self.keywords.name.trim().is_empty() {
            return Err(GradebookError::Settings(
                "keywords.name must not be empty".to_string(),
            ));
        }
        if self.keywords.exams.all().iter().any(|k| k.trim().is_empty()) {
            return Err(GradebookError::Settings(
                "keywords.exams entries must not be empty".to_string(),
            ));
        }
        if self.keywords.attendance.is_empty() {
            return Err(GradebookError::Settings(
                "keywords.attendance must list at least one category".to_string(),
            ));
        }
        Ok(())
    }

    /// Destination sheet name for a term
    pub fn grades_sheet_name(&self, term: &str) -> String {
        self.sheets.grades_template.replace(TERM_PLACEHOLDER, term)
    }

    pub fn default_terms(&self) -> &[String] {
        &self.terms.0
    }
}
