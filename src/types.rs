use std::collections::HashMap;
use std::fmt;

//==============================================================================
// Cell values
//==============================================================================

/// NA markers treated as blank, matching what spreadsheet exports emit
const NA_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "#N/A", "NULL", "null"];

/// A scalar read from the CSV and written to the workbook
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    /// Text; blank cells are normalised to the empty string
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Classify a raw CSV field
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
            return CellValue::empty();
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

//==============================================================================
// Source columns
//==============================================================================

/// One column of the CSV's two-row header, labels kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceColumn {
    /// First-level label (subject or aggregate field name)
    pub primary: String,
    /// Second-level label (category keyword)
    pub secondary: String,
}

impl SourceColumn {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

//==============================================================================
// Student records
//==============================================================================

/// (subject, category) key used for scores and attendance
pub type SubjectKey = (String, String);

/// One student's consolidated data for a run
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    id: String,
    name: String,
    /// (subject, exam category) → score
    pub scores: HashMap<SubjectKey, CellValue>,
    /// (subject, attendance code) → count
    pub attendance: HashMap<SubjectKey, CellValue>,
    /// aggregate field name → value
    pub aggregates: HashMap<String, CellValue>,
}

impl StudentRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scores: HashMap::new(),
            attendance: HashMap::new(),
            aggregates: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_score(&mut self, subject: &str, category: &str, value: CellValue) {
        self.scores
            .insert((subject.to_string(), category.to_string()), value);
    }

    pub fn add_attendance(&mut self, subject: &str, code: &str, value: CellValue) {
        self.attendance
            .insert((subject.to_string(), code.to_string()), value);
    }

    pub fn set_aggregate(&mut self, field: &str, value: CellValue) {
        self.aggregates.insert(field.to_string(), value);
    }

    pub fn score(&self, subject: &str, category: &str) -> Option<&CellValue> {
        self.scores.get(&(subject.to_string(), category.to_string()))
    }

    pub fn attendance_for(&self, subject: &str, code: &str) -> Option<&CellValue> {
        self.attendance.get(&(subject.to_string(), code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers_and_text() {
        assert_eq!(CellValue::parse("80"), CellValue::Number(80.0));
        assert_eq!(CellValue::parse(" 72.5 "), CellValue::Number(72.5));
        assert_eq!(CellValue::parse("B"), CellValue::Text("B".to_string()));
        assert_eq!(CellValue::parse("inf"), CellValue::Text("inf".to_string()));
    }

    #[test]
    fn test_parse_blank_and_na() {
        for raw in ["", "   ", "NaN", "#N/A", "null"] {
            assert_eq!(CellValue::parse(raw), CellValue::empty(), "raw = {raw:?}");
        }
    }

    #[test]
    fn test_display_drops_trailing_zero_fraction() {
        assert_eq!(CellValue::Number(80.0).to_string(), "80");
        assert_eq!(CellValue::Number(72.5).to_string(), "72.5");
        assert_eq!(CellValue::from("優").to_string(), "優");
    }

    #[test]
    fn test_record_lookups() {
        let mut record = StudentRecord::new("S1", "Taro");
        record.add_score("Math", "本試", CellValue::Number(80.0));
        record.add_attendance("Math", "欠", CellValue::Number(2.0));
        assert_eq!(record.score("Math", "本試"), Some(&CellValue::Number(80.0)));
        assert_eq!(record.score("Math", "評"), None);
        assert_eq!(
            record.attendance_for("Math", "欠"),
            Some(&CellValue::Number(2.0))
        );
    }
}
