//! End-to-end runs: CSV on disk → workbook on disk

mod common;

use common::FIRST_TERM_SHEET;
use grade_transcriber::config::Settings;
use grade_transcriber::error::ErrorKind;
use grade_transcriber::excel::{GradeWorkbook, SheetOutcome, SkipReason};
use grade_transcriber::runner::{run, RunOptions, SummaryOutcome, TaskSelection};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

fn options(csv: &Path, workbook: &Path, terms: &[&str], tasks: TaskSelection) -> RunOptions {
    RunOptions {
        csv_path: csv.to_path_buf(),
        workbook_path: workbook.to_path_buf(),
        terms: terms.iter().map(|t| t.to_string()).collect(),
        tasks,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FULL RUNS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_full_run_updates_term_and_rebuilds_summaries() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(dir.path(), "grades.csv", &common::standard_csv_lines());
    let book = dir.path().join("book.xlsx");
    common::write_template(&book, FIRST_TERM_SHEET, &[("S002", "佐藤花子")]);

    let settings = Settings::default();
    let report = run(
        &options(&csv, &book, &["前期", "通期"], TaskSelection::default()),
        &settings,
    )
    .unwrap();

    assert_eq!(report.records, 3);
    assert!(!report.no_terms);
    assert_eq!(
        report.sheets,
        vec![
            SheetOutcome::Updated {
                sheet: FIRST_TERM_SHEET.to_string(),
                updated: 1,
                inserted: 2,
            },
            SheetOutcome::Skipped {
                sheet: "成績一覧 (通期)".to_string(),
                reason: SkipReason::SheetNotFound,
            },
        ]
    );
    assert_eq!(
        report.summaries,
        vec![
            SummaryOutcome::Written {
                sheet: "評定一覧".to_string(),
                rows: 3,
            },
            SummaryOutcome::Written {
                sheet: "科目別個人出席状況".to_string(),
                rows: 3,
            },
        ]
    );

    let saved = GradeWorkbook::open(&book).unwrap();
    let term = saved.sheet(FIRST_TERM_SHEET).unwrap();
    assert_eq!(term.get_value((1, 5)), "S002");
    assert_eq!(term.get_value((3, 5)), "90");
    assert_eq!(term.get_value((1, 6)), "S001");
    assert_eq!(term.get_value((1, 7)), "S003");
    assert_eq!(term.get_value((4, 7)), "65");

    let grades = saved.sheet("評定一覧").unwrap();
    assert_eq!(grades.get_value("C1"), "数学");
    assert_eq!(grades.get_value("D1"), "英語");
    assert_eq!(grades.get_value("C4"), "C");

    let attendance = saved.sheet("科目別個人出席状況").unwrap();
    assert_eq!(attendance.get_value("C2"), "欠席");
    assert_eq!(attendance.get_value("D2"), "遅刻");
    assert_eq!(attendance.get_value("D4"), "2");
}

#[test]
fn test_summaries_only_leaves_term_sheet_alone() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(dir.path(), "grades.csv", &common::standard_csv_lines());
    let book = dir.path().join("book.xlsx");
    common::write_template(&book, FIRST_TERM_SHEET, &[]);

    let tasks = TaskSelection {
        transcribe: false,
        ..TaskSelection::default()
    };
    let report = run(&options(&csv, &book, &["前期"], tasks), &Settings::default()).unwrap();

    assert!(report.sheets.is_empty());
    let saved = GradeWorkbook::open(&book).unwrap();
    assert_eq!(saved.sheet(FIRST_TERM_SHEET).unwrap().get_value((1, 5)), "");
    assert!(saved.has_sheet("評定一覧"));
}

#[test]
fn test_no_terms_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(dir.path(), "grades.csv", &common::standard_csv_lines());
    let book = dir.path().join("book.xlsx");
    common::write_template(&book, FIRST_TERM_SHEET, &[]);

    let report = run(
        &options(&csv, &book, &[], TaskSelection::default()),
        &Settings::default(),
    )
    .unwrap();
    assert!(report.no_terms);
    assert!(report.sheets.is_empty());
    assert_eq!(report.summaries.len(), 2);
}

#[test]
fn test_summary_without_source_columns_is_skipped() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(
        dir.path(),
        "grades.csv",
        &["学籍番号,氏名,数学", ",,", ",,", ",氏名,本試", "S001,山田太郎,80"],
    );
    let book = dir.path().join("book.xlsx");
    common::write_template(&book, FIRST_TERM_SHEET, &[]);

    let report = run(
        &options(&csv, &book, &["前期"], TaskSelection::default()),
        &Settings::default(),
    )
    .unwrap();
    assert_eq!(
        report.summaries,
        vec![
            SummaryOutcome::Skipped {
                sheet: "評定一覧".to_string()
            },
            SummaryOutcome::Skipped {
                sheet: "科目別個人出席状況".to_string()
            },
        ]
    );
    let saved = GradeWorkbook::open(&book).unwrap();
    assert!(!saved.has_sheet("評定一覧"));
}

#[test]
fn test_padded_csv_labels_match_destination_headers() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(
        dir.path(),
        "grades.csv",
        &[
            "学籍番号,氏名, 数学 ,英語 ",
            ",,,",
            ",,,",
            ",氏名,本試 , 評",
            "S001,山田太郎,77,A",
        ],
    );
    let book = dir.path().join("book.xlsx");
    common::write_template(&book, FIRST_TERM_SHEET, &[]);

    let tasks = TaskSelection {
        transcribe: true,
        grade_summary: false,
        attendance_summary: false,
    };
    run(&options(&csv, &book, &["前期"], tasks), &Settings::default()).unwrap();

    let saved = GradeWorkbook::open(&book).unwrap();
    let term = saved.sheet(FIRST_TERM_SHEET).unwrap();
    assert_eq!(term.get_value((3, 5)), "77");
    assert_eq!(term.get_value((8, 5)), "A");
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILED RUNS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_failed_load_leaves_workbook_untouched() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(
        dir.path(),
        "grades.csv",
        &[
            "学籍番号,氏名,数学",
            ",,",
            ",,",
            ",氏名,本試",
            "S001,山田太郎,80,extra",
        ],
    );
    let book = dir.path().join("book.xlsx");
    common::write_template(&book, FIRST_TERM_SHEET, &[]);
    let before = std::fs::read(&book).unwrap();

    let err = run(
        &options(&csv, &book, &["前期"], TaskSelection::default()),
        &Settings::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RowProcessing);
    assert_eq!(std::fs::read(&book).unwrap(), before);
}

#[test]
fn test_missing_workbook_is_classified() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(dir.path(), "grades.csv", &common::standard_csv_lines());

    let err = run(
        &options(
            &csv,
            &dir.path().join("absent.xlsx"),
            &["前期"],
            TaskSelection::default(),
        ),
        &Settings::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DestinationNotFound);
}

#[test]
fn test_non_xlsx_workbook_is_format_error() {
    let dir = TempDir::new().unwrap();
    let csv = common::write_sjis_csv(dir.path(), "grades.csv", &common::standard_csv_lines());
    let book = dir.path().join("book.xlsx");
    std::fs::write(&book, b"not a zip archive").unwrap();

    let err = run(
        &options(&csv, &book, &["前期"], TaskSelection::default()),
        &Settings::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DestinationFormat);
}
