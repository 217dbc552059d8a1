//! Shared fixtures: Shift_JIS CSV exports and destination gradebooks
#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

pub const FIRST_TERM_SHEET: &str = "成績一覧 (前期)";

/// Write `lines` as a CRLF, Shift_JIS encoded CSV
pub fn write_sjis_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    write_sjis_csv_with_eol(dir, name, lines, "\r\n")
}

/// Write `lines` as a Shift_JIS encoded CSV terminated by `eol`
pub fn write_sjis_csv_with_eol(dir: &Path, name: &str, lines: &[&str], eol: &str) -> PathBuf {
    let text = lines.join(eol) + eol;
    let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(&text);
    assert!(!had_errors, "fixture text must be representable in Shift_JIS");
    let path = dir.join(name);
    std::fs::write(&path, bytes.as_ref()).unwrap();
    path
}

/// Standard export: two subjects with exams, attendance and aggregates
pub fn standard_csv_lines() -> Vec<&'static str> {
    vec![
        "学籍番号,氏名,数学,数学,数学,数学,英語,英語,英語,英語,総点,再試数,備考",
        "単位,,2,2,2,2,2,2,2,2,,,",
        "担当,,佐藤,佐藤,佐藤,佐藤,鈴木,鈴木,鈴木,鈴木,,,",
        ",氏名,本試,再試,評,欠,本試,再試,評,遅,,,",
        "S001,山田太郎,80,,A,1,55,62,C,0,135,1,",
        "S002,佐藤花子,90,,A,0,70,,B,2,160,0,優秀",
        "S003,鈴木次郎,40,65,C,3,88,,A,1,128,1,",
    ]
}

/// Destination sheet layout used by most tests:
///
/// ```text
///      A        B     C    D    E    F    G    H    I     J      K
/// 1  学籍番号  氏名  [ 数学 merged ] [ 英語 merged ] 総点  再試数  備考
/// 4                  本試 再試  評  本試 再試  評
/// ```
///
/// `students` are placed from row 5 down.
pub fn write_template(path: &Path, sheet_name: &str, students: &[(&str, &str)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();

    let plain = Format::new();
    worksheet.write_string(0, 0, "学籍番号").unwrap();
    worksheet.write_string(0, 1, "氏名").unwrap();
    worksheet.merge_range(0, 2, 0, 4, "数学", &plain).unwrap();
    worksheet.merge_range(0, 5, 0, 7, "英語", &plain).unwrap();
    worksheet.write_string(0, 8, "総点").unwrap();
    worksheet.write_string(0, 9, "再試数").unwrap();
    worksheet.write_string(0, 10, "備考").unwrap();
    worksheet.write_string(1, 2, "単位数").unwrap();
    for (offset, category) in ["本試", "再試", "評"].iter().cycle().take(6).enumerate() {
        worksheet
            .write_string(3, 2 + offset as u16, *category)
            .unwrap();
    }
    for (i, (id, name)) in students.iter().enumerate() {
        let row = 4 + i as u32;
        worksheet.write_string(row, 0, *id).unwrap();
        worksheet.write_string(row, 1, *name).unwrap();
    }

    workbook.save(path).unwrap();
}

/// Workbook whose only sheet has a header shorter than four rows
pub fn write_short_template(path: &Path, sheet_name: &str) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();
    worksheet.write_string(0, 0, "学籍番号").unwrap();
    worksheet.write_string(1, 2, "本試").unwrap();
    workbook.save(path).unwrap();
}
