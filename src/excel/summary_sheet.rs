//! Renders a `SummaryTable` into a freshly recreated, styled worksheet

use super::column_map::column_letter;
use super::transcribe::write_value;
use super::workbook::GradeWorkbook;
use crate::config::HeaderStyle;
use crate::error::GradebookResult;
use crate::summary::SummaryTable;
use crate::types::CellValue;
use tracing::info;
use umya_spreadsheet::{Border, HorizontalAlignmentValues, VerticalAlignmentValues, Worksheet};

/// Column widths never exceed this
const MAX_COLUMN_WIDTH: f64 = 500.0;

/// Replace sheet `name` with `table`. Header rows are bold, filled and
/// centred; every cell in the used range gets a thin border.
pub fn write_summary_sheet(
    workbook: &mut GradeWorkbook,
    name: &str,
    table: &SummaryTable,
    style: &HeaderStyle,
) -> GradebookResult<()> {
    let sheet = workbook.replace_sheet(name)?;
    let header_count = table.header_rows.len() as u32;

    for (r, header) in table.header_rows.iter().enumerate() {
        let row = r as u32 + 1;
        for (c, label) in header.iter().enumerate() {
            sheet
                .get_cell_mut((c as u32 + 1, row))
                .set_value_string(label.as_str());
        }
    }
    for (r, data) in table.rows.iter().enumerate() {
        let row = header_count + r as u32 + 1;
        for (c, value) in data.iter().enumerate() {
            write_value(sheet, c as u32 + 1, row, value);
        }
    }

    let col_count = table.column_count() as u32;
    for row in 1..=header_count {
        style_header_row(sheet, row, col_count, style);
    }
    for span in &table.merges {
        sheet.add_merge_cells(format!(
            "{}{}:{}{}",
            column_letter(span.first_col),
            span.row,
            column_letter(span.last_col),
            span.row
        ));
    }
    let last_row = header_count + table.rows.len() as u32;
    apply_borders(sheet, last_row, col_count);
    fit_column_widths(sheet, table);

    info!(sheet = name, rows = table.rows.len(), "summary sheet written");
    Ok(())
}

fn style_header_row(sheet: &mut Worksheet, row: u32, col_count: u32, style: &HeaderStyle) {
    for col in 1..=col_count {
        let cell_style = sheet.get_style_mut((col, row));
        let font = cell_style.get_font_mut();
        font.set_bold(true);
        font.get_color_mut().set_argb(style.font_argb());
        cell_style.set_background_color(style.fill_argb());
        let alignment = cell_style.get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Center);
        alignment.set_vertical(VerticalAlignmentValues::Center);
    }
}

fn apply_borders(sheet: &mut Worksheet, last_row: u32, col_count: u32) {
    for row in 1..=last_row {
        for col in 1..=col_count {
            let borders = sheet.get_style_mut((col, row)).get_borders_mut();
            borders.get_left_mut().set_border_style(Border::BORDER_THIN);
            borders.get_right_mut().set_border_style(Border::BORDER_THIN);
            borders.get_top_mut().set_border_style(Border::BORDER_THIN);
            borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);
        }
    }
}

/// Size each column from its last header label and its data cells
fn fit_column_widths(sheet: &mut Worksheet, table: &SummaryTable) {
    let Some(header) = table.header_rows.last() else {
        return;
    };
    for (idx, label) in header.iter().enumerate() {
        let data_width = table
            .rows
            .iter()
            .filter_map(|row| row.get(idx))
            .filter(|value| !value.is_blank())
            .map(|value: &CellValue| display_width(&value.to_string()))
            .fold(0.0, f64::max);
        let width = display_width(label).max(data_width).min(MAX_COLUMN_WIDTH);
        sheet
            .get_column_dimension_mut(&column_letter(idx as u32 + 1))
            .set_width(width);
    }
}

/// Rough rendered width: full-width Japanese characters count triple,
/// plus two characters of padding.
pub fn display_width(text: &str) -> f64 {
    let (wide, narrow) = text.chars().fold((0usize, 0usize), |(wide, narrow), ch| {
        if is_wide_char(ch) {
            (wide + 1, narrow)
        } else {
            (wide, narrow + 1)
        }
    });
    (narrow + wide * 3 + 2) as f64
}

fn is_wide_char(ch: char) -> bool {
    matches!(ch,
        '一'..='龠'   // kanji
        | 'ぁ'..='ん' // hiragana
        | 'ァ'..='ン' // katakana
        | 'Ａ'..='ｚ') // full-width latin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width(""), 2.0);
        assert_eq!(display_width("S001"), 6.0);
        assert_eq!(display_width("氏名"), 8.0);
        assert_eq!(display_width("数学A"), 9.0);
    }
}
