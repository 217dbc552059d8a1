use crate::config::Settings;
use crate::error::GradebookResult;
use crate::excel::{ColumnMap, GradeWorkbook, SheetOutcome, SkipReason};
use crate::loader::load_students;
use crate::runner::{self, RunOptions, RunReport, SummaryOutcome, TaskSelection};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

/// Load settings from `config`, or use the built-in defaults
pub fn load_settings(config: Option<&Path>) -> GradebookResult<Settings> {
    match config {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    }
}

/// Execute the run command. Failures are classified and printed here; the
/// process never panics on bad input.
pub fn run(
    csv: PathBuf,
    workbook: PathBuf,
    terms: Vec<String>,
    tasks: TaskSelection,
    config: Option<PathBuf>,
) -> ExitCode {
    println!("{}", "📚 Grade Transcriber".bold().green());
    println!("   CSV:   {}", csv.display());
    println!("   Excel: {}\n", workbook.display());

    let result = load_settings(config.as_deref()).and_then(|settings| {
        let terms = if terms.is_empty() {
            settings.default_terms().to_vec()
        } else {
            terms
        };
        let options = RunOptions {
            csv_path: csv,
            workbook_path: workbook,
            terms,
            tasks,
        };
        runner::run(&options, &settings)
    });

    match result {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), "run failed: {e}");
            eprintln!("{}", "❌ Processing stopped".bold().red());
            for line in e.user_message().lines() {
                eprintln!("   {line}");
            }
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &RunReport) {
    println!("   Students loaded: {}", report.records.to_string().bold());

    if report.no_terms {
        println!(
            "   {} No term selected, grades sheets not updated",
            "⚠️".yellow()
        );
    }
    for outcome in &report.sheets {
        match outcome {
            SheetOutcome::Updated {
                sheet,
                updated,
                inserted,
            } => println!(
                "   {} {}: {} updated, {} added",
                "✅".green(),
                sheet.bright_blue().bold(),
                updated,
                inserted
            ),
            SheetOutcome::Skipped { sheet, reason } => {
                let why = match reason {
                    SkipReason::SheetNotFound => "sheet not found".to_string(),
                    SkipReason::HeaderTooShort { rows } => {
                        format!("header has only {rows} rows (4 required)")
                    }
                };
                println!(
                    "   {} {}: skipped, {}",
                    "⚠️".yellow(),
                    sheet.bright_blue(),
                    why.yellow()
                );
            }
        }
    }
    for outcome in &report.summaries {
        match outcome {
            SummaryOutcome::Written { sheet, rows } => println!(
                "   {} {}: {} rows",
                "✅".green(),
                sheet.bright_blue().bold(),
                rows
            ),
            SummaryOutcome::Skipped { sheet } => println!(
                "   {} {}: skipped, no matching CSV columns",
                "⚠️".yellow(),
                sheet.bright_blue()
            ),
        }
    }

    println!();
    println!("{}", "✅ Completed successfully".bold().green());
    println!("   File: {}", report.output.display());
}

/// Execute the inspect command: show what the CSV contains and how each term
/// sheet's header maps, without writing anything.
pub fn inspect(
    csv: PathBuf,
    workbook: Option<PathBuf>,
    terms: Vec<String>,
    config: Option<PathBuf>,
) -> ExitCode {
    match inspect_inner(&csv, workbook.as_deref(), terms, config.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", "❌ Inspection failed".bold().red());
            for line in e.user_message().lines() {
                eprintln!("   {line}");
            }
            ExitCode::FAILURE
        }
    }
}

fn inspect_inner(
    csv: &Path,
    workbook: Option<&Path>,
    terms: Vec<String>,
    config: Option<&Path>,
) -> GradebookResult<()> {
    let settings = load_settings(config)?;
    let loaded = load_students(csv, &settings)?;

    println!("{}", "🔍 CSV".bold().green());
    println!("   File: {}", csv.display());
    println!("   Students: {}", loaded.records.len().to_string().bold());

    let mut subjects: Vec<&str> = Vec::new();
    for col in loaded.columns.iter().skip(1) {
        let is_subject = settings.keywords.exams.contains(&col.secondary)
            || settings.keywords.is_attendance(&col.secondary);
        if is_subject && !subjects.contains(&col.primary.as_str()) {
            subjects.push(&col.primary);
        }
    }
    println!("   Subjects: {}", subjects.join(", ").cyan());

    let Some(path) = workbook else {
        return Ok(());
    };
    let book = GradeWorkbook::open(path)?;
    let terms = if terms.is_empty() {
        settings.default_terms().to_vec()
    } else {
        terms
    };

    println!();
    println!("{}", "📊 Workbook".bold().green());
    println!("   File: {}", path.display());
    for term in &terms {
        let sheet_name = settings.grades_sheet_name(term);
        let Some(sheet) = book.sheet(&sheet_name) else {
            println!("   {} {}: not found", "⚠️".yellow(), sheet_name.bright_blue());
            continue;
        };
        let Some(map) = ColumnMap::scan(sheet, &settings.keywords) else {
            println!(
                "   {} {}: header has fewer than 4 rows",
                "⚠️".yellow(),
                sheet_name.bright_blue()
            );
            continue;
        };
        println!("   {}", sheet_name.bright_blue().bold());
        for (subject, category, col) in map.subject_entries() {
            println!(
                "      {:>4}  {} / {}",
                crate::excel::column_letter(col),
                subject.cyan(),
                category
            );
        }
        for (field, col) in map.aggregate_entries() {
            println!(
                "      {:>4}  {}",
                crate::excel::column_letter(col),
                field.cyan()
            );
        }
        let missing: Vec<&str> = subjects
            .iter()
            .copied()
            .filter(|s| {
                settings
                    .keywords
                    .exams
                    .all()
                    .iter()
                    .all(|cat| map.subject_column(s, cat).is_none())
            })
            .collect();
        if !missing.is_empty() {
            println!(
                "      {} not in this sheet: {}",
                "⚠️".yellow(),
                missing.join(", ").yellow()
            );
        }
    }
    Ok(())
}
