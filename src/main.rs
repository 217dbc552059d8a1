use clap::{Parser, Subcommand};
use grade_transcriber::cli;
use grade_transcriber::logging;
use grade_transcriber::runner::TaskSelection;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "grade-transcriber")]
#[command(about = "Transcribe grade/attendance CSV exports into an Excel gradebook.")]
#[command(long_about = "Grade Transcriber - CSV export → pre-formatted Excel gradebook

Reads a Shift_JIS CSV with a two-row header (line 1 = subject, line 4 =
category; lines 2-3 are skipped) and writes every student into the term
sheets of an existing workbook, matching columns by their header labels.

COMMANDS:
  run      - Update term sheets and rebuild the summary sheets
  inspect  - Show what the CSV contains and how each term sheet maps

EXAMPLES:
  grade-transcriber run grades.csv gradebook.xlsx
  grade-transcriber run grades.csv gradebook.xlsx --term 前期
  grade-transcriber run grades.csv gradebook.xlsx --skip-transcribe
  grade-transcriber inspect grades.csv gradebook.xlsx")]
#[command(version)]
struct Cli {
    /// Show debug-level log output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true, env = "GRADE_TRANSCRIBER_LOG")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Update term sheets and rebuild the summary sheets.

For every selected term, the sheet named by the grades template (default
\"成績一覧 ({term})\") is updated: students already present (matched by the
ID in column A) are overwritten in place, new students are appended.
Terms whose sheet is missing are skipped with a warning.

The grade summary (評定一覧) and attendance summary (科目別個人出席状況)
sheets are deleted and rebuilt from the CSV.

The workbook is saved once, only if every step succeeds.")]
    /// Update term sheets and rebuild the summary sheets
    Run {
        /// Path to the CSV export (Shift_JIS)
        csv: PathBuf,

        /// Path to the destination workbook (.xlsx), updated in place
        workbook: PathBuf,

        /// Term to update (repeatable; defaults to the configured terms)
        #[arg(short, long = "term")]
        terms: Vec<String>,

        /// Do not update the term sheets
        #[arg(long)]
        skip_transcribe: bool,

        /// Do not rebuild the grade summary sheet
        #[arg(long)]
        skip_grade_summary: bool,

        /// Do not rebuild the attendance summary sheet
        #[arg(long)]
        skip_attendance_summary: bool,

        /// YAML settings file overriding sheet names and keywords
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show CSV contents and the column map of each term sheet
    Inspect {
        /// Path to the CSV export (Shift_JIS)
        csv: PathBuf,

        /// Destination workbook to check against (optional)
        workbook: Option<PathBuf>,

        /// Term to check (repeatable; defaults to the configured terms)
        #[arg(short, long = "term")]
        terms: Vec<String>,

        /// YAML settings file overriding sheet names and keywords
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let code = match cli.command {
        Commands::Run {
            csv,
            workbook,
            terms,
            skip_transcribe,
            skip_grade_summary,
            skip_attendance_summary,
            config,
        } => {
            let tasks = TaskSelection {
                transcribe: !skip_transcribe,
                grade_summary: !skip_grade_summary,
                attendance_summary: !skip_attendance_summary,
            };
            cli::run(csv, workbook, terms, tasks, config)
        }

        Commands::Inspect {
            csv,
            workbook,
            terms,
            config,
        } => cli::inspect(csv, workbook, terms, config),
    };
    Ok(code)
}
