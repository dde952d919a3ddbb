//! Rendering tables and single records in the selected output format

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::table::{RowRef, Table};

/// Widest cell shown in table output before truncation
const MAX_CELL: usize = 40;

/// Print every row of `table`
pub fn print_table(table: &Table, format: OutputFormat, id_column: &str, noun: &str, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(table).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(table.columns()).into_diagnostic()?;
            for row in table.rows() {
                writer
                    .write_record(row.values().iter().map(|v| v.to_string()))
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Id => {
            for row in table.rows() {
                println!("{}", row.text(id_column));
            }
        }
        OutputFormat::Md => {
            if table.is_empty() {
                println!("No {}s found.", noun);
            } else {
                println!("{}", build(table, false).with(Style::markdown()).to_string());
            }
        }
        OutputFormat::Auto | OutputFormat::Table => {
            if table.is_empty() {
                println!("No {}s found.", noun);
                return Ok(());
            }
            println!("{}", build(table, true).with(Style::sharp()).to_string());
            if !quiet {
                println!();
                println!("{} {}(s) found.", style(table.len()).cyan(), noun);
            }
        }
    }
    Ok(())
}

fn build(table: &Table, truncate: bool) -> tabled::Table {
    let mut builder = Builder::default();
    builder.push_record(table.columns().iter().cloned());
    for row in table.rows() {
        builder.push_record(row.values().iter().map(|v| {
            let text = v.to_string();
            if truncate {
                truncate_str(&text, MAX_CELL)
            } else {
                text.replace('|', "\\|").replace('\n', " ")
            }
        }));
    }
    builder.build()
}

/// Print one row as field/value pairs
pub fn print_row(row: &RowRef<'_>, columns: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(row).into_diagnostic()?);
        }
        OutputFormat::Id => {
            if let Some(first) = columns.first() {
                println!("{}", row.text(first));
            }
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(columns).into_diagnostic()?;
            writer
                .write_record(row.values().iter().map(|v| v.to_string()))
                .into_diagnostic()?;
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for column in columns {
                builder.push_record([column.clone(), row.text(column)]);
            }
            println!("{}", builder.build().with(Style::markdown()).to_string());
        }
        OutputFormat::Auto | OutputFormat::Table => {
            let width = columns.iter().map(|c| c.len()).max().unwrap_or(0);
            for column in columns {
                println!(
                    "{}  {}",
                    style(format!("{:<width$}", column, width = width)).bold(),
                    row.text(column)
                );
            }
        }
    }
    Ok(())
}

/// JSON for structured results; returns false when the caller should render text instead
pub fn print_json_if<T: Serialize>(format: OutputFormat, value: &T) -> Result<bool> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Print a ✓ line unless quiet
pub fn success(quiet: bool, message: impl std::fmt::Display) {
    if !quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Print a ! warning line to stderr
pub fn warning(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("!").yellow(), message);
}
