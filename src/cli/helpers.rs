//! Shared helper functions for CLI commands
//!
//! Session setup, output format resolution, and the search/filter flags
//! every list command shares.

use chrono::NaiveDate;
use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::output;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cells;
use crate::core::entity::Record;
use crate::core::filter::{self, ColumnControl, SearchFilter, Selection};
use crate::core::records::Records;
use crate::core::session::Session;
use crate::core::table::Table;

/// Open the workspace for a command, honoring `--data-dir` and `--role`
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    Session::open(global.data_dir.as_deref(), global.role.as_deref())
        .map_err(|e| miette::miette!("{}", e))
}

/// `--format auto` falls back to the configured default, then to a table
pub fn resolve_format(global: &GlobalOpts, session: &Session) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    session
        .config()
        .default_format
        .as_deref()
        .and_then(|f| OutputFormat::from_str(f, true).ok())
        .filter(|f| *f != OutputFormat::Auto)
        .unwrap_or(OutputFormat::Table)
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    cells::parse_date(s).ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD)", s))
}

/// Split a comma-separated list argument, dropping blanks
pub fn split_list(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Search, column filter, and paging flags shared by list commands
#[derive(clap::Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Free-text search across every column (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Column to refine on after the search
    #[arg(long, short = 'c')]
    pub column: Option<String>,

    /// Keep rows whose column is one of these values (comma-separated)
    #[arg(long, value_delimiter = ',', requires = "column", conflicts_with_all = ["contains", "min", "max"])]
    pub values: Vec<String>,

    /// Keep rows whose column contains this text
    #[arg(long, requires = "column", conflicts_with_all = ["min", "max"])]
    pub contains: Option<String>,

    /// Lower bound for a numeric column (inclusive)
    #[arg(long, requires = "column", allow_hyphen_values = true)]
    pub min: Option<f64>,

    /// Upper bound for a numeric column (inclusive)
    #[arg(long, requires = "column", allow_hyphen_values = true)]
    pub max: Option<f64>,

    /// List filterable columns and the control each offers
    #[arg(long)]
    pub show_filters: bool,

    /// Sort by column
    #[arg(long)]
    pub sort: Option<String>,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

impl FilterArgs {
    pub fn to_filter(&self) -> SearchFilter {
        let mut filter = SearchFilter {
            query: self.search.clone().filter(|q| !q.is_empty()),
            column: None,
        };
        if let Some(column) = &self.column {
            let selection = if self.min.is_some() || self.max.is_some() {
                Selection::Range {
                    min: self.min,
                    max: self.max,
                }
            } else if let Some(text) = &self.contains {
                Selection::Contains(text.clone())
            } else if !self.values.is_empty() {
                Selection::OneOf(self.values.clone())
            } else {
                Selection::Any
            };
            filter = filter.with_column(column.clone(), selection);
        }
        filter
    }
}

/// Filter, sort, and print a table the way every `list` command does
///
/// Returns without printing rows when `--show-filters` or `--count` is set.
pub fn list_table(table: Table, args: &FilterArgs, global: &GlobalOpts, session: &Session, id_column: &str, noun: &str) -> Result<()> {
    let filter = args.to_filter();
    let searched = match filter.query.as_deref() {
        Some(q) => filter::free_text(&table, q),
        None => table.clone(),
    };

    if args.show_filters {
        return show_filters(&table, &searched, global, session);
    }

    let outcome = filter::apply(&table, &filter).map_err(|e| miette::miette!("{}", e))?;
    if let Some(note) = outcome.note {
        if !global.quiet {
            eprintln!("{} {}", style("!").yellow(), note);
        }
    }

    let mut rows = outcome.table;
    if let Some(column) = &args.sort {
        if !rows.has_column(column) {
            return Err(miette::miette!(
                "unknown sort column '{}' (available: {})",
                column,
                rows.columns().join(", ")
            ));
        }
        rows.sort_by_column(column, args.reverse);
    } else if args.reverse {
        rows = reversed(&rows);
    }
    if let Some(limit) = args.limit {
        rows = rows.head(limit);
    }

    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    output::print_table(&rows, resolve_format(global, session), id_column, noun, global.quiet)
}

fn reversed(table: &Table) -> Table {
    let mut rows: Vec<_> = table.rows().map(|r| r.to_row()).collect();
    rows.reverse();
    let mut out = Table::new(table.columns());
    for row in rows {
        out.push_row(row);
    }
    out
}

fn show_filters(table: &Table, searched: &Table, global: &GlobalOpts, session: &Session) -> Result<()> {
    if searched.is_empty() {
        println!("{}", filter::NO_DATA_NOTE);
        return Ok(());
    }

    let mut summary = Table::new(&["column", "control", "options"]);
    for (column, control) in filter::offered_controls(table, searched) {
        let options = match &control {
            ColumnControl::Range { min, max } => format!("{} .. {}", min, max),
            ColumnControl::Substring => "--contains <TEXT>".to_string(),
            ColumnControl::MultiSelect { options } => truncate_str(&options.join(", "), 60),
        };
        summary.push_row(
            crate::core::table::Row::new()
                .with("column", column.as_str())
                .with("control", control.name())
                .with("options", options),
        );
    }

    let format = resolve_format(global, session);
    output::print_table(&summary, format, "column", "filterable column", global.quiet)
}

/// `show` for any record type: print the stored row as-is
pub fn show_record<R: Record>(session: &Session, id: &str, global: &GlobalOpts) -> Result<()> {
    let records = Records::<R>::new(session.workspace());
    let table = records.table().map_err(|e| miette::miette!("{}", e))?;
    let row = table
        .position(R::ID_COLUMN, id)
        .and_then(|index| table.row(index))
        .ok_or_else(|| miette::miette!("{} '{}' not found", R::KIND, id))?;
    output::print_row(&row, table.columns(), resolve_format(global, session))
}

/// `delete` for any record type
pub fn delete_record<R: Record>(session: &Session, id: &str, global: &GlobalOpts) -> Result<()> {
    Records::<R>::new(session.workspace())
        .delete(id)
        .map_err(|e| miette::miette!("{}", e))?;
    output::success(global.quiet, format!("Deleted {} {}", R::KIND, style(id).cyan()));
    Ok(())
}

/// Lay records back out as a table in their stored column order
pub fn records_table<R: Record>(records: &[R]) -> Table {
    let mut table = Table::new(R::COLUMNS);
    for record in records {
        table.push_row(record.to_row());
    }
    table
}

/// `list` for any role-scoped record type
pub fn list_records<R: Record>(session: &Session, args: &FilterArgs, global: &GlobalOpts) -> Result<()> {
    let table = Records::<R>::new(session.workspace())
        .table_for(session.role())
        .map_err(|e| miette::miette!("{}", e))?;
    list_table(table, args, global, session, R::ID_COLUMN, R::KIND)
}
