//! Search and filter engine for list views
//!
//! Filtering runs in two stages that always compose in this order:
//!
//! 1. A free-text query keeps rows where any cell contains the query,
//!    case-insensitively.
//! 2. An optional column filter refines the stage-1 result. The column's
//!    kind comes from the whole table, so a mixed column stays text however
//!    the search narrows it. The seeded range and the multi-select options
//!    come from the stage-1 result.
//!
//! The engine never mutates the store; it returns a reduced copy for display.

use serde::Serialize;
use thiserror::Error;

use crate::core::table::{ColumnKind, Table, Value};

/// Columns with at most this many distinct values are always offered
pub const LOW_CARDINALITY_MAX: usize = 20;

/// Text columns with more distinct values than this get a substring box
pub const HIGH_CARDINALITY_MIN: usize = 50;

/// Message shown when there is nothing left to refine
pub const NO_DATA_NOTE: &str = "No data to apply advanced filters.";

/// The control offered for a column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ColumnControl {
    /// Inclusive numeric range seeded with the column's min and max
    Range { min: f64, max: f64 },
    /// Case-insensitive substring match for high-cardinality text
    Substring,
    /// Pick any of the listed values; picking none keeps every row
    MultiSelect { options: Vec<String> },
}

impl ColumnControl {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnControl::Range { .. } => "range",
            ColumnControl::Substring => "substring",
            ColumnControl::MultiSelect { .. } => "multi-select",
        }
    }
}

/// A user's choice for the column stage
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Nothing chosen yet; whichever control is offered keeps every row
    Any,
    /// Missing bounds default to the seeded min/max
    Range { min: Option<f64>, max: Option<f64> },
    Contains(String),
    OneOf(Vec<String>),
}

impl Selection {
    fn name(&self) -> &'static str {
        match self {
            Selection::Any => "empty",
            Selection::Range { .. } => "range",
            Selection::Contains(_) => "substring",
            Selection::OneOf(_) => "multi-select",
        }
    }
}

/// A column-scoped refinement
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub selection: Selection,
}

/// Both filter stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub query: Option<String>,
    pub column: Option<ColumnFilter>,
}

impl SearchFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            column: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>, selection: Selection) -> Self {
        self.column = Some(ColumnFilter {
            column: column.into(),
            selection,
        });
        self
    }
}

/// Result of applying a [`SearchFilter`]
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub table: Table,
    /// Control offered for the filtered column, if a column filter ran
    pub control: Option<ColumnControl>,
    /// Set when the column stage was skipped
    pub note: Option<&'static str>,
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("unknown column '{column}' (available: {available})")]
    UnknownColumn { column: String, available: String },

    #[error("column '{column}' takes a {expected} filter, not a {given} filter")]
    WrongSelection {
        column: String,
        expected: &'static str,
        given: &'static str,
    },
}

/// Stage 1: keep rows where any cell contains `query`, ignoring case
///
/// An empty query keeps everything. Null cells never match.
pub fn free_text(table: &Table, query: &str) -> Table {
    if query.is_empty() {
        return table.clone();
    }
    let needle = query.to_lowercase();
    table.filter(|row| {
        row.values()
            .iter()
            .any(|v| !v.is_null() && v.to_string().to_lowercase().contains(&needle))
    })
}

/// The control offered for `column`, or `None` for an empty table or unknown column
pub fn column_control(table: &Table, column: &str) -> Option<ColumnControl> {
    let kind = table.column_kind(column)?;
    control_for(table, column, kind)
}

/// The control for a column of `kind`, with bounds and options taken from `subset`
pub fn control_for(subset: &Table, column: &str, kind: ColumnKind) -> Option<ColumnControl> {
    if subset.is_empty() || !subset.has_column(column) {
        return None;
    }
    if kind.is_numeric() {
        let (min, max) = numeric_bounds(subset, column)?;
        return Some(ColumnControl::Range { min, max });
    }

    let options = subset.distinct_strings(column);
    if kind == ColumnKind::Text && options.len() > HIGH_CARDINALITY_MIN {
        Some(ColumnControl::Substring)
    } else {
        Some(ColumnControl::MultiSelect { options })
    }
}

/// Columns offered in the filter menu and their controls
///
/// A column is offered when it is text or has at most 20 distinct values in
/// `subset`; its kind is read from the whole `table`.
pub fn offered_controls(table: &Table, subset: &Table) -> Vec<(String, ColumnControl)> {
    subset
        .columns()
        .iter()
        .filter_map(|column| {
            let kind = table.column_kind(column)?;
            let exposed = kind == ColumnKind::Text
                || subset.distinct_count(column) <= LOW_CARDINALITY_MAX;
            if !exposed {
                return None;
            }
            control_for(subset, column, kind).map(|control| (column.clone(), control))
        })
        .collect()
}

fn numeric_bounds(table: &Table, column: &str) -> Option<(f64, f64)> {
    table
        .column_values(column)
        .into_iter()
        .filter_map(Value::as_f64)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Run both stages
pub fn apply(table: &Table, filter: &SearchFilter) -> Result<FilterOutcome, FilterError> {
    let searched = match filter.query.as_deref() {
        Some(q) => free_text(table, q),
        None => table.clone(),
    };

    let Some(column_filter) = &filter.column else {
        return Ok(FilterOutcome {
            table: searched,
            control: None,
            note: None,
        });
    };

    if !table.has_column(&column_filter.column) {
        return Err(FilterError::UnknownColumn {
            column: column_filter.column.clone(),
            available: table.columns().join(", "),
        });
    }

    let kind = table
        .column_kind(&column_filter.column)
        .unwrap_or(ColumnKind::Text);
    let Some(control) = control_for(&searched, &column_filter.column, kind) else {
        return Ok(FilterOutcome {
            table: searched,
            control: None,
            note: Some(NO_DATA_NOTE),
        });
    };

    let column = column_filter.column.as_str();
    let reduced = match (&control, &column_filter.selection) {
        (_, Selection::Any) => searched,
        (ColumnControl::Range { min, max }, Selection::Range { min: lo, max: hi }) => {
            let lo = lo.unwrap_or(*min);
            let hi = hi.unwrap_or(*max);
            searched.filter(|row| {
                row.get(column)
                    .as_f64()
                    .is_some_and(|v| v >= lo && v <= hi)
            })
        }
        (ColumnControl::Substring, Selection::Contains(text)) => {
            let needle = text.to_lowercase();
            searched.filter(|row| {
                let v = row.get(column);
                !v.is_null() && v.to_string().to_lowercase().contains(&needle)
            })
        }
        (ColumnControl::MultiSelect { .. }, Selection::OneOf(values)) => {
            if values.is_empty() {
                searched
            } else {
                searched.filter(|row| {
                    let v = row.get(column);
                    !v.is_null() && values.contains(&v.to_string())
                })
            }
        }
        (control, selection) => {
            return Err(FilterError::WrongSelection {
                column: column.to_string(),
                expected: control.name(),
                given: selection.name(),
            });
        }
    };

    Ok(FilterOutcome {
        table: reduced,
        control: Some(control),
        note: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::Row;

    fn companies() -> Table {
        Table::from_rows([
            Row::new().with("name", "Acme").with("id", 1i64),
            Row::new().with("name", "Globex").with("id", 2i64),
        ])
    }

    fn names(table: &Table, column: &str) -> Vec<String> {
        table.rows().map(|r| r.text(column)).collect()
    }

    #[test]
    fn test_free_text_case_insensitive_any_column() {
        let out = free_text(&companies(), "acm");
        assert_eq!(names(&out, "name"), vec!["Acme"]);

        let out = free_text(&companies(), "2");
        assert_eq!(names(&out, "name"), vec!["Globex"]);

        assert_eq!(free_text(&companies(), "").len(), 2);
    }

    #[test]
    fn test_free_text_ignores_nulls() {
        let table = Table::from_rows([
            Row::new().with("name", "Acme").with("notes", Value::Null),
        ]);
        assert!(free_text(&table, "nan").is_empty());
        assert!(free_text(&table, "none").is_empty());
    }

    #[test]
    fn test_range_seeded_from_free_text_subset() {
        let table = Table::from_rows([
            Row::new().with("name", "Initech").with("score", 10i64),
            Row::new().with("name", "Acme North").with("score", 40i64),
            Row::new().with("name", "Acme South").with("score", 70i64),
        ]);
        let searched = free_text(&table, "acme");
        assert_eq!(
            column_control(&searched, "score"),
            Some(ColumnControl::Range { min: 40.0, max: 70.0 })
        );

        let outcome = apply(
            &table,
            &SearchFilter::query("acme").with_column("score", Selection::Range { min: None, max: None }),
        )
        .unwrap();
        assert_eq!(outcome.table.len(), 2);
        assert_eq!(outcome.control, Some(ColumnControl::Range { min: 40.0, max: 70.0 }));
    }

    #[test]
    fn test_range_is_inclusive() {
        let table = Table::from_rows(
            [1i64, 2, 3, 4, 5].map(|n| Row::new().with("n", n)),
        );
        let outcome = apply(
            &table,
            &SearchFilter::default().with_column("n", Selection::Range { min: Some(2.0), max: Some(4.0) }),
        )
        .unwrap();
        assert_eq!(names(&outcome.table, "n"), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_multiselect_empty_selection_is_noop() {
        let table = Table::from_rows([
            Row::new().with("name", "Acme").with("risk", "Low"),
            Row::new().with("name", "Acme Two").with("risk", "High"),
            Row::new().with("name", "Globex").with("risk", "High"),
        ]);
        let outcome = apply(
            &table,
            &SearchFilter::query("acme").with_column("risk", Selection::OneOf(vec![])),
        )
        .unwrap();
        assert_eq!(outcome.table, free_text(&table, "acme"));
        assert_eq!(
            outcome.control,
            Some(ColumnControl::MultiSelect {
                options: vec!["High".into(), "Low".into()]
            })
        );
    }

    #[test]
    fn test_multiselect_matches_stringified_values() {
        let table = Table::from_rows([
            Row::new().with("met", true),
            Row::new().with("met", false),
            Row::new().with("met", Value::Null),
        ]);
        let outcome = apply(
            &table,
            &SearchFilter::default().with_column("met", Selection::OneOf(vec!["False".into()])),
        )
        .unwrap();
        assert_eq!(outcome.table.len(), 1);
    }

    #[test]
    fn test_high_cardinality_text_uses_substring() {
        let table = Table::from_rows((0..60).map(|i| Row::new().with("code", format!("C-{i:03}"))));
        assert_eq!(column_control(&table, "code"), Some(ColumnControl::Substring));

        let outcome = apply(
            &table,
            &SearchFilter::default().with_column("code", Selection::Contains("c-05".into())),
        )
        .unwrap();
        assert_eq!(outcome.table.len(), 10);
    }

    #[test]
    fn test_mid_cardinality_text_uses_multiselect() {
        let table = Table::from_rows((0..30).map(|i| Row::new().with("code", format!("C-{i}"))));
        assert!(matches!(
            column_control(&table, "code"),
            Some(ColumnControl::MultiSelect { .. })
        ));
    }

    #[test]
    fn test_filterable_columns_axes() {
        let table = Table::from_rows((0..30i64).map(|i| {
            Row::new()
                .with("name", format!("S{i}"))
                .with("spend", i * 1000)
                .with("score", i % 5)
        }));
        let cols: Vec<String> = offered_controls(&table, &table)
            .into_iter()
            .map(|(column, _)| column)
            .collect();
        assert_eq!(cols, vec!["name".to_string(), "score".to_string()]);

        // still filterable by range when asked directly
        assert!(matches!(
            column_control(&table, "spend"),
            Some(ColumnControl::Range { .. })
        ));
    }

    #[test]
    fn test_mixed_column_treated_as_text() {
        let table = Table::from_rows([
            Row::new().with("v", 1i64),
            Row::new().with("v", "n/a"),
        ]);
        assert!(matches!(
            column_control(&table, "v"),
            Some(ColumnControl::MultiSelect { .. })
        ));
        let err = apply(
            &table,
            &SearchFilter::default().with_column("v", Selection::Range { min: None, max: None }),
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::WrongSelection { .. }));
    }

    #[test]
    fn test_mixed_column_stays_text_after_search() {
        let table = Table::from_rows([
            Row::new().with("name", "Initech").with("score", "n/a"),
            Row::new().with("name", "Acme").with("score", 40i64),
        ]);
        let outcome = apply(
            &table,
            &SearchFilter::query("acme").with_column("score", Selection::OneOf(vec!["40".into()])),
        )
        .unwrap();
        assert_eq!(names(&outcome.table, "name"), vec!["Acme"]);
        assert_eq!(
            outcome.control,
            Some(ColumnControl::MultiSelect { options: vec!["40".into()] })
        );

        let searched = free_text(&table, "acme");
        let offered = offered_controls(&table, &searched);
        assert!(offered.contains(&(
            "score".to_string(),
            ColumnControl::MultiSelect { options: vec!["40".into()] }
        )));
    }

    #[test]
    fn test_no_choice_keeps_every_row_for_any_control() {
        let table = Table::from_rows([
            Row::new().with("name", "Acme").with("score", 40i64),
            Row::new().with("name", "Globex").with("score", 90i64),
        ]);
        let outcome = apply(
            &table,
            &SearchFilter::default().with_column("score", Selection::Any),
        )
        .unwrap();
        assert_eq!(outcome.table.len(), 2);
        assert_eq!(outcome.control, Some(ColumnControl::Range { min: 40.0, max: 90.0 }));
    }

    #[test]
    fn test_empty_subset_skips_column_stage() {
        let outcome = apply(
            &companies(),
            &SearchFilter::query("zzz").with_column("name", Selection::OneOf(vec!["Acme".into()])),
        )
        .unwrap();
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.note, Some(NO_DATA_NOTE));
        assert!(outcome.control.is_none());
    }

    #[test]
    fn test_unknown_column() {
        let err = apply(
            &companies(),
            &SearchFilter::default().with_column("nope", Selection::OneOf(vec![])),
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::UnknownColumn { .. }));
    }

    #[test]
    fn test_supplier_scenario() {
        let table = Table::from_rows([
            Row::new()
                .with("supplier_id", "SUP0001")
                .with("supplier_name", "Acme")
                .with("risk_level", "Low"),
            Row::new()
                .with("supplier_id", "SUP0002")
                .with("supplier_name", "Globex")
                .with("risk_level", "High"),
        ]);
        let out = apply(&table, &SearchFilter::query("acme")).unwrap();
        assert_eq!(names(&out.table, "supplier_id"), vec!["SUP0001"]);

        let out = apply(
            &table,
            &SearchFilter::default().with_column("risk_level", Selection::OneOf(vec!["High".into()])),
        )
        .unwrap();
        assert_eq!(names(&out.table, "supplier_id"), vec!["SUP0002"]);
    }
}
