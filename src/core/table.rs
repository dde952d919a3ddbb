//! In-memory tables backing every entity file
//!
//! A [`Table`] is an ordered set of rows sharing one named column list. Cells
//! are loosely typed [`Value`]s parsed from CSV text, so a column's kind is
//! inferred from what it actually holds rather than declared up front.

use std::cmp::Ordering;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Parse a raw CSV cell into the narrowest matching value
    ///
    /// Numbers with a leading zero (`"007"`, `"0123 456"`) stay text so phone
    /// numbers and codes survive a round trip.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Value::Null;
        }
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if !trimmed.chars().any(|c| c.is_ascii_digit()) || has_leading_zero(trimmed) {
            return Value::Text(raw.to_string());
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        Value::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Numeric view of the value (integers widen to f64)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Loose ordering: numbers numerically, everything else by its text, nulls last
    pub fn cmp_loose(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.to_string().cmp(&b.to_string()),
            },
        }
    }
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut chars = digits.chars();
    matches!((chars.next(), chars.next()), (Some('0'), Some(c)) if c.is_ascii_digit())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part (95.0) so the cell re-parses as a float
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        i64::try_from(i).map_or(Value::Float(i as f64), Value::Integer)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Kind of a column, inferred from its non-null values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    /// Text, mixed kinds, or no values at all
    Text,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    fn infer<'a>(values: impl Iterator<Item = &'a Value>) -> Self {
        let mut kind: Option<ColumnKind> = None;
        for value in values {
            let this = match value {
                Value::Null => continue,
                Value::Bool(_) => ColumnKind::Boolean,
                Value::Integer(_) => ColumnKind::Integer,
                Value::Float(_) => ColumnKind::Float,
                Value::Text(_) => return ColumnKind::Text,
            };
            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(a), b) if a.is_numeric() && b.is_numeric() => ColumnKind::Float,
                _ => return ColumnKind::Text,
            });
        }
        kind.unwrap_or(ColumnKind::Text)
    }
}

/// A named set of cells used to build or replace one table row
///
/// Cell order is kept so new columns are added in a predictable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.cells.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(n, v)| (n.as_str(), v))
    }
}

static NULL: Value = Value::Null;

/// Borrowed view of a single table row
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    columns: &'a [String],
    values: &'a [Value],
    index: usize,
}

impl<'a> RowRef<'a> {
    /// Position of the row in its table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell by column name; missing columns read as null
    pub fn get(&self, column: &str) -> &'a Value {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&NULL)
    }

    /// Cell as display text (empty for null)
    pub fn text(&self, column: &str) -> String {
        self.get(column).to_string()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        for (name, value) in self.columns.iter().zip(self.values) {
            row.set(name, value.clone());
        }
        row
    }
}

/// An ordered collection of rows over a named column list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns (duplicates are dropped)
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        let mut table = Table::default();
        for column in columns {
            table.ensure_column(column.as_ref());
        }
        table
    }

    /// Build a table from rows, taking columns in first-seen order
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut table = Table::default();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Add an all-null column if it is not present; returns its index
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    /// Append a row; unknown names become new columns, absent names are null
    pub fn push_row(&mut self, row: Row) {
        for (name, _) in row.iter() {
            self.ensure_column(name);
        }
        let mut values = vec![Value::Null; self.columns.len()];
        for (name, value) in row.cells {
            if let Some(idx) = self.column_index(&name) {
                values[idx] = value;
            }
        }
        self.rows.push(values);
    }

    /// Append raw positional values, padding or truncating to the column count
    pub(crate) fn push_values(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        self.rows.push(values);
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|values| RowRef {
            columns: &self.columns,
            values,
            index,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().enumerate().map(|(index, values)| RowRef {
            columns: &self.columns,
            values,
            index,
        })
    }

    /// Values of one column, or nothing if the column is absent
    pub fn column_values(&self, name: &str) -> Vec<&Value> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|r| &r[idx]).collect(),
            None => Vec::new(),
        }
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let idx = self.column_index(name)?;
        Some(ColumnKind::infer(self.rows.iter().map(|r| &r[idx])))
    }

    /// Sorted distinct display strings of the non-null values in a column
    pub fn distinct_strings(&self, name: &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .column_values(name)
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// Distinct value count, counting null as one value when present
    pub fn distinct_count(&self, name: &str) -> usize {
        let values = self.column_values(name);
        let has_null = values.iter().any(|v| v.is_null());
        self.distinct_strings(name).len() + usize::from(has_null)
    }

    /// Reorder/restrict to `columns`; columns not present become null
    pub fn reindex<S: AsRef<str>>(&self, columns: &[S]) -> Table {
        let mut out = Table::new(columns);
        let mapping: Vec<Option<usize>> = out
            .columns
            .iter()
            .map(|c| self.column_index(c))
            .collect();
        for row in &self.rows {
            let values = mapping
                .iter()
                .map(|idx| idx.map_or(Value::Null, |i| row[i].clone()))
                .collect();
            out.rows.push(values);
        }
        out
    }

    /// Rows of `self` followed by rows of `other` over the union of both column sets
    pub fn concat(&self, other: &Table) -> Table {
        let mut columns = self.columns.clone();
        for column in &other.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        let mut out = self.reindex(&columns);
        out.rows.extend(other.reindex(&columns).rows);
        out
    }

    /// Keep only rows matching the predicate
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let mask: Vec<bool> = self.rows().map(|r| keep(r)).collect();
        let mut flags = mask.into_iter();
        self.rows.retain(|_| flags.next().unwrap_or(false));
    }

    /// Copy of the table holding only rows matching the predicate
    pub fn filter<F>(&self, keep: F) -> Table
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let mut out = self.clone();
        out.retain(keep);
        out
    }

    /// First row whose `column` displays as `id`
    pub fn position(&self, column: &str, id: &str) -> Option<usize> {
        let idx = self.column_index(column)?;
        self.rows.iter().position(|r| r[idx].to_string() == id)
    }

    /// Overwrite a row's entire attribute set; cells not in `row` become null
    pub fn replace_row(&mut self, index: usize, row: Row) {
        if index >= self.rows.len() {
            return;
        }
        for (name, _) in row.iter() {
            self.ensure_column(name);
        }
        let mut values = vec![Value::Null; self.columns.len()];
        for (name, value) in row.cells {
            if let Some(idx) = self.column_index(&name) {
                values[idx] = value;
            }
        }
        self.rows[index] = values;
    }

    /// Set a single cell, adding the column if needed
    pub fn set_cell(&mut self, index: usize, column: &str, value: impl Into<Value>) {
        let idx = self.ensure_column(column);
        if let Some(row) = self.rows.get_mut(index) {
            row[idx] = value.into();
        }
    }

    /// Remove every row whose `column` displays as `id`; returns the count removed
    pub fn remove_where(&mut self, column: &str, id: &str) -> usize {
        let before = self.rows.len();
        if let Some(idx) = self.column_index(column) {
            self.rows.retain(|r| r[idx].to_string() != id);
        }
        before - self.rows.len()
    }

    /// Stable sort on one column using [`Value::cmp_loose`]
    pub fn sort_by_column(&mut self, column: &str, descending: bool) {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        self.rows.sort_by(|a, b| {
            let ord = a[idx].cmp_loose(&b[idx]);
            // nulls stay last either way
            match (a[idx].is_null(), b[idx].is_null(), descending) {
                (false, false, true) => ord.reverse(),
                _ => ord,
            }
        });
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        let mut out = self.clone();
        out.rows.truncate(n);
        out
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Rows serialize as objects in column order
impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}
