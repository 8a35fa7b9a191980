use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::error::MergeError;
use crate::value::Value;

/// An immutable, row-major table with an ordered schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from a schema and rows. Every row must be as wide as
    /// the schema and column names must be unique.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, MergeError> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(MergeError::InvalidInput(format!("duplicate column '{name}'")));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(MergeError::InvalidInput(format!(
                    "row {i} has {} value(s), schema has {} column(s)",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Column-major constructor, the shape data-frame literals are written in:
    ///
    /// ```
    /// use qekit_merge::{Table, Value};
    /// let t = Table::from_columns(vec![
    ///     ("id", vec![Value::from(1), Value::from(2)]),
    ///     ("dept", vec![Value::from("HR"), Value::from("IT")]),
    /// ]).unwrap();
    /// assert_eq!(t.row_count(), 2);
    /// ```
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Value>)>) -> Result<Self, MergeError> {
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            names.push(name.into());
            data.push(values);
        }

        let height = data.first().map_or(0, Vec::len);
        if let Some((name, col)) = names.iter().zip(&data).find(|(_, c)| c.len() != height) {
            return Err(MergeError::InvalidInput(format!(
                "column '{name}' has {} value(s), expected {height}",
                col.len()
            )));
        }

        let mut columns: Vec<std::vec::IntoIter<Value>> = data.into_iter().map(Vec::into_iter).collect();
        let rows = (0..height)
            .map(|_| columns.iter_mut().filter_map(Iterator::next).collect())
            .collect();
        Self::new(names, rows)
    }

    /// A table with a schema and no rows.
    pub fn empty(columns: Vec<String>) -> Result<Self, MergeError> {
        Self::new(columns, Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
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

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Distinct key tuples over the given columns, ordered. Values are
    /// normalised with [`Value::join_key`], matching how merges pair keys.
    pub fn key_set(&self, key: &[String]) -> Result<BTreeSet<Vec<Value>>, MergeError> {
        let idx = key
            .iter()
            .map(|k| {
                self.column_index(k)
                    .ok_or_else(|| MergeError::InvalidInput(format!("missing key column '{k}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self
            .rows
            .iter()
            .map(|r| idx.iter().map(|&i| r[i].join_key()).collect())
            .collect())
    }
}

impl fmt::Display for Table {
    /// Aligned text rendering: header, separator, one line per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(ToString::to_string).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        write_aligned(f, &header, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("  "))?;
        for row in &cells {
            let items: Vec<&str> = row.iter().map(String::as_str).collect();
            write_aligned(f, &items, &widths)?;
        }
        Ok(())
    }
}

fn write_aligned(f: &mut fmt::Formatter<'_>, items: &[&str], widths: &[usize]) -> fmt::Result {
    let parts: Vec<String> = items
        .iter()
        .zip(widths)
        .map(|(s, &w)| format!("{s:<w$}"))
        .collect();
    writeln!(f, "{}", parts.join("  ").trim_end())
}
