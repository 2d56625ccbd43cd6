//! Feature tables and schema alignment.
//!
//! A [`FeatureTable`] holds named numeric columns, all with the same row
//! count. [`FeatureTable::align_to`] reindexes a table against a model's
//! ordered feature schema: columns the schema lacks are dropped, columns the
//! table lacks are synthesized as zeros, and the output column order is
//! exactly the schema order. This is the contract the model's inference call
//! relies on, so it is the most heavily tested piece of the crate.

use std::collections::HashMap;

/// Named numeric columns with uniform row count. Row `i` of every column
/// corresponds to input row `i` of the uploaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl FeatureTable {
    /// Create an empty table expecting `rows` rows per column.
    #[must_use]
    pub fn new(rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            rows,
        }
    }

    /// Append a column, replacing any existing column with the same name.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not have exactly one entry per row. Callers
    /// construct columns from the same source table, so a mismatch is a
    /// programming error, not an input error.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.rows,
            "column length must equal table row count"
        );
        let name = name.into();
        if let Some(idx) = self.names.iter().position(|n| *n == name) {
            self.columns[idx] = values;
        } else {
            self.names.push(name);
            self.columns.push(values);
        }
    }

    /// Column names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Values of row `i` across columns, in column order.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|col| col[i]).collect()
    }

    /// Reindex this table to match `schema` exactly.
    ///
    /// Schema columns missing here come back zero-filled; columns absent
    /// from the schema are dropped; output order is schema order. The row
    /// count is preserved.
    #[must_use]
    pub fn align_to(&self, schema: &[String]) -> FeatureTable {
        let by_name: HashMap<&str, &Vec<f64>> = self
            .names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
            .collect();

        let columns: Vec<Vec<f64>> = schema
            .iter()
            .map(|name| {
                by_name
                    .get(name.as_str())
                    .map_or_else(|| vec![0.0; self.rows], |col| (*col).clone())
            })
            .collect();

        FeatureTable {
            names: schema.to_vec(),
            columns,
            rows: self.rows,
        }
    }
}
