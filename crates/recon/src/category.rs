use std::collections::HashMap;

use crate::model::CategoryRow;

/// Procedure code → training category, tolerant of locale variants: a code
/// matches a row when it equals either the row's code A or code B.
#[derive(Debug, Default)]
pub struct CategoryTable {
    /// First row index per code, so the earliest row wins.
    index: HashMap<String, usize>,
    rows: Vec<CategoryRow>,
}

impl CategoryTable {
    pub fn new(rows: Vec<CategoryRow>) -> Self {
        let mut index = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            for code in [&row.code_a, &row.code_b].into_iter().flatten() {
                index.entry(code.clone()).or_insert(i);
            }
        }
        Self { index, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Category of the first row listing `code`. The first matching row
    /// decides even when its category cell is blank.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let &i = self.index.get(code)?;
        self.rows[i].category.as_deref()
    }
}
