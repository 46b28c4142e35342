//! Markdown table builder.
//!
//! [`TableDraft`] is the grid behind the table dialog; [`insert_table`] drops
//! its markdown into the document at a selection, keeping the table separated
//! from surrounding text by blank lines.

use crate::error::{MarkdraftError, Result};
use std::ops::Range;

/// A rectangular grid of cells. The first row is the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDraft {
    cells: Vec<Vec<String>>,
}

impl Default for TableDraft {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

impl TableDraft {
    /// An empty grid; zero dimensions are raised to one.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            cells: vec![vec![String::new(); columns.max(1)]; rows.max(1)],
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.cells[0].len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.cells.get(row)?.get(column).map(String::as_str)
    }

    pub fn add_row(&mut self) {
        self.cells.push(vec![String::new(); self.columns()]);
    }

    pub fn add_column(&mut self) {
        for row in &mut self.cells {
            row.push(String::new());
        }
    }

    /// Remove a row. The last remaining row is kept.
    pub fn delete_row(&mut self, index: usize) -> bool {
        if self.rows() <= 1 || index >= self.rows() {
            return false;
        }
        self.cells.remove(index);
        true
    }

    /// Remove a column. The last remaining column is kept.
    pub fn delete_column(&mut self, index: usize) -> bool {
        if self.columns() <= 1 || index >= self.columns() {
            return false;
        }
        for row in &mut self.cells {
            row.remove(index);
        }
        true
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn to_markdown(&self) -> String {
        let separator = vec!["---".to_string(); self.columns()];
        let mut out = table_row(&self.cells[0]);
        out.push_str(&table_row(&separator));
        for row in &self.cells[1..] {
            out.push_str(&table_row(row));
        }
        out
    }
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

/// Replace `range` of `content` with `table`. Returns the new content and
/// the byte offset just past the inserted text.
pub fn insert_table(
    content: &str,
    range: Range<usize>,
    table: &TableDraft,
) -> Result<(String, usize)> {
    if range.start > range.end
        || range.end > content.len()
        || !content.is_char_boundary(range.start)
        || !content.is_char_boundary(range.end)
    {
        return Err(MarkdraftError::InvalidSelection {
            start: range.start,
            end: range.end,
            len: content.len(),
        });
    }

    let before = &content[..range.start];
    let after = &content[range.end..];
    let space_before = !before.trim().is_empty() && !before.ends_with("\n\n");
    let space_after = !after.trim().is_empty() && !after.starts_with("\n\n");

    let mut insertion = String::new();
    if space_before {
        insertion.push_str("\n\n");
    }
    insertion.push_str(&table.to_markdown());
    if space_after {
        insertion.push_str("\n\n");
    }

    let cursor = before.len() + insertion.len();
    Ok((format!("{}{}{}", before, insertion, after), cursor))
}
