//! Table flattening: Docling cell grids to markdown tables.
//!
//! Flattening never fails the document. A table whose cells cannot be read
//! turns into the [`TABLE_FAILED_MARKER`] text, and a table without cells
//! or columns turns into nothing.

use crate::types::TableData;
use serde::Deserialize;

pub const TABLE_FAILED_MARKER: &str = "[Table extraction failed]";

/// Largest grid (rows x columns) a table may span before it is treated as
/// unreadable
pub const MAX_TABLE_GRID_CELLS: usize = 1 << 20;

/// One Docling table cell with half-open row/column offsets
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableCell {
    pub start_row_offset_idx: usize,
    pub end_row_offset_idx: usize,
    pub start_col_offset_idx: usize,
    pub end_col_offset_idx: usize,
    #[serde(default)]
    pub text: String,
}

impl TableCell {
    pub fn new(row: usize, col: usize, text: &str) -> Self {
        Self {
            start_row_offset_idx: row,
            end_row_offset_idx: row + 1,
            start_col_offset_idx: col,
            end_col_offset_idx: col + 1,
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenedTable {
    Markdown(String),
    /// No cells, or a grid with zero rows or columns
    Empty,
    /// Cells were present but unreadable
    Failed,
}

impl FlattenedTable {
    /// Text carried into the item stream; empty means "no item"
    pub fn into_text(self) -> String {
        match self {
            FlattenedTable::Markdown(markdown) => markdown,
            FlattenedTable::Empty => String::new(),
            FlattenedTable::Failed => TABLE_FAILED_MARKER.to_string(),
        }
    }
}

/// Flatten a raw Docling table. Any malformed cell (missing or negative
/// offset, non-string text) fails the whole table.
pub fn flatten_table(data: &TableData) -> FlattenedTable {
    if data.table_cells.is_empty() {
        return FlattenedTable::Empty;
    }

    let cells: Result<Vec<TableCell>, _> = data
        .table_cells
        .iter()
        .map(|value| TableCell::deserialize(value))
        .collect();

    match cells {
        Ok(cells) => flatten_cells(&cells),
        Err(e) => {
            log::debug!("Table cells unreadable, emitting failure marker: {e}");
            FlattenedTable::Failed
        }
    }
}

pub fn flatten_cells(cells: &[TableCell]) -> FlattenedTable {
    let row_count = cells.iter().map(|c| c.end_row_offset_idx).max().unwrap_or(0);
    let col_count = cells.iter().map(|c| c.end_col_offset_idx).max().unwrap_or(0);

    if row_count == 0 || col_count == 0 {
        return FlattenedTable::Empty;
    }

    match row_count.checked_mul(col_count) {
        Some(size) if size <= MAX_TABLE_GRID_CELLS => {}
        _ => {
            log::debug!("Table grid {row_count}x{col_count} is too large, emitting failure marker");
            return FlattenedTable::Failed;
        }
    }

    let mut grid = vec![vec![String::new(); col_count]; row_count];
    for cell in cells {
        // Cells starting outside the grid are dropped
        if let Some(slot) = grid
            .get_mut(cell.start_row_offset_idx)
            .and_then(|row| row.get_mut(cell.start_col_offset_idx))
        {
            *slot = cell.text.trim().to_string();
        }
    }

    let separator = vec!["---"; col_count];
    let mut lines = Vec::with_capacity(row_count + 1);
    lines.push(markdown_row(&grid[0]));
    lines.push(markdown_row(&separator));
    lines.extend(grid[1..].iter().map(|row| markdown_row(row)));

    FlattenedTable::Markdown(lines.join("\n"))
}

fn markdown_row<S: AsRef<str>>(cells: &[S]) -> String {
    let joined = cells
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(" | ");
    format!("| {joined} |")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn two_by_two_grid() {
        let cells = vec![
            TableCell::new(0, 0, "A"),
            TableCell::new(0, 1, "B"),
            TableCell::new(1, 0, "1"),
            TableCell::new(1, 1, "2"),
        ];
        assert_eq!(
            flatten_cells(&cells),
            FlattenedTable::Markdown("| A | B |\n| --- | --- |\n| 1 | 2 |".to_string())
        );
    }

    #[test]
    fn spanning_cell_leaves_gaps_empty() {
        let cells = vec![
            TableCell {
                start_row_offset_idx: 0,
                end_row_offset_idx: 1,
                start_col_offset_idx: 0,
                end_col_offset_idx: 3,
                text: "  Schedule  ".to_string(),
            },
            TableCell::new(1, 2, "x"),
        ];
        let markdown = flatten_cells(&cells).into_text();
        assert_eq!(markdown, "| Schedule |  |  |\n| --- | --- | --- |\n|  |  | x |");
    }

    #[test]
    fn no_cells_is_empty() {
        assert_eq!(flatten_table(&TableData::default()), FlattenedTable::Empty);
        assert_eq!(flatten_cells(&[]).into_text(), "");
    }

    #[test]
    fn zero_width_grid_is_empty() {
        let cells = vec![TableCell {
            start_row_offset_idx: 0,
            end_row_offset_idx: 2,
            start_col_offset_idx: 0,
            end_col_offset_idx: 0,
            text: "orphan".to_string(),
        }];
        assert_eq!(flatten_cells(&cells), FlattenedTable::Empty);
    }

    #[test]
    fn missing_offset_fails_the_table() {
        let data = TableData {
            table_cells: vec![json!({"start_row_offset_idx": 0, "text": "A"})],
        };
        let flattened = flatten_table(&data);
        assert_eq!(flattened, FlattenedTable::Failed);
        assert_eq!(flattened.into_text(), TABLE_FAILED_MARKER);
    }

    #[test]
    fn oversized_grid_fails_the_table() {
        let data = TableData {
            table_cells: vec![
                json!({"start_row_offset_idx": 0, "end_row_offset_idx": 1,
                       "start_col_offset_idx": 0, "end_col_offset_idx": 4611686018427387904u64,
                       "text": "A"}),
            ],
        };
        assert_eq!(flatten_table(&data), FlattenedTable::Failed);

        let wide = TableCell {
            start_row_offset_idx: 0,
            end_row_offset_idx: 2048,
            start_col_offset_idx: 0,
            end_col_offset_idx: 1024,
            text: "A".to_string(),
        };
        assert_eq!(flatten_cells(&[wide]), FlattenedTable::Failed);

        let overflowing = TableCell {
            end_row_offset_idx: usize::MAX,
            end_col_offset_idx: usize::MAX,
            ..TableCell::new(0, 0, "A")
        };
        assert_eq!(flatten_cells(&[overflowing]), FlattenedTable::Failed);
    }

    #[test]
    fn cells_starting_outside_the_grid_are_dropped() {
        // Grid is 2x2 from the widest end offsets; the stray cell starts at row 5
        let stray = TableCell {
            start_row_offset_idx: 5,
            end_row_offset_idx: 1,
            start_col_offset_idx: 0,
            end_col_offset_idx: 1,
            text: "stray".to_string(),
        };
        let cells = vec![
            TableCell::new(0, 0, "A"),
            TableCell::new(1, 1, "2"),
            stray,
            TableCell {
                start_col_offset_idx: 7,
                ..TableCell::new(0, 1, "also stray")
            },
        ];
        assert_eq!(
            flatten_cells(&cells).into_text(),
            "| A |  |\n| --- | --- |\n|  | 2 |"
        );
    }

    #[test]
    fn raw_cells_are_decoded() {
        let data = TableData {
            table_cells: vec![
                json!({"start_row_offset_idx": 0, "end_row_offset_idx": 1,
                       "start_col_offset_idx": 0, "end_col_offset_idx": 1,
                       "text": "Offence", "row_span": 1}),
                json!({"start_row_offset_idx": 1, "end_row_offset_idx": 2,
                       "start_col_offset_idx": 0, "end_col_offset_idx": 1}),
            ],
        };
        assert_eq!(flatten_table(&data).into_text(), "| Offence |\n| --- |\n|  |");
    }
}
