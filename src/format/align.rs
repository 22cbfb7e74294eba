//! Elastic column alignment in the style of Go's `text/tabwriter`, as
//! configured by gofmt: no minimum width, one space of padding, spaces as
//! padding, empty columns discarded.
//!
//! Each row is a list of cells. Every cell but the last is "terminated" and
//! takes part in alignment; the last cell is written as-is. A column block
//! is a run of consecutive rows that all have a terminated cell in that
//! column, and every cell of a block is padded to the widest one.

const PADDING: usize = 1;

/// Align `rows` into lines (without indentation or newlines).
pub fn align_cells(rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<Vec<usize>> = rows
        .iter()
        .map(|row| vec![0; row.len().saturating_sub(1)])
        .collect();
    format_block(rows, 0, rows.len(), 0, &mut widths);

    rows.iter()
        .zip(&widths)
        .map(|(row, row_widths)| {
            let mut line = String::new();
            for (cell, width) in row.iter().zip(row_widths) {
                line.push_str(cell);
                let pad = width.saturating_sub(cell_width(cell));
                line.extend(std::iter::repeat(' ').take(pad));
            }
            if let Some(last) = row.last() {
                line.push_str(last);
            }
            line.truncate(line.trim_end().len());
            line
        })
        .collect()
}

fn format_block(
    rows: &[Vec<String>],
    line0: usize,
    line1: usize,
    column: usize,
    widths: &mut [Vec<usize>],
) {
    let mut this = line0;
    while this < line1 {
        if !has_terminated_cell(&rows[this], column) {
            this += 1;
            continue;
        }

        let block_start = this;
        let mut width = 0;
        let mut discardable = true;
        while this < line1 && has_terminated_cell(&rows[this], column) {
            let w = cell_width(&rows[this][column]);
            width = width.max(w + PADDING);
            if w > 0 {
                discardable = false;
            }
            this += 1;
        }
        if discardable {
            width = 0;
        }

        for row_widths in &mut widths[block_start..this] {
            row_widths[column] = width;
        }
        format_block(rows, block_start, this, column + 1, widths);
    }
}

fn has_terminated_cell(row: &[String], column: usize) -> bool {
    column + 1 < row.len()
}

fn cell_width(cell: &str) -> usize {
    cell.chars().count()
}
