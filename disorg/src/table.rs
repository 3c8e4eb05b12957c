//! Table blocks
//!
//! A table block is a contiguous run of lines that start (after optional
//! blanks) with `|`. Splitting a row on `|` gives the cells; column 0 is the
//! padding before the first bar, and a row closed with a final bar ends in an
//! empty cell.

use disorg_core::Coord;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn table_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[ \t]*\|").expect("table row pattern is valid"))
}

/// Does this line belong to a table?
pub fn is_table_line(line: &str) -> bool {
    table_line_regex().is_match(line)
}

/// Snapshot of one table block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    /// Index of the block's first line in the document
    pub start: usize,
    rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Snapshot the given rows. Cells keep their raw text, so an untouched
    /// block renders back to exactly the same lines.
    pub fn from_lines<S: AsRef<str>>(start: usize, lines: &[S]) -> Self {
        let rows = lines.iter().map(|l| split_row(l.as_ref())).collect();
        Self { start, rows }
    }

    /// Parse a block written as text, one row per line
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self::from_lines(0, &lines)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the widest row, padding column included
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height() && coord.col < self.width()
    }

    /// Raw text of a cell; `None` past the end of its row
    pub fn cell(&self, coord: Coord) -> Option<&str> {
        self.rows
            .get(coord.row)
            .and_then(|row| row.get(coord.col))
            .map(String::as_str)
    }

    pub fn set_cell(&mut self, coord: Coord, text: String) {
        if let Some(row) = self.rows.get_mut(coord.row) {
            if row.len() <= coord.col {
                row.resize(coord.col + 1, String::new());
            }
            row[coord.col] = text;
        }
    }

    /// Coordinates of every data cell, row-major
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| (1..row.len()).map(move |c| Coord::new(r, c)))
    }

    pub fn to_lines(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.join("|")).collect()
    }

    /// Align every column to its widest cell.
    ///
    /// Open rows are closed with a final bar, data cells lose trailing
    /// blanks, and short rows are padded with empty cells. Returns the
    /// column widths, padding column first.
    pub fn reformat(&mut self) -> Vec<usize> {
        for row in &mut self.rows {
            if !is_closed(row) {
                row.push(String::new());
            }
            for cell in row.iter_mut().skip(1) {
                cell.truncate(cell.trim_end().len());
            }
        }

        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        for row in &mut self.rows {
            row.resize(widths.len(), String::new());
            for (cell, &width) in row.iter_mut().zip(&widths) {
                let pad = width.saturating_sub(cell.chars().count());
                cell.extend(std::iter::repeat(' ').take(pad));
            }
        }

        widths
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split('|').map(str::to_string).collect()
}

/// A row ends with a bar when its last cell is blank
fn is_closed(row: &[String]) -> bool {
    row.len() > 1 && row.last().map_or(false, |c| c.trim().is_empty())
}

/// Every table block in a document, top to bottom
pub fn find_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<TableBlock> {
    let mut blocks = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        if !is_table_line(lines[idx].as_ref()) {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < lines.len() && is_table_line(lines[idx].as_ref()) {
            idx += 1;
        }
        blocks.push(TableBlock::from_lines(start, &lines[start..idx]));
    }
    blocks
}

/// The block containing line `index`, if that line is a table row
pub fn block_at<S: AsRef<str>>(lines: &[S], index: usize) -> Option<TableBlock> {
    if !is_table_line(lines.get(index)?.as_ref()) {
        return None;
    }
    let start = (0..index)
        .rev()
        .take_while(|&i| is_table_line(lines[i].as_ref()))
        .last()
        .unwrap_or(index);
    let end = (index..lines.len())
        .take_while(|&i| is_table_line(lines[i].as_ref()))
        .last()
        .unwrap_or(index);
    Some(TableBlock::from_lines(start, &lines[start..=end]))
}

/// Write a block's rows back into the document, touching only rows whose
/// text changed. Returns the number of rows written.
pub fn write_back(lines: &mut [String], block: &TableBlock) -> usize {
    let mut written = 0;
    for (offset, new) in block.to_lines().into_iter().enumerate() {
        if let Some(line) = lines.get_mut(block.start + offset) {
            if *line != new {
                *line = new;
                written += 1;
            }
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_table_line() {
        assert!(is_table_line("| a |"));
        assert!(is_table_line("  \t| a"));
        assert!(!is_table_line("text | a"));
        assert!(!is_table_line(""));
    }

    #[test]
    fn test_split_keeps_padding_column() {
        let block = TableBlock::parse("   | cell 1 | whatever");
        assert_eq!(block.rows()[0], vec!["   ", " cell 1 ", " whatever"]);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let text = "  | a |  b  |\n  |1|2|";
        let block = TableBlock::parse(text);
        assert_eq!(block.to_lines().join("\n"), text);
    }

    #[test]
    fn test_cell_access() {
        let block = TableBlock::parse("| a | b |\n| c |");
        assert_eq!(block.height(), 2);
        assert_eq!(block.width(), 4);
        assert_eq!(block.cell(Coord::new(0, 2)), Some(" b "));
        assert_eq!(block.cell(Coord::new(1, 2)), Some(""));
        assert_eq!(block.cell(Coord::new(1, 3)), None, "past the end of a short row");
        assert!(block.contains(Coord::new(1, 3)));
        assert!(!block.contains(Coord::new(2, 0)));
    }

    #[test]
    fn test_coords_skip_padding() {
        let block = TableBlock::parse("| a |\n| b | c");
        let coords: Vec<Coord> = block.coords().collect();
        assert_eq!(
            coords,
            vec![Coord::new(0, 1), Coord::new(0, 2), Coord::new(1, 1), Coord::new(1, 2)]
        );
    }

    #[test]
    fn test_reformat_aligns_columns() {
        let mut block = TableBlock::parse("  | a | bbb |\n  | cc | d |");
        let widths = block.reformat();
        assert_eq!(widths, vec![2, 3, 4, 0]);
        assert_eq!(block.to_lines(), vec!["  | a | bbb|", "  | cc| d  |"]);
    }

    #[test]
    fn test_reformat_closes_open_rows_and_pads_short_ones() {
        let mut block = TableBlock::parse("| a | b |\n| c");
        block.reformat();
        assert_eq!(block.to_lines(), vec!["| a| b|", "| c|  |"]);
    }

    #[test]
    fn test_reformat_is_idempotent() {
        let mut block = TableBlock::parse("| x | 10 |\n| yy | 2 |");
        block.reformat();
        let once = block.to_lines();
        block.reformat();
        assert_eq!(block.to_lines(), once);
    }

    #[test]
    fn test_find_blocks() {
        let doc = vec!["# heading", "| a |", "| b |", "", "text", "  | c |"];
        let blocks = find_blocks(&doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start, 1);
        assert_eq!(blocks[0].height(), 2);
        assert_eq!(blocks[1].start, 5);
    }

    #[test]
    fn test_block_at() {
        let doc = vec!["intro", "| a |", "| b |", "| c |", "outro"];
        let block = block_at(&doc, 2).unwrap();
        assert_eq!(block.start, 1);
        assert_eq!(block.height(), 3);
        assert!(block_at(&doc, 0).is_none());
        assert!(block_at(&doc, 99).is_none());

        let top = vec!["| a |", "| b |"];
        assert_eq!(block_at(&top, 1).map(|b| b.start), Some(0));
    }

    #[test]
    fn test_write_back_only_changed_rows() {
        let mut doc: Vec<String> = vec!["x".into(), "| a |".into(), "| b |".into()];
        let mut block = block_at(&doc, 1).unwrap();
        block.set_cell(Coord::new(1, 1), " z ".to_string());
        assert_eq!(write_back(&mut doc, &block), 1);
        assert_eq!(doc, vec!["x", "| a |", "| z |"]);
        assert_eq!(write_back(&mut doc, &block), 0);
    }
}
