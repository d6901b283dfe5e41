//! Search-range description for the DP table.
//!
//! Today only the full rectangle is produced; deriving a banded range from
//! a seed alignment is an extension point, and asking for it reports an
//! error instead of guessing at semantics.

use anyhow::{bail, Result};

use crate::cigar::Cigar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRangeKind {
    Rectangle,
    /// Band sliding one row per column.
    Parallelogram,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchRangeItem {
    pub kind: SearchRangeKind,
    pub start_column: usize,
    pub end_column: usize,
    pub start_row: usize,
    pub end_row: usize,
}

#[derive(Debug, Clone)]
pub struct SearchRange {
    pub items: Vec<SearchRangeItem>,
}

impl SearchRange {
    /// Range covering the whole `columns x rows` table.
    pub fn full(columns: usize, rows: usize) -> Self {
        SearchRange {
            items: vec![SearchRangeItem {
                kind: SearchRangeKind::Rectangle,
                start_column: 0,
                end_column: columns,
                start_row: 0,
                end_row: rows,
            }],
        }
    }

    pub fn start_row(&self, column: usize) -> Result<usize> {
        for item in &self.items {
            if column < item.end_column {
                return Ok(match item.kind {
                    SearchRangeKind::Rectangle => item.start_row,
                    SearchRangeKind::Parallelogram => {
                        item.start_row + (column - item.start_column)
                    }
                });
            }
        }
        bail!("incomplete search range: column {} not covered", column);
    }

    pub fn end_row(&self, column: usize) -> Result<usize> {
        for item in &self.items {
            if column < item.end_column {
                return Ok(match item.kind {
                    SearchRangeKind::Rectangle => item.end_row,
                    SearchRangeKind::Parallelogram => item.end_row + (column - item.start_column),
                });
            }
        }
        bail!("incomplete search range: column {} not covered", column);
    }
}

/// Full rectangle for an empty seed; a banded range from a real seed is
/// not implemented.
pub fn get_search_range(seed: &Cigar, ref_size: usize, query_size: usize) -> Result<SearchRange> {
    if seed.is_empty() {
        Ok(SearchRange::full(ref_size + 1, query_size + 1))
    } else {
        bail!("seeded search range is not implemented");
    }
}
