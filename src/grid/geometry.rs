use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A rectangular cell region, zero-based and half-open on both axes.
///
/// `end_row` and `end_col` are exclusive; every rect produced by the
/// notation codec satisfies `end_row > start_row && end_col > start_col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GridRect {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl GridRect {
    pub fn new(start_row: u32, end_row: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start_row,
            end_row,
            start_col,
            end_col,
        }
    }

    /// Single cell at (row, col).
    pub fn cell(row: u32, col: u32) -> Self {
        Self::new(row, row + 1, col, col + 1)
    }

    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row
    }

    pub fn col_count(&self) -> u32 {
        self.end_col - self.start_col
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_count()) * u64::from(self.col_count())
    }

    /// Strict half-open intersection test on both axes. Rects that only
    /// share a boundary row or column do not overlap.
    pub fn overlaps(&self, other: &GridRect) -> bool {
        self.start_row < other.end_row
            && self.end_row > other.start_row
            && self.start_col < other.end_col
            && self.end_col > other.start_col
    }

    /// Whether the absolute row index falls inside this rect's row span.
    pub fn contains_row(&self, row: u32) -> bool {
        self.start_row <= row && row < self.end_row
    }
}
