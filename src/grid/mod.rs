pub mod geometry;
pub mod notation;

pub use geometry::GridRect;
pub use notation::{
    ParsedRange, col_to_letters, letters_to_col, parse_range, to_a1, to_a1_with_sheet,
};
