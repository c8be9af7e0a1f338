//! A1 range notation codec.
//!
//! Accepts `[SheetName!]<COL><ROW>[:<COL><ROW>]` with case-insensitive
//! column letters and 1-based rows, and converts to/from zero-based
//! half-open [`GridRect`] coordinates. Column letters use the standard
//! spreadsheet bijective base-26 sequence (A, B, .., Z, AA, AB, ..).

use crate::errors::InvalidRangeError;
use crate::grid::GridRect;
use once_cell::sync::Lazy;
use regex::Regex;

static SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)([0-9]+):([A-Z]+)([0-9]+)$").expect("regex"));
static CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z]+)([0-9]+)$").expect("regex"));

/// Decoded form of an A1 range string.
///
/// `sheet` is `None` when the text carried no `!` qualifier; the caller
/// decides the default sheet, never this codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRange {
    pub sheet: Option<String>,
    pub rect: GridRect,
}

/// Decode an A1 range string into sheet name and grid coordinates.
pub fn parse_range(text: &str) -> Result<ParsedRange, InvalidRangeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InvalidRangeError::new(text, "empty range"));
    }

    // The sheet qualifier ends at the last '!'.
    let (sheet, span) = match trimmed.rsplit_once('!') {
        Some((name, span)) => {
            if name.is_empty() {
                return Err(InvalidRangeError::new(text, "empty sheet name"));
            }
            (Some(name.to_string()), span)
        }
        None => (None, trimmed),
    };

    let span_upper = span.to_ascii_uppercase();

    if let Some(caps) = SPAN_RE.captures(&span_upper) {
        let start_col = letters_to_col(&caps[1]).map_err(|r| InvalidRangeError::new(text, r))?;
        let row1 = parse_row(&caps[2]).map_err(|r| InvalidRangeError::new(text, r))?;
        let end_col_incl = letters_to_col(&caps[3]).map_err(|r| InvalidRangeError::new(text, r))?;
        let row2 = parse_row(&caps[4]).map_err(|r| InvalidRangeError::new(text, r))?;

        if row2 < row1 || end_col_incl < start_col {
            return Err(InvalidRangeError::new(
                text,
                "end corner precedes start corner",
            ));
        }

        return Ok(ParsedRange {
            sheet,
            rect: GridRect::new(row1 - 1, row2, start_col, end_col_incl + 1),
        });
    }

    if let Some(caps) = CELL_RE.captures(&span_upper) {
        let col = letters_to_col(&caps[1]).map_err(|r| InvalidRangeError::new(text, r))?;
        let row = parse_row(&caps[2]).map_err(|r| InvalidRangeError::new(text, r))?;
        return Ok(ParsedRange {
            sheet,
            rect: GridRect::cell(row - 1, col),
        });
    }

    Err(InvalidRangeError::new(
        text,
        format!("unparseable cell span '{span}'"),
    ))
}

/// Encode grid coordinates as a two-corner A1 span, e.g. `B2:D10`.
pub fn to_a1(rect: &GridRect) -> String {
    format!(
        "{}{}:{}{}",
        col_to_letters(rect.start_col),
        rect.start_row + 1,
        col_to_letters(rect.end_col - 1),
        rect.end_row
    )
}

/// Encode with a sheet qualifier, e.g. `Sheet1!B2:D10`.
pub fn to_a1_with_sheet(sheet: &str, rect: &GridRect) -> String {
    format!("{}!{}", sheet, to_a1(rect))
}

/// Column letters to zero-based column index (A=0, Z=25, AA=26, ..).
pub fn letters_to_col(letters: &str) -> Result<u32, String> {
    if letters.is_empty() {
        return Err("empty column token".to_string());
    }
    let mut col: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return Err(format!("invalid column letter '{c}'"));
        }
        col = col * 26 + u64::from(c as u32 - 'A' as u32 + 1);
        if col > u32::MAX as u64 {
            return Err(format!("column '{letters}' out of range"));
        }
    }
    Ok((col - 1) as u32)
}

/// Zero-based column index to letters; inverse of [`letters_to_col`].
pub fn col_to_letters(col: u32) -> String {
    let mut out = Vec::new();
    let mut col = col;
    loop {
        out.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).expect("ascii letters")
}

fn parse_row(digits: &str) -> Result<u32, String> {
    let row: u32 = digits
        .parse()
        .map_err(|_| format!("row '{digits}' out of range"))?;
    if row == 0 {
        return Err("row numbers are 1-based".to_string());
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(text: &str) -> GridRect {
        parse_range(text).unwrap().rect
    }

    #[test]
    fn column_letter_mapping() {
        assert_eq!(rect("A1").start_col, 0);
        assert_eq!(rect("Z1").start_col, 25);
        assert_eq!(rect("AA1").start_col, 26);
        assert_eq!(rect("AZ1").start_col, 51);
        assert_eq!(rect("BA1").start_col, 52);
        assert_eq!(letters_to_col("ZZZ").unwrap(), 18_277);
    }

    #[test]
    fn single_cell_is_a_1x1_rect() {
        assert_eq!(rect("B2"), GridRect::new(1, 2, 1, 2));
    }

    #[test]
    fn rectangular_span_with_sheet() {
        let parsed = parse_range("Sheet1!A1:C4").unwrap();
        assert_eq!(parsed.sheet.as_deref(), Some("Sheet1"));
        assert_eq!(parsed.rect, GridRect::new(0, 4, 0, 3));
    }

    #[test]
    fn sheet_qualifier_splits_at_last_bang() {
        let parsed = parse_range("Q1!A1:B2").unwrap();
        assert_eq!(parsed.sheet.as_deref(), Some("Q1"));
    }

    #[test]
    fn columns_are_case_insensitive() {
        assert_eq!(rect("b2:d10"), rect("B2:D10"));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(parse_range("").is_err());
        assert!(parse_range("1A").is_err());
        assert!(parse_range("A0").is_err());
        assert!(parse_range("A1:B0").is_err());
        assert!(parse_range("!A1").is_err());
        assert!(parse_range("A1:B2:C3").is_err());
        assert!(parse_range("A:B").is_err());
    }

    #[test]
    fn reversed_corners_are_rejected() {
        assert!(parse_range("D10:B2").is_err());
        assert!(parse_range("A5:A1").is_err());
    }

    #[test]
    fn encode_uses_two_corner_form() {
        assert_eq!(to_a1(&GridRect::new(1, 10, 1, 4)), "B2:D10");
        assert_eq!(to_a1(&GridRect::cell(0, 0)), "A1:A1");
        assert_eq!(
            to_a1_with_sheet("Data", &GridRect::new(0, 4, 0, 3)),
            "Data!A1:C4"
        );
    }

    #[test]
    fn encode_is_idempotent() {
        let r = GridRect::new(3, 9, 27, 55);
        assert_eq!(to_a1(&r), to_a1(&r));
    }

    #[test]
    fn decode_inverts_encode_across_the_column_space() {
        // Sweep columns through the one/two/three-letter boundaries.
        for start_col in [0u32, 1, 25, 26, 51, 52, 675, 676, 702, 18_276] {
            for width in [1u32, 2, 26, 700] {
                let g = GridRect::new(4, 123, start_col, start_col + width);
                if g.end_col > 18_278 {
                    continue;
                }
                assert_eq!(rect(&to_a1(&g)), g, "round trip for {}", to_a1(&g));
            }
        }
    }

    #[test]
    fn letters_round_trip() {
        for col in 0..2_000u32 {
            assert_eq!(letters_to_col(&col_to_letters(col)).unwrap(), col);
        }
    }
}
