//! Excel workbook rendering.

use crate::book::{
    ALTMAN_Z_COLUMN, Layout, OutputBook, OutputTable, PIOTROSKI_F_COLUMN, SHEET_NAME,
};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::HashSet;
use tracing::debug;

/// Longest sheet name produced for per-ticker sheets.
pub const MAX_SHEET_NAME: usize = 30;

const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Make a display name usable as a sheet name.
///
/// Characters Excel rejects become `_`, surrounding apostrophes and
/// whitespace are trimmed, and the result is cut to [`MAX_SHEET_NAME`]
/// characters.
///
/// ```
/// use stockrisk_output::xlsx::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("Reliance Steel & Aluminum"), "Reliance Steel & Aluminum");
/// assert_eq!(sanitize_sheet_name("A/B: [test]"), "A_B_ _test_");
/// ```
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let truncated: String = replaced
        .trim()
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME)
        .collect();
    let name = truncated.trim_end().trim_end_matches('\'');
    if name.is_empty() {
        "Sheet".to_string()
    } else {
        name.to_string()
    }
}

/// Hands out unique sheet names; Excel compares them case-insensitively.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    /// Create a namer with no names taken.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sanitized, not yet used name for `display_name`.
    ///
    /// Repeats get a ` (2)`, ` (3)`, ... suffix, shortening the stem so the
    /// name stays within [`MAX_SHEET_NAME`].
    pub fn unique(&mut self, display_name: &str) -> String {
        let base = sanitize_sheet_name(display_name);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let suffix = format!(" ({n})");
            let stem: String = base
                .chars()
                .take(MAX_SHEET_NAME.saturating_sub(suffix.chars().count()))
                .collect();
            let candidate = format!("{}{suffix}", stem.trim_end());
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Render a book as a workbook in the book's layout.
pub fn build_workbook(book: &OutputBook) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    match book.layout() {
        Layout::Consolidated => {
            let table = book.consolidated();
            let sheet = workbook.add_worksheet().set_name(SHEET_NAME)?;
            write_table(sheet, 0, &table, &bold)?;
            sheet.autofit();
            debug!(rows = table.len(), "consolidated sheet written");
        }
        Layout::PerTicker => {
            let mut namer = SheetNamer::new();
            for block in book.blocks() {
                let name = namer.unique(&block.name);
                let sheet = workbook.add_worksheet().set_name(&name)?;

                write_row(
                    sheet,
                    0,
                    &[ALTMAN_Z_COLUMN.to_string(), block.scores.altman_z.clone()],
                    None,
                )?;
                write_row(
                    sheet,
                    1,
                    &[PIOTROSKI_F_COLUMN.to_string(), block.scores.piotroski_f.clone()],
                    None,
                )?;
                // Row 2 stays blank.
                let table = book.ticker_table(block);
                write_table(sheet, 3, &table, &bold)?;
                sheet.autofit();
                debug!(symbol = %block.symbol, sheet = %name, rows = table.len(), "ticker sheet written");
            }
            if book.is_empty() {
                workbook.add_worksheet().set_name(SHEET_NAME)?;
            }
        }
    }

    Ok(workbook)
}

/// Render a book to xlsx bytes.
pub fn to_xlsx_bytes(book: &OutputBook) -> Result<Vec<u8>, XlsxError> {
    build_workbook(book)?.save_to_buffer()
}

fn write_table(
    sheet: &mut Worksheet,
    first_row: u32,
    table: &OutputTable,
    header_format: &Format,
) -> Result<(), XlsxError> {
    write_row(sheet, first_row, table.header(), Some(header_format))?;
    for (offset, row) in table.rows().iter().enumerate() {
        let offset = u32::try_from(offset).map_err(|_| XlsxError::RowColumnLimitError)?;
        write_row(sheet, first_row + 1 + offset, row, None)?;
    }
    Ok(())
}

// Empty values are skipped so they stay empty cells.
fn write_row(
    sheet: &mut Worksheet,
    row: u32,
    cells: &[String],
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    for (col, value) in cells.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let col = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
        match format {
            Some(format) => sheet.write_string_with_format(row, col, value, format)?,
            None => sheet.write_string(row, col, value)?,
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Alcoa", "Alcoa")]
    #[case("Reliance Steel & Aluminum Company of America", "Reliance Steel & Aluminum Comp")]
    #[case("What? Corp*", "What_ Corp_")]
    #[case("'Quoted'", "Quoted")]
    #[case("   ", "Sheet")]
    fn test_sanitize_sheet_name(#[case] name: &str, #[case] expected: &str) {
        let sanitized = sanitize_sheet_name(name);
        assert_eq!(sanitized, expected);
        assert!(sanitized.chars().count() <= MAX_SHEET_NAME);
    }

    #[test]
    fn test_sheet_namer_dedupes() {
        let mut namer = SheetNamer::new();
        assert_eq!(namer.unique("Alcoa"), "Alcoa");
        assert_eq!(namer.unique("ALCOA"), "ALCOA (2)");
        assert_eq!(namer.unique("Alcoa"), "Alcoa (3)");
    }

    #[test]
    fn test_sheet_namer_keeps_long_names_in_bounds() {
        let mut namer = SheetNamer::new();
        let long = "Kaiser Aluminum Corporation Holdings";
        let first = namer.unique(long);
        let second = namer.unique(long);
        assert_eq!(first.chars().count(), MAX_SHEET_NAME);
        assert!(second.ends_with(" (2)"));
        assert!(second.chars().count() <= MAX_SHEET_NAME);
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_book_still_has_a_sheet() {
        let book = OutputBook::new(vec!["Current Ratio".to_string()]).with_layout(Layout::PerTicker);
        let bytes = to_xlsx_bytes(&book).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
