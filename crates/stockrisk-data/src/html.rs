//! HTML table extraction.
//!
//! Tables are read in two passes. The structured pass walks every `<table>`
//! element of the parsed document, taking header rows from `<thead>` (or from
//! leading rows made only of `<th>` cells) and expanding `colspan`/`rowspan`
//! into a rectangular grid. When that pass finds nothing, the raw text is
//! searched for the first `<table …>…</table>` block, which is parsed on its
//! own with its first row used as the header. This catches tables that only
//! exist inside script payloads or templates.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));

static RAW_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>.*?</table\s*>").expect("valid regex"));

/// Upper bound for `colspan`/`rowspan` attributes.
const MAX_SPAN: usize = 1000;

/// A rectangular table scraped from HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    /// Header levels, outermost first. Each level has one entry per column.
    header: Vec<Vec<String>>,
    /// Body rows, one entry per column.
    rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Create a table, padding every row and header level to the widest row.
    pub fn new(header: Vec<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        let width = header
            .iter()
            .chain(rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        let pad = |mut row: Vec<String>| {
            row.resize(width, String::new());
            row
        };
        Self {
            header: header.into_iter().map(pad).collect(),
            rows: rows.into_iter().map(pad).collect(),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.header
            .first()
            .or_else(|| self.rows.first())
            .map_or(0, Vec::len)
    }

    /// Body rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Flattened column names.
    ///
    /// Each column's header levels are joined with a single space, skipping
    /// empty and `nan` levels. Columns without any header get their position
    /// as name.
    pub fn columns(&self) -> Vec<String> {
        if self.header.is_empty() {
            return (0..self.width()).map(|i| i.to_string()).collect();
        }
        (0..self.width())
            .map(|col| {
                let levels: Vec<&str> = self
                    .header
                    .iter()
                    .map(|level| level[col].as_str())
                    .collect();
                flatten_column(&levels)
            })
            .collect()
    }

    /// Promote the first body row to a single-level header.
    fn with_first_row_as_header(mut self) -> Self {
        if self.header.is_empty() && !self.rows.is_empty() {
            let first = self.rows.remove(0);
            self.header.push(first);
        }
        self
    }
}

/// Join one column's header levels into a single name.
///
/// ```
/// use stockrisk_data::html::flatten_column;
///
/// assert_eq!(flatten_column(&["Current Ratio", "FY2023"]), "Current Ratio FY2023");
/// assert_eq!(flatten_column(&["", "nan", "EBITDA"]), "EBITDA");
/// ```
pub fn flatten_column<S: AsRef<str>>(levels: &[S]) -> String {
    levels
        .iter()
        .map(|level| level.as_ref().trim())
        .filter(|level| !level.is_empty() && !level.eq_ignore_ascii_case("nan"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse every table of a document with the structured pass.
pub fn parse_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    document
        .select(&TABLE)
        .filter_map(|table| read_table(table, false))
        .collect()
}

/// First table of a document, falling back to the raw `<table>` scan.
pub fn first_table(html: &str) -> Option<HtmlTable> {
    parse_tables(html)
        .into_iter()
        .next()
        .or_else(|| raw_table_fallback(html))
}

/// Locate the first raw `<table>` block in the text and parse it directly.
pub fn raw_table_fallback(html: &str) -> Option<HtmlTable> {
    let block = RAW_TABLE.find(html)?;
    tracing::debug!(bytes = block.len(), "using raw <table> fallback");
    let fragment = Html::parse_fragment(block.as_str());
    let table = fragment.select(&TABLE).next()?;
    read_table(table, true)
}

/// A cell before span expansion.
#[derive(Debug)]
struct Cell {
    text: String,
    header: bool,
    colspan: usize,
    rowspan: usize,
}

fn read_table(table: ElementRef<'_>, first_row_is_header: bool) -> Option<HtmlTable> {
    let mut head: Vec<Vec<Cell>> = Vec::new();
    let mut body: Vec<Vec<Cell>> = Vec::new();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => head.extend(rows_of(child)),
            "tbody" | "tfoot" => body.extend(rows_of(child)),
            "tr" => body.push(cells_of(child)),
            _ => {}
        }
    }

    // Without <thead>, leading all-<th> rows form the header.
    if head.is_empty() {
        let leading = body
            .iter()
            .take_while(|row| !row.is_empty() && row.iter().all(|c| c.header))
            .count();
        head = body.drain(..leading).collect();
    }

    if head.is_empty() && body.is_empty() {
        return None;
    }

    let table = HtmlTable::new(expand_spans(head), expand_spans(body));
    if table.width() == 0 {
        return None;
    }
    Some(if first_row_is_header {
        table.with_first_row_as_header()
    } else {
        table
    })
}

fn rows_of(section: ElementRef<'_>) -> Vec<Vec<Cell>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .map(cells_of)
        .collect()
}

fn cells_of(row: ElementRef<'_>) -> Vec<Cell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|el| Cell {
            text: normalize_ws(&el.text().collect::<Vec<_>>().join(" ")),
            header: el.value().name() == "th",
            colspan: span_attr(el, "colspan"),
            rowspan: span_attr(el, "rowspan"),
        })
        .collect()
}

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Expand `colspan`/`rowspan` into a grid of plain strings.
fn expand_spans(rows: Vec<Vec<Cell>>) -> Vec<Vec<String>> {
    // Per column: text still to be repeated and the number of rows left.
    let mut carry: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out: Vec<String> = Vec::new();
        let mut cells = row.into_iter();
        let mut col = 0;

        loop {
            if let Some(slot) = carry.get_mut(col) {
                if let Some((text, left)) = slot.take() {
                    if left > 1 {
                        *slot = Some((text.clone(), left - 1));
                    }
                    out.push(text);
                    col += 1;
                    continue;
                }
            }

            let Some(cell) = cells.next() else {
                if carry.iter().skip(col).any(Option::is_some) {
                    out.push(String::new());
                    col += 1;
                    continue;
                }
                break;
            };

            let text = cell.text;
            for _ in 0..cell.colspan {
                if cell.rowspan > 1 {
                    if carry.len() <= col {
                        carry.resize(col + 1, None);
                    }
                    carry[col] = Some((text.clone(), cell.rowspan - 1));
                }
                out.push(text.clone());
                col += 1;
            }
        }

        grid.push(out);
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_flatten_two_level_header() {
        let table = HtmlTable::new(
            vec![
                s(&["Current Ratio", "Current Ratio"]),
                s(&["FY2023", "FY2024"]),
            ],
            vec![s(&["1.2", "1.4"])],
        );
        assert_eq!(
            table.columns(),
            vec!["Current Ratio FY2023", "Current Ratio FY2024"]
        );
    }

    #[test]
    fn test_flatten_skips_empty_and_nan_levels() {
        assert_eq!(flatten_column(&["nan", "Fiscal Year"]), "Fiscal Year");
        assert_eq!(flatten_column(&["NaN", "", "  "]), "");
        assert_eq!(flatten_column(&[" FY 2024 ", "Dec 31, 2024"]), "FY 2024 Dec 31, 2024");
    }

    #[test]
    fn test_columns_without_header_are_positional() {
        let table = HtmlTable::new(vec![], vec![s(&["a", "b", "c"])]);
        assert_eq!(table.columns(), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_new_pads_ragged_rows() {
        let table = HtmlTable::new(vec![s(&["A", "B", "C"])], vec![s(&["1"])]);
        assert_eq!(table.width(), 3);
        assert_eq!(table.rows()[0], s(&["1", "", ""]));
    }

    #[test]
    fn test_parse_thead_tbody() {
        let html = r#"
            <html><body>
            <table>
              <thead><tr><th>Fiscal Year</th><th>FY 2024</th><th>FY 2023</th></tr></thead>
              <tbody>
                <tr><td>Current Ratio</td><td>1.52</td><td>1.41</td></tr>
                <tr><td>EBITDA</td><td>1,234</td><td>-</td></tr>
              </tbody>
            </table>
            </body></html>"#;
        let tables = parse_tables(html);
        assert_eq!(tables.len(), 1);
        let t = &tables[0];
        assert_eq!(t.columns(), vec!["Fiscal Year", "FY 2024", "FY 2023"]);
        assert_eq!(t.rows().len(), 2);
        assert_eq!(t.rows()[1], s(&["EBITDA", "1,234", "-"]));
    }

    #[test]
    fn test_parse_leading_th_rows_without_thead() {
        let html = r#"<table>
            <tr><th>Metric</th><th>2024</th></tr>
            <tr><td>Current Ratio</td><td>2.0</td></tr>
        </table>"#;
        let t = first_table(html).unwrap();
        assert_eq!(t.columns(), vec!["Metric", "2024"]);
        assert_eq!(t.rows(), &[s(&["Current Ratio", "2.0"])]);
    }

    #[test]
    fn test_parse_colspan_and_rowspan_header() {
        let html = r#"<table>
            <thead>
              <tr><th rowspan="2">Metric</th><th colspan="2">Period</th></tr>
              <tr><th>FY 2024</th><th>FY 2023</th></tr>
            </thead>
            <tbody><tr><td>EBITDA</td><td>10</td><td>9</td></tr></tbody>
        </table>"#;
        let t = first_table(html).unwrap();
        assert_eq!(
            t.columns(),
            vec!["Metric Metric", "Period FY 2024", "Period FY 2023"]
        );
    }

    #[test]
    fn test_cell_whitespace_is_normalized() {
        let html = "<table><tr><th>A</th></tr><tr><td>\n  Debt /\n <span>Equity</span>  </td></tr></table>";
        let t = first_table(html).unwrap();
        assert_eq!(t.rows()[0][0], "Debt / Equity");
    }

    #[test]
    fn test_first_table_is_taken() {
        let html = "<table><tr><th>first</th></tr></table><table><tr><th>second</th></tr></table>";
        assert_eq!(first_table(html).unwrap().columns(), vec!["first"]);
    }

    #[test]
    fn test_raw_fallback_inside_script() {
        // html5ever keeps script bodies as text, so only the raw scan sees this table.
        let html = r#"<html><head><script type="text/template">
            <table><tr><td>Metric</td><td>FY 2024</td></tr>
            <tr><td>Current Ratio</td><td>1.1</td></tr></table>
        </script></head><body><p>no table</p></body></html>"#;
        assert!(parse_tables(html).is_empty());
        let t = first_table(html).unwrap();
        assert_eq!(t.columns(), vec!["Metric", "FY 2024"]);
        assert_eq!(t.rows(), &[s(&["Current Ratio", "1.1"])]);
    }

    #[test]
    fn test_no_table() {
        assert!(first_table("<html><body><p>nothing</p></body></html>").is_none());
        assert!(first_table("<table></table>").is_none());
    }
}
