//! CSV tokenizer for published spreadsheet exports.
//!
//! Published QC sheets arrive as one text blob whose quoted fields may
//! contain commas, escaped quotes, and embedded newlines. The scanner below
//! handles all of that without ever failing: malformed quoting degrades to
//! literal text instead of aborting the import.

/// Split raw CSV text into rows of string cells.
///
/// Outside quotes a `,` ends the cell and `\r`, `\n`, or `\r\n` ends the
/// row; a row is kept only if it has more than one cell or its sole cell is
/// non-empty, which skips blank lines. Inside quotes `""` is a literal
/// quote and everything else (commas and newlines included) is taken
/// verbatim. A trailing row without a final newline is still emitted.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' | '\n' => {
                row.push(std::mem::take(&mut cell));
                if row.len() > 1 || !row[0].is_empty() {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => cell.push(c),
        }
    }

    // Flush a trailing row that has no terminating newline.
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_plain_rows() {
        let rows = tokenize("a,b,c\nd,e,f\n");
        assert_eq!(rows, vec![cells(&["a", "b", "c"]), cells(&["d", "e", "f"])]);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn trailing_row_without_newline_is_emitted() {
        let rows = tokenize("a,b\nc,d");
        assert_eq!(rows, vec![cells(&["a", "b"]), cells(&["c", "d"])]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = tokenize("a,b\n\n\nc,d\n");
        assert_eq!(rows, vec![cells(&["a", "b"]), cells(&["c", "d"])]);
    }

    #[test]
    fn row_of_empty_cells_is_kept() {
        // Only a lone empty cell counts as a blank line; ",," is real data.
        let rows = tokenize(",,\n");
        assert_eq!(rows, vec![cells(&["", "", ""])]);
    }

    #[test]
    fn quoted_comma_stays_in_cell() {
        let rows = tokenize("\"a,b\",c\n");
        assert_eq!(rows, vec![cells(&["a,b", "c"])]);
    }

    #[test]
    fn doubled_quote_is_literal() {
        let rows = tokenize("\"he said \"\"hi\"\"\",x\n");
        assert_eq!(rows, vec![cells(&["he said \"hi\"", "x"])]);
    }

    #[test]
    fn quoted_newline_stays_in_cell() {
        let rows = tokenize("\"line1\nline2\",x\n");
        assert_eq!(rows, vec![cells(&["line1\nline2", "x"])]);
    }

    #[test]
    fn crlf_and_bare_cr_end_rows() {
        let rows = tokenize("a,b\r\nc,d\re,f\n");
        assert_eq!(
            rows,
            vec![cells(&["a", "b"]), cells(&["c", "d"]), cells(&["e", "f"])]
        );
    }

    #[test]
    fn unterminated_quote_degrades_gracefully() {
        // The open quote swallows the rest of the input as one cell.
        let rows = tokenize("a,\"unclosed,rest\nmore");
        assert_eq!(rows, vec![cells(&["a", "unclosed,rest\nmore"])]);
    }

    #[test]
    fn quote_and_double_round_trip() {
        let fields = [
            "plain",
            "with,comma",
            "with \"quotes\"",
            "multi\nline",
            "ผ่านเกณฑ์, ดีเยี่ยม",
        ];
        let encoded = fields
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",");
        let rows = tokenize(&encoded);
        assert_eq!(rows, vec![cells(&fields)]);
    }
}
