//! Plain-text table rendering.
//!
//! Used by the CLI to show previews and query results, and by the result
//! explainer to put a bounded rendering of the result set into the
//! summarization prompt.

use unicode_width::UnicodeWidthStr;

use crate::dataset::Value;
use crate::db::ResultSet;

/// Render columns and rows as an aligned text table, showing at most
/// `max_rows` rows. When rows are cut off, a footer states the total so a
/// reader (human or model) knows the rendering is partial.
pub fn table(columns: &[String], rows: &[Vec<Value>], max_rows: usize) -> String {
    let shown = &rows[..rows.len().min(max_rows)];

    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in shown {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.display_width());
            }
        }
    }

    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| pad(c, widths[i]))
        .collect();
    out.push_str(&header.join(" | "));
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for row in shown {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(&cell.display(), widths.get(i).copied().unwrap_or(0)))
            .collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }

    if rows.is_empty() {
        out.push_str("(no rows)\n");
    } else if rows.len() > max_rows {
        out.push_str(&format!(
            "({} rows total, showing first {})\n",
            rows.len(),
            max_rows
        ));
    }

    out
}

/// Render a result set with the given row cap.
pub fn result_table(result: &ResultSet, max_rows: usize) -> String {
    table(&result.columns, &result.rows, max_rows)
}

fn pad(text: &str, width: usize) -> String {
    let mut s = text.to_string();
    let current = text.width();
    for _ in current..width {
        s.push(' ');
    }
    s
}
