//! Plain-text rendering of result pages.

use std::fmt::Write as _;

use wwise_search::{PageState, PageView, SearchResult};

/// Line printed when a search matched nothing.
pub const NO_RESULTS: &str = "No matching results.";

const HEADER: [&str; 6] = ["#", "Name", "Type", "GUID", "ShortID", "MediaID"];

/// Render the current page of `state` as a table with a page footer.
pub fn render_page(state: &PageState) -> String {
    match state.view() {
        PageView::NoResults => format!("{NO_RESULTS}\n"),
        PageView::Page {
            page,
            total_pages,
            total_results,
            items,
        } => {
            let rows: Vec<[String; 6]> = items
                .iter()
                .enumerate()
                .map(|(i, result)| row(state.window_offset() + i + 1, result))
                .collect();

            let mut widths = HEADER.map(str::len);
            for cells in &rows {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            let mut out = String::new();
            push_line(&mut out, &HEADER.map(str::to_owned), &widths);
            for cells in &rows {
                push_line(&mut out, cells, &widths);
            }
            let noun = if total_results == 1 { "result" } else { "results" };
            let _ = writeln!(out, "Page {page}/{total_pages} ({total_results} {noun})");
            out
        }
    }
}

fn row(index: usize, result: &SearchResult) -> [String; 6] {
    let cell = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_owned());
    [
        index.to_string(),
        result.name.clone(),
        result.object_type.clone(),
        cell(&result.guid),
        cell(&result.short_id),
        cell(&result.media_id),
    ]
}

fn push_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths.iter().copied()).enumerate() {
        if i == 0 {
            let _ = write!(line, "{cell:>width$}");
        } else {
            let _ = write!(line, "  {cell:<width$}");
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
