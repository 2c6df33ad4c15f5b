//! Compact rendering of missing-line ranges for the "Missing" column.

use crate::model::MissingRange;

const SEPARATOR: &str = " ";
const ELLIPSIS: &str = " &hellip;";

/// Plain range text: "5" for a single line, "10-12" otherwise.
#[must_use]
pub fn range_text(range: &MissingRange) -> String {
    if range.is_single() {
        range.start.to_string()
    } else {
        format!("{}-{}", range.start, range.end)
    }
}

/// Keep as many leading entries as fit in `max_length` characters.
///
/// Every entry contributes `SEPARATOR + text` to the running length,
/// including the first. The first entry is never dropped, so a file with
/// missing lines always shows at least one range. `max_length <= 0` disables
/// cropping. Returns the number of entries kept and whether any were dropped.
fn crop(texts: &[String], max_length: i64) -> (usize, bool) {
    if max_length <= 0 {
        return (texts.len(), false);
    }
    let mut accumulated = 0usize;
    for (index, text) in texts.iter().enumerate() {
        accumulated += SEPARATOR.len() + text.len();
        if index == 0 {
            continue;
        }
        if accumulated as i64 > max_length {
            return (index, true);
        }
    }
    (texts.len(), false)
}

/// Link a wrapped range to its lines, e.g. `` [`3-5`](url?plain=1#L3-L5) ``.
/// `plain=1` keeps the host from showing a rendered view of the file.
fn link(file_url: &str, range: &MissingRange, wrapped: &str) -> String {
    let anchor = if range.is_single() {
        format!("L{}", range.start)
    } else {
        format!("L{}-L{}", range.start, range.end)
    };
    format!("[{wrapped}]({file_url}?plain=1#{anchor})")
}

/// Format missing ranges as backtick-wrapped, space-separated entries,
/// cropped to `max_length` characters of range text and optionally linked.
///
/// Cropping only counts the bare range text, never backticks or link
/// markup. A cropped list ends with an ellipsis. An empty result is a single
/// space so a table cell never collapses.
#[must_use]
pub fn format_missing_lines(
    file_url: Option<&str>,
    ranges: &[MissingRange],
    max_length: i64,
    with_links: bool,
) -> String {
    let texts: Vec<String> = ranges.iter().map(range_text).collect();
    let (kept, cropped) = crop(&texts, max_length);

    let entries: Vec<String> = ranges[..kept]
        .iter()
        .zip(&texts[..kept])
        .map(|(range, text)| {
            let wrapped = format!("`{text}`");
            match file_url {
                Some(url) if with_links => link(url, range, &wrapped),
                _ => wrapped,
            }
        })
        .collect();

    let mut out = entries.join(SEPARATOR);
    if cropped {
        out.push_str(ELLIPSIS);
    }
    if out.is_empty() {
        out.push(' ');
    }
    out
}
