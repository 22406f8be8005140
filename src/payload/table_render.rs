//! HTML table rendering under a hard character budget.
//!
//! PPM long-text fields hold at most [`MAX_FIELD_CHARS`] characters and
//! silently truncate anything longer, which would leave broken markup. Rows
//! are therefore packed greedily: each whole `<tr>` is appended only if the
//! table can still be closed within the budget, and packing stops at the first
//! row that does not fit. The input order is the priority order.

use std::borrow::Cow;

use crate::models::{ImpactedSystem, Milestone};

/// Character limit of a PPM long-text field.
pub const MAX_FIELD_CHARS: usize = 4000;

const TABLE_OPEN: &str =
    r#"<table border="1" cellpadding="2" style="border-collapse: collapse; font-size: 10pt;">"#;
const HEADER_ROW_OPEN: &str = r#"<tr style="background-color: #ffcb05;">"#;
const TABLE_CLOSE: &str = "</table>";

/// A record that renders as one table row.
pub trait TableRow {
    /// Column captions, in cell order.
    fn headers() -> &'static [&'static str];

    /// Cell texts, unescaped, in header order.
    fn cells(&self) -> Vec<&str>;
}

impl TableRow for ImpactedSystem {
    fn headers() -> &'static [&'static str] {
        &["Impacted System", "Involvement", "Estimate (Hours)"]
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.system_name.as_str(),
            self.involvement.as_str(),
            self.estimate_hours.as_str(),
        ]
    }
}

impl TableRow for Milestone {
    fn headers() -> &'static [&'static str] {
        &["Milestone", "Scheduled Finish", "Actual Finish", "Status"]
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.scheduled_finish.as_deref().unwrap_or_default(),
            self.actual_finish.as_deref().unwrap_or_default(),
            self.status.as_deref().unwrap_or_default(),
        ]
    }
}

/// A rendered table and how much of the input made it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub html: String,
    /// Length of `html` in characters.
    pub chars: usize,
    pub rows: usize,
    /// Trailing rows left out to stay within the budget.
    pub dropped: usize,
}

/// Render `rows` as an HTML table of at most `max_chars` characters.
///
/// Returns `None` when there are no rows, or when the budget cannot even hold
/// the header and closing tag (a caller error, logged as a warning).
pub fn render_table<'a, R, I>(rows: I, max_chars: usize) -> Option<RenderedTable>
where
    R: TableRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let rows: Vec<&R> = rows.into_iter().collect();
    if rows.is_empty() {
        return None;
    }

    let header = header_block::<R>();
    let close_len = char_len(TABLE_CLOSE);
    let mut len = char_len(&header);
    if len + close_len > max_chars {
        tracing::warn!(
            "Table budget of {} characters cannot hold the {} character header",
            max_chars,
            len + close_len
        );
        return None;
    }

    let mut html = header;
    let mut rendered = 0;
    for row in &rows {
        let fragment = row_fragment(*row);
        let fragment_len = char_len(&fragment);
        if len + fragment_len + close_len > max_chars {
            break;
        }
        html.push_str(&fragment);
        len += fragment_len;
        rendered += 1;
    }
    html.push_str(TABLE_CLOSE);
    len += close_len;

    Some(RenderedTable {
        html,
        chars: len,
        rows: rendered,
        dropped: rows.len() - rendered,
    })
}

fn header_block<R: TableRow>() -> String {
    let mut out = String::from(TABLE_OPEN);
    out.push_str(HEADER_ROW_OPEN);
    for caption in R::headers() {
        out.push_str("<th>");
        out.push_str(&escape_html(caption));
        out.push_str("</th>");
    }
    out.push_str("</tr>");
    out
}

fn row_fragment<R: TableRow>(row: &R) -> String {
    let mut out = String::from("<tr>");
    for cell in row.cells() {
        out.push_str("<td>");
        out.push_str(&escape_html(cell));
        out.push_str("</td>");
    }
    out.push_str("</tr>");
    out
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Escape text for use inside an HTML element.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
