//! Digest assembler: ranks scored items and renders the outbound document.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::pipeline::summarize::SummaryResult;

/// Double-asterisk emphasis, lazy so adjacent bold runs stay separate.
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// One accumulated entry, in arrival order.
#[derive(Debug, Clone)]
pub struct DigestItem {
    pub subject: String,
    pub sender: String,
    pub summary: SummaryResult,
}

/// The assembled outbound document.
#[derive(Debug, Clone)]
pub struct DigestDocument {
    pub subject: String,
    pub html: String,
}

/// Assemble the ranked digest document.
///
/// Items are sorted by score descending; `sort_by` is stable, so equal
/// scores keep their arrival order. Each item gets a table-of-contents line
/// with a five-mark strength indicator linking to an anchored section.
pub fn assemble(mut items: Vec<DigestItem>, date: NaiveDate) -> DigestDocument {
    items.sort_by(|a, b| b.summary.score.cmp(&a.summary.score));

    let count = items.len();
    let subject = format!("Daily Substack Digest ({count}) - {}", date.format("%d/%m/%Y"));

    let mut html = format!("<a name='top'></a><h2>Daily Digest: {count} Newsletters</h2><hr>");

    html.push_str("<h3>Quick Links:</h3><ul>");
    for (i, item) in items.iter().enumerate() {
        html.push_str(&format!(
            "<li>[{}] <a href='#item{i}'>{}</a></li>",
            strength_indicator(item.summary.score),
            item.subject
        ));
    }
    html.push_str("</ul><hr>");

    for (i, item) in items.iter().enumerate() {
        html.push_str(&format!(
            "<h3><a name='item{i}' id='item{i}'></a>{}</h3>",
            item.subject
        ));
        html.push_str(&format!("<p><b>From:</b> {}</p>", item.sender));
        html.push_str(&format!(
            "<div style='background:#f9f9f9; padding:15px; border-left: 5px solid #0044cc;'>{}</div>",
            render_markup(&item.summary.content)
        ));
        html.push_str("<p style='font-size:12px;'><a href='#top'>↑ Back to Top</a></p><hr>");
    }

    DigestDocument { subject, html }
}

/// Five marks, `score` filled and `5 - score` empty.
fn strength_indicator(score: u8) -> String {
    let filled = usize::from(score.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Minimal markup: `**…**` becomes bold, single newlines become breaks,
/// everything else passes through verbatim.
fn render_markup(text: &str) -> String {
    BOLD_RE.replace_all(text, "<b>$1</b>").replace('\n', "<br>")
}
