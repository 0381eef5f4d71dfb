//! Rich text helpers: plain-text conversion and inline HTML.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::TextFormat;

static BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\f]+").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());

static P_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*<p>\s*").unwrap());
static P_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*</p>\s*").unwrap());
static TRAILING_BR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(<br\s*/?>)+$").unwrap());

/// Reduce `text` to plain text for reports and summaries.
///
/// HTML-like formats lose their markup: line breaks and paragraph ends become
/// newlines, other tags are dropped and common entities decoded. Plain and
/// markdown text is only trimmed.
pub fn html_to_text(text: &str, format: TextFormat) -> String {
    match format {
        TextFormat::Plain | TextFormat::Markdown => text.trim().to_string(),
        TextFormat::Html | TextFormat::Moodle => {
            let text = BREAK.replace_all(text, "\n");
            let text = TAG.replace_all(&text, "");
            let text = decode_entities(&text);
            let text = SPACES.replace_all(&text, " ");
            let text = BLANK_LINES.replace_all(&text, "\n");
            text.lines()
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        }
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Make HTML suitable for inline presentation: paragraphs become line
/// breaks and trailing breaks are removed.
pub fn make_html_inline(html: &str) -> String {
    let html = P_OPEN.replace_all(html, "");
    let html = P_CLOSE.replace_all(&html, "<br />");
    let html = TRAILING_BR.replace_all(&html, "");
    html.trim().to_string()
}
