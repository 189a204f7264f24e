//! Turning article HTML into a short plain-text preview.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::{Captures, Regex};

use notte_core::text::{strip_tags, unescape_html};

static LOCAL_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span[^>]+data-local_date="(\d+)[^>]+>"#).unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

/// Previews stop growing once they are longer than this many characters.
pub const PREVIEW_LENGTH: usize = 100;

/// Appended to a preview that does not cover the whole article.
pub const TRUNCATION_MARK: &str = "\n\n...\n\u{200b}";

const LOCAL_DATE_FORMAT: &str = "%I:%M %p, %b %d, %Y (UTC)";

/// Plain text of an article body: one line per block, local-time
/// placeholders rendered in UTC, tags removed and entities decoded.
pub fn article_text(html: &str) -> String {
    let html = html.replace("</div>", "\n").replace("<br>", "\n");
    let html = LOCAL_DATE_RE.replace_all(&html, |caps: &Captures| {
        caps[1]
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.format(LOCAL_DATE_FORMAT).to_string())
            .unwrap_or_default()
    });
    unescape_html(&strip_tags(&html))
}

/// The preview posted for an article titled `title`.
///
/// Release announcements for the "Dragalia Life" comic keep only their
/// first line. Other articles take whole lines until the preview is longer
/// than [`PREVIEW_LENGTH`], with blank lines between paragraphs.
pub fn article_preview(title: &str, html: &str) -> String {
    let text = article_text(html);
    let sections: Vec<&str> = text.split('\n').collect();

    if title.contains("Dragalia Life") && title.contains("Now Available") {
        return sections.first().copied().unwrap_or_default().to_string();
    }

    let mut preview = String::new();
    let mut taken = 0;
    for section in &sections {
        preview.push('\n');
        preview.push_str(section);
        taken += 1;
        if preview.chars().count() > PREVIEW_LENGTH {
            break;
        }
    }

    let mut preview = NEWLINES_RE.replace_all(&preview, "\n\n").trim().to_string();
    if taken < sections.len() {
        preview.push_str(TRUNCATION_MARK);
    }
    preview
}
