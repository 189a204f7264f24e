//! Text cleanup helpers shared by data parsing and news formatting.

use std::sync::LazyLock;

use regex::Regex;

static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i) *</? *br */?> *").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").unwrap());
static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(?:[^\]|]*\|)?([^\]|]*)\]\]").unwrap());
static WIKI_TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").unwrap());
static WIKI_EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'{2,}").unwrap());
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

const WIKI_BASE_URL: &str = "https://dragalialost.gamepedia.com/";

/// Replace HTML character references (`&amp;`, `&rsquo;`, `&#39;`,
/// `&#x2605;`, ...) with the characters they stand for. Unknown references
/// are left untouched.
pub fn unescape_html(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Remove every HTML tag, keeping the text between them.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Clean a wiki-sourced text field for display.
///
/// Unescapes entities, turns `<br>` into newlines, drops remaining tags and
/// wiki markup, and squeezes runs of spaces. Returns `None` when nothing
/// printable is left.
pub fn clean_markup(s: &str) -> Option<String> {
    let unescaped = unescape_html(s);
    let breaks = BREAK_RE.replace_all(&unescaped, "\n");
    let untagged = TAG_RE.replace_all(&breaks, "");
    let linked = WIKI_LINK_RE.replace_all(&untagged, "$1");
    let templated = WIKI_TEMPLATE_RE.replace_all(&linked, "");
    let plain = WIKI_EMPHASIS_RE.replace_all(&templated, "");
    let squeezed = SPACES_RE.replace_all(&plain, " ");
    let trimmed = squeezed.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Format items as an English list: `a`, `a and b`, `a, b, and c`.
pub fn readable_list(items: &[String], last_separator: &str) -> String {
    if items.len() < 3 {
        return items.join(&format!(" {last_separator} "));
    }
    let rest = items[..items.len() - 1].join(", ");
    format!("{rest}, {last_separator} {}", items[items.len() - 1])
}

/// Link to the wiki page with the given title.
pub fn wiki_link(page_name: &str) -> String {
    format!(
        "{WIKI_BASE_URL}{}",
        urlencoding::encode(&page_name.replace(' ', "_"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_named_and_numeric() {
        assert_eq!(unescape_html("Fish &amp; Chips"), "Fish & Chips");
        assert_eq!(unescape_html("it&#39;s"), "it's");
        assert_eq!(unescape_html("&#x2605;5"), "★5");
        assert_eq!(unescape_html("&bogus;"), "&bogus;");
    }

    #[test]
    fn unescape_typographic_entities() {
        assert_eq!(
            unescape_html("It&rsquo;s &ldquo;Gala&rdquo; time &eacute; &#8217;"),
            "It\u{2019}s \u{201c}Gala\u{201d} time \u{e9} \u{2019}"
        );
        assert_eq!(clean_markup("Caf&eacute;&nbsp;Notte").as_deref(), Some("Caf\u{e9}\u{a0}Notte"));
    }

    #[test]
    fn clean_markup_strips_html_and_wiki() {
        let raw = "Deals <span style=\"color:red\">heavy</span> damage<br/>to [[Enemy|enemies]] '''twice'''";
        assert_eq!(
            clean_markup(raw).as_deref(),
            Some("Deals heavy damage\nto enemies twice")
        );
    }

    #[test]
    fn clean_markup_removes_templates_and_spaces() {
        assert_eq!(
            clean_markup("{{Icon|Flame}}  Flame   attack").as_deref(),
            Some("Flame attack")
        );
    }

    #[test]
    fn clean_markup_empty_is_none() {
        assert_eq!(clean_markup("  <br>  "), None);
        assert_eq!(clean_markup(""), None);
    }

    #[test]
    fn readable_list_forms() {
        let items = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(readable_list(&items(&[]), "and"), "");
        assert_eq!(readable_list(&items(&["a"]), "and"), "a");
        assert_eq!(readable_list(&items(&["a", "b"]), "and"), "a and b");
        assert_eq!(
            readable_list(&items(&["a", "b", "c", "d"]), "or"),
            "a, b, c, or d"
        );
    }

    #[test]
    fn wiki_link_encodes_spaces() {
        assert_eq!(
            wiki_link("Gala Leonidas"),
            "https://dragalialost.gamepedia.com/Gala_Leonidas"
        );
    }
}
