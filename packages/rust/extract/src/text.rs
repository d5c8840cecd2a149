//! Text helpers shared by the HTML extractors.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Collapse runs of whitespace (including newlines and NBSP) to one space and trim.
pub(crate) fn normalize_ws(s: &str) -> String {
    WS_RE.replace_all(s.trim(), " ").into_owned()
}

/// All text below `el`, whitespace-normalized.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}
