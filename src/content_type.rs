//! Content-type sniffing for bodies that were configured without one.
use crate::fixture::FixtureData;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Anything that implements `ContentTypeInference` can guess the MIME type of a fixture.
///
/// It must be total - every fixture gets a content type - and safe to call from
/// concurrent requests.
///
/// Closures taking a [`FixtureData`] reference and returning a `String` implement it out of the box:
/// ```rust
/// use net_stubbing::{ContentTypeInference, FixtureData};
///
/// let always_csv = |_data: &FixtureData| "text/csv".to_string();
/// assert_eq!(always_csv.infer(&FixtureData::Text("a,b".into())), "text/csv");
/// ```
pub trait ContentTypeInference: Send + Sync {
    fn infer(&self, data: &FixtureData) -> String;
}

impl<F> ContentTypeInference for F
where
    F: Fn(&FixtureData) -> String,
    F: Send + Sync,
{
    fn infer(&self, data: &FixtureData) -> String {
        self(data)
    }
}

/// The default [`ContentTypeInference`], backed by [`infer_content_type`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Sniffer;

impl ContentTypeInference for Sniffer {
    fn infer(&self, data: &FixtureData) -> String {
        infer_content_type(data).to_string()
    }
}

/// Guess the MIME type of a fixture:
/// - structured values and text that parses as JSON are `application/json`, except
///   structured strings, which are sniffed as text;
/// - markup (see [`is_html`]) is `text/html`;
/// - any other text is `text/plain`;
/// - bytes are treated as text when they are valid UTF-8, `application/octet-stream` otherwise.
pub fn infer_content_type(data: &FixtureData) -> &'static str {
    match data {
        FixtureData::Structured(serde_json::Value::String(text)) => infer_text(text),
        FixtureData::Structured(_) => "application/json",
        FixtureData::Text(text) => infer_text(text),
        FixtureData::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => infer_text(text),
            Err(_) => "application/octet-stream",
        },
    }
}

fn infer_text(text: &str) -> &'static str {
    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
        "application/json"
    } else if is_html(text) {
        "text/html"
    } else {
        "text/plain"
    }
}

const HTML_TAGS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col", "colgroup",
    "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd",
    "label", "legend", "li", "link", "main", "map", "mark", "math", "menu", "meta", "meter",
    "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "param", "picture",
    "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "search", "section",
    "select", "slot", "small", "source", "span", "strong", "style", "sub", "summary", "sup",
    "svg", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time",
    "title", "tr", "track", "u", "ul", "var", "video", "wbr",
];

// Only the beginning of a document is inspected.
const HTML_SNIFF_LIMIT: usize = 1000;

static BASIC_HTML: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\s?<!doctype html>|(<html\b[^>]*>|<body\b[^>]*>|<x-[^>]+>)+")
        .case_insensitive(true)
        .build()
        .expect("The basic HTML pattern is a valid regex.")
});

static FULL_HTML: Lazy<Regex> = Lazy::new(|| {
    let pattern = HTML_TAGS
        .iter()
        .map(|tag| format!(r"<{}\b[^>]*>", tag))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("The HTML tags pattern is a valid regex.")
});

/// Whether `text` looks like markup.
///
/// Leading and trailing whitespace is ignored and only the first 1000 characters are inspected.
pub fn is_html(text: &str) -> bool {
    let text = text.trim();
    let head = match text.char_indices().nth(HTML_SNIFF_LIMIT) {
        Some((end, _)) => &text[..end],
        None => text,
    };
    BASIC_HTML.is_match(head) || FULL_HTML.is_match(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_detected() {
        assert!(is_html("<p>hi</p>"));
        assert!(is_html("  <!DOCTYPE html><title>x</title>"));
        assert!(is_html("<x-custom-element></x-custom-element>"));
        assert!(is_html("<DIV class=\"a\">"));
    }

    #[test]
    fn plain_text_is_not_markup() {
        assert!(!is_html("hello world"));
        assert!(!is_html("1 < 2 and 3 > 2"));
        assert!(!is_html("<notatag>"));
    }

    #[test]
    fn markup_past_the_sniff_limit_is_ignored() {
        let text = format!("{}<p>late</p>", "a".repeat(HTML_SNIFF_LIMIT));
        assert!(!is_html(&text));
    }

    #[test]
    fn json_text_is_json() {
        let data = FixtureData::Text(r#"{"a": 1}"#.into());
        assert_eq!(infer_content_type(&data), "application/json");
    }

    #[test]
    fn invalid_utf8_bytes_are_opaque() {
        let data = FixtureData::Bytes(vec![0xff, 0xfe, 0x00].into());
        assert_eq!(infer_content_type(&data), "application/octet-stream");
    }

    #[test]
    fn structured_strings_are_sniffed_as_text() {
        let plain = FixtureData::Structured(serde_json::Value::String("hello".into()));
        let markup = FixtureData::Structured(serde_json::Value::String("<p>hi</p>".into()));
        assert_eq!(infer_content_type(&plain), "text/plain");
        assert_eq!(infer_content_type(&markup), "text/html");
    }
}
