// src/utils/html.rs

use regex::Regex;
use std::sync::OnceLock;

/// Title + visible text pulled out of a page's rich-text content.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub title: String,
    pub body: String,
}

const NO_TITLE: &str = "No title";

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]\s*>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Extracts the title and plain-text body from rich-text page content.
///
/// The title is the text of the first heading element, or "No title" when
/// the content carries no heading. The body is the markup's visible text:
/// tags removed, entities decoded, whitespace collapsed. Lenient on
/// malformed markup; never fails.
pub fn extract_page_text(html: &str) -> ExtractedContent {
    let title = heading_re()
        .captures(html)
        .map(|caps| strip_tags(caps.get(1).map_or("", |m| m.as_str())))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    ExtractedContent {
        title,
        body: strip_tags(html),
    }
}

/// Removes all tags, decodes common entities, and collapses whitespace.
fn strip_tags(html: &str) -> String {
    let text = tag_re().replace_all(html, " ");
    let text = decode_entities(&text);
    whitespace_re().replace_all(text.trim(), " ").to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization for page content on write: safe tags
/// survive, script/iframe and event-handler attributes do not. Fail-safe
/// against stored XSS from authoring clients.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_heading_as_title() {
        let html = "<h1>Integration by Parts</h1><p>Recall that the product rule...</p>";
        let extracted = extract_page_text(html);

        assert_eq!(extracted.title, "Integration by Parts");
        assert!(extracted.body.contains("Integration by Parts"));
        assert!(extracted.body.contains("Recall that the product rule..."));
    }

    #[test]
    fn missing_heading_falls_back_to_sentinel() {
        let extracted = extract_page_text("<p>Just a paragraph.</p>");
        assert_eq!(extracted.title, "No title");
        assert_eq!(extracted.body, "Just a paragraph.");
    }

    #[test]
    fn strips_nested_tags_and_collapses_whitespace() {
        let html = "<h2><strong>Limits</strong></h2>\n\n<p>A   limit\n describes <em>behavior</em>.</p>";
        let extracted = extract_page_text(html);

        assert_eq!(extracted.title, "Limits");
        assert_eq!(extracted.body, "Limits A limit describes behavior.");
    }

    #[test]
    fn decodes_entities() {
        let extracted = extract_page_text("<p>x &lt; y &amp;&nbsp;z</p>");
        assert_eq!(extracted.body, "x < y & z");
    }

    #[test]
    fn tolerates_malformed_markup() {
        let extracted = extract_page_text("<p>unclosed <b>bold text");
        assert_eq!(extracted.title, "No title");
        assert_eq!(extracted.body, "unclosed bold text");
    }

    #[test]
    fn empty_input_yields_empty_body() {
        let extracted = extract_page_text("");
        assert_eq!(extracted.title, "No title");
        assert_eq!(extracted.body, "");
    }
}
