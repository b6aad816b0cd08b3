use std::collections::HashSet;
use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::util::collapse_whitespace;

/// Body text used when a page yields no non-empty paragraphs.
pub const NO_TEXT_PLACEHOLDER: &str = "[No readable text found]";

/// Readable content pulled out of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub body: String,
}

struct Selectors {
    title: Selector,
    article: Selector,
    paragraph: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        title: Selector::parse("title").expect("static CSS selector"),
        article: Selector::parse("article").expect("static CSS selector"),
        paragraph: Selector::parse("p").expect("static CSS selector"),
    })
}

/// Extracts the title and paragraph text from an HTML page.
///
/// The title falls back to `link` when the page has no non-empty `<title>`.
/// Paragraphs come from the first `<article>` element when the page has one,
/// otherwise from the whole document; whitespace runs are collapsed, empty
/// and repeated paragraphs dropped, and the survivors joined one per line.
/// A page with no usable paragraphs gets [`NO_TEXT_PLACEHOLDER`].
pub fn extract_article(html: &str, link: &str) -> Article {
    let document = Html::parse_document(html);
    let sel = selectors();

    let title = document
        .select(&sel.title)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| link.to_string());

    let paragraphs: Vec<String> = match document.select(&sel.article).next() {
        Some(scope) => scope.select(&sel.paragraph).map(paragraph_text).collect(),
        None => document.select(&sel.paragraph).map(paragraph_text).collect(),
    };

    let mut seen = HashSet::new();
    let mut kept: Vec<String> = Vec::new();
    for paragraph in paragraphs {
        if paragraph.is_empty() {
            continue;
        }
        if seen.insert(paragraph.clone()) {
            kept.push(paragraph);
        }
    }

    let body = if kept.is_empty() {
        NO_TEXT_PLACEHOLDER.to_string()
    } else {
        kept.join("\n")
    };

    Article { title, body }
}

fn paragraph_text(paragraph: ElementRef<'_>) -> String {
    collapse_whitespace(&paragraph.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_and_paragraphs() {
        let html = r#"<html><head><title>Big News</title></head>
            <body><p>First paragraph.</p><p>Second paragraph.</p></body></html>"#;

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.title, "Big News");
        assert_eq!(article.body, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_missing_title_falls_back_to_link() {
        let html = "<html><body><p>Text.</p></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.title, "https://example.com/a");
    }

    #[test]
    fn test_whitespace_only_title_falls_back_to_link() {
        let html = "<html><head><title>   \n\t  </title></head><body><p>Text.</p></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.title, "https://example.com/a");
    }

    #[test]
    fn test_title_whitespace_collapsed() {
        let html = "<html><head><title>  Breaking\n\t  News  </title></head><body></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.title, "Breaking News");
    }

    #[test]
    fn test_article_element_scopes_paragraphs() {
        let html = r#"<html><body>
            <p>Navigation cruft.</p>
            <article><p>Story text.</p><p>More story.</p></article>
            <p>Footer cruft.</p>
            </body></html>"#;

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, "Story text.\nMore story.");
    }

    #[test]
    fn test_no_article_element_uses_whole_page() {
        let html = "<html><body><div><p>One.</p></div><footer><p>Two.</p></footer></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, "One.\nTwo.");
    }

    #[test]
    fn test_duplicate_paragraphs_dropped() {
        let html = "<html><body><p>Repeated.</p><p>Unique.</p><p>Repeated.</p></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, "Repeated.\nUnique.");
    }

    #[test]
    fn test_empty_paragraphs_dropped() {
        let html = "<html><body><p>   </p><p>Kept.</p><p></p></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, "Kept.");
    }

    #[test]
    fn test_no_paragraphs_yields_placeholder() {
        let html = "<html><head><title>Bare</title></head><body><div>no p tags</div></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, NO_TEXT_PLACEHOLDER);
    }

    #[test]
    fn test_nested_markup_inside_paragraph_flattened() {
        let html = "<html><body><p>Text with <a href=\"#\">a link</a> and <em>emphasis</em>.</p></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, "Text with a link and emphasis.");
    }

    #[test]
    fn test_first_article_wins_when_several() {
        let html = r#"<html><body>
            <article><p>Primary.</p></article>
            <article><p>Secondary.</p></article>
            </body></html>"#;

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, "Primary.");
    }

    #[test]
    fn test_empty_article_element_yields_placeholder() {
        // An <article> with no usable paragraphs does not fall back to the
        // rest of the page.
        let html = "<html><body><article></article><p>Outside.</p></body></html>";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.body, NO_TEXT_PLACEHOLDER);
    }

    #[test]
    fn test_malformed_html_still_extracts() {
        let html = "<title>Busted</title><p>First<p>Second";

        let article = extract_article(html, "https://example.com/a");
        assert_eq!(article.title, "Busted");
        assert_eq!(article.body, "First\nSecond");
    }
}
