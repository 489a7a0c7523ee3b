//! Main-article extraction from fetched HTML pages.
//!
//! [`ArticleExtractor`] is the seam; [`ReadabilityExtractor`] is the built-in
//! heuristic implementation. Callers fall back to [`body_text`] when
//! extraction fails.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use contentsynth_shared::{Result, SynthError};

/// Text and metadata pulled out of an HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    /// Main article text (Markdown-flavoured).
    pub text: String,
    /// Publisher or site name, if the page declares one.
    pub site_name: Option<String>,
}

/// Trait for main-content extraction.
pub trait ArticleExtractor: Send + Sync {
    /// Extract the main article from a page fetched from `url`.
    fn extract(&self, html: &str, url: &Url) -> Result<ExtractedArticle>;

    /// Human-readable extractor name for tracing.
    fn name(&self) -> &str;
}

/// Heuristic extractor: first matching content container, chrome removed,
/// converted to Markdown text.
pub struct ReadabilityExtractor;

/// Content containers in priority order.
const CONTENT_SELECTORS: [&str; 5] = ["article", "main", r#"[role="main"]"#, ".content", "body"];

/// Meta tags that carry a site name, in priority order.
const SITE_NAME_SELECTORS: [&str; 3] = [
    r#"meta[property="og:site_name"]"#,
    r#"meta[name="application-name"]"#,
    r#"meta[name="twitter:site"]"#,
];

/// Page chrome dropped from the content container.
const CHROME_SELECTOR: &str =
    "nav, header, footer, aside, script, style, form, .sidebar, .nav, .advert, .comments";

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

impl ArticleExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str, _url: &Url) -> Result<ExtractedArticle> {
        let doc = Html::parse_document(html);
        let chrome = Selector::parse(CHROME_SELECTOR)
            .map_err(|e| SynthError::parse(format!("invalid chrome selector: {e:?}")))?;

        let container = CONTENT_SELECTORS
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .find_map(|sel| doc.select(&sel).next())
            .ok_or_else(|| SynthError::parse("page has no content container"))?;

        let mut content_html = String::new();
        write_without_chrome(container, &chrome, &mut content_html);

        let text = contentsynth_markdown::html_to_markdown(&content_html)?;
        if text.trim().is_empty() {
            return Err(SynthError::EmptyContent(
                "article container is empty".to_string(),
            ));
        }

        Ok(ExtractedArticle {
            text,
            site_name: site_name(&doc),
        })
    }

    fn name(&self) -> &str {
        "readability"
    }
}

fn site_name(doc: &Html) -> Option<String> {
    SITE_NAME_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|sel| doc.select(&sel).next())
        .filter_map(|el| el.value().attr("content"))
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
}

/// Serialize the children of `el` as HTML, skipping every element that
/// matches `chrome` along with its subtree.
fn write_without_chrome(el: ElementRef<'_>, chrome: &Selector, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(&escape_html(text, false));
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        if chrome.matches(&child_el) {
            continue;
        }

        let name = child_el.value().name();
        out.push('<');
        out.push_str(name);
        for (attr, value) in child_el.value().attrs() {
            out.push_str(&format!(" {attr}=\"{}\"", escape_html(value, true)));
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&name) {
            continue;
        }
        write_without_chrome(child_el, chrome, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn escape_html(s: &str, in_attr: bool) -> String {
    let escaped = s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;");
    if in_attr {
        escaped.replace('"', "&quot;")
    } else {
        escaped
    }
}

/// Plain text of a page's `<body>` (or the whole document when there is none),
/// with runs of whitespace collapsed.
pub fn body_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let root_text: Vec<&str> = match Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
    {
        Some(body) => body.text().collect(),
        None => doc.root_element().text().collect(),
    };

    root_text
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://blog.example.com/post").unwrap()
    }

    #[test]
    fn extracts_article_and_site_name() {
        let html = r#"<html><head><meta property="og:site_name" content="Example Blog"></head>
            <body><nav>Menu</nav><article><h1>Post</h1><p>Deep thoughts.</p></article>
            <footer>Footer text</footer></body></html>"#;
        let article = ReadabilityExtractor.extract(html, &url()).unwrap();
        assert!(article.text.contains("Deep thoughts."));
        assert!(!article.text.contains("Menu"));
        assert_eq!(article.site_name.as_deref(), Some("Example Blog"));
    }

    #[test]
    fn falls_back_to_body_container() {
        let html = "<html><body><p>Just a body.</p></body></html>";
        let article = ReadabilityExtractor.extract(html, &url()).unwrap();
        assert_eq!(article.text, "Just a body.");
        assert!(article.site_name.is_none());
    }

    #[test]
    fn chrome_inside_main_is_removed() {
        let html = r#"<html><body><main><aside>Related links</aside><p>Core.</p></main></body></html>"#;
        let article = ReadabilityExtractor.extract(html, &url()).unwrap();
        assert!(article.text.contains("Core."));
        assert!(!article.text.contains("Related"));
    }

    #[test]
    fn chrome_is_removed_regardless_of_source_formatting() {
        let html = "<html><body><article><nav class='top' data-x=a>Menu &amp; more<br></nav>\
            <p>Kept &lt;text&gt;.</p><footer id=f>Site footer</footer></article></body></html>";
        let article = ReadabilityExtractor.extract(html, &url()).unwrap();
        assert!(article.text.contains("Kept"));
        assert!(!article.text.contains("Menu"));
        assert!(!article.text.contains("Site footer"));
    }

    #[test]
    fn nested_markup_survives_serialization() {
        let html = r#"<html><body><main><h2>Setup</h2><p>Use <a href="https://x.dev/?a=1&amp;b=2">the docs</a>.<img src="i.png"></p>
            <div class="sidebar"><p>Ads</p></div><ul><li>one</li><li>two</li></ul></main></body></html>"#;
        let article = ReadabilityExtractor.extract(html, &url()).unwrap();
        assert!(article.text.contains("Setup"));
        assert!(article.text.contains("the docs"));
        assert!(article.text.contains("https://x.dev/?a=1&b=2"));
        assert!(article.text.contains("one"));
        assert!(article.text.contains("two"));
        assert!(!article.text.contains("Ads"));
    }

    #[test]
    fn empty_article_is_an_error() {
        let html = "<html><body><article><script>x()</script></article></body></html>";
        assert!(ReadabilityExtractor.extract(html, &url()).is_err());
    }

    #[test]
    fn body_text_collapses_whitespace() {
        let html = "<html><body><h1>Title</h1>\n\n<p>Some   text</p></body></html>";
        assert_eq!(body_text(html), "Title Some text");
    }
}
