//! Markdown conversion in both directions.
//!
//! - [`html_to_markdown`]: web page HTML → compact Markdown text (via `htmd`),
//!   used when extracting article bodies for the model.
//! - [`render_markdown`]: Markdown → sanitized HTML (via `pulldown-cmark`),
//!   used to display and export synthesized articles.
//! - [`terminal_lines`]: Markdown → styled line list for terminal display.

mod cleanup;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use contentsynth_shared::{Result, SynthError};

/// Tags whose content never belongs in extracted article text.
const SKIP_TAGS: [&str; 10] = [
    "script", "style", "nav", "iframe", "noscript", "svg", "header", "footer", "aside", "form",
];

/// URL schemes neutralised in rendered links and images.
const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

// ---------------------------------------------------------------------------
// HTML → Markdown
// ---------------------------------------------------------------------------

/// Convert an HTML fragment or document to cleaned-up Markdown text.
#[instrument(skip(html), fields(html_len = html.len()))]
pub fn html_to_markdown(html: &str) -> Result<String> {
    let html = tables_to_markdown(html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();

    let raw = converter
        .convert(&html)
        .map_err(|e| SynthError::Conversion(format!("htmd conversion failed: {e}")))?;

    let cleaned = cleanup::run_pipeline(&raw);
    debug!(raw_len = raw.len(), cleaned_len = cleaned.len(), "html converted");

    Ok(cleaned)
}

/// Replace `<table>` elements with Markdown tables before `htmd` runs.
///
/// `htmd` 0.1 flattens tables into run-on text.
fn tables_to_markdown(html: &str) -> String {
    let Ok(table_sel) = Selector::parse("table") else {
        return html.to_string();
    };

    let doc = Html::parse_fragment(html);
    let mut result = html.to_string();

    for table in doc.select(&table_sel) {
        let markdown = table_markdown(&table);
        result = result.replacen(&table.html(), &markdown, 1);
    }

    result
}

fn table_markdown(table: &ElementRef) -> String {
    let (Ok(tr_sel), Ok(cell_sel)) = (Selector::parse("tr"), Selector::parse("th, td")) else {
        return String::new();
    };

    let rows: Vec<Vec<String>> = table
        .select(&tr_sel)
        .map(|tr| {
            tr.select(&cell_sel)
                .map(|cell| cell.text().collect::<String>().trim().replace('|', "\\|"))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let line = |cells: &[String]| {
        let mut padded = cells.to_vec();
        padded.resize(width, String::new());
        format!("| {} |", padded.join(" | "))
    };

    let mut md = vec![String::new(), line(&rows[0])];
    md.push(format!("|{}", " --- |".repeat(width)));
    md.extend(rows[1..].iter().map(|row| line(row)));
    md.push(String::new());

    // Wrap in <p> so htmd keeps the block separate from neighbours.
    format!("<p>{}</p>", md.join("<br>"))
}

// ---------------------------------------------------------------------------
// Markdown → HTML
// ---------------------------------------------------------------------------

fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render Markdown to HTML with raw HTML escaped and unsafe URLs removed.
pub fn render_markdown(markdown: &str) -> String {
    let events = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lowered = url.trim().to_ascii_lowercase();
    if UNSAFE_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

// ---------------------------------------------------------------------------
// Markdown → terminal lines
// ---------------------------------------------------------------------------

/// Kind of a rendered terminal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Heading with its level (1–6).
    Heading(u8),
    Paragraph,
    ListItem,
    Quote,
    Code,
    Blank,
}

/// One display line produced by [`terminal_lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub kind: LineKind,
    pub text: String,
}

/// Flatten Markdown into display lines, one per block (code blocks keep their lines).
pub fn terminal_lines(markdown: &str) -> Vec<TerminalLine> {
    let mut lines: Vec<TerminalLine> = Vec::new();
    let mut current = String::new();
    let mut kind = LineKind::Paragraph;
    let mut list_depth = 0usize;
    let mut quote_depth = 0usize;

    let flush = |lines: &mut Vec<TerminalLine>, current: &mut String, kind: LineKind| {
        if !current.trim().is_empty() {
            lines.push(TerminalLine {
                kind,
                text: current.trim_end().to_string(),
            });
            if !matches!(kind, LineKind::ListItem) {
                lines.push(TerminalLine {
                    kind: LineKind::Blank,
                    text: String::new(),
                });
            }
        }
        current.clear();
    };

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(&mut lines, &mut current, kind);
                kind = LineKind::Heading(heading_number(level));
            }
            Event::Start(Tag::Item) => {
                flush(&mut lines, &mut current, kind);
                kind = LineKind::ListItem;
                current.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                current.push_str("• ");
            }
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                flush(&mut lines, &mut current, kind);
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    lines.push(TerminalLine {
                        kind: LineKind::Blank,
                        text: String::new(),
                    });
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                flush(&mut lines, &mut current, kind);
                quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                flush(&mut lines, &mut current, kind);
                quote_depth = quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::Paragraph) => {
                if kind != LineKind::ListItem {
                    flush(&mut lines, &mut current, kind);
                    kind = if quote_depth > 0 {
                        LineKind::Quote
                    } else {
                        LineKind::Paragraph
                    };
                } else if !current.ends_with("• ") {
                    current.push(' ');
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if kind != LineKind::ListItem {
                    flush(&mut lines, &mut current, kind);
                    kind = LineKind::Paragraph;
                }
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Item) => {
                flush(&mut lines, &mut current, kind);
                kind = LineKind::Paragraph;
            }
            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut lines, &mut current, kind);
                kind = LineKind::Code;
            }
            Event::End(TagEnd::CodeBlock) => {
                for code_line in current.trim_end_matches('\n').lines() {
                    lines.push(TerminalLine {
                        kind: LineKind::Code,
                        text: code_line.to_string(),
                    });
                }
                lines.push(TerminalLine {
                    kind: LineKind::Blank,
                    text: String::new(),
                });
                current.clear();
                kind = LineKind::Paragraph;
            }
            Event::Text(text) | Event::Code(text) => current.push_str(&text),
            Event::Html(text) | Event::InlineHtml(text) => current.push_str(&text),
            Event::SoftBreak => current.push(' '),
            Event::HardBreak => current.push(' '),
            Event::TaskListMarker(done) => current.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }
    flush(&mut lines, &mut current, kind);

    while lines.last().is_some_and(|l| l.kind == LineKind::Blank) {
        lines.pop();
    }
    lines
}

fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_simple_article() {
        let html = "<article><h1>Hello World</h1><p>Some <strong>bold</strong> text.</p></article>";
        let md = html_to_markdown(html).unwrap();
        assert!(md.contains("# Hello World"));
        assert!(md.contains("**bold**"));
    }

    #[test]
    fn skips_scripts_and_navigation() {
        let html = r#"<body>
            <nav><a href="/">Home</a></nav>
            <p>Important text.</p>
            <script>alert(1)</script>
            <footer>Copyright 2024</footer>
        </body>"#;
        let md = html_to_markdown(html).unwrap();
        assert!(md.contains("Important text."));
        assert!(!md.contains("alert"));
        assert!(!md.contains("Copyright"));
    }

    #[test]
    fn preserves_code_blocks() {
        let html = r#"<pre><code class="language-rust">fn main() {}</code></pre>"#;
        let md = html_to_markdown(html).unwrap();
        assert!(md.contains("```"));
        assert!(md.contains("fn main() {}"));
    }

    #[test]
    fn tables_keep_one_row_per_line() {
        let html = r#"<table>
            <tr><th>Name</th><th>Value</th></tr>
            <tr><td>foo</td><td>bar</td></tr>
        </table>"#;
        let md = html_to_markdown(html).unwrap();
        let header = md.lines().find(|l| l.contains("Name")).expect("header row");
        let row = md.lines().find(|l| l.contains("foo")).expect("data row");
        assert!(header.contains("Value"));
        assert!(row.contains("bar"));
        assert_ne!(header, row);
    }

    #[test]
    fn renders_headings_and_lists() {
        let html = render_markdown("# Title\n\n- one\n- two\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_markdown("Hello <script>alert('x')</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn javascript_links_are_neutralised() {
        let html = render_markdown("[click](javascript:alert(1)) and [ok](https://example.com)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn terminal_lines_mark_structure() {
        let lines = terminal_lines("# Title\n\nIntro text\nwraps here.\n\n- a\n- b\n\n```\nx = 1\n```\n");
        assert_eq!(lines[0].kind, LineKind::Heading(1));
        assert_eq!(lines[0].text, "Title");
        assert!(lines.iter().any(|l| l.kind == LineKind::Paragraph && l.text == "Intro text wraps here."));
        assert!(lines.iter().any(|l| l.kind == LineKind::ListItem && l.text == "• a"));
        assert!(lines.iter().any(|l| l.kind == LineKind::Code && l.text == "x = 1"));
        assert_ne!(lines.last().map(|l| l.kind), Some(LineKind::Blank));
    }
}
