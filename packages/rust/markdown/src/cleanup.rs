//! Cleanup passes applied to Markdown extracted from web pages.
//!
//! The output feeds a language model, not a renderer, so the passes favour
//! compact plain text: images become their alt text, stray tags go, and blank
//! runs collapse.

use std::sync::LazyLock;

use regex::Regex;

/// Run every pass in order on raw `htmd` output.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = fix_code_block_languages(&result);
    result = inline_images(&result);
    result = strip_leftover_html(&result);
    result = normalize_whitespace(&result);
    result = collapse_blank_lines(&result);

    result.trim().to_string()
}

/// Rewrite fences such as ```` ```language-js ```` to ```` ```js ````.
fn fix_code_block_languages(md: &str) -> String {
    static LANG_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^```(?:language-|lang-|highlight-)(\w+)").expect("valid regex")
    });

    LANG_PREFIX_RE.replace_all(md, "```$1").to_string()
}

/// Replace `![alt](src)` with `alt`, dropping images that have no alt text.
fn inline_images(md: &str) -> String {
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

    map_outside_fences(md, |line| IMAGE_RE.replace_all(line, "$1").to_string())
}

/// Remove layout tags that survived conversion, keeping their inner text.
fn strip_leftover_html(md: &str) -> String {
    static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"</?(?:div|span|section|article|aside|header|footer|figure|figcaption|details|summary|picture|source)(?:\s[^>]*)?/?>",
        )
        .expect("valid regex")
    });

    map_outside_fences(md, |line| HTML_TAG_RE.replace_all(line, "").to_string())
}

/// Trim trailing whitespace on every line.
fn normalize_whitespace(md: &str) -> String {
    md.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of blank lines into a single blank line.
fn collapse_blank_lines(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(md, "\n\n").to_string()
}

/// Apply `f` to every line that is not inside a fenced code block.
fn map_outside_fences(md: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;

    for line in md.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            out.push(line.to_string());
        } else if in_fence {
            out.push(line.to_string());
        } else {
            out.push(f(line));
        }
    }

    out.join("\n")
}
