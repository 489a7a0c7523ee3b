//! Writing finished articles to disk.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use contentsynth_shared::{RewriteOptions, Result, SynthError};

use crate::session::{Article, Session};

/// Provenance written into the article frontmatter.
#[derive(Debug, Clone)]
pub struct ExportMeta {
    pub source_label: Option<String>,
    pub options: RewriteOptions,
    pub generated_at: DateTime<Utc>,
}

impl ExportMeta {
    /// Metadata for the session's current article, stamped now.
    pub fn from_session(session: &Session) -> Self {
        Self {
            source_label: session.source_label().map(str::to_string),
            options: session.options(),
            generated_at: Utc::now(),
        }
    }

    /// File name like `article-20261016-093000.md`.
    pub fn default_file_name(&self) -> String {
        format!("article-{}.md", self.generated_at.format("%Y%m%d-%H%M%S"))
    }
}

/// The article as a Markdown document with YAML frontmatter.
pub fn article_document(article: &Article, meta: &ExportMeta) -> String {
    format!("{}\n{}\n", build_frontmatter(meta), article.markdown.trim_end())
}

/// Write `article` to `path`.
///
/// `.html`/`.htm` targets get a standalone page around the sanitized HTML;
/// anything else gets the Markdown document.
pub fn write_article(path: &Path, article: &Article, meta: &ExportMeta) -> Result<()> {
    let is_html = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| e == "html" || e == "htm");

    let body = if is_html {
        html_document(article, meta)
    } else {
        article_document(article, meta)
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SynthError::io(parent, e))?;
    }
    std::fs::write(path, body).map_err(|e| SynthError::io(path, e))?;

    info!(path = %path.display(), html = is_html, "article exported");
    Ok(())
}

fn build_frontmatter(meta: &ExportMeta) -> String {
    let mut fm = String::from("---\n");
    if let Some(label) = &meta.source_label {
        fm.push_str(&format!("source: \"{}\"\n", escape_yaml_string(label)));
    }
    fm.push_str(&format!("channel: \"{}\"\n", meta.options.channel));
    fm.push_str(&format!("voice: \"{}\"\n", meta.options.voice));
    fm.push_str(&format!("generated_at: \"{}\"\n", meta.generated_at.to_rfc3339()));
    fm.push_str("---\n");
    debug!(len = fm.len(), "frontmatter built");
    fm
}

fn html_document(article: &Article, meta: &ExportMeta) -> String {
    let title = meta
        .source_label
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "Article".to_string());
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"generator\" content=\"contentsynth\">\n\
         <title>{title}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        article.html
    )
}

fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
