//! Local file ingestion.

use std::path::Path;

use tracing::{info, instrument};

use contentsynth_shared::{Result, SourceContent, SynthError};

use crate::notebook::flatten_notebook;

/// Label for flattened notebooks, from files or URLs.
pub const NOTEBOOK_LABEL: &str = "Jupyter Notebook";

/// Label for local files with a `text/*` MIME type.
pub const TEXT_FILE_LABEL: &str = "Text File";

/// Read a local file and turn it into [`SourceContent`].
#[instrument(fields(path = %path.display()))]
pub async fn parse_file(path: &Path) -> Result<SourceContent> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SynthError::io(path, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let source = parse_upload(&file_name, guess_mime(&file_name), &bytes);
    info!(label = %source.label, chars = source.content.len(), "file parsed");
    Ok(source)
}

/// Classify an uploaded file by name and MIME type and decode its text.
///
/// Bytes are decoded as UTF-8 with replacement; binary formats are not
/// interpreted, only labelled with their file name.
pub fn parse_upload(file_name: &str, mime: &str, bytes: &[u8]) -> SourceContent {
    let text = String::from_utf8_lossy(bytes).into_owned();

    if file_name.ends_with(".ipynb") {
        SourceContent {
            content: flatten_notebook(&text),
            label: NOTEBOOK_LABEL.to_string(),
        }
    } else if mime.starts_with("text/") {
        SourceContent {
            content: text,
            label: TEXT_FILE_LABEL.to_string(),
        }
    } else {
        SourceContent {
            content: text,
            label: file_name.to_string(),
        }
    }
}

/// Guess a MIME type from a file extension the way browsers report it.
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "html" | "htm" => "text/html",
        "xml" => "text/xml",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "py" => "text/x-python",
        "rst" => "text/x-rst",
        "tex" => "text/x-tex",
        "json" | "ipynb" => "application/json",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
