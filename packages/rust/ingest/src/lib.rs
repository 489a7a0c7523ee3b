//! Source ingestion for ContentSynth.
//!
//! Turns a local file or a public URL into a [`SourceContent`]: text plus a
//! short label describing where it came from. Remote pages go through a
//! JSON content proxy; HTML is reduced to its main article, and Jupyter
//! notebooks are flattened to Markdown and fenced code.
//!
//! [`SourceContent`]: contentsynth_shared::SourceContent

mod extract;
mod file;
mod notebook;
mod remote;

pub use extract::{ArticleExtractor, ExtractedArticle, ReadabilityExtractor, body_text};
pub use file::{NOTEBOOK_LABEL, TEXT_FILE_LABEL, guess_mime, parse_file, parse_upload};
pub use notebook::flatten_notebook;
pub use remote::{ContentFetcher, REMOTE_TEXT_LABEL, WEBPAGE_LABEL};
