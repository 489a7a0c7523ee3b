//! TUI screens.
//!
//! The active screen follows the session's view. Screens edit the skeleton
//! directly and hand process-level requests back to the app as [`Action`]s.

mod article;
mod insights;
mod progress;
mod start;

use std::path::PathBuf;

pub(crate) use article::ArticleScreen;
pub(crate) use insights::InsightsScreen;
pub(crate) use progress::ProgressScreen;
pub(crate) use start::StartScreen;

/// Requests a screen makes of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    FetchUrl(String),
    LoadFile(PathBuf),
    Stop,
    Continue,
    Synthesize,
    StartOver,
    Export,
    Status(String),
}
