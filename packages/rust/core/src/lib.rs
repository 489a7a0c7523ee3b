//! Session state and workflow orchestration for ContentSynth.
//!
//! This crate ties ingestion, the model adapters, and the skeleton editor
//! together behind one explicit state container ([`Session`]) that front ends
//! render and mutate, and a [`ProcessController`] that runs one monitored
//! background process at a time.

pub mod drag;
pub mod export;
pub mod process;
pub mod session;
pub mod skeleton;
pub mod workflow;

pub use drag::DragState;
pub use export::{ExportMeta, article_document, write_article};
pub use process::{DEFAULT_TICK, ProcessController, ProcessEvent, TaskReporter};
pub use session::{
    Article, DECONSTRUCTING_MESSAGE, DEFAULT_PAUSE_AFTER_SECS, FETCHING_MESSAGE, ProcessKind,
    ProcessMonitor, SYNTHESIZING_MESSAGE, Session, TaskOutcome, View,
};
pub use skeleton::Skeleton;
pub use workflow::{SourceInput, Workflows, ingest, ingest_and_deconstruct, synthesize};
