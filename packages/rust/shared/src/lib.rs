//! Shared types, error model, and configuration for ContentSynth.
//!
//! This crate is the foundation depended on by all other ContentSynth crates.
//! It provides:
//! - [`SynthError`], the unified error type
//! - Domain types ([`InsightBlock`], [`Channel`], [`Voice`], [`SourceContent`])
//! - Configuration ([`AppConfig`], config loading, API key resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GeminiConfig, ProcessConfig, ProxyConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, SynthError};
pub use types::{
    BlockCategory, Channel, InsightBlock, InsightDraft, MAX_SUMMARY_CHARS, RewriteOptions,
    SourceContent, Voice,
};
