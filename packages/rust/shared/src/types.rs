//! Core domain types for ContentSynth sessions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of an insight summary, in characters.
pub const MAX_SUMMARY_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// InsightBlock
// ---------------------------------------------------------------------------

/// One AI-identified unit of meaning extracted from source content.
///
/// Blocks are immutable once created; the skeleton refers to them by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightBlock {
    /// Locally generated unique identifier.
    pub id: String,
    /// Free-form category label chosen by the model (e.g. "Methodology").
    #[serde(rename = "type")]
    pub kind: String,
    /// Original text of the block.
    pub content: String,
    /// Short summary, at most [`MAX_SUMMARY_CHARS`] characters.
    pub summary: String,
    /// Lowercase, de-duplicated tags.
    pub tags: Vec<String>,
    /// Model confidence in `[0, 1]`.
    pub confidence_score: f64,
}

impl InsightBlock {
    /// Confidence as a whole percentage, for display.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence_score.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Display category derived from the block's type label.
    pub fn category(&self) -> BlockCategory {
        BlockCategory::from_label(&self.kind)
    }
}

/// An insight block as the model returns it: no id, fields possibly missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub confidence_score: f64,
}

impl InsightDraft {
    /// Assign a fresh id and normalise the fields into a valid [`InsightBlock`].
    pub fn into_block(self) -> InsightBlock {
        let confidence_score = if self.confidence_score.is_nan() {
            0.0
        } else {
            self.confidence_score.clamp(0.0, 1.0)
        };

        let summary = if self.summary.chars().count() > MAX_SUMMARY_CHARS {
            self.summary.chars().take(MAX_SUMMARY_CHARS).collect()
        } else {
            self.summary
        };

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        InsightBlock {
            id: Uuid::new_v4().to_string(),
            kind: self.kind,
            content: self.content,
            summary,
            tags,
            confidence_score,
        }
    }
}

// ---------------------------------------------------------------------------
// BlockCategory
// ---------------------------------------------------------------------------

/// Coarse grouping of block type labels, used for badge colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCategory {
    Title,
    Outcome,
    Code,
    Metric,
    Hypothesis,
    Limitation,
    Other,
}

impl BlockCategory {
    /// Classify a type label by case-insensitive substring match.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("title") {
            Self::Title
        } else if lower.contains("conclusion") || lower.contains("result") {
            Self::Outcome
        } else if lower.contains("code") {
            Self::Code
        } else if lower.contains("kpi") || lower.contains("metric") {
            Self::Metric
        } else if lower.contains("hypothesis") {
            Self::Hypothesis
        } else if lower.contains("limitation") {
            Self::Limitation
        } else {
            Self::Other
        }
    }
}

// ---------------------------------------------------------------------------
// Channel / Voice
// ---------------------------------------------------------------------------

/// Target publication format for the rewrite step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[default]
    #[serde(rename = "Blog Post")]
    BlogPost,
    #[serde(rename = "LinkedIn")]
    LinkedIn,
    #[serde(rename = "X.com Post")]
    XPost,
    #[serde(rename = "Technical Paper")]
    TechnicalPaper,
}

impl Channel {
    /// All channels in selector order.
    pub const ALL: [Channel; 4] = [
        Self::BlogPost,
        Self::LinkedIn,
        Self::XPost,
        Self::TechnicalPaper,
    ];

    /// Label sent to the model and shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BlogPost => "Blog Post",
            Self::LinkedIn => "LinkedIn",
            Self::XPost => "X.com Post",
            Self::TechnicalPaper => "Technical Paper",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Self::BlogPost => "blog-post",
            Self::LinkedIn => "linkedin",
            Self::XPost => "x-post",
            Self::TechnicalPaper => "technical-paper",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

/// Target tone for the rewrite step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    #[default]
    Formal,
    Conversational,
    Creative,
    Journalistic,
}

impl Voice {
    /// All voices in selector order.
    pub const ALL: [Voice; 4] = [
        Self::Formal,
        Self::Conversational,
        Self::Creative,
        Self::Journalistic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Formal => "Formal",
            Self::Conversational => "Conversational",
            Self::Creative => "Creative",
            Self::Journalistic => "Journalistic",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Conversational => "conversational",
            Self::Creative => "creative",
            Self::Journalistic => "journalistic",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(needle) || c.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                format!("unknown channel '{s}': expected one of blog-post, linkedin, x-post, technical-paper")
            })
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(needle) || v.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                format!("unknown voice '{s}': expected one of formal, conversational, creative, journalistic")
            })
    }
}

/// Channel and voice selection for a rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOptions {
    pub channel: Channel,
    pub voice: Voice,
}

// ---------------------------------------------------------------------------
// SourceContent
// ---------------------------------------------------------------------------

/// Uniform result of ingesting a file or URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContent {
    /// Text handed to the model.
    pub content: String,
    /// Human-readable source type label (e.g. "Jupyter Notebook").
    pub label: String,
}
