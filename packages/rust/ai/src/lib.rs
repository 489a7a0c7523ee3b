//! Generative-model adapters for ContentSynth.
//!
//! Two stateless operations, each a single schema-constrained round trip:
//! - [`deconstruct_content`] splits source text into [`InsightBlock`]s
//! - [`rewrite_article`] turns an ordered skeleton into a Markdown article
//!
//! The model itself sits behind [`GenerativeModel`]; [`GeminiClient`] is the
//! production implementation. Failures are logged with their cause and
//! surfaced to callers as one generic message per operation.

mod gemini;
mod model;
mod prompt;
mod schema;

use serde::Deserialize;
use tracing::{error, info, instrument};

use contentsynth_shared::{InsightBlock, InsightDraft, Result, RewriteOptions, SynthError};

pub use gemini::GeminiClient;
pub use model::{GenerationRequest, GenerativeModel};
pub use schema::{article_schema, insight_blocks_schema};

/// Message shown when deconstruction fails for any reason.
pub const DECONSTRUCT_FAILED: &str =
    "The AI failed to process the content. The content might be too complex or the format unsupported.";

/// Message shown when rewriting fails for any reason.
pub const REWRITE_FAILED: &str = "The AI failed to rewrite the article.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleResponse {
    article_content: String,
}

/// Split `content` into insight blocks.
///
/// Every returned block gets a fresh local id, a confidence clamped to
/// `[0, 1]`, and normalised tags.
#[instrument(skip_all, fields(model = model.model_name(), source = source_label))]
pub async fn deconstruct_content<M: GenerativeModel>(
    model: &M,
    content: &str,
    source_label: &str,
    thinking_budget: Option<u32>,
) -> Result<Vec<InsightBlock>> {
    let request = GenerationRequest {
        prompt: prompt::deconstruct_prompt(content, source_label),
        system_instruction: prompt::DECONSTRUCT_INSTRUCTION.to_string(),
        response_schema: insight_blocks_schema(),
        thinking_budget,
    };

    let blocks = model
        .generate_json(&request)
        .await
        .and_then(|text| parse_blocks(&text))
        .map_err(|e| {
            error!(error = %e, "deconstruction failed");
            SynthError::Ai(DECONSTRUCT_FAILED.to_string())
        })?;

    info!(blocks = blocks.len(), "content deconstructed");
    Ok(blocks)
}

/// Rewrite `blocks`, in order, into a Markdown article.
#[instrument(skip_all, fields(model = model.model_name(), blocks = blocks.len(), channel = %options.channel, voice = %options.voice))]
pub async fn rewrite_article<M: GenerativeModel>(
    model: &M,
    blocks: &[InsightBlock],
    options: &RewriteOptions,
) -> Result<String> {
    let outcome = async {
        let request = GenerationRequest {
            prompt: prompt::rewrite_prompt(blocks, options)?,
            system_instruction: prompt::REWRITE_INSTRUCTION.to_string(),
            response_schema: article_schema(),
            thinking_budget: None,
        };
        let text = model.generate_json(&request).await?;
        parse_article(&text)
    }
    .await;

    let article = outcome.map_err(|e| {
        error!(error = %e, "rewrite failed");
        SynthError::Ai(REWRITE_FAILED.to_string())
    })?;

    info!(chars = article.len(), "article synthesized");
    Ok(article)
}

fn parse_blocks(text: &str) -> Result<Vec<InsightBlock>> {
    let drafts: Vec<InsightDraft> = serde_json::from_str(text.trim())
        .map_err(|e| SynthError::Ai(format!("model answer is not a block array: {e}")))?;
    Ok(drafts.into_iter().map(InsightDraft::into_block).collect())
}

fn parse_article(text: &str) -> Result<String> {
    let response: ArticleResponse = serde_json::from_str(text.trim())
        .map_err(|e| SynthError::Ai(format!("model answer is not an article object: {e}")))?;
    Ok(response.article_content)
}
