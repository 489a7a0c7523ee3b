//! Prompt and system-instruction text.

use contentsynth_shared::{InsightBlock, RewriteOptions, Result, SynthError};

pub(crate) const DECONSTRUCT_INSTRUCTION: &str = "You are an analyst of technical and \
editorial content. Split the supplied material (a notebook, an article, a web page or a \
plain document) into distinct insight blocks, each a self-contained unit of meaning. \
Read prose, code and outputs alike. Give particular attention to passages that state the \
core problem, describe the method, or discuss limitations and weaknesses of the approach \
or its results. Return every block in the structured JSON format requested.";

pub(crate) const REWRITE_INSTRUCTION: &str = "You are a writer and editor. Turn the \
supplied JSON content blocks into one coherent, well-structured article. Do not list the \
blocks or reuse their type labels as headings; connect them into a continuous narrative \
with natural headings and subheadings where they help the reader. Respond with a single \
JSON object whose articleContent field holds the finished article in Markdown.";

/// User prompt for deconstruction.
pub(crate) fn deconstruct_prompt(content: &str, source_label: &str) -> String {
    format!(
        "Content from a {source_label}:\n---\n{content}\n---\n\
         Deconstruct this content and respond only with a JSON array of insight block objects."
    )
}

/// User prompt for rewriting; blocks are serialised in skeleton order.
pub(crate) fn rewrite_prompt(blocks: &[InsightBlock], options: &RewriteOptions) -> Result<String> {
    let blocks_json = serde_json::to_string(blocks)
        .map_err(|e| SynthError::Ai(format!("failed to serialise blocks: {e}")))?;

    Ok(format!(
        "**Target Channel:** {}\n**Target Voice:** {}\n\n\
         Synthesize these JSON blocks into a complete article:\n---\n{blocks_json}\n---",
        options.channel, options.voice
    ))
}
