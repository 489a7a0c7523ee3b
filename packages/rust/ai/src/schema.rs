//! Response schemas sent with each request.

use serde_json::{Value, json};

/// Schema for deconstruction: an array of insight-block objects without ids.
pub fn insight_blocks_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "type": {
                    "type": "STRING",
                    "description": "Category of the block, for example \"Problem Statement\", \"Methodology\", \"Code Snippet\", \"Result\", \"Limitation\", \"Hypothesis\", \"Metric\" or \"Conclusion\"."
                },
                "content": {
                    "type": "STRING",
                    "description": "The original plain-text content of the block, including any code."
                },
                "summary": {
                    "type": "STRING",
                    "description": "A concise summary of the block, at most 500 characters."
                },
                "tags": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Three to five lowercase tags for filtering."
                },
                "confidenceScore": {
                    "type": "NUMBER",
                    "description": "Confidence from 0.0 to 1.0 that this is a distinct, valuable insight."
                }
            }
        }
    })
}

/// Schema for rewriting: one object holding the Markdown article.
pub fn article_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "articleContent": {
                "type": "STRING",
                "description": "The complete article in Markdown, with headings and paragraphs."
            }
        },
        "required": ["articleContent"]
    })
}
