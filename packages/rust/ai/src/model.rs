//! The generative-model seam.

use std::future::Future;

use serde_json::Value;

use contentsynth_shared::Result;

/// One schema-constrained generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// User prompt text.
    pub prompt: String,
    /// System instruction describing the task.
    pub system_instruction: String,
    /// Output schema the model must follow (OpenAPI-subset JSON).
    pub response_schema: Value,
    /// Thinking token budget; `None` leaves the model default.
    pub thinking_budget: Option<u32>,
}

/// A hosted model that answers with JSON text matching a schema.
///
/// Implementations make exactly one round trip per call and never retry.
pub trait GenerativeModel: Send + Sync {
    /// Send the request and return the raw JSON text of the answer.
    fn generate_json(&self, req: &GenerationRequest)
    -> impl Future<Output = Result<String>> + Send;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
