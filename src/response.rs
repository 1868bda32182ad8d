//! Typed results of completion and image calls.
//!
//! A response is either a real server result (`success == true`) or a
//! placeholder synthesized after a failed call, which carries only the
//! caller's echo fields plus the cause in `failure`.

use serde_json::Value;

use crate::client::CallFailure;
use crate::model::{CompletionModel, Lookup};
use crate::request::{CompletionRequest, ImageRequest};

/// One generated completion.
#[derive(Debug, Clone, PartialEq)]
pub struct TextVariation {
    pub content: String,

    /// Position among the variations of one response
    pub index: u32,

    /// Never populated: the service does not return it for these calls.
    pub log_probabilities: Option<Value>,

    /// Why generation stopped, e.g. `stop` or `length`
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of a completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: String,

    /// Wire `object` tag, `text_completion` for real results
    pub object_type: String,

    /// Unix timestamp in seconds
    pub created_at: u64,

    /// Model that produced the result; unknown identifiers are kept verbatim
    pub model: Lookup<CompletionModel>,

    /// In the order the service returned them
    pub variations: Vec<TextVariation>,

    pub usage: ResponseUsage,

    pub user: Option<String>,

    pub success: bool,

    /// Cause of a soft failure; `None` whenever `success` is set
    pub failure: Option<CallFailure>,
}

impl CompletionResponse {
    /// Placeholder for a call that produced no server result.
    pub fn failed(request: &CompletionRequest, failure: CallFailure) -> Self {
        Self {
            id: String::new(),
            object_type: String::new(),
            created_at: 0,
            model: Lookup::Found(request.model),
            variations: Vec::new(),
            usage: ResponseUsage::default(),
            user: request.user.clone(),
            success: false,
            failure: Some(failure),
        }
    }

    /// Content of the first variation, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.variations.first().map(|v| v.content.as_str())
    }
}

/// One generated image. The payload is a URL or a base64 blob depending on
/// the response format of the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub payload: String,
}

/// Result of an image generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResponse {
    /// Unix timestamp in seconds
    pub created_at: u64,

    /// No ordering is promised by the service
    pub images: Vec<GeneratedImage>,

    pub user: Option<String>,

    pub success: bool,

    pub failure: Option<CallFailure>,
}

impl ImageResponse {
    /// Placeholder for a call that produced no server result, stamped with
    /// the local time of failure.
    pub fn failed(request: &ImageRequest, failure: CallFailure) -> Self {
        Self {
            created_at: unix_now(),
            images: Vec::new(),
            user: request.user.clone(),
            success: false,
            failure: Some(failure),
        }
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
