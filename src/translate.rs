//! Conversion between request/response models and the service's JSON.
//!
//! Pure and synchronous. Wire keys differ from the model field names
//! (`max_length` is `max_tokens`, `variation_count` is `n`, ...), and absent
//! optional fields are omitted rather than sent as `null`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::model::{CompletionModel, ResponseFormat};
use crate::request::{CompletionRequest, ImageRequest};
use crate::response::{
    CompletionResponse, GeneratedImage, ImageResponse, ResponseUsage, TextVariation,
};

/// Errors raised while translating to or from wire JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

pub fn encode_completion_request(request: &CompletionRequest) -> Result<Vec<u8>, TranslationError> {
    serde_json::to_vec(&WireCompletionRequest::from(request))
        .map_err(|e| TranslationError::Encode(e.to_string()))
}

pub fn encode_image_request(request: &ImageRequest) -> Result<Vec<u8>, TranslationError> {
    serde_json::to_vec(&WireImageRequest::from(request))
        .map_err(|e| TranslationError::Encode(e.to_string()))
}

/// Decode a successful completion body.
pub fn decode_completion_response(body: &[u8]) -> Result<CompletionResponse, TranslationError> {
    let wire: WireCompletionResponse = serde_json::from_slice(body)
        .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;
    trace!(id = %wire.id, choices = wire.choices.len(), "decoded completion response");
    Ok(wire.into())
}

/// Decode a successful image body. Each datum's payload is read from the key
/// named by `format`, since the payload itself does not say what it is.
pub fn decode_image_response(
    body: &[u8],
    format: ResponseFormat,
) -> Result<ImageResponse, TranslationError> {
    let wire: WireImageResponse = serde_json::from_slice(body)
        .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;
    trace!(images = wire.data.len(), %format, "decoded image response");

    let images = wire
        .data
        .into_iter()
        .enumerate()
        .map(|(i, datum)| {
            let payload = match format {
                ResponseFormat::Url => datum.url,
                ResponseFormat::Base64 => datum.b64_json,
            };
            payload
                .map(|payload| GeneratedImage { payload })
                .ok_or_else(|| {
                    TranslationError::MalformedResponse(format!(
                        "missing field `{}` in data[{}]",
                        format.as_str(),
                        i
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImageResponse {
        created_at: wire.created,
        images,
        user: wire.user,
        success: true,
        failure: None,
    })
}

impl<'a> From<&'a CompletionRequest> for WireCompletionRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        WireCompletionRequest {
            model: request.model.as_str(),
            prompt: &request.prompt,
            max_tokens: request.max_length,
            temperature: request.creativity,
            n: request.variation_count,
            user: request.user.as_deref(),
        }
    }
}

impl<'a> From<&'a ImageRequest> for WireImageRequest<'a> {
    fn from(request: &'a ImageRequest) -> Self {
        WireImageRequest {
            prompt: &request.description,
            n: request.image_count,
            size: request.size.as_str(),
            response_format: request.response_format.as_str(),
            user: request.user.as_deref(),
        }
    }
}

impl From<WireCompletionResponse> for CompletionResponse {
    fn from(wire: WireCompletionResponse) -> Self {
        CompletionResponse {
            id: wire.id,
            object_type: wire.object,
            created_at: wire.created,
            model: CompletionModel::lookup(&wire.model),
            variations: wire.choices.into_iter().map(|c| c.into()).collect(),
            usage: wire.usage.into(),
            user: wire.user,
            success: true,
            failure: None,
        }
    }
}

impl From<WireChoice> for TextVariation {
    fn from(choice: WireChoice) -> Self {
        TextVariation {
            content: choice.text,
            index: choice.index,
            log_probabilities: None,
            finish_reason: choice.finish_reason,
        }
    }
}

impl From<WireUsage> for ResponseUsage {
    fn from(u: WireUsage) -> Self {
        ResponseUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

// --- Wire Request Types ---

#[derive(Debug, Serialize)]
struct WireCompletionRequest<'a> {
    model: &'static str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireImageRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'static str,
    response_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

// --- Wire Response Types ---

#[derive(Debug, Deserialize)]
struct WireCompletionResponse {
    id: String,
    object: String,
    created: u64,
    model: String,
    choices: Vec<WireChoice>,
    usage: WireUsage,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    text: String,
    index: u32,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Copy, Clone, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireImageResponse {
    created: u64,
    data: Vec<WireImageDatum>,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireImageDatum {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageSize, Lookup};
    use serde_json::json;

    fn completion_body(model: &str, choices: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "cmpl-123",
            "object": "text_completion",
            "created": 1_672_531_200u64,
            "model": model,
            "choices": choices,
            "usage": { "prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12 }
        }))
        .unwrap()
    }

    #[test]
    fn test_encode_completion_request() {
        let request = CompletionRequest::new("Hello")
            .with_model(CompletionModel::Davinci)
            .with_creativity(0.5)
            .with_max_length(16)
            .with_variation_count(2);

        let body = encode_completion_request(&request).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"model":"text-davinci-003","prompt":"Hello","max_tokens":16,"temperature":0.5,"n":2}"#
        );
    }

    #[test]
    fn test_encode_completion_request_with_user() {
        let request = CompletionRequest::new("Hi").with_user("user-7");
        let value: serde_json::Value =
            serde_json::from_slice(&encode_completion_request(&request).unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "model": "text-davinci-003",
                "prompt": "Hi",
                "max_tokens": 128,
                "temperature": 0.0,
                "n": 1,
                "user": "user-7"
            })
        );
    }

    #[test]
    fn test_encode_image_request() {
        let request = ImageRequest::new("a cat")
            .with_size(ImageSize::Large)
            .with_response_format(ResponseFormat::Base64);

        let body = encode_image_request(&request).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"prompt":"a cat","n":1,"size":"1024x1024","response_format":"b64_json"}"#
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let request = CompletionRequest::new("Hello")
            .with_creativity(0.7)
            .with_user("u");
        assert_eq!(request.to_json().unwrap(), request.to_json().unwrap());

        let image = ImageRequest::new("a dog").with_user("u");
        assert_eq!(image.to_json().unwrap(), image.to_json().unwrap());
    }

    #[test]
    fn test_numbers_are_not_strings() {
        let request = CompletionRequest::new("x").with_max_length(64);
        let value: serde_json::Value =
            serde_json::from_slice(&request.to_json().unwrap()).unwrap();
        assert!(value["max_tokens"].is_u64());
        assert!(value["n"].is_u64());
        assert!(value["temperature"].is_f64());
    }

    #[test]
    fn test_decode_completion_response() {
        let body = completion_body(
            "text-davinci-003",
            json!([
                { "text": "first", "index": 0, "logprobs": null, "finish_reason": "stop" },
                { "text": "second", "index": 1, "logprobs": null, "finish_reason": "length" }
            ]),
        );

        let response = decode_completion_response(&body).unwrap();
        assert!(response.success);
        assert_eq!(response.failure, None);
        assert_eq!(response.id, "cmpl-123");
        assert_eq!(response.object_type, "text_completion");
        assert_eq!(response.created_at, 1_672_531_200);
        assert_eq!(response.model, Lookup::Found(CompletionModel::Davinci));
        assert_eq!(response.user, None);
        assert_eq!(
            response.usage,
            ResponseUsage { prompt_tokens: 5, completion_tokens: 7, total_tokens: 12 }
        );

        let contents: Vec<_> = response.variations.iter().map(|v| v.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(response.variations[1].index, 1);
        assert_eq!(response.variations[1].finish_reason.as_deref(), Some("length"));
        assert!(response.variations.iter().all(|v| v.log_probabilities.is_none()));
    }

    #[test]
    fn test_decode_keeps_server_order() {
        let body = completion_body(
            "text-ada-001",
            json!([
                { "text": "b", "index": 1, "finish_reason": "stop" },
                { "text": "a", "index": 0, "finish_reason": "stop" }
            ]),
        );
        let response = decode_completion_response(&body).unwrap();
        let indexes: Vec<_> = response.variations.iter().map(|v| v.index).collect();
        assert_eq!(indexes, [1, 0]);
    }

    #[test]
    fn test_decode_empty_choices() {
        let body = completion_body("text-davinci-003", json!([]));
        let response = decode_completion_response(&body).unwrap();
        assert!(response.success);
        assert!(response.variations.is_empty());
    }

    #[test]
    fn test_decode_unknown_model_does_not_fail() {
        let body = completion_body("gpt-3.5-turbo-instruct", json!([]));
        let response = decode_completion_response(&body).unwrap();
        assert_eq!(
            response.model,
            Lookup::NotFound("gpt-3.5-turbo-instruct".to_string())
        );
    }

    #[test]
    fn test_decode_optional_fields() {
        let mut value: serde_json::Value = serde_json::from_slice(&completion_body(
            "text-davinci-003",
            json!([
                { "text": "no reason", "index": 0 },
                { "text": "null reason", "index": 1, "finish_reason": null }
            ]),
        ))
        .unwrap();
        value["user"] = json!("user-9");

        let response = decode_completion_response(&serde_json::to_vec(&value).unwrap()).unwrap();
        assert_eq!(response.user.as_deref(), Some("user-9"));
        assert!(response.variations.iter().all(|v| v.finish_reason.is_none()));
    }

    #[test]
    fn test_decode_missing_mandatory_field() {
        let body = br#"{"id":"x","object":"text_completion","created":1,"model":"text-ada-001","choices":[]}"#;
        let err = decode_completion_response(body).unwrap_err();
        match err {
            TranslationError::MalformedResponse(reason) => assert!(reason.contains("usage")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_wrong_type_and_garbage() {
        let wrong = completion_body("text-ada-001", json!([{ "text": 5, "index": 0 }]));
        assert!(matches!(
            decode_completion_response(&wrong),
            Err(TranslationError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_completion_response(b"<html>502</html>"),
            Err(TranslationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_image_response_by_format() {
        let body = serde_json::to_vec(&json!({
            "created": 1_700_000_000u64,
            "data": [
                { "url": "https://img.example/1.png" },
                { "url": "https://img.example/2.png" }
            ]
        }))
        .unwrap();

        let response = decode_image_response(&body, ResponseFormat::Url).unwrap();
        assert!(response.success);
        assert_eq!(response.created_at, 1_700_000_000);
        assert_eq!(response.user, None);
        assert_eq!(response.images.len(), 2);
        assert_eq!(response.images[0].payload, "https://img.example/1.png");

        let err = decode_image_response(&body, ResponseFormat::Base64).unwrap_err();
        assert_eq!(
            err,
            TranslationError::MalformedResponse("missing field `b64_json` in data[0]".to_string())
        );
    }

    #[test]
    fn test_decode_base64_images_and_empty_data() {
        let body = br#"{"created":1,"data":[{"b64_json":"aGVsbG8="}],"user":"u1"}"#;
        let response = decode_image_response(body, ResponseFormat::Base64).unwrap();
        assert_eq!(response.images, vec![GeneratedImage { payload: "aGVsbG8=".to_string() }]);
        assert_eq!(response.user.as_deref(), Some("u1"));

        let empty = decode_image_response(br#"{"created":1,"data":[]}"#, ResponseFormat::Url).unwrap();
        assert!(empty.success);
        assert!(empty.images.is_empty());
    }

    #[test]
    fn test_model_survives_echo() {
        for model in CompletionModel::ALL {
            let request = CompletionRequest::new("echo").with_model(model).with_variation_count(3);
            let sent: serde_json::Value =
                serde_json::from_slice(&request.to_json().unwrap()).unwrap();

            let echoed = completion_body(sent["model"].as_str().unwrap(), json!([]));
            let response = decode_completion_response(&echoed).unwrap();
            assert_eq!(response.model, Lookup::Found(request.model));
        }
    }
}
