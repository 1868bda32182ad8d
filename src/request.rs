//! Request parameter objects with their defaults.

use crate::client::ClientError;
use crate::model::{CompletionModel, ImageSize, ResponseFormat};
use crate::translate::{self, TranslationError};

/// Parameters of a text completion call.
///
/// # Example
/// ```rust
/// use openai_gen::model::CompletionModel;
/// use openai_gen::request::CompletionRequest;
///
/// let request = CompletionRequest::new("Hello")
///     .with_model(CompletionModel::Davinci)
///     .with_creativity(0.5)
///     .with_max_length(16)
///     .with_variation_count(2);
///
/// assert_eq!(
///     String::from_utf8(request.to_json().unwrap()).unwrap(),
///     r#"{"model":"text-davinci-003","prompt":"Hello","max_tokens":16,"temperature":0.5,"n":2}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: CompletionModel,

    pub prompt: String,

    /// Sampling temperature (0.0 - 2.0)
    pub creativity: f32,

    /// Upper bound on generated tokens
    pub max_length: u32,

    /// How many alternative completions to generate
    pub variation_count: u32,

    /// End-user identifier forwarded to the service
    pub user: Option<String>,
}

impl CompletionRequest {
    pub const DEFAULT_MAX_LENGTH: u32 = 128;

    /// Create a completion request with default parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: CompletionModel::default(),
            prompt: prompt.into(),
            creativity: 0.0,
            max_length: Self::DEFAULT_MAX_LENGTH,
            variation_count: 1,
            user: None,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: CompletionModel) -> Self {
        self.model = model;
        self
    }

    /// Set the sampling temperature.
    pub fn with_creativity(mut self, creativity: f32) -> Self {
        self.creativity = creativity;
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set how many completions to generate.
    pub fn with_variation_count(mut self, variation_count: u32) -> Self {
        self.variation_count = variation_count;
        self
    }

    /// Set the end-user identifier.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Checks the constraints the wire format itself does not enforce.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.prompt.trim().is_empty() {
            return Err(ClientError::InvalidRequest("prompt must not be empty".to_string()));
        }
        if !self.creativity.is_finite() || !(0.0..=2.0).contains(&self.creativity) {
            return Err(ClientError::InvalidRequest(format!(
                "creativity must be within 0.0..=2.0, got {}",
                self.creativity
            )));
        }
        if self.max_length == 0 {
            return Err(ClientError::InvalidRequest("max_length must be positive".to_string()));
        }
        if self.variation_count == 0 {
            return Err(ClientError::InvalidRequest(
                "variation_count must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Wire JSON body for this request.
    pub fn to_json(&self) -> Result<Vec<u8>, TranslationError> {
        translate::encode_completion_request(self)
    }
}

/// Parameters of an image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// What the image should depict
    pub description: String,

    pub image_count: u32,

    pub size: ImageSize,

    pub response_format: ResponseFormat,

    pub user: Option<String>,
}

impl ImageRequest {
    /// Create an image request with default parameters.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            image_count: 1,
            size: ImageSize::default(),
            response_format: ResponseFormat::default(),
            user: None,
        }
    }

    /// Set how many images to generate.
    pub fn with_image_count(mut self, image_count: u32) -> Self {
        self.image_count = image_count;
        self
    }

    /// Set the image size.
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    /// Set how images are delivered.
    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    /// Set the end-user identifier.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.description.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "description must not be empty".to_string(),
            ));
        }
        if self.image_count == 0 {
            return Err(ClientError::InvalidRequest("image_count must be positive".to_string()));
        }
        Ok(())
    }

    /// Wire JSON body for this request.
    pub fn to_json(&self) -> Result<Vec<u8>, TranslationError> {
        translate::encode_image_request(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_defaults() {
        let request = CompletionRequest::new("Say hi");
        assert_eq!(request.model, CompletionModel::Davinci);
        assert_eq!(request.creativity, 0.0);
        assert_eq!(request.max_length, 128);
        assert_eq!(request.variation_count, 1);
        assert_eq!(request.user, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_completion_builders() {
        let request = CompletionRequest::new("Say hi")
            .with_model(CompletionModel::Ada)
            .with_creativity(1.5)
            .with_max_length(32)
            .with_variation_count(3)
            .with_user("user-7");
        assert_eq!(request.model, CompletionModel::Ada);
        assert_eq!(request.creativity, 1.5);
        assert_eq!(request.max_length, 32);
        assert_eq!(request.variation_count, 3);
        assert_eq!(request.user.as_deref(), Some("user-7"));
    }

    #[test]
    fn test_completion_validation() {
        let invalid = [
            CompletionRequest::new(""),
            CompletionRequest::new("   \n"),
            CompletionRequest::new("x").with_creativity(2.5),
            CompletionRequest::new("x").with_creativity(-0.1),
            CompletionRequest::new("x").with_creativity(f32::NAN),
            CompletionRequest::new("x").with_max_length(0),
            CompletionRequest::new("x").with_variation_count(0),
        ];
        for request in invalid {
            assert!(
                matches!(request.validate(), Err(ClientError::InvalidRequest(_))),
                "{:?} should be rejected",
                request
            );
        }
        assert!(CompletionRequest::new("x").with_creativity(2.0).validate().is_ok());
    }

    #[test]
    fn test_image_defaults() {
        let request = ImageRequest::new("a cat");
        assert_eq!(request.image_count, 1);
        assert_eq!(request.size, ImageSize::Small);
        assert_eq!(request.response_format, ResponseFormat::Url);
        assert_eq!(request.user, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_image_builders() {
        let request = ImageRequest::new("a cat")
            .with_image_count(2)
            .with_size(ImageSize::Large)
            .with_response_format(ResponseFormat::Base64)
            .with_user("user-7");
        assert_eq!(request.image_count, 2);
        assert_eq!(request.size, ImageSize::Large);
        assert_eq!(request.response_format, ResponseFormat::Base64);
        assert_eq!(request.user.as_deref(), Some("user-7"));
    }

    #[test]
    fn test_image_validation() {
        assert!(ImageRequest::new(" ").validate().is_err());
        assert!(ImageRequest::new("a cat").with_image_count(0).validate().is_err());
        assert!(ImageRequest::new("a cat").with_image_count(4).validate().is_ok());
    }
}
