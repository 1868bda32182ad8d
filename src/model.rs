//! Closed sets of model identifiers and fixed-choice request parameters.
//!
//! Every value has a canonical wire string. Only [`CompletionModel`] is ever
//! read back from server output, so it is the only one with a lookup.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Text completion models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompletionModel {
    /// The most capable completion model.
    #[default]
    Davinci,
    Curie,
    Babbage,
    Ada,
}

impl CompletionModel {
    /// All known models, most capable first.
    pub const ALL: [CompletionModel; 4] = [
        CompletionModel::Davinci,
        CompletionModel::Curie,
        CompletionModel::Babbage,
        CompletionModel::Ada,
    ];

    /// Canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionModel::Davinci => "text-davinci-003",
            CompletionModel::Curie => "text-curie-001",
            CompletionModel::Babbage => "text-babbage-001",
            CompletionModel::Ada => "text-ada-001",
        }
    }

    /// Look up a model by its wire identifier.
    ///
    /// # Example
    /// ```
    /// use openai_gen::model::CompletionModel;
    ///
    /// assert_eq!(CompletionModel::from_wire("text-ada-001"), Some(CompletionModel::Ada));
    /// assert_eq!(CompletionModel::from_wire("gpt-5"), None);
    /// ```
    pub fn from_wire(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.as_str() == id)
    }

    /// Look up a model by its wire identifier, keeping the raw string on a miss.
    ///
    /// Used wherever an unknown identifier must be carried along rather than
    /// rejected, e.g. the `model` field of a completion response.
    pub fn lookup(id: &str) -> Lookup<Self> {
        match Self::from_wire(id) {
            Some(model) => Lookup::Found(model),
            None => Lookup::NotFound(id.to_string()),
        }
    }
}

impl fmt::Display for CompletionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`CompletionModel::from_str`] for an unrecognized identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown completion model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for CompletionModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Outcome of a wire-string lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup<T> {
    Found(T),
    /// The raw wire string that matched nothing.
    NotFound(String),
}

impl<T> Lookup<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound(_) => None,
        }
    }

    pub fn into_found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

impl Lookup<CompletionModel> {
    /// Wire identifier, whether or not it was recognized.
    pub fn wire(&self) -> &str {
        match self {
            Lookup::Found(model) => model.as_str(),
            Lookup::NotFound(raw) => raw,
        }
    }
}

impl<T> From<T> for Lookup<T> {
    fn from(value: T) -> Self {
        Lookup::Found(value)
    }
}

/// Dimensions of generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageSize {
    /// 256x256
    #[default]
    Small,
    /// 512x512
    Medium,
    /// 1024x1024
    Large,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Small => "256x256",
            ImageSize::Medium => "512x512",
            ImageSize::Large => "1024x1024",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How generated images are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseFormat {
    /// A hosted URL.
    #[default]
    Url,
    /// An inline base64-encoded blob.
    Base64,
}

impl ResponseFormat {
    /// Wire string. Also the key holding the payload of each returned image.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Url => "url",
            ResponseFormat::Base64 => "b64_json",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
