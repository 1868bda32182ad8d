//! # openai-gen - OpenAI text completion and image generation client
//!
//! A small async client that turns typed request objects into calls against
//! the OpenAI `completions` and `images/generations` endpoints and maps the
//! JSON results back into typed responses.
//!
//! ## Features
//! - Non-blocking calls dispatched onto a per-client worker pool
//! - Typed, defaulted request builders
//! - Soft failures: a failed call still resolves to a response, flagged with
//!   `success == false` and carrying the cause in `failure`
//! - Pluggable [`HttpTransport`](http::HttpTransport), reqwest by default
//!
//! ## Example
//! ```no_run
//! use openai_gen::client::Client;
//! use openai_gen::model::{ImageSize, ResponseFormat};
//! use openai_gen::options::ClientOptions;
//! use openai_gen::request::{CompletionRequest, ImageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientOptions::new("your-api-key"))?;
//!
//!     let completion = client.generate_completions(
//!         CompletionRequest::new("Write a haiku about the sea")
//!             .with_creativity(0.7)
//!             .with_max_length(64),
//!     );
//!     let images = client.generate_images(
//!         ImageRequest::new("a lighthouse at dusk")
//!             .with_size(ImageSize::Medium)
//!             .with_response_format(ResponseFormat::Url),
//!     );
//!
//!     let (completion, images) = futures::join!(completion, images);
//!     println!("{:?}", completion.first_text());
//!     println!("{} image(s)", images.images.len());
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod pool;
pub mod request;
pub mod response;
pub mod translate;

// Re-exports for convenience
pub use client::{CallFailure, Client, ClientError};
pub use model::{CompletionModel, ImageSize, Lookup, ResponseFormat};
pub use request::{CompletionRequest, ImageRequest};
pub use response::{CompletionResponse, GeneratedImage, ImageResponse, ResponseUsage, TextVariation};
