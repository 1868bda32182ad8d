//! One completion and one image request against the live API.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! RUST_LOG=openai_gen=debug cargo run --example generate
//! ```

use openai_gen::client::Client;
use openai_gen::model::{CompletionModel, ImageSize, ResponseFormat};
use openai_gen::options::ClientOptions;
use openai_gen::request::{CompletionRequest, ImageRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key =
        std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY environment variable must be set");

    let client = Client::new(ClientOptions::new(api_key))?;

    let request = CompletionRequest::new("What is the capital of France? Answer in one word.")
        .with_model(CompletionModel::Davinci)
        .with_max_length(16);
    request.validate()?;

    println!("Sending completion request...");
    let response = client.generate_completions(request).await;

    if response.success {
        println!("\n=== Completion ===");
        println!("Model: {}", response.model.wire());
        println!(
            "Tokens: {} prompt + {} completion = {}",
            response.usage.prompt_tokens, response.usage.completion_tokens, response.usage.total_tokens
        );
        for variation in &response.variations {
            println!(
                "[{}] {} ({:?})",
                variation.index,
                variation.content.trim(),
                variation.finish_reason
            );
        }
    } else {
        eprintln!("Completion failed: {:?}", response.failure);
    }

    let request = ImageRequest::new("a watercolor lighthouse at dusk")
        .with_size(ImageSize::Small)
        .with_response_format(ResponseFormat::Url);

    println!("\nSending image request...");
    let response = client.generate_images(request).await;

    if response.success {
        println!("\n=== Images ===");
        for image in &response.images {
            println!("{}", image.payload);
        }
    } else {
        eprintln!("Image generation failed: {:?}", response.failure);
    }

    client.shutdown();
    Ok(())
}
