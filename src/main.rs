//! Server binary: load the model, then serve the prediction endpoint.

use animal_classifier::classifier::AnimalClassifierBuilder;
use animal_classifier::core::{ClassifyError, init_tracing};
use animal_classifier::server::{DEFAULT_MAX_BODY_SIZE, ServerConfig, serve};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line arguments for the classification service
#[derive(Parser)]
#[command(name = "animal-classifier")]
#[command(about = "HTTP service serving a pretrained animal image classifier")]
struct Args {
    /// Path to the ONNX model artifact
    #[arg(long, default_value = "animal_classifier.onnx")]
    model_path: PathBuf,

    /// Name of the model's input tensor
    #[arg(long, default_value = "input")]
    input_name: String,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Browser origin allowed by CORS (repeatable); defaults to the local
    /// frontend dev servers
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Maximum accepted upload size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE)]
    max_body_size: usize,

    /// Number of pooled ONNX Runtime sessions
    #[arg(long, default_value_t = 1)]
    session_pool_size: usize,
}

#[tokio::main]
async fn main() -> Result<(), ClassifyError> {
    init_tracing();
    let args = Args::parse();

    // Model-load or output-width failures are fatal before the socket binds.
    let classifier = AnimalClassifierBuilder::new()
        .model_name("animal_classifier")
        .input_name(&args.input_name)
        .session_pool_size(args.session_pool_size)
        .build(&args.model_path)?;
    info!(model = %args.model_path.display(), "model loaded");

    let mut config = ServerConfig {
        host: args.host,
        port: args.port,
        max_body_size: args.max_body_size,
        ..Default::default()
    };
    if !args.cors_origins.is_empty() {
        config.cors_allowed_origins = args.cors_origins;
    }

    serve(config, Arc::new(classifier)).await
}
