pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod relay;
pub mod server;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::{HttpTransport, Transport, TryOnSession};
pub use config::{ClientConfig, Config, GeminiConfig};
pub use error::{Result, TryOnError};
pub use gemini::{GeminiClient, GenerationRequest, GenerativeImageModel};
pub use models::*;
pub use relay::TryOnRelay;
pub use server::AppState;
