use std::env;
use std::path::PathBuf;

use crate::error::{Result, TryOnError};
use crate::models::GenerationSettings;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_ORIGIN: &str = "http://localhost:3001";
pub const DEFAULT_ENDPOINT: &str = "/api/generate-try-on";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub gemini: GeminiConfig,
    pub assets_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

/// Settings of the storefront side: where the UI is served from and where
/// the relay endpoint lives.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub origin: String,
    pub endpoint: String,
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            generation: GenerationSettings::default(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = non_empty_env("GOOGLE_CLOUD_API_KEY").or_else(|| non_empty_env("GEMINI_API_KEY"));
        let model = non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = non_empty_env("GEMINI_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        GeminiConfig {
            api_key,
            model,
            api_base,
            generation: GenerationSettings::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    /// The credential is the one setting the server cannot run without.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            TryOnError::Config(
                "GOOGLE_CLOUD_API_KEY (or GEMINI_API_KEY) must be set".into(),
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: None,
            gemini: GeminiConfig::default(),
            assets_dir: PathBuf::from("assets"),
            catalog_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the server configuration. Fails when the API credential is absent.
    pub fn from_env() -> Result<Self> {
        let port = match non_empty_env("PORT") {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| TryOnError::Config(format!("PORT is not a valid port: {}", raw)))?,
            ),
            None => None,
        };
        let max_upload_bytes = match non_empty_env("TRYON_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse().map_err(|_| {
                TryOnError::Config(format!("TRYON_MAX_UPLOAD_BYTES is not a number: {}", raw))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let config = Config {
            host: non_empty_env("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            gemini: GeminiConfig::from_env(),
            assets_dir: non_empty_env("TRYON_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets")),
            catalog_path: non_empty_env("TRYON_CATALOG_PATH").map(PathBuf::from),
            max_upload_bytes,
        };
        config.gemini.require_api_key()?;
        Ok(config)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gemini(mut self, gemini: GeminiConfig) -> Self {
        self.gemini = gemini;
        self
    }

    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            origin: DEFAULT_ORIGIN.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        ClientConfig {
            origin: non_empty_env("TRYON_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            endpoint: non_empty_env("TRYON_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
