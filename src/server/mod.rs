pub mod error;
pub mod handlers;
pub mod multipart;

use actix_web::web;
use std::path::Path;
use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    gemini::{GeminiClient, GenerativeImageModel},
    models::Catalog,
    relay::TryOnRelay,
};

pub use handlers::{generate_try_on, health, list_catalog};

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub relay: TryOnRelay,
    pub catalog: Catalog,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(model: Arc<dyn GenerativeImageModel>, catalog: Catalog, max_upload_bytes: usize) -> Self {
        Self {
            relay: TryOnRelay::new(model),
            catalog,
            max_upload_bytes,
        }
    }

    /// Build the production state: Gemini client plus the configured catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = GeminiClient::new(config.gemini.clone())?;
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_json_file(path)?,
            None => Catalog::builtin(),
        };

        Ok(Self::new(Arc::new(model), catalog, config.max_upload_bytes))
    }
}

/// Register the API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(generate_try_on)
        .service(list_catalog)
        .service(health);
}

/// Static catalog images, served from the same origin as the API.
pub fn assets(dir: &Path) -> actix_files::Files {
    actix_files::Files::new("/assets", dir)
}
