use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use url::Url;

use crate::{
    config::ClientConfig,
    error::{Result, TryOnError},
    models::{Catalog, Product, UploadPayload},
};

/// Raw outcome of the relay call: status plus body, before interpretation.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub reason: String,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A fetched static resource.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Network access of the orchestrator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a same-origin static resource. Non-success statuses are errors.
    async fn fetch(&self, url: &Url) -> Result<FetchedResource>;

    /// Post both images to the relay endpoint as one multipart request.
    async fn submit(&self, payload: UploadPayload) -> Result<TransportResponse>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| TryOnError::Config(format!("invalid origin '{}': {}", config.origin, e)))?;
        let endpoint = origin.join(&config.endpoint).map_err(|e| {
            TryOnError::Config(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;

        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Load the product list the relay server exposes.
    pub async fn fetch_catalog(&self) -> Result<Catalog> {
        let url = self
            .endpoint
            .join("/api/catalog")
            .map_err(|e| TryOnError::Config(e.to_string()))?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TryOnError::Transport(format!(
                "Server error: {}",
                response.status()
            )));
        }
        let products: Vec<Product> = response.json().await?;
        Ok(Catalog::new(products))
    }
}

fn file_part(upload: crate::models::ImageUpload) -> Result<multipart::Part> {
    multipart::Part::bytes(upload.data.to_vec())
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)
        .map_err(|e| TryOnError::RequestError(format!("invalid content type: {}", e)))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TryOnError::ResourceFetch(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await?;

        Ok(FetchedResource { content_type, data })
    }

    async fn submit(&self, payload: UploadPayload) -> Result<TransportResponse> {
        let form = multipart::Form::new()
            .part("userImage", file_part(payload.user_image)?)
            .part("productImage", file_part(payload.product_image)?);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }
}
