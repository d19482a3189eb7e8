//! Storefront side of the try-on flow.
//!
//! `TryOnSession` holds the transient UI state (selected product, uploaded
//! photo, last result, loading flag) and drives one request at a time
//! through an injected [`Transport`].

pub mod transport;

use url::Url;

use crate::{
    config::ClientConfig,
    error::{Result, TryOnError},
    models::{
        mime_for_path, Catalog, EncodedImage, GenerationResult, ImageUpload, Product,
        TryOnResponse, UploadPayload,
    },
};

pub use transport::{FetchedResource, HttpTransport, Transport, TransportResponse};

pub const VALIDATION_MESSAGE: &str = "Please select a product and upload your photo first.";
pub const NO_RESPONSE_MESSAGE: &str = "No response received from the server.";

type LoadingObserver = Box<dyn Fn(bool) + Send + Sync>;

pub struct TryOnSession<T: Transport> {
    transport: T,
    catalog: Catalog,
    origin: Url,
    selected: Option<Product>,
    photo: Option<ImageUpload>,
    result: Option<GenerationResult>,
    loading: bool,
    on_loading: Option<LoadingObserver>,
}

impl<T: Transport> TryOnSession<T> {
    pub fn new(transport: T, catalog: Catalog, config: &ClientConfig) -> Result<Self> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| TryOnError::Config(format!("invalid origin '{}': {}", config.origin, e)))?;

        Ok(Self {
            transport,
            catalog,
            origin,
            selected: None,
            photo: None,
            result: None,
            loading: false,
            on_loading: None,
        })
    }

    /// Called with `true` when a submission starts and `false` when it ends.
    pub fn with_loading_observer(mut self, observer: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_loading = Some(Box::new(observer));
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn products(&self) -> &[Product] {
        self.catalog.products()
    }

    pub fn select_product(&mut self, id: u32) -> Result<&Product> {
        let product = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| TryOnError::Validation(format!("Unknown product id {}", id)))?;
        Ok(&*self.selected.insert(product))
    }

    /// A new photo invalidates the previous result.
    pub fn upload_photo(&mut self, photo: ImageUpload) {
        self.photo = Some(photo);
        self.result = None;
    }

    pub fn back_to_catalog(&mut self) {
        self.selected = None;
        self.photo = None;
        self.result = None;
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    pub fn photo(&self) -> Option<&ImageUpload> {
        self.photo.as_ref()
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn generated_image(&self) -> Option<&EncodedImage> {
        self.result.as_ref().and_then(GenerationResult::image)
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().and_then(GenerationResult::error)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.photo.is_some() && !self.loading
    }

    /// Submit the selected product and photo, then record the outcome.
    pub async fn generate(&mut self) -> &GenerationResult {
        let (Some(product), Some(photo)) = (self.selected.clone(), self.photo.clone()) else {
            return self.result.insert(GenerationResult::Error(VALIDATION_MESSAGE.to_string()));
        };

        self.set_loading(true);
        self.result = None;
        log::info!(
            "Starting try-on generation: photo '{}', product '{}' ({})",
            photo.file_name,
            product.name,
            product.image_url
        );

        let outcome = match self.submit(&product, photo).await {
            Ok(image) => GenerationResult::Image(image),
            Err(e) => {
                log::error!("Try-on generation failed: {:?}", e);
                GenerationResult::Error(e.to_string())
            }
        };

        self.set_loading(false);
        self.result.insert(outcome)
    }

    async fn submit(&self, product: &Product, photo: ImageUpload) -> Result<EncodedImage> {
        let product_image = self.load_product_image(product).await?;
        let payload = UploadPayload {
            user_image: photo,
            product_image,
        };

        let response = self.transport.submit(payload).await.map_err(|e| match e {
            TryOnError::Transport(_) => e,
            other => TryOnError::Transport(format!("Could not reach the server: {}", other)),
        })?;

        interpret_response(response)
    }

    /// Resolve the product's relative image path against the origin and
    /// fetch it. Any failure is reported generically; the cause is logged.
    async fn load_product_image(&self, product: &Product) -> Result<ImageUpload> {
        let url = self.origin.join(&product.image_url).map_err(|e| {
            log::error!("Invalid product image path '{}': {}", product.image_url, e);
            TryOnError::ResourceFetch(e.to_string())
        })?;

        let resource = self.transport.fetch(&url).await.map_err(|e| {
            log::error!("Error loading product image {}: {}", url, e);
            match e {
                TryOnError::ResourceFetch(_) => e,
                other => TryOnError::ResourceFetch(other.to_string()),
            }
        })?;

        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("product.png")
            .to_string();
        let content_type = resource
            .content_type
            .or_else(|| mime_for_path(std::path::Path::new(&file_name)).map(str::to_string));

        Ok(ImageUpload::new(file_name, content_type, resource.data))
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if let Some(observer) = &self.on_loading {
            observer(loading);
        }
    }
}

/// Turn the relay's raw response into an image or a user-facing error.
pub fn interpret_response(response: TransportResponse) -> Result<EncodedImage> {
    if !response.is_success() {
        let message = serde_json::from_slice::<TryOnResponse>(&response.body)
            .ok()
            .and_then(|body| body.error)
            .filter(|error| !error.is_empty())
            .unwrap_or_else(|| {
                format!("Server error: {} {}", response.status, response.reason)
                    .trim_end()
                    .to_string()
            });
        return Err(TryOnError::Transport(message));
    }

    let body: TryOnResponse = serde_json::from_slice(&response.body)
        .map_err(|e| TryOnError::Transport(format!("Invalid server response: {}", e)))?;

    match body.image_data {
        Some(data) if body.success && !data.is_empty() => Ok(EncodedImage::new(data, body.mime_type)),
        _ => Err(TryOnError::Transport(
            body.error
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| NO_RESPONSE_MESSAGE.to_string()),
        )),
    }
}
