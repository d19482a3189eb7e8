use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TryOnError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or both of `userImage` / `productImage` were not uploaded.
    #[error("Both images are required (userImage and productImage).")]
    MissingImages,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Upload too large: field '{field}' exceeds {limit} bytes")]
    UploadTooLarge { field: String, limit: usize },

    /// Opening the generation session or reading its stream failed.
    #[error("Model error: {0}")]
    Model(String),

    /// The stream completed without a single inline image.
    /// `diagnostic` carries the text the model produced instead.
    #[error("The model did not return an image")]
    NoImage { diagnostic: String },

    #[error("{0}")]
    Validation(String),

    #[error("Could not load the product image")]
    ResourceFetch(String),

    #[error("{0}")]
    Transport(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl TryOnError {
    /// Short, user-facing message. Technical detail lives in `details()`.
    pub fn public_message(&self) -> String {
        match self {
            TryOnError::MissingImages => self.to_string(),
            TryOnError::InvalidUpload(_) | TryOnError::UploadTooLarge { .. } => self.to_string(),
            TryOnError::Model(_) => "Generation stream failed".to_string(),
            TryOnError::NoImage { .. } => "Could not generate the try-on image".to_string(),
            TryOnError::Validation(msg) | TryOnError::Transport(msg) => msg.clone(),
            TryOnError::ResourceFetch(_) => self.to_string(),
            _ => "Server error".to_string(),
        }
    }

    /// Diagnostic detail safe to hand back to a caller, if any.
    pub fn details(&self) -> Option<String> {
        match self {
            TryOnError::MissingImages
            | TryOnError::InvalidUpload(_)
            | TryOnError::UploadTooLarge { .. }
            | TryOnError::Validation(_)
            | TryOnError::Transport(_) => None,
            TryOnError::Model(msg) => Some(msg.clone()),
            TryOnError::NoImage { .. } => {
                Some("The model did not return an image in the expected format".to_string())
            }
            TryOnError::ResourceFetch(cause) => Some(cause.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for TryOnError {
    fn from(e: reqwest::Error) -> Self {
        TryOnError::RequestError(e.to_string())
    }
}

impl From<std::io::Error> for TryOnError {
    fn from(e: std::io::Error) -> Self {
        TryOnError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for TryOnError {
    fn from(e: serde_json::Error) -> Self {
        TryOnError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TryOnError>;
