//! Maps relay failures onto status codes and `{error, details?}` JSON bodies.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::{error::TryOnError, models::ErrorBody};

impl ResponseError for TryOnError {
    fn status_code(&self) -> StatusCode {
        match self {
            TryOnError::MissingImages | TryOnError::InvalidUpload(_) | TryOnError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            TryOnError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed with {}: {}", status, self);
        } else {
            log::warn!("Request rejected with {}: {}", status, self);
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.public_message(),
            details: self.details(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: TryOnError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn missing_images_is_bad_request_without_details() {
        let (status, body) = body_of(TryOnError::MissingImages).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert!(body.get("details").is_none());
    }

    #[actix_web::test]
    async fn model_and_no_image_bodies_differ() {
        let (model_status, model_body) = body_of(TryOnError::Model("reset".into())).await;
        let (none_status, none_body) = body_of(TryOnError::NoImage {
            diagnostic: "text".into(),
        })
        .await;

        assert_eq!(model_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(none_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(model_body["error"], none_body["error"]);
        assert_eq!(model_body["details"], "reset");
    }

    #[actix_web::test]
    async fn oversized_upload_is_413() {
        let (status, _) = body_of(TryOnError::UploadTooLarge {
            field: "userImage".into(),
            limit: 10,
        })
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
