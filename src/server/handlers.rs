use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::{error::TryOnError, models::TryOnSuccess};

use super::{multipart::read_try_on_form, AppState};

/// Accepts `userImage` and `productImage` file parts and answers with the
/// generated composite as base64.
#[post("/api/generate-try-on")]
pub async fn generate_try_on(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, TryOnError> {
    log::info!("Request received on /api/generate-try-on");

    let form = read_try_on_form(payload, state.max_upload_bytes).await?;
    let image = state.relay.relay(form.user_image, form.product_image).await?;

    Ok(HttpResponse::Ok().json(TryOnSuccess::from(image)))
}

#[get("/api/catalog")]
pub async fn list_catalog(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.catalog.products())
}

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model": state.relay.model_id(),
    }))
}
