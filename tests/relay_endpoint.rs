use actix_web::{http::header, http::StatusCode, test, web, App};
use std::sync::Arc;

use tryon::{
    gemini::{Part, ResponseChunk},
    models::Catalog,
    server::{configure, AppState},
    testing::{
        form_body, image_chunk, image_part, multipart_body, multipart_content_type, text_chunk,
        FilePart, StubModel, TextPart, JPEG_BYTES, PNG_BYTES,
    },
    TryOnError,
};

const LIMIT: usize = 1024 * 1024;

fn both_images() -> Vec<u8> {
    multipart_body(&[
        FilePart {
            name: "userImage",
            file_name: "me.png",
            content_type: "image/png",
            data: PNG_BYTES,
        },
        FilePart {
            name: "productImage",
            file_name: "shirt.jpeg",
            content_type: "image/jpeg",
            data: JPEG_BYTES,
        },
    ])
}

async fn post(model: Arc<StubModel>, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let state = AppState::new(model, Catalog::builtin(), LIMIT);
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-try-on")
        .insert_header((header::CONTENT_TYPE, multipart_content_type()))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: serde_json::Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_web::test]
async fn relays_generated_image() {
    let model = StubModel::streaming(vec![Ok(image_chunk("image/png", "iVBORw0KGgo="))]);
    let (status, body) = post(model.clone(), both_images()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["mimeType"], "image/png");
    assert_eq!(body["imageData"], "iVBORw0KGgo=");
    assert_eq!(model.calls(), 1);

    let request = model.last_request().unwrap();
    assert_eq!(request.images.len(), 2);
    assert_eq!(request.images[0].mime_type, "image/png");
    assert_eq!(request.images[1].mime_type, "image/jpeg");
}

#[actix_web::test]
async fn missing_product_image_is_rejected() {
    let model = StubModel::streaming(vec![Ok(image_chunk("image/png", "AAAA"))]);
    let body = multipart_body(&[FilePart {
        name: "userImage",
        file_name: "me.png",
        content_type: "image/png",
        data: PNG_BYTES,
    }]);
    let (status, body) = post(model.clone(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert!(body.get("details").is_none());
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn empty_file_counts_as_missing() {
    let model = StubModel::streaming(vec![]);
    let body = multipart_body(&[
        FilePart {
            name: "userImage",
            file_name: "me.png",
            content_type: "image/png",
            data: b"",
        },
        FilePart {
            name: "productImage",
            file_name: "shirt.jpeg",
            content_type: "image/jpeg",
            data: JPEG_BYTES,
        },
    ]);
    let (status, _) = post(model.clone(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn mid_stream_failure_reports_details() {
    let model = StubModel::streaming(vec![
        Ok(text_chunk("working on it")),
        Err(TryOnError::Model("connection reset".into())),
    ]);
    let (status, body) = post(model, both_images()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Generation stream failed");
    assert!(body["details"].as_str().unwrap().contains("connection reset"));
}

#[actix_web::test]
async fn text_only_response_is_a_server_error() {
    let model = StubModel::streaming(vec![Ok(text_chunk("I cannot do that"))]);
    let (status, body) = post(model, both_images()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Could not generate the try-on image");
    assert_eq!(
        body["details"],
        "The model did not return an image in the expected format"
    );
}

#[actix_web::test]
async fn last_inline_image_wins() {
    let model = StubModel::streaming(vec![
        Ok(image_chunk("image/png", "Zmlyc3Q=")),
        Ok(ResponseChunk::from_parts(vec![
            Part::text("here you go"),
            image_part("image/webp", "data:image/webp;base64,bGFzdA=="),
        ])),
    ]);
    let (status, body) = post(model, both_images()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mimeType"], "image/webp");
    assert_eq!(body["imageData"], "bGFzdA==");
}

#[actix_web::test]
async fn unknown_fields_are_ignored() {
    let model = StubModel::streaming(vec![Ok(image_chunk("image/png", "AAAA"))]);
    let body = multipart_body(&[
        FilePart {
            name: "note",
            file_name: "note.txt",
            content_type: "text/plain",
            data: b"hello",
        },
        FilePart {
            name: "userImage",
            file_name: "me.png",
            content_type: "image/png",
            data: PNG_BYTES,
        },
        FilePart {
            name: "productImage",
            file_name: "shirt.jpeg",
            content_type: "image/jpeg",
            data: JPEG_BYTES,
        },
    ]);
    let (status, _) = post(model.clone(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(model.calls(), 1);
}

#[actix_web::test]
async fn text_fields_are_not_images() {
    let model = StubModel::streaming(vec![Ok(image_chunk("image/png", "AAAA"))]);
    let body = form_body(
        &[
            TextPart {
                name: "userImage",
                value: "hello",
            },
            TextPart {
                name: "productImage",
                value: "world",
            },
        ],
        &[],
    );
    let (status, body) = post(model.clone(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn file_part_after_text_field_of_same_name_is_used() {
    let model = StubModel::streaming(vec![Ok(image_chunk("image/png", "AAAA"))]);
    let body = form_body(
        &[TextPart {
            name: "userImage",
            value: "hello",
        }],
        &[
            FilePart {
                name: "userImage",
                file_name: "me.png",
                content_type: "image/png",
                data: PNG_BYTES,
            },
            FilePart {
                name: "productImage",
                file_name: "shirt.jpeg",
                content_type: "image/jpeg",
                data: JPEG_BYTES,
            },
        ],
    );
    let (status, _) = post(model.clone(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(model.calls(), 1);
}

#[actix_web::test]
async fn empty_inline_image_is_a_server_error() {
    let model = StubModel::streaming(vec![Ok(image_chunk("image/png", ""))]);
    let (status, body) = post(model, both_images()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Could not generate the try-on image");
    assert!(body.get("imageData").is_none());
}
