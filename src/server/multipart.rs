use actix_multipart::{Field, Multipart};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;

use crate::{
    error::{Result, TryOnError},
    models::ImageUpload,
};

pub const USER_IMAGE_FIELD: &str = "userImage";
pub const PRODUCT_IMAGE_FIELD: &str = "productImage";

/// The two file fields of a try-on form. Either may be missing.
#[derive(Debug, Default)]
pub struct TryOnForm {
    pub user_image: Option<ImageUpload>,
    pub product_image: Option<ImageUpload>,
}

/// Read the form into memory. Unknown fields and non-file parts are skipped,
/// a repeated field keeps its first occurrence and empty files count as missing.
pub async fn read_try_on_form(mut payload: Multipart, max_bytes: usize) -> Result<TryOnForm> {
    let mut form = TryOnForm::default();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| TryOnError::InvalidUpload(e.to_string()))?;
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        let slot = match name.as_str() {
            USER_IMAGE_FIELD => &mut form.user_image,
            PRODUCT_IMAGE_FIELD => &mut form.product_image,
            _ => {
                log::debug!("Skipping unexpected form field '{}'", name);
                skip_field(&mut field).await?;
                continue;
            }
        };

        // only file parts carry images; a plain text field leaves the slot empty
        let Some(file_name) = field
            .content_disposition()
            .get_filename()
            .map(str::to_string)
        else {
            log::debug!("Ignoring non-file form field '{}'", name);
            skip_field(&mut field).await?;
            continue;
        };

        if slot.is_some() {
            log::debug!("Ignoring repeated form field '{}'", name);
            skip_field(&mut field).await?;
            continue;
        }

        let content_type = field.content_type().map(|mime| mime.to_string());
        let data = read_field(&mut field, &name, max_bytes).await?;

        if !data.is_empty() {
            *slot = Some(ImageUpload::new(file_name, content_type, data));
        }
    }

    Ok(form)
}

async fn read_field(field: &mut Field, name: &str, max_bytes: usize) -> Result<Bytes> {
    let mut buf = BytesMut::new();

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| TryOnError::InvalidUpload(e.to_string()))?;
        if buf.len() + chunk.len() > max_bytes {
            return Err(TryOnError::UploadTooLarge {
                field: name.to_string(),
                limit: max_bytes,
            });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}

async fn skip_field(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| TryOnError::InvalidUpload(e.to_string()))?;
    }
    Ok(())
}
