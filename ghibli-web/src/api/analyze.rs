//! `POST /api/analyze-image` (multipart, field `image`)

use axum::extract::{Multipart, State};
use axum::Json;

use ghibli_common::types::{AnalyzeResponse, ALLOWED_IMAGE_TYPES, MAX_UPLOAD_BYTES};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

struct Upload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Caption an uploaded image. Validation failures are immediate 400s;
/// captioning failures are retried inside the caption client before the
/// terminal 500 with a short message plus logged-only detail.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeResponse>> {
    let upload = read_image_field(multipart).await?;

    if !ALLOWED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
        return Err(ApiError::BadRequest(
            "Please upload a JPEG, PNG, or WebP image".to_string(),
        ));
    }

    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::BadRequest(
            "Image must be smaller than 10MB".to_string(),
        ));
    }

    let description = state
        .caption
        .describe_image(&upload.filename, upload.bytes, &upload.content_type)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, filename = %upload.filename, "image analysis failed");
            ApiError::backend_with_details(
                "Couldn't analyze this image, please try another",
                e.to_string(),
            )
        })?;

    Ok(Json(AnalyzeResponse {
        description,
        filename: upload.filename,
    }))
}

async fn read_image_field(mut multipart: Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {}", e)))?
            .to_vec();

        return Ok(Upload {
            filename,
            content_type,
            bytes,
        });
    }

    Err(ApiError::BadRequest("No image file provided".to_string()))
}
