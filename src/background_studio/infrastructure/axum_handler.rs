use crate::application::error::ApplicationError;
use crate::application::pipeline_service::{TransformOutcome, TransformPipeline};
use crate::domain::color::Color;
use crate::domain::dimension::Dimension;
use crate::domain::error::DomainError;
use crate::domain::image_store::ImageStore;
use crate::domain::transform::{Transform, TransformRequest};
use super::image_data::{decode_image_data, encode_image_data};
use super::retry::RetryPolicy;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct AppState {
    pub pipeline: Arc<TransformPipeline>,
    pub image_store: Arc<dyn ImageStore + Send + Sync>,
    pub retry_policy: RetryPolicy,
}

#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub message: String,
    pub image_id: String,
    pub image_data: String,
}

#[derive(Serialize, Debug)]
pub struct TransformResponse {
    pub message: String,
    pub image_id: String,
    pub image_data: String,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
}

#[derive(Deserialize, Debug, Default)]
pub struct ImageQuery {
    pub download: Option<bool>,
}

/// Fields accepted by the transform endpoints. Empty text fields count as absent.
#[derive(Debug, Default)]
pub struct TransformForm {
    pub image: Option<Vec<u8>>,
    pub image_data: Option<String>,
    pub image_id: Option<String>,
    pub color: Option<String>,
    pub background_image: Option<Vec<u8>>,
    pub background_image_data: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

fn malformed(e: MultipartError) -> ApplicationError {
    DomainError::MalformedForm(e.to_string()).into()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl TransformForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApplicationError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => form.image = Some(field.bytes().await.map_err(malformed)?.to_vec()),
                "background_image" => {
                    form.background_image = Some(field.bytes().await.map_err(malformed)?.to_vec())
                }
                "image_data" => form.image_data = non_empty(field.text().await.map_err(malformed)?),
                "image_id" => form.image_id = non_empty(field.text().await.map_err(malformed)?),
                "color" => form.color = non_empty(field.text().await.map_err(malformed)?),
                "background_image_data" => {
                    form.background_image_data = non_empty(field.text().await.map_err(malformed)?)
                }
                "width" => form.width = non_empty(field.text().await.map_err(malformed)?),
                "height" => form.height = non_empty(field.text().await.map_err(malformed)?),
                other => log::debug!("Ignoring unknown form field '{}'", other),
            }
        }
        Ok(form)
    }

    /// Source image: inline base64 first, then a stored id, then an uploaded file.
    pub async fn source(&self, store: &(dyn ImageStore + Send + Sync)) -> Result<Vec<u8>, ApplicationError> {
        if let Some(data) = &self.image_data {
            return decode_image_data(data).map_err(ApplicationError::Decode);
        }
        if let Some(id) = &self.image_id {
            return store
                .get(id)
                .await?
                .ok_or_else(|| ApplicationError::ImageNotFound(id.clone()));
        }
        if let Some(bytes) = &self.image {
            return Ok(bytes.clone());
        }
        Err(DomainError::MissingParameter("image_data".to_string()).into())
    }

    // color が優先. どちらも無ければクライアントエラー
    pub fn background_transform(&self) -> Result<Transform, ApplicationError> {
        if let Some(color) = &self.color {
            return Ok(Transform::ApplySolidBackground(color.parse::<Color>()?));
        }
        if let Some(bytes) = &self.background_image {
            return Ok(Transform::ApplyImageBackground(bytes.clone()));
        }
        if let Some(data) = &self.background_image_data {
            let bytes = decode_image_data(data).map_err(ApplicationError::Decode)?;
            return Ok(Transform::ApplyImageBackground(bytes));
        }
        Err(DomainError::MissingParameter("color or background_image".to_string()).into())
    }

    pub fn resize_transform(&self) -> Result<Transform, DomainError> {
        let axis = |value: &Option<String>| match value {
            Some(token) => token.parse::<Dimension>(),
            None => Ok(Dimension::Auto),
        };
        Ok(Transform::Resize(axis(&self.width)?, axis(&self.height)?))
    }
}

async fn run_transform(
    state: &AppState,
    source: Vec<u8>,
    transform: Transform,
) -> Result<Json<TransformResponse>, ApplicationError> {
    let request = TransformRequest::new(source, transform);
    let pipeline = &state.pipeline;
    let request = &request;
    let outcome = state
        .retry_policy
        .run(move || pipeline.run(request.clone()))
        .await?;
    store_outcome(state, outcome).await
}

async fn store_outcome(
    state: &AppState,
    outcome: TransformOutcome,
) -> Result<Json<TransformResponse>, ApplicationError> {
    let TransformOutcome { image, content_type, width, height, message } = outcome;
    let image_data = encode_image_data(&image);
    let image_id = state.image_store.put(image).await?;
    Ok(Json(TransformResponse {
        message,
        image_id,
        image_data,
        width,
        height,
        content_type,
    }))
}

pub async fn index_handler() -> &'static str {
    "Image Processing Backend is running!"
}

pub async fn upload_image_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApplicationError> {
    let form = TransformForm::from_multipart(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| DomainError::MissingParameter("image".to_string()))?;
    if image.is_empty() {
        return Err(DomainError::MissingParameter("image".to_string()).into());
    }

    let image_data = encode_image_data(&image);
    let image_id = state.image_store.put(image).await?;
    log::info!("Uploaded image stored as {}", image_id);
    Ok(Json(UploadResponse {
        message: "Image uploaded successfully!".to_string(),
        image_id,
        image_data,
    }))
}

pub async fn remove_background_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TransformResponse>, ApplicationError> {
    let form = TransformForm::from_multipart(multipart).await?;
    let source = form.source(state.image_store.as_ref()).await?;
    run_transform(&state, source, Transform::RemoveBackground).await
}

pub async fn edit_background_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TransformResponse>, ApplicationError> {
    let form = TransformForm::from_multipart(multipart).await?;
    let transform = form.background_transform()?;
    let source = form.source(state.image_store.as_ref()).await?;
    run_transform(&state, source, transform).await
}

pub async fn resize_image_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TransformResponse>, ApplicationError> {
    let form = TransformForm::from_multipart(multipart).await?;
    let transform = form.resize_transform()?;
    let source = form.source(state.image_store.as_ref()).await?;
    run_transform(&state, source, transform).await
}

pub async fn get_image_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApplicationError> {
    let image = state
        .image_store
        .get(&id)
        .await?
        .ok_or_else(|| ApplicationError::ImageNotFound(id.clone()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(sniff_content_type(&image)));
    if query.download.unwrap_or(false) {
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"processed_image.png\""),
        );
    }
    Ok((headers, image).into_response())
}

fn sniff_content_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Bmp) => "image/bmp",
        Ok(ImageFormat::Tiff) => "image/tiff",
        _ => "application/octet-stream",
    }
}
