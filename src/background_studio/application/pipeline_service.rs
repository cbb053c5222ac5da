use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use super::error::ApplicationError;

use crate::domain::dimension::Dimension;
use crate::domain::error::{DomainError, TransformError};
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::raster::Raster;
use crate::domain::resizer;
use crate::domain::separator::{Separator, SeparatorError};
use crate::domain::transform::{Transform, TransformRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Decoded,
    Transforming,
    Encoded,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Decoded => "decoded",
            PipelineStage::Transforming => "transforming",
            PipelineStage::Encoded => "encoded",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound for a single call to the separator.
    pub separator_timeout: Duration,
    /// Largest accepted resize target per axis.
    pub max_dimension: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            separator_timeout: Duration::from_secs(30),
            max_dimension: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub image: Vec<u8>,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub message: String,
}

struct DecodedRequest {
    source: Raster,
    background: Option<Raster>,
}

/// Runs one transform request: decode, transform, encode.
///
/// Never retries; a failed request ends with the error of the stage it failed in.
pub struct TransformPipeline {
    image_processor: Arc<dyn ImageProcessor + Send + Sync>,
    separator: Arc<dyn Separator + Send + Sync>,
    options: PipelineOptions,
}

impl TransformPipeline {
    pub fn new(
        image_processor: Arc<dyn ImageProcessor + Send + Sync>,
        separator: Arc<dyn Separator + Send + Sync>,
        options: PipelineOptions,
    ) -> Self {
        Self { image_processor, separator, options }
    }

    pub async fn run(&self, request: TransformRequest) -> Result<TransformOutcome, ApplicationError> {
        let transform_name = request.transform.name();
        let mut stage = PipelineStage::Received;
        log::debug!("Pipeline[{}]: {}", transform_name, stage);

        match self.execute(request, &mut stage).await {
            Ok(outcome) => {
                advance(&mut stage, PipelineStage::Done, transform_name);
                log::info!(
                    "Pipeline[{}]: produced {}x{} ({} bytes)",
                    transform_name,
                    outcome.width,
                    outcome.height,
                    outcome.image.len()
                );
                Ok(outcome)
            }
            Err(err) => {
                log::warn!("Pipeline[{}]: failed while {}: {}", transform_name, stage, err);
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        request: TransformRequest,
        stage: &mut PipelineStage,
    ) -> Result<TransformOutcome, ApplicationError> {
        let TransformRequest { source, transform } = request;
        if source.is_empty() {
            return Err(DomainError::MissingParameter("image".to_string()).into());
        }
        transform.validate(self.options.max_dimension)?;

        let decoded = self.decode(&source, &transform)?;
        advance(stage, PipelineStage::Decoded, transform.name());

        advance(stage, PipelineStage::Transforming, transform.name());
        let (result, message) = self.transform(decoded, &transform).await?;

        let image = self
            .image_processor
            .encode(&result)
            .map_err(|e| TransformError::Encode(e.to_string()))?;
        advance(stage, PipelineStage::Encoded, transform.name());

        Ok(TransformOutcome {
            image,
            content_type: self.image_processor.content_type(),
            width: result.width(),
            height: result.height(),
            message,
        })
    }

    fn decode(&self, source: &[u8], transform: &Transform) -> Result<DecodedRequest, ApplicationError> {
        let source = self.image_processor.decode(source).map_err(ApplicationError::Decode)?;
        let background = match transform {
            Transform::ApplyImageBackground(bytes) => {
                Some(self.image_processor.decode(bytes).map_err(ApplicationError::Decode)?)
            }
            _ => None,
        };
        Ok(DecodedRequest { source, background })
    }

    async fn transform(
        &self,
        decoded: DecodedRequest,
        transform: &Transform,
    ) -> Result<(Raster, String), ApplicationError> {
        let DecodedRequest { source, background } = decoded;
        match transform {
            Transform::RemoveBackground => {
                let foreground = self.separate(&source).await?;
                Ok((foreground, "Background removed successfully!".to_string()))
            }
            Transform::ApplySolidBackground(color) => {
                warn_if_opaque(&source);
                let result = self.image_processor.apply_solid_background(&source, *color)?;
                Ok((result, format!("Background changed to {}!", color)))
            }
            Transform::ApplyImageBackground(_) => {
                warn_if_opaque(&source);
                let background = background.ok_or_else(|| {
                    DomainError::MissingParameter("background_image".to_string())
                })?;
                let result = self.image_processor.composite(&source, &background)?;
                Ok((result, "Image background applied successfully!".to_string()))
            }
            Transform::Resize(width, height) => {
                self.check_resize_target(&source, *width, *height)?;
                let result = self.image_processor.resize(&source, *width, *height)?;
                let message = if width.is_auto() && height.is_auto() {
                    "Image size is original.".to_string()
                } else {
                    format!("Image resized to {}x{}.", result.width(), result.height())
                };
                Ok((result, message))
            }
        }
    }

    // auto 側の軸もソースの比率次第で上限を超えうる
    fn check_resize_target(&self, source: &Raster, width: Dimension, height: Dimension) -> Result<(), DomainError> {
        let limit = self.options.max_dimension;
        match resizer::target_dimensions(source.dimensions(), width, height) {
            Some((w, h)) if w > limit || h > limit => Err(DomainError::InvalidDimension(format!(
                "resize target {}x{} exceeds the maximum of {} pixels per axis",
                w, h, limit
            ))),
            _ => Ok(()),
        }
    }

    async fn separate(&self, source: &Raster) -> Result<Raster, ApplicationError> {
        // 正規化した PNG を外部サービスへ渡す
        let normalized = self
            .image_processor
            .encode(source)
            .map_err(|e| TransformError::Encode(e.to_string()))?;

        let timeout = self.options.separator_timeout;
        let separated = tokio::time::timeout(timeout, self.separator.separate(normalized))
            .await
            .map_err(|_| SeparatorError::Timeout(timeout))??;

        let foreground = self
            .image_processor
            .decode(&separated)
            .map_err(|e| SeparatorError::InvalidOutput(e.to_string()))?;
        Ok(foreground)
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage, transform_name: &str) {
    log::debug!("Pipeline[{}]: {} -> {}", transform_name, stage, next);
    *stage = next;
}

fn warn_if_opaque(source: &Raster) {
    if !source.has_transparency() {
        log::warn!(
            "Source {}x{} has no transparent pixels; the background will not show through",
            source.width(),
            source.height()
        );
    }
}
