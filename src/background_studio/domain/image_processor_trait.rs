use crate::domain::color::Color;
use crate::domain::dimension::Dimension;
use crate::domain::error::TransformError;
use crate::domain::raster::Raster;
use crate::infrastructure::error::InfrastructureError;

// コーデックと画像変換をまとめたトレイト. パイプラインはこれ経由でのみ画素を触る
pub trait ImageProcessor {
    /// Any supported raster format in, RGBA8 out.
    fn decode(&self, bytes: &[u8]) -> Result<Raster, InfrastructureError>;

    /// Canonical lossless output; alpha is preserved exactly.
    fn encode(&self, raster: &Raster) -> Result<Vec<u8>, InfrastructureError>;

    fn content_type(&self) -> &'static str;

    fn composite(&self, foreground: &Raster, background: &Raster) -> Result<Raster, TransformError>;

    fn apply_solid_background(&self, foreground: &Raster, color: Color) -> Result<Raster, TransformError>;

    fn resize(&self, source: &Raster, width: Dimension, height: Dimension) -> Result<Raster, TransformError>;
}
