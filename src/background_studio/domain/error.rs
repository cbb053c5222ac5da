use thiserror::Error;

// クライアント起因のエラー (400 系)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Malformed form data: {0}")]
    MalformedForm(String),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),
}

// 変換処理中の内部エラー (実装バグ扱い)
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Raster size mismatch: foreground {foreground:?}, background {background:?}")]
    SizeMismatch {
        foreground: (u32, u32),
        background: (u32, u32),
    },

    #[error("Resample target must be at least 1x1, got {0}x{1}")]
    EmptyTarget(u32, u32),

    #[error("Invalid intermediate raster: {0}")]
    InvalidRaster(#[from] DomainError),

    #[error("Encoding failed: {0}")]
    Encode(String),
}
