use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Data decoding failed: {0}")]
    DecodingError(String),

    #[error("Underlying image library error: {0}")]
    ImageLibError(#[from] image::ImageError), // image::ImageError をラップ

    #[error("Underlying I/O error: {0}")]
    IoError(#[from] std::io::Error), // std::io::Error をラップ

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),
}
