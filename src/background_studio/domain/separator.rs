use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeparatorError {
    #[error("Background removal service is not configured")]
    NotConfigured,

    #[error("Background removal timed out after {0:?}")]
    Timeout(Duration),

    #[error("Background removal service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Background removal request failed: {0}")]
    Transport(String),

    #[error("Background removal returned an unreadable image: {0}")]
    InvalidOutput(String),
}

impl SeparatorError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SeparatorError::Timeout(_) | SeparatorError::Transport(_) => true,
            SeparatorError::Service { status, .. } => *status == 429 || *status >= 500,
            SeparatorError::NotConfigured | SeparatorError::InvalidOutput(_) => false,
        }
    }
}

/// 前景抽出 (外部サービス). 入力・出力ともにエンコード済みの画像バイト列.
///
/// A second call on the same input may return a slightly different mask.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Separator {
    async fn separate(&self, image: Vec<u8>) -> Result<Vec<u8>, SeparatorError>;
}
