//! Server configuration, read from flags or the environment.

use crate::application::error::ApplicationError;
use crate::application::pipeline_service::PipelineOptions;
use crate::infrastructure::remove_bg_separator::DEFAULT_REMOVE_BG_API_URL;
use crate::infrastructure::retry::RetryPolicy;
use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorKind {
    /// remove.bg HTTP API
    RemoveBg,
    /// Return images unchanged
    Passthrough,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    File,
}

/// Background removal and image transform server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Foreground extraction backend
    #[arg(long, env = "SEPARATOR", value_enum, default_value_t = SeparatorKind::RemoveBg)]
    pub separator: SeparatorKind,

    /// API key for remove.bg
    #[arg(long, env = "REMOVE_BG_API_KEY", hide_env_values = true)]
    pub remove_bg_api_key: Option<String>,

    #[arg(long, env = "REMOVE_BG_API_URL", default_value = DEFAULT_REMOVE_BG_API_URL)]
    pub remove_bg_api_url: String,

    /// Timeout for one background removal call, in seconds
    #[arg(long, env = "SEPARATOR_TIMEOUT_SECS", default_value_t = 30)]
    pub separator_timeout_secs: u64,

    /// Retries after a transient background removal failure
    #[arg(long, env = "SEPARATOR_RETRIES", default_value_t = 2)]
    pub separator_retries: u32,

    /// Initial retry backoff, doubled on every retry
    #[arg(long, env = "RETRY_BACKOFF_MS", default_value_t = 250)]
    pub retry_backoff_ms: u64,

    /// Largest accepted width or height, for decoding and resizing
    #[arg(long, env = "MAX_DIMENSION", default_value_t = 10_000)]
    pub max_dimension: u32,

    /// Largest accepted request body
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Where uploads and results are kept
    #[arg(long, env = "STORAGE", value_enum, default_value_t = StorageKind::Memory)]
    pub storage: StorageKind,

    #[arg(long, env = "STORAGE_DIR", default_value = "uploads", value_hint = clap::ValueHint::DirPath)]
    pub storage_dir: PathBuf,

    /// Images kept by the memory store before the oldest is dropped
    #[arg(long, env = "MEMORY_STORE_CAPACITY", default_value_t = 256)]
    pub memory_store_capacity: usize,

    /// Frontend build to serve for unmatched routes
    #[arg(long, env = "STATIC_DIR", value_hint = clap::ValueHint::DirPath)]
    pub static_dir: Option<PathBuf>,

    /// Allowed CORS origin (any origin when unset)
    #[arg(long, env = "CORS_ALLOW_ORIGIN")]
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.separator_timeout_secs == 0 {
            return Err(ApplicationError::ConfigurationError(
                "separator timeout must be at least one second".to_string(),
            ));
        }
        if self.max_dimension == 0 {
            return Err(ApplicationError::ConfigurationError(
                "max dimension must be positive".to_string(),
            ));
        }
        if self.storage == StorageKind::Memory && self.memory_store_capacity == 0 {
            return Err(ApplicationError::ConfigurationError(
                "memory store capacity must be positive".to_string(),
            ));
        }
        self.cors_origin_header()?;
        if self.separator == SeparatorKind::RemoveBg && self.remove_bg_api_key.is_none() {
            log::warn!("REMOVE_BG_API_KEY is not set; background removal requests will fail");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            separator_timeout: Duration::from_secs(self.separator_timeout_secs),
            max_dimension: self.max_dimension,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.separator_retries, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn cors_origin_header(&self) -> Result<Option<HeaderValue>, ApplicationError> {
        self.cors_origin
            .as_deref()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| {
                    ApplicationError::ConfigurationError(format!("invalid CORS origin '{}': {}", origin, e))
                })
            })
            .transpose()
    }
}
