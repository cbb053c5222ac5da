use crate::domain::separator::{Separator, SeparatorError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

pub const DEFAULT_REMOVE_BG_API_URL: &str = "https://api.remove.bg/v1.0/removebg";

// remove.bg API を使った前景抽出
pub struct RemoveBgSeparator {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl RemoveBgSeparator {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn transport_error(error: reqwest::Error) -> SeparatorError {
        SeparatorError::Transport(error.to_string())
    }
}

#[async_trait]
impl Separator for RemoveBgSeparator {
    async fn separate(&self, image: Vec<u8>) -> Result<Vec<u8>, SeparatorError> {
        let api_key = self.api_key.as_deref().ok_or(SeparatorError::NotConfigured)?;

        log::info!("Sending image to remove.bg ({} bytes)", image.len());
        let part = Part::bytes(image)
            .file_name("image.png")
            .mime_str("image/png")
            .map_err(Self::transport_error)?;
        let form = Form::new().part("image_file", part).text("size", "auto");

        let response = self
            .client
            .post(&self.api_url)
            .header("X-Api-Key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::warn!("remove.bg answered {}: {}", status, message);
            return Err(SeparatorError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(Self::transport_error)?;
        Ok(body.to_vec())
    }
}
