use crate::domain::separator::{Separator, SeparatorError};
use async_trait::async_trait;

/// Returns the image untouched. Used when no removal service is deployed.
pub struct PassthroughSeparator;

impl PassthroughSeparator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Separator for PassthroughSeparator {
    async fn separate(&self, image: Vec<u8>) -> Result<Vec<u8>, SeparatorError> {
        log::debug!("PassthroughSeparator: skipping background removal ({} bytes)", image.len());
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_input_unchanged() {
        let input = vec![9, 8, 7];
        assert_eq!(PassthroughSeparator::new().separate(input.clone()).await.unwrap(), input);
    }
}
