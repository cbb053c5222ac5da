use crate::infrastructure::error::InfrastructureError;
use async_trait::async_trait;

// アップロード画像・変換結果の保存先. 呼び出し側が所有して注入する
#[async_trait]
pub trait ImageStore {
    /// Stores `bytes` and returns the key to fetch them again.
    async fn put(&self, bytes: Vec<u8>) -> Result<String, InfrastructureError>;

    /// `Ok(None)` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, InfrastructureError>;
}
