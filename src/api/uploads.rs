use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use super::client::ComposerClient;
use super::error::ApiError;
use crate::models::{ProviderCatalog, UploadProvider};
use crate::services::UploadProviderCatalog;

fn parse_providers(payload: &Value) -> Result<ProviderCatalog, ApiError> {
    let providers = payload.get("providers").unwrap_or(payload);
    let raw: BTreeMap<String, UploadProvider> =
        serde_json::from_value(providers.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(raw.into_iter().collect())
}

#[async_trait]
impl UploadProviderCatalog for ComposerClient {
    async fn fetch_upload_providers(&self) -> Result<ProviderCatalog, ApiError> {
        let payload = self.call("GET", "/api/v1/upload/providers", None).await?;
        parse_providers(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn providers_envelope_is_unwrapped() {
        let payload = json!({"providers": {"aws": {
            "displayName": "AWS",
            "auth": {"accessKeyID": {"displayText": "Access key ID"}},
            "settings": {"bucket": {"displayText": "S3 bucket"}}
        }}});
        let catalog = parse_providers(&payload).unwrap();
        let aws = catalog.get("aws").unwrap();
        assert_eq!(aws.id, "aws");
        assert_eq!(aws.field_count(), 2);
        assert!(!aws.auth["accessKeyID"].is_secret);
    }
}
