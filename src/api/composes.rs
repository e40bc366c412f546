use async_trait::async_trait;
use serde_json::Value;

use super::client::ComposerClient;
use super::error::ApiError;
use crate::models::image_type::default_label;
use crate::models::{ComposeQueue, ComposeRequest, ImageType, UploadPayload};
use crate::services::ComposeService;

fn parse_types(payload: &Value) -> Result<Vec<ImageType>, ApiError> {
    let arr = payload
        .get("types")
        .and_then(|t| t.as_array())
        .ok_or_else(|| ApiError::Decode("missing \"types\" array".to_string()))?;
    let mut types = Vec::with_capacity(arr.len());
    for item in arr {
        let mut image_type: ImageType =
            serde_json::from_value(item.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
        if image_type.label.is_empty() {
            if let Some(label) = default_label(&image_type.name) {
                image_type.label = label.to_string();
            }
        }
        types.push(image_type);
    }
    types.sort_by(|a, b| a.display_label().cmp(b.display_label()));
    Ok(types)
}

#[async_trait]
impl ComposeService for ComposerClient {
    async fn fetch_compose_types(&self) -> Result<Vec<ImageType>, ApiError> {
        let payload = self.call("GET", "/api/v1/compose/types", None).await?;
        parse_types(&payload)
    }

    async fn fetch_compose_queue(&self) -> Result<ComposeQueue, ApiError> {
        let payload = self.call("GET", "/api/v1/compose/queue", None).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn start_compose(
        &self,
        blueprint_name: &str,
        compose_type: &str,
        upload: Option<&UploadPayload>,
    ) -> Result<(), ApiError> {
        let request = ComposeRequest::new(blueprint_name, compose_type, upload);
        let body = serde_json::to_value(&request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let payload = self.call("POST", "/api/v1/compose", Some(body)).await?;
        tracing::info!(
            blueprint = blueprint_name,
            compose_type,
            build_id = payload.get("build_id").and_then(|b| b.as_str()).unwrap_or(""),
            "Compose started"
        );
        Ok(())
    }
}
