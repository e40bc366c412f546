use async_trait::async_trait;
use serde_json::Value;

use super::client::ComposerClient;
use super::error::ApiError;
use crate::models::{Blueprint, BlueprintDetails, PendingChange};
use crate::services::BlueprintService;

/// Info endpoint for one blueprint.
fn info_endpoint(name: &str) -> String {
    format!("/api/v1/blueprints/info/{}", urlencoding::encode(name))
}

/// Picks the named blueprint and its workspace flag out of an info payload.
fn parse_info(payload: &Value, name: &str) -> Result<(Blueprint, bool), ApiError> {
    let entry = payload
        .get("blueprints")
        .and_then(|b| b.as_array())
        .and_then(|arr| arr.iter().find(|b| b.get("name").and_then(|n| n.as_str()) == Some(name)))
        .ok_or_else(|| ApiError::Api(format!("{}: blueprint not found", name)))?;
    let blueprint: Blueprint =
        serde_json::from_value(entry.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
    let changed = payload
        .get("changes")
        .and_then(|c| c.as_array())
        .map(|arr| {
            arr.iter().any(|c| {
                c.get("name").and_then(|n| n.as_str()) == Some(name)
                    && c.get("changed").and_then(|v| v.as_bool()).unwrap_or(false)
            })
        })
        .unwrap_or(false);
    Ok((blueprint, changed))
}

impl ComposerClient {
    /// Loads a blueprint. Uncommitted workspace edits on the server show up
    /// as a workspace pending change.
    pub async fn get_blueprint(&self, name: &str) -> Result<Blueprint, ApiError> {
        let payload = self.call("GET", &info_endpoint(name), None).await?;
        let (mut blueprint, changed) = parse_info(&payload, name)?;
        if changed {
            blueprint.workspace_pending_changes.push(PendingChange::default());
        }
        Ok(blueprint)
    }
}

#[async_trait]
impl BlueprintService for ComposerClient {
    async fn commit_blueprint(&self, blueprint: &Blueprint) -> Result<(), ApiError> {
        let body = serde_json::to_value(blueprint).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.call("POST", "/api/v1/blueprints/new", Some(body)).await?;
        tracing::debug!(blueprint = %blueprint.name, "Blueprint posted");
        Ok(())
    }

    async fn reload_blueprint_details(&self, blueprint: &Blueprint) -> Result<BlueprintDetails, ApiError> {
        let payload = self.call("GET", &info_endpoint(&blueprint.name), None).await?;
        let (fresh, changed) = parse_info(&payload, &blueprint.name)?;
        Ok(BlueprintDetails {
            name: fresh.name,
            version: fresh.version,
            description: fresh.description,
            changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn info_endpoint_escapes_the_name() {
        assert_eq!(info_endpoint("web server"), "/api/v1/blueprints/info/web%20server");
    }

    #[test]
    fn parse_info_reads_version_and_changes() {
        let payload = json!({
            "blueprints": [{"name": "base", "version": "0.0.3", "packages": [{"name": "tmux", "version": "*"}]}],
            "changes": [{"name": "base", "changed": true}],
            "errors": []
        });
        let (bp, changed) = parse_info(&payload, "base").unwrap();
        assert_eq!(bp.version, "0.0.3");
        assert_eq!(bp.packages.len(), 1);
        assert!(changed);
    }

    #[test]
    fn parse_info_without_entries_fails() {
        let payload = json!({"blueprints": [], "changes": [], "errors": []});
        assert!(matches!(parse_info(&payload, "base"), Err(ApiError::Api(_))));
    }

    #[test]
    fn parse_info_ignores_other_blueprints() {
        let payload = json!({
            "blueprints": [{"name": "database", "version": "1.2.0"}],
            "changes": [],
            "errors": []
        });
        match parse_info(&payload, "base") {
            Err(ApiError::Api(msg)) => assert_eq!(msg, "base: blueprint not found"),
            other => panic!("expected not found, got {:?}", other),
        }
    }
}
