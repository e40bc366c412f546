use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Upload instructions attached to a compose request.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadPayload {
    pub image_name: String,
    pub provider: String,
    pub settings: BTreeMap<String, String>,
}

/// Body of a compose start request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ComposeRequest {
    pub blueprint_name: String,
    pub compose_type: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadPayload>,
}

impl ComposeRequest {
    pub fn new(blueprint_name: &str, compose_type: &str, upload: Option<&UploadPayload>) -> Self {
        Self {
            blueprint_name: blueprint_name.to_string(),
            compose_type: compose_type.to_string(),
            branch: "master".to_string(),
            upload: upload.cloned(),
        }
    }
}

/// Builds waiting and running on the compose server. Entries are kept opaque.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ComposeQueue {
    #[serde(default)]
    pub new: Vec<Value>,
    #[serde(default)]
    pub run: Vec<Value>,
}

impl ComposeQueue {
    pub fn len(&self) -> usize {
        self.new.len() + self.run.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
