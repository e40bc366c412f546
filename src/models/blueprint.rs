use serde::{Deserialize, Serialize};

/// A package or module entry of a blueprint.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub name: String,
}

/// An edit that has not been persisted to the blueprint store yet.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    #[serde(default)]
    pub component_old: Option<String>,
    #[serde(default)]
    pub component_new: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Blueprint {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub packages: Vec<Component>,
    #[serde(default)]
    pub modules: Vec<Component>,
    #[serde(default)]
    pub groups: Vec<Group>,
    // Pending changes are client-side bookkeeping and never sent to the API.
    #[serde(default, skip_serializing, alias = "workspacePendingChanges")]
    pub workspace_pending_changes: Vec<PendingChange>,
    #[serde(default, skip_serializing, alias = "localPendingChanges")]
    pub local_pending_changes: Vec<PendingChange>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.workspace_pending_changes.is_empty() || !self.local_pending_changes.is_empty()
    }

    /// True when the blueprint does not list any package.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Snapshot after a successful commit: server version, nothing pending.
    pub fn committed(&self, version: &str) -> Self {
        Self {
            version: version.to_string(),
            workspace_pending_changes: Vec::new(),
            local_pending_changes: Vec::new(),
            ..self.clone()
        }
    }
}

/// Metadata returned when blueprint details are reloaded after a commit.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlueprintDetails {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Set when the server still holds uncommitted workspace edits.
    #[serde(default)]
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_changes_from_either_list() {
        let mut bp = Blueprint::new("web-server");
        assert!(!bp.has_pending_changes());

        bp.local_pending_changes.push(PendingChange {
            component_old: None,
            component_new: Some("httpd-2.4".into()),
        });
        assert!(bp.has_pending_changes());

        bp.local_pending_changes.clear();
        bp.workspace_pending_changes.push(PendingChange::default());
        assert!(bp.has_pending_changes());
    }

    #[test]
    fn committed_snapshot_takes_version_and_clears_changes() {
        let mut bp = Blueprint::new("web-server");
        bp.version = "0.0.1".into();
        bp.packages.push(Component { name: "httpd".into(), version: "*".into() });
        bp.local_pending_changes.push(PendingChange::default());

        let next = bp.committed("0.0.2");
        assert_eq!(next.version, "0.0.2");
        assert_eq!(next.packages, bp.packages);
        assert!(!next.has_pending_changes());
    }

    #[test]
    fn pending_changes_are_not_serialized() {
        let json = r#"{
            "name": "base",
            "packages": [{"name": "tmux", "version": "*"}],
            "localPendingChanges": [{"componentNew": "tmux-*"}]
        }"#;
        let bp: Blueprint = serde_json::from_str(json).unwrap();
        assert_eq!(bp.local_pending_changes.len(), 1);

        let out = serde_json::to_value(&bp).unwrap();
        assert!(out.get("local_pending_changes").is_none());
        assert_eq!(out["packages"][0]["name"], "tmux");
    }
}
