//! Capabilities the image wizard consumes.
//!
//! The wizard never talks to the network or the terminal directly; it is
//! handed implementations of these traits. `crate::api::ComposerClient`
//! implements the three service traits over HTTP, and tests substitute
//! recording fakes.

pub mod notifier;

use async_trait::async_trait;

use crate::api::ApiError;
use crate::models::{Blueprint, BlueprintDetails, ComposeQueue, ImageType, ProviderCatalog, UploadPayload};

pub use notifier::{ConsoleNotifier, NotificationKind, Notifier};

/// Source of upload destinations and their form descriptors.
#[async_trait]
pub trait UploadProviderCatalog: Send + Sync {
    async fn fetch_upload_providers(&self) -> Result<ProviderCatalog, ApiError>;
}

#[async_trait]
pub trait ComposeService: Send + Sync {
    async fn fetch_compose_types(&self) -> Result<Vec<ImageType>, ApiError>;

    async fn fetch_compose_queue(&self) -> Result<ComposeQueue, ApiError>;

    /// Starts building `compose_type` from the named blueprint, uploading the
    /// result when `upload` is given.
    async fn start_compose(
        &self,
        blueprint_name: &str,
        compose_type: &str,
        upload: Option<&UploadPayload>,
    ) -> Result<(), ApiError>;
}

#[async_trait]
pub trait BlueprintService: Send + Sync {
    /// Persists the blueprint, pending changes included.
    async fn commit_blueprint(&self, blueprint: &Blueprint) -> Result<(), ApiError>;

    /// Fetches metadata the server assigned during a commit, such as the version.
    async fn reload_blueprint_details(&self, blueprint: &Blueprint) -> Result<BlueprintDetails, ApiError>;
}

/// Requests the wizard sends back to whoever opened it.
pub trait WizardHost: Send + Sync {
    /// Replace the stored blueprint with the committed snapshot.
    fn set_blueprint(&self, blueprint: Blueprint);

    /// Dismiss the wizard.
    fn close(&self);
}
