use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ChainStage, ValidationError, WizardError};
use super::review::{advance_label, image_type_warnings, review_rows, ReviewRow};
use super::state::{transition, Action, Transition, WizardContext, WizardEvent, WizardState};
use super::step::Step;
use super::validation::missing_required_fields;
use crate::api::ApiError;
use crate::models::{Blueprint, ComposeQueue, ImageType, ProviderCatalog};
use crate::services::{
    BlueprintService, ComposeService, NotificationKind, Notifier, UploadProviderCatalog, WizardHost,
};

/// Collaborators handed to the wizard when it opens.
#[derive(Clone)]
pub struct WizardServices {
    pub blueprints: Arc<dyn BlueprintService>,
    pub composes: Arc<dyn ComposeService>,
    pub uploads: Arc<dyn UploadProviderCatalog>,
    pub notifier: Arc<dyn Notifier>,
    pub host: Arc<dyn WizardHost>,
}

/// Drives the create-image wizard for one blueprint, from open to close.
pub struct WizardController {
    services: WizardServices,
    timeout: Duration,
    blueprint: Blueprint,
    image_types: Vec<ImageType>,
    providers: ProviderCatalog,
    queue: Option<ComposeQueue>,
    state: WizardState,
    open: bool,
}

impl WizardController {
    /// Opens the wizard and loads what it needs. `image_types` is the
    /// caller's cached list and is only fetched when empty.
    pub async fn open(
        services: WizardServices,
        blueprint: Blueprint,
        image_types: Vec<ImageType>,
        timeout: Duration,
    ) -> Result<Self, WizardError> {
        let providers = match services.uploads.fetch_upload_providers().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(%e, "Upload providers unavailable, continuing without upload options");
                ProviderCatalog::new()
            }
        };

        let image_types = if image_types.is_empty() {
            services.composes.fetch_compose_types().await.map_err(WizardError::Fetch)?
        } else {
            image_types
        };

        let queue = match services.composes.fetch_compose_queue().await {
            Ok(q) => Some(q),
            Err(e) => {
                tracing::warn!(%e, "Compose queue unavailable");
                None
            }
        };

        tracing::debug!(
            blueprint = %blueprint.name,
            image_types = image_types.len(),
            "Create image wizard opened"
        );

        Ok(Self {
            services,
            timeout,
            blueprint,
            image_types,
            providers,
            queue,
            state: WizardState::default(),
            open: true,
        })
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn image_types(&self) -> &[ImageType] {
        &self.image_types
    }

    pub fn providers(&self) -> &ProviderCatalog {
        &self.providers
    }

    pub fn queue(&self) -> Option<&ComposeQueue> {
        self.queue.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current_step(&self) -> Step {
        self.state.step
    }

    pub fn visible_steps(&self) -> Vec<Step> {
        self.state.visible_steps()
    }

    pub fn missing_required_fields(&self) -> bool {
        missing_required_fields(&self.state, &self.providers)
    }

    /// Whether the advance control is enabled.
    pub fn can_advance(&self) -> bool {
        !self.state.image_type.is_empty() && !(self.state.step == Step::Review && self.missing_required_fields())
    }

    pub fn can_go_back(&self) -> bool {
        self.state.step != Step::ImageType
    }

    pub fn advance_label(&self) -> &'static str {
        advance_label(&self.state, &self.blueprint)
    }

    pub fn warnings(&self) -> Vec<&'static str> {
        image_type_warnings(&self.blueprint)
    }

    /// Summary rows for the review step; empty without a provider.
    pub fn review_rows(&self) -> Vec<ReviewRow> {
        self.state
            .provider
            .as_deref()
            .and_then(|id| self.providers.get(id))
            .map(|p| review_rows(&self.state, p))
            .unwrap_or_default()
    }

    /// Applies one user event. A failed commit or compose keeps the wizard
    /// open with its state, so the same event can be dispatched again.
    pub async fn dispatch(&mut self, event: WizardEvent) -> Result<(), WizardError> {
        if !self.open {
            return Err(WizardError::Closed);
        }
        let ctx = WizardContext {
            image_types: &self.image_types,
            providers: &self.providers,
        };
        let Transition { state, action } = transition(&self.state, event, &ctx)?;
        tracing::debug!(step = %state.step, ?action, "Wizard transition");
        self.state = state;

        match action {
            Action::None => Ok(()),
            Action::Close => {
                self.close();
                Ok(())
            }
            Action::CreateImage => self.create_image().await,
        }
    }

    async fn create_image(&mut self) -> Result<(), WizardError> {
        if self.blueprint.name.is_empty() {
            return Err(ValidationError::EmptyBlueprintName.into());
        }
        if self.blueprint.has_pending_changes() {
            self.commit().await?;
        }
        self.start_compose().await?;
        self.close();
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), WizardError> {
        let notifier = &self.services.notifier;
        let name = self.blueprint.name.clone();
        notifier.dismiss(NotificationKind::Committed);
        notifier.dismiss(NotificationKind::Committing);
        notifier.notify(&name, NotificationKind::Committing);

        let commit = self.services.blueprints.commit_blueprint(&self.blueprint);
        self.guard(ChainStage::Commit, commit).await?;
        notifier.notify(&name, NotificationKind::Committed);

        let reload = self.services.blueprints.reload_blueprint_details(&self.blueprint);
        let details = self.guard(ChainStage::Reload, reload).await?;

        tracing::info!(blueprint = %name, version = %details.version, "Blueprint committed");
        self.blueprint = self.blueprint.committed(&details.version);
        self.services.host.set_blueprint(self.blueprint.clone());
        Ok(())
    }

    async fn start_compose(&self) -> Result<(), WizardError> {
        let name = &self.blueprint.name;
        self.services.notifier.notify(name, NotificationKind::ImageWaiting);
        let upload = self.state.upload_payload();
        let start = self
            .services
            .composes
            .start_compose(name, &self.state.image_type, upload.as_ref());
        self.guard(ChainStage::Compose, start).await?;
        tracing::info!(blueprint = %name, image_type = %self.state.image_type, upload = upload.is_some(), "Image creation requested");
        Ok(())
    }

    /// Runs one step of the create-image chain under the configured timeout.
    async fn guard<T, F>(&self, stage: ChainStage, fut: F) -> Result<T, WizardError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let blueprint = self.blueprint.name.clone();
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                tracing::error!(%source, %stage, blueprint = %blueprint, "Create image step failed");
                Err(match stage {
                    ChainStage::Commit | ChainStage::Reload => WizardError::CommitFailed { blueprint, source },
                    ChainStage::Compose => WizardError::ComposeStartFailed { blueprint, source },
                })
            }
            Err(_) => {
                tracing::error!(%stage, blueprint = %blueprint, "Create image step timed out");
                Err(WizardError::Timeout {
                    stage,
                    after: self.timeout,
                })
            }
        }
    }

    fn close(&mut self) {
        self.state = WizardState::default();
        self.queue = None;
        self.open = false;
        self.services.host.close();
        tracing::debug!(blueprint = %self.blueprint.name, "Create image wizard closed");
    }
}
