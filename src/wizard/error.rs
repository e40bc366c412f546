use std::time::Duration;
use thiserror::Error;

use super::step::Step;
use crate::api::ApiError;

/// Input problems that block advancing. The wizard state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select an image type first")]
    NoImageType,

    #[error("Image type {0} is not available")]
    ImageTypeUnavailable(String),

    #[error("Uploading {image_type} images to {provider} is not supported")]
    ProviderNotOffered { provider: String, image_type: String },

    #[error("Required information is missing")]
    MissingRequiredFields,

    #[error("{field} is not a field of the {step} step")]
    UnknownField { field: String, step: Step },

    #[error("{action} is not possible on the {step} step")]
    WrongStep { action: &'static str, step: Step },

    #[error("The blueprint has no name")]
    EmptyBlueprintName,
}

/// Which part of the create-image chain was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStage {
    Commit,
    Reload,
    Compose,
}

impl std::fmt::Display for ChainStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChainStage::Commit => "blueprint commit",
            ChainStage::Reload => "blueprint reload",
            ChainStage::Compose => "compose start",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown upload provider: {0}")]
    UnknownProvider(String),

    /// Commit or the follow-up reload failed; compose was not started.
    #[error("Failed to commit blueprint {blueprint}: {source}")]
    CommitFailed {
        blueprint: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to start compose for {blueprint}: {source}")]
    ComposeStartFailed {
        blueprint: String,
        #[source]
        source: ApiError,
    },

    /// The stage was abandoned after `after`. A compose request may still
    /// have reached the server, so a compose timeout is not retryable.
    #[error("The {stage} did not finish within {}s", .after.as_secs())]
    Timeout { stage: ChainStage, after: Duration },

    #[error("Failed to load wizard data: {0}")]
    Fetch(#[source] ApiError),

    #[error("The wizard is closed")]
    Closed,
}

impl WizardError {
    /// Failures after which the user may simply try again.
    pub fn is_retryable(&self) -> bool {
        match self {
            WizardError::CommitFailed { .. } | WizardError::ComposeStartFailed { .. } => true,
            WizardError::Timeout { stage, .. } => *stage != ChainStage::Compose,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_timeout_is_not_retryable() {
        let timeout = |stage| WizardError::Timeout {
            stage,
            after: Duration::from_secs(30),
        };
        assert!(timeout(ChainStage::Commit).is_retryable());
        assert!(timeout(ChainStage::Reload).is_retryable());
        assert!(!timeout(ChainStage::Compose).is_retryable());
        assert!(!WizardError::Closed.is_retryable());
    }
}
