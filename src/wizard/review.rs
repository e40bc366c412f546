use super::state::WizardState;
use super::step::Step;
use crate::models::{Blueprint, FieldDescriptor, UploadProvider};

/// One line of the review summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub label: String,
    pub value: String,
}

/// Replaces every character of a secret with `*`.
pub fn mask_secret(value: &str) -> String {
    "*".repeat(value.chars().count())
}

fn row(key: &str, descriptor: &FieldDescriptor, state: &WizardState) -> ReviewRow {
    let value = match state.upload_settings.get(key) {
        Some(v) if descriptor.is_secret => mask_secret(v),
        Some(v) => v.clone(),
        None => String::new(),
    };
    ReviewRow {
        label: descriptor.display_text.clone(),
        value,
    }
}

/// Auth fields, then the image name, then the provider settings.
pub fn review_rows(state: &WizardState, provider: &UploadProvider) -> Vec<ReviewRow> {
    let mut rows: Vec<ReviewRow> = provider.auth.iter().map(|(k, d)| row(k, d, state)).collect();
    rows.push(ReviewRow {
        label: "Image name".to_string(),
        value: state.image_name.clone(),
    });
    rows.extend(provider.settings.iter().map(|(k, d)| row(k, d, state)));
    rows
}

/// Text of the advance control for the current step.
pub fn advance_label(state: &WizardState, blueprint: &Blueprint) -> &'static str {
    match state.step {
        Step::ImageType => match (state.provider.is_some(), blueprint.has_pending_changes()) {
            (true, true) => "Commit and next",
            (true, false) => "Next",
            (false, true) => "Commit and create",
            (false, false) => "Create",
        },
        Step::Review => "Finish",
        _ => "Next",
    }
}

/// Inline warnings shown on the image type step.
pub fn image_type_warnings(blueprint: &Blueprint) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if blueprint.has_pending_changes() {
        warnings.push(
            "This blueprint has changes that are not committed. \
             These changes will be committed before the image is created.",
        );
    }
    if blueprint.is_empty() {
        warnings.push("This blueprint is empty.");
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PendingChange;

    fn aws() -> UploadProvider {
        let mut aws = UploadProvider::default();
        aws.auth.insert("accessKeyID".into(), FieldDescriptor::new("Access key ID", false));
        aws.auth.insert("secretAccessKey".into(), FieldDescriptor::new("Secret access key", true));
        aws.settings.insert("bucket".into(), FieldDescriptor::new("S3 bucket", false));
        aws
    }

    #[test]
    fn secret_is_masked_to_its_length() {
        assert_eq!(mask_secret("abcde"), "*****");
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("pässwörd"), "********");
    }

    #[test]
    fn rows_mask_secrets_and_keep_order() {
        let mut state = WizardState {
            image_name: "web".into(),
            provider: Some("aws".into()),
            ..Default::default()
        };
        state.upload_settings.insert("accessKeyID".into(), "AKIA".into());
        state.upload_settings.insert("secretAccessKey".into(), "abcde".into());

        let rows = review_rows(&state, &aws());
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Access key ID", "Secret access key", "Image name", "S3 bucket"]);
        assert_eq!(rows[0].value, "AKIA");
        assert_eq!(rows[1].value, "*****");
        assert_eq!(rows[2].value, "web");
        assert_eq!(rows[3].value, "");
    }

    #[test]
    fn advance_label_reflects_provider_and_pending_changes() {
        let mut bp = Blueprint::new("base");
        let mut state = WizardState::default();
        assert_eq!(advance_label(&state, &bp), "Create");

        bp.local_pending_changes.push(PendingChange::default());
        assert_eq!(advance_label(&state, &bp), "Commit and create");

        state.provider = Some("aws".into());
        assert_eq!(advance_label(&state, &bp), "Commit and next");

        state.step = Step::UploadAuth;
        assert_eq!(advance_label(&state, &bp), "Next");
        state.step = Step::Review;
        assert_eq!(advance_label(&state, &bp), "Finish");
    }

    #[test]
    fn warnings_for_pending_and_empty_blueprint() {
        let mut bp = Blueprint::new("base");
        assert_eq!(image_type_warnings(&bp), vec!["This blueprint is empty."]);
        bp.workspace_pending_changes.push(PendingChange::default());
        assert_eq!(image_type_warnings(&bp).len(), 2);
    }
}
