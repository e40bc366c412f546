use super::state::WizardState;
use crate::models::ProviderCatalog;

/// True when the upload form is incomplete: no provider, no image name, a
/// descriptor without a value, or an empty value.
pub fn missing_required_fields(state: &WizardState, providers: &ProviderCatalog) -> bool {
    let Some(provider) = state.provider.as_deref().and_then(|id| providers.get(id)) else {
        return true;
    };
    if state.image_name.is_empty() {
        return true;
    }
    if state.upload_settings.len() != provider.field_count() {
        return true;
    }
    state.upload_settings.values().any(|v| v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDescriptor, UploadProvider};

    fn catalog() -> ProviderCatalog {
        let mut aws = UploadProvider::default();
        aws.auth.insert("accessKeyID".into(), FieldDescriptor::new("Access key ID", false));
        aws.auth.insert("secretAccessKey".into(), FieldDescriptor::new("Secret access key", true));
        aws.settings.insert("region".into(), FieldDescriptor::new("AWS region", false));
        aws.settings.insert("bucket".into(), FieldDescriptor::new("S3 bucket", false));
        let mut catalog = ProviderCatalog::new();
        catalog.insert("aws", aws);
        catalog
    }

    fn complete() -> WizardState {
        let mut state = WizardState {
            image_type: "ami".into(),
            image_name: "web-server".into(),
            provider: Some("aws".into()),
            show_upload_steps: true,
            show_review_step: true,
            ..Default::default()
        };
        for (k, v) in [
            ("accessKeyID", "AKIA"),
            ("secretAccessKey", "abcde"),
            ("region", "us-east-1"),
            ("bucket", "images"),
        ] {
            state.upload_settings.insert(k.into(), v.into());
        }
        state
    }

    #[test]
    fn complete_form_passes() {
        assert!(!missing_required_fields(&complete(), &catalog()));
    }

    #[test]
    fn no_provider_fails() {
        let mut state = complete();
        state.provider = None;
        assert!(missing_required_fields(&state, &catalog()));
    }

    #[test]
    fn provider_missing_from_catalog_fails() {
        let mut state = complete();
        state.provider = Some("azure".into());
        assert!(missing_required_fields(&state, &catalog()));
    }

    #[test]
    fn empty_image_name_fails() {
        let mut state = complete();
        state.image_name.clear();
        assert!(missing_required_fields(&state, &catalog()));
    }

    #[test]
    fn field_count_mismatch_fails() {
        let mut state = complete();
        state.upload_settings.remove("bucket");
        assert!(missing_required_fields(&state, &catalog()));
    }

    #[test]
    fn empty_value_fails() {
        let mut state = complete();
        state.upload_settings.insert("region".into(), String::new());
        assert!(missing_required_fields(&state, &catalog()));
    }
}
