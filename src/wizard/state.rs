use std::collections::BTreeMap;

use super::error::{ValidationError, WizardError};
use super::step::Step;
use super::validation::missing_required_fields;
use crate::models::{ImageType, ProviderCatalog, UploadPayload};

/// Everything the user has entered so far. Created fresh when the wizard
/// opens and replaced, never mutated, by [`transition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub step: Step,
    pub image_type: String,
    pub image_name: String,
    pub provider: Option<String>,
    /// Provider auth and setting values keyed by field name.
    pub upload_settings: BTreeMap<String, String>,
    pub show_upload_steps: bool,
    pub show_review_step: bool,
}

impl WizardState {
    /// Steps currently part of the wizard, in order.
    pub fn visible_steps(&self) -> Vec<Step> {
        let mut steps = vec![Step::ImageType];
        if self.show_upload_steps {
            steps.push(Step::UploadAuth);
            steps.push(Step::UploadSettings);
        }
        if self.show_review_step {
            steps.push(Step::Review);
        }
        steps
    }

    /// Upload instructions for the compose request, when a provider is selected.
    pub fn upload_payload(&self) -> Option<UploadPayload> {
        self.provider.as_ref().map(|provider| UploadPayload {
            image_name: self.image_name.clone(),
            provider: provider.clone(),
            settings: self.upload_settings.clone(),
        })
    }

    /// True when advancing from the current step starts image creation.
    pub fn advance_is_terminal(&self) -> bool {
        match self.step {
            Step::ImageType => self.provider.is_none(),
            Step::Review => true,
            _ => false,
        }
    }

    fn previous_step(&self) -> Step {
        let steps = self.visible_steps();
        match steps.iter().position(|s| *s == self.step) {
            Some(idx) if idx > 0 => steps[idx - 1],
            _ => Step::ImageType,
        }
    }

    fn next_step(&self) -> Step {
        let steps = self.visible_steps();
        steps
            .iter()
            .position(|s| *s == self.step)
            .and_then(|idx| steps.get(idx + 1).copied())
            .unwrap_or(self.step)
    }
}

/// User input the wizard reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    SelectImageType(String),
    /// Selecting the provider that is already selected deselects it.
    ToggleProvider(String),
    SetImageName(String),
    SetField { name: String, value: String },
    Next,
    Back,
    Cancel,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Commit pending changes if any, then start the compose.
    CreateImage,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WizardState,
    pub action: Action,
}

impl Transition {
    fn stay(state: WizardState) -> Self {
        Self { state, action: Action::None }
    }
}

/// Data loaded when the wizard opened.
#[derive(Debug, Clone, Copy)]
pub struct WizardContext<'a> {
    pub image_types: &'a [ImageType],
    pub providers: &'a ProviderCatalog,
}

/// Computes the state that follows `event`. Rejected events leave `state`
/// as it was and return the reason.
pub fn transition(state: &WizardState, event: WizardEvent, ctx: &WizardContext<'_>) -> Result<Transition, WizardError> {
    match event {
        WizardEvent::SelectImageType(name) => {
            require_step(state, Step::ImageType, "Changing the image type")?;
            let selectable = ctx.image_types.iter().any(|t| t.name == name && t.enabled);
            if !selectable {
                return Err(ValidationError::ImageTypeUnavailable(name).into());
            }
            // A new type invalidates every upload choice made for the old one.
            Ok(Transition::stay(WizardState {
                image_type: name,
                ..WizardState::default()
            }))
        }
        WizardEvent::ToggleProvider(id) => {
            require_step(state, Step::ImageType, "Choosing an upload provider")?;
            let provider = ctx
                .providers
                .get(&id)
                .ok_or_else(|| WizardError::UnknownProvider(id.clone()))?;
            if !provider.accepts(&state.image_type) {
                return Err(ValidationError::ProviderNotOffered {
                    provider: id,
                    image_type: state.image_type.clone(),
                }
                .into());
            }
            let mut next = state.clone();
            if state.provider.as_deref() == Some(id.as_str()) {
                next.provider = None;
                next.show_upload_steps = false;
                next.show_review_step = false;
            } else {
                // Values entered for another provider only carry over where the new one has the same field.
                next.upload_settings.retain(|name, _| provider.field(name).is_some());
                next.provider = Some(id);
                next.show_upload_steps = true;
                next.show_review_step = true;
            }
            Ok(Transition::stay(next))
        }
        WizardEvent::SetImageName(name) => {
            require_step(state, Step::UploadSettings, "Setting the image name")?;
            let mut next = state.clone();
            next.image_name = name;
            Ok(Transition::stay(next))
        }
        WizardEvent::SetField { name, value } => {
            let provider = state
                .provider
                .as_deref()
                .and_then(|id| ctx.providers.get(id))
                .ok_or(ValidationError::WrongStep {
                    action: "Entering upload settings",
                    step: state.step,
                })?;
            let known = match state.step {
                Step::UploadAuth => provider.auth.contains_key(&name),
                Step::UploadSettings => provider.settings.contains_key(&name),
                _ => false,
            };
            if !known {
                return Err(ValidationError::UnknownField {
                    field: name,
                    step: state.step,
                }
                .into());
            }
            let mut next = state.clone();
            next.upload_settings.insert(name, value);
            Ok(Transition::stay(next))
        }
        WizardEvent::Next => advance(state, ctx),
        WizardEvent::Back => {
            let mut next = state.clone();
            next.step = state.previous_step();
            Ok(Transition::stay(next))
        }
        WizardEvent::Cancel => Ok(Transition {
            state: WizardState::default(),
            action: Action::Close,
        }),
    }
}

fn advance(state: &WizardState, ctx: &WizardContext<'_>) -> Result<Transition, WizardError> {
    if state.image_type.is_empty() {
        return Err(ValidationError::NoImageType.into());
    }
    if state.advance_is_terminal() {
        if state.step == Step::Review && missing_required_fields(state, ctx.providers) {
            return Err(ValidationError::MissingRequiredFields.into());
        }
        return Ok(Transition {
            state: state.clone(),
            action: Action::CreateImage,
        });
    }
    let mut next = state.clone();
    next.step = state.next_step();
    Ok(Transition::stay(next))
}

fn require_step(state: &WizardState, step: Step, action: &'static str) -> Result<(), ValidationError> {
    if state.step == step {
        Ok(())
    } else {
        Err(ValidationError::WrongStep {
            action,
            step: state.step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDescriptor, UploadProvider};

    fn image_types() -> Vec<ImageType> {
        vec![
            ImageType::new("ami", "Amazon Web Services (.raw)", true),
            ImageType::new("qcow2", "QEMU QCOW2 (.qcow2)", true),
            ImageType::new("vmdk", "VMware VSphere (.vmdk)", false),
        ]
    }

    fn providers() -> ProviderCatalog {
        let mut aws = UploadProvider {
            display_name: "AWS".into(),
            ..Default::default()
        };
        aws.auth.insert("accessKeyID".into(), FieldDescriptor::new("Access key ID", false));
        aws.auth.insert("secretAccessKey".into(), FieldDescriptor::new("Secret access key", true));
        aws.settings.insert("bucket".into(), FieldDescriptor::new("S3 bucket", false));
        let mut store = UploadProvider {
            display_name: "Object store".into(),
            supported_types: vec!["ami".into()],
            ..Default::default()
        };
        store.auth.insert("token".into(), FieldDescriptor::new("Access token", true));
        store.settings.insert("bucket".into(), FieldDescriptor::new("Bucket", false));
        let mut catalog = ProviderCatalog::new();
        catalog.insert("aws", aws);
        catalog.insert("store", store);
        catalog
    }

    fn apply(state: &WizardState, events: Vec<WizardEvent>) -> WizardState {
        let types = image_types();
        let catalog = providers();
        let ctx = WizardContext {
            image_types: &types,
            providers: &catalog,
        };
        events.into_iter().fold(state.clone(), |s, e| transition(&s, e, &ctx).unwrap().state)
    }

    fn step(state: &WizardState, event: WizardEvent) -> Result<Transition, WizardError> {
        let types = image_types();
        let catalog = providers();
        let ctx = WizardContext {
            image_types: &types,
            providers: &catalog,
        };
        transition(state, event, &ctx)
    }

    #[test]
    fn next_without_image_type_is_refused() {
        let err = step(&WizardState::default(), WizardEvent::Next).unwrap_err();
        assert!(matches!(err, WizardError::Validation(ValidationError::NoImageType)));
    }

    #[test]
    fn disabled_image_type_cannot_be_selected() {
        let err = step(&WizardState::default(), WizardEvent::SelectImageType("vmdk".into())).unwrap_err();
        assert!(matches!(err, WizardError::Validation(ValidationError::ImageTypeUnavailable(_))));
    }

    #[test]
    fn image_type_without_provider_creates_image_directly() {
        let state = apply(&WizardState::default(), vec![WizardEvent::SelectImageType("qcow2".into())]);
        let t = step(&state, WizardEvent::Next).unwrap();
        assert_eq!(t.action, Action::CreateImage);
        assert_eq!(t.state.visible_steps(), vec![Step::ImageType]);
    }

    #[test]
    fn toggling_provider_twice_hides_upload_steps() {
        let state = apply(
            &WizardState::default(),
            vec![
                WizardEvent::SelectImageType("ami".into()),
                WizardEvent::ToggleProvider("aws".into()),
            ],
        );
        assert_eq!(state.provider.as_deref(), Some("aws"));
        assert_eq!(
            state.visible_steps(),
            vec![Step::ImageType, Step::UploadAuth, Step::UploadSettings, Step::Review]
        );

        let state = apply(&state, vec![WizardEvent::ToggleProvider("aws".into())]);
        assert_eq!(state.provider, None);
        assert_eq!(state.visible_steps(), vec![Step::ImageType]);
    }

    #[test]
    fn provider_not_offered_for_qcow2() {
        let state = apply(&WizardState::default(), vec![WizardEvent::SelectImageType("qcow2".into())]);
        let err = step(&state, WizardEvent::ToggleProvider("aws".into())).unwrap_err();
        assert!(matches!(
            err,
            WizardError::Validation(ValidationError::ProviderNotOffered { .. })
        ));
    }

    #[test]
    fn unknown_provider_is_reported() {
        let state = apply(&WizardState::default(), vec![WizardEvent::SelectImageType("ami".into())]);
        let err = step(&state, WizardEvent::ToggleProvider("gcp".into())).unwrap_err();
        assert!(matches!(err, WizardError::UnknownProvider(id) if id == "gcp"));
    }

    #[test]
    fn changing_image_type_resets_everything() {
        let mut filled = apply(
            &WizardState::default(),
            vec![
                WizardEvent::SelectImageType("ami".into()),
                WizardEvent::ToggleProvider("aws".into()),
            ],
        );
        filled.image_name = "web".into();
        filled.upload_settings.insert("bucket".into(), "images".into());

        let state = apply(&filled, vec![WizardEvent::SelectImageType("qcow2".into())]);
        assert_eq!(state.image_type, "qcow2");
        assert_eq!(state.provider, None);
        assert!(state.image_name.is_empty());
        assert!(state.upload_settings.is_empty());
        assert!(!state.show_upload_steps);
        assert!(!state.show_review_step);
    }

    #[test]
    fn fields_belong_to_their_step() {
        let state = apply(
            &WizardState::default(),
            vec![
                WizardEvent::SelectImageType("ami".into()),
                WizardEvent::ToggleProvider("aws".into()),
                WizardEvent::Next,
            ],
        );
        assert_eq!(state.step, Step::UploadAuth);
        let err = step(
            &state,
            WizardEvent::SetField {
                name: "bucket".into(),
                value: "images".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, WizardError::Validation(ValidationError::UnknownField { .. })));

        let state = apply(
            &state,
            vec![WizardEvent::SetField {
                name: "accessKeyID".into(),
                value: "AKIA".into(),
            }],
        );
        assert_eq!(state.upload_settings["accessKeyID"], "AKIA");
    }

    #[test]
    fn back_walks_visible_steps_and_stops_at_image_type() {
        let state = apply(
            &WizardState::default(),
            vec![
                WizardEvent::SelectImageType("ami".into()),
                WizardEvent::ToggleProvider("aws".into()),
                WizardEvent::Next,
                WizardEvent::Next,
                WizardEvent::Next,
            ],
        );
        assert_eq!(state.step, Step::Review);
        let state = apply(&state, vec![WizardEvent::Back]);
        assert_eq!(state.step, Step::UploadSettings);
        let state = apply(&state, vec![WizardEvent::Back, WizardEvent::Back, WizardEvent::Back]);
        assert_eq!(state.step, Step::ImageType);
        assert_eq!(state.image_type, "ami");
    }

    #[test]
    fn review_with_missing_fields_blocks_finish() {
        let state = apply(
            &WizardState::default(),
            vec![
                WizardEvent::SelectImageType("ami".into()),
                WizardEvent::ToggleProvider("aws".into()),
                WizardEvent::Next,
                WizardEvent::Next,
                WizardEvent::Next,
            ],
        );
        let err = step(&state, WizardEvent::Next).unwrap_err();
        assert!(matches!(err, WizardError::Validation(ValidationError::MissingRequiredFields)));
    }

    #[test]
    fn switching_provider_drops_fields_it_does_not_have() {
        let state = apply(
            &WizardState::default(),
            vec![
                WizardEvent::SelectImageType("ami".into()),
                WizardEvent::ToggleProvider("aws".into()),
                WizardEvent::Next,
                WizardEvent::SetField {
                    name: "secretAccessKey".into(),
                    value: "s3cr3t".into(),
                },
                WizardEvent::Next,
                WizardEvent::SetField {
                    name: "bucket".into(),
                    value: "images".into(),
                },
                WizardEvent::Back,
                WizardEvent::Back,
                WizardEvent::ToggleProvider("store".into()),
            ],
        );
        assert_eq!(state.provider.as_deref(), Some("store"));
        assert_eq!(state.upload_settings.keys().collect::<Vec<_>>(), vec!["bucket"]);

        let state = apply(
            &state,
            vec![
                WizardEvent::Next,
                WizardEvent::SetField {
                    name: "token".into(),
                    value: "t0ken".into(),
                },
                WizardEvent::Next,
                WizardEvent::SetImageName("web".into()),
                WizardEvent::Next,
            ],
        );
        assert_eq!(state.step, Step::Review);
        assert!(!missing_required_fields(&state, &providers()));
        let payload = state.upload_payload().unwrap();
        assert_eq!(payload.provider, "store");
        assert!(!payload.settings.contains_key("secretAccessKey"));
        assert_eq!(step(&state, WizardEvent::Next).unwrap().action, Action::CreateImage);
    }

    #[test]
    fn cancel_discards_state() {
        let state = apply(&WizardState::default(), vec![WizardEvent::SelectImageType("ami".into())]);
        let t = step(&state, WizardEvent::Cancel).unwrap();
        assert_eq!(t.action, Action::Close);
        assert_eq!(t.state, WizardState::default());
    }
}
