pub mod blueprint;
pub mod compose;
pub mod image_type;
pub mod upload_provider;

pub use blueprint::{Blueprint, BlueprintDetails, Component, Group, PendingChange};
pub use compose::{ComposeQueue, ComposeRequest, UploadPayload};
pub use image_type::ImageType;
pub use upload_provider::{FieldDescriptor, ProviderCatalog, UploadProvider};
