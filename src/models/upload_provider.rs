use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Describes one input of an upload provider form.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldDescriptor {
    #[serde(rename = "displayText")]
    pub display_text: String,
    #[serde(rename = "isPassword", default)]
    pub is_secret: bool,
}

impl FieldDescriptor {
    pub fn new(display_text: &str, is_secret: bool) -> Self {
        Self {
            display_text: display_text.to_string(),
            is_secret,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadProvider {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "displayName")]
    pub display_name: String,
    /// Image types this provider accepts. Empty means the well-known defaults.
    #[serde(default, rename = "supportedTypes")]
    pub supported_types: Vec<String>,
    #[serde(default)]
    pub auth: BTreeMap<String, FieldDescriptor>,
    #[serde(default)]
    pub settings: BTreeMap<String, FieldDescriptor>,
}

impl UploadProvider {
    pub fn accepts(&self, image_type: &str) -> bool {
        if self.supported_types.is_empty() {
            return default_supported_types(&self.id).contains(&image_type);
        }
        self.supported_types.iter().any(|t| t == image_type)
    }

    pub fn field_count(&self) -> usize {
        self.auth.len() + self.settings.len()
    }

    /// Looks a field up in the auth descriptors first, then in the settings.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.auth.get(name).or_else(|| self.settings.get(name))
    }

    pub fn display_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}

fn default_supported_types(provider: &str) -> &'static [&'static str] {
    match provider {
        "aws" => &["ami"],
        _ => &[],
    }
}

/// Upload destinations keyed by provider id.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProviderCatalog(BTreeMap<String, UploadProvider>);

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a provider, filling in its id from the map key.
    pub fn insert(&mut self, id: &str, mut provider: UploadProvider) {
        provider.id = id.to_string();
        self.0.insert(id.to_string(), provider);
    }

    pub fn get(&self, id: &str) -> Option<&UploadProvider> {
        self.0.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadProvider> {
        self.0.values()
    }

    /// Providers that may receive an image of the given type.
    pub fn offered_for<'a>(&'a self, image_type: &'a str) -> impl Iterator<Item = &'a UploadProvider> + 'a {
        self.0.values().filter(move |p| p.accepts(image_type))
    }
}

impl FromIterator<(String, UploadProvider)> for ProviderCatalog {
    fn from_iter<I: IntoIterator<Item = (String, UploadProvider)>>(iter: I) -> Self {
        let mut catalog = ProviderCatalog::new();
        for (id, provider) in iter {
            catalog.insert(&id, provider);
        }
        catalog
    }
}
