use std::fmt;

/// Wizard pages in display order. Only `ImageType` is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Step {
    #[default]
    ImageType,
    UploadAuth,
    UploadSettings,
    Review,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::ImageType => "Image type",
            Step::UploadAuth => "Authentication",
            Step::UploadSettings => "File upload",
            Step::Review => "Review",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
