// Blueprint, compose and upload API modules
pub mod client;
pub mod error;
pub mod blueprints;
pub mod composes;
pub mod uploads;

// Re-export commonly used items
pub use client::{set_silent, ComposerClient};
pub use error::ApiError;
