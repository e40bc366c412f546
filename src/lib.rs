//! Create and upload system images from blueprints.
//!
//! The [`wizard`] module holds the create-image wizard: a pure state machine
//! plus a controller that commits pending blueprint changes before starting a
//! compose. [`api`] implements the services the wizard needs over HTTP, and
//! [`pages`] provides page objects for end-to-end UI tests.

pub mod api;
pub mod config;
pub mod models;
pub mod pages;
pub mod services;
pub mod wizard;
