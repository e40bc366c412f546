//! Create-image wizard.
//!
//! [`state`] holds the pure state machine: a [`WizardState`] value and a
//! [`transition`] function from `(state, event)` to the next state plus the
//! side effect to run. [`controller::WizardController`] owns one state value,
//! loads the data the wizard needs and runs the commit and compose chain.

pub mod controller;
pub mod error;
pub mod review;
pub mod state;
pub mod step;
pub mod validation;

pub use controller::{WizardController, WizardServices};
pub use error::{ChainStage, ValidationError, WizardError};
pub use review::{mask_secret, ReviewRow};
pub use state::{transition, Action, Transition, WizardContext, WizardEvent, WizardState};
pub use step::Step;
pub use validation::missing_required_fields;
