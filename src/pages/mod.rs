//! Page objects for end-to-end tests of the blueprint UI.
//!
//! Page objects only know selectors and how long to wait for them; the
//! browser session itself sits behind [`PageDriver`].

pub mod driver;
pub mod view_blueprint;

pub use driver::{wait_until, Element, PageDriver, PageError, Wait};
pub use view_blueprint::ViewBlueprintPage;
