use std::time::Duration;

use super::driver::{wait_until, Element, PageDriver, PageError, Wait};
use crate::config::{self, DEFAULT_PAGE_POLL_MS};

const HEADER_TITLE: &str = r#"h1[class="cmpsr-title__item"]"#;
const CUSTOMIZATIONS: &str = r#"under "Customizations" tab in View Blueprint page"#;

/// Page object for the View Blueprint page.
pub struct ViewBlueprintPage<'d, D: PageDriver> {
    driver: &'d D,
    pub name: String,
    pub description: String,
    wait: Wait,
}

impl<'d, D: PageDriver> ViewBlueprintPage<'d, D> {
    pub fn new(driver: &'d D, name: &str, description: &str, timeout: Duration) -> Self {
        Self {
            driver,
            name: name.to_string(),
            description: description.to_string(),
            wait: Wait::new(timeout, Duration::from_millis(DEFAULT_PAGE_POLL_MS)),
        }
    }

    /// Same as [`new`](Self::new) with the timeout from `COMPOSER_PAGE_TIMEOUT_MS`.
    pub fn with_configured_timeout(driver: &'d D, name: &str, description: &str) -> Self {
        Self::new(driver, name, description, config::get_page_timeout())
    }

    /// Waits for the header to show this blueprint's name.
    pub async fn loading(&self) -> Result<(), PageError> {
        let driver = self.driver;
        let name = self.name.as_str();
        wait_until(self.wait, "Cannot load View Blueprint page", || async move {
            driver.get_text(HEADER_TITLE).await.as_deref() == Some(name)
        })
        .await
    }

    async fn locate_with(&self, selector: String, what: String, wait: Wait) -> Result<Element, PageError> {
        let driver = self.driver;
        let sel = selector.as_str();
        let message = format!("{} cannot be found by selector {}", what, selector);
        wait_until(wait, message, || async move { driver.is_existing(sel).await }).await?;
        Ok(Element { selector })
    }

    async fn locate(&self, selector: impl Into<String>, what: impl Into<String>) -> Result<Element, PageError> {
        self.locate_with(selector.into(), what.into(), self.wait).await
    }

    pub async fn back_to_blueprints_link(&self) -> Result<Element, PageError> {
        self.locate("span=Back to Blueprints", "Back to Blueprint link in View Blueprint page").await
    }

    pub async fn navigation_blueprint_name_label(&self) -> Result<Element, PageError> {
        self.locate(
            format!("strong={}", self.name),
            "blueprint name label in navigation bar in View Blueprint page",
        )
        .await
    }

    pub async fn edit_blueprint_button(&self) -> Result<Element, PageError> {
        self.locate("span=Edit Blueprint", "Edit Blueprint button in View Blueprint page").await
    }

    pub async fn create_image_button(&self) -> Result<Element, PageError> {
        // The Images tab has a second Create Image button, so scope to the header.
        self.locate(
            r#".cmpsr-header__actions [id="cmpsr-btn-crt-image"] span"#,
            "Create Image button in View Blueprint page",
        )
        .await
    }

    pub async fn more_button(&self) -> Result<Element, PageError> {
        self.locate(".cmpsr-header__actions .fa-ellipsis-v", ": button in View Blueprint page").await
    }

    pub async fn header_blueprint_name_label(&self) -> Result<Element, PageError> {
        self.locate(HEADER_TITLE, "header blueprint name label in View Blueprint page").await
    }

    pub async fn header_blueprint_description_label(&self) -> Result<Element, PageError> {
        self.locate(
            r#"p[class="cmpsr-title__item"]"#,
            "header blueprint description label in View Blueprint page",
        )
        .await
    }

    pub async fn details_tab(&self) -> Result<Element, PageError> {
        self.locate("=Details", "Details tab in View Blueprint page").await
    }

    pub async fn details_tab_blueprint_description_label(&self) -> Result<Element, PageError> {
        self.locate(
            format!("span={}", self.description),
            format!("blueprint description {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn updated_blueprint_description_label(&self, description: &str) -> Result<Element, PageError> {
        self.locate(
            format!("span={}", description),
            format!("blueprint description {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn edit_blueprint_description_button(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="description"] .pficon-edit"#,
            format!("edit blueprint description button {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn description_input_box(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="description"] .form-control"#,
            format!("blueprint description input box {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn ok_button(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="description"] .form-control-pf-save"#,
            format!("ok button {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn cancel_button(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="description"] .form-control-pf-cancel"#,
            format!("cancel button {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn details_tab_hostname_label(&self, hostname: &str) -> Result<Element, PageError> {
        self.locate(
            format!("span={}", hostname),
            format!("blueprint hostname {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn edit_hostname_button(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="hostname"] .pficon-edit"#,
            format!("edit hostname button {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn hostname_input_box(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="hostname"] .form-control"#,
            format!("blueprint hostname input box {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn ok_hostname_button(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="hostname"] .form-control-pf-save"#,
            format!("ok button for hostname edit {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn cancel_hostname_button(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[data-form="hostname"] .form-control-pf-cancel"#,
            format!("cancel button for hostname {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn create_user_account_button(&self) -> Result<Element, PageError> {
        self.locate(
            "span=Create User Account",
            format!("Create User Account button {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn full_name_cell(&self, user: &str) -> Result<Element, PageError> {
        self.locate(
            format!("[data-tr={}] [data-td=fullname]", user),
            format!("Full name cell {}", CUSTOMIZATIONS),
        )
        .await
    }

    pub async fn user_name_cell(&self, user: &str) -> Result<Element, PageError> {
        self.locate(
            format!("[data-tr={}] [data-td=username]", user),
            format!("User name cell {}", CUSTOMIZATIONS),
        )
        .await
    }

    // The next three cells may legitimately be absent, so they are not awaited.

    pub fn administrator_cell(&self, user: &str) -> String {
        format!("[data-tr={}] [data-td=groups] span", user)
    }

    pub fn password_cell(&self, user: &str) -> String {
        format!("[data-tr={}] [data-td=password] span", user)
    }

    pub fn ssh_key_cell(&self, user: &str) -> String {
        format!("[data-tr={}] [data-td=sshkey] span", user)
    }

    pub async fn edit_user_button(&self, user: &str) -> Result<Element, PageError> {
        self.locate(
            format!(r#"[data-tr={}] [data-btn="edit"]"#, user),
            format!("Edit user button in user {} row", user),
        )
        .await
    }

    pub async fn more_user_button(&self, user: &str) -> Result<Element, PageError> {
        self.locate(
            format!(r#"[data-tr={}] [data-btn="more"]"#, user),
            format!(": button in user {} row", user),
        )
        .await
    }

    pub async fn selected_components_tab(&self) -> Result<Element, PageError> {
        self.locate("=Selected Components", "Selected Components tab in View Blueprint page").await
    }

    pub async fn selected_component_filter(&self) -> Result<Element, PageError> {
        self.locate(
            r#"[id="filter-blueprints"]"#,
            "Selected Components filter in View Blueprint page",
        )
        .await
    }

    pub async fn images_tab(&self) -> Result<Element, PageError> {
        self.locate("=Images", "Images tab in View Blueprint page").await
    }

    pub async fn no_image_message_label(&self) -> Result<Element, PageError> {
        self.locate(
            "p=No images have been created from this blueprint.",
            "No Image message label in View Blueprint page",
        )
        .await
    }

    pub async fn image_name_label(&self) -> Result<Element, PageError> {
        self.locate(".cmpsr-images .list-pf-title", "Image name label in View Blueprint page").await
    }

    pub async fn image_type_label(&self, image_type: &str) -> Result<Element, PageError> {
        self.locate(
            format!("strong={}", image_type),
            format!("Images type label {} under Images tab in View Blueprint page", image_type),
        )
        .await
    }

    pub async fn pending_label(&self) -> Result<Element, PageError> {
        self.locate("span=Pending", "Pending label under Images tab in View Blueprint page").await
    }

    pub async fn pending_icon(&self) -> Result<Element, PageError> {
        self.locate(
            ".cmpsr-images .pficon-pending",
            "Creating image pending icon under Images tab in View Blueprint page",
        )
        .await
    }

    /// Image builds take a while: waits twenty times longer, polling every 2s.
    pub async fn complete_label(&self) -> Result<Element, PageError> {
        let wait = Wait::new(self.wait.timeout * 20, Duration::from_secs(2));
        self.locate_with(
            "span=Complete".to_string(),
            "Complete label under Images tab in View Blueprint page".to_string(),
            wait,
        )
        .await
    }

    pub async fn complete_icon(&self) -> Result<Element, PageError> {
        self.locate(
            ".cmpsr-images .pficon-ok",
            "Creating image complete icon under Images tab in View Blueprint page",
        )
        .await
    }

    pub async fn image_more_button(&self) -> Result<Element, PageError> {
        self.locate(".cmpsr-images .fa-ellipsis-v", ": button under Images tab in View Blueprint page").await
    }

    pub async fn image_download_button(&self) -> Result<Element, PageError> {
        self.locate(
            r#".list-pf-actions [download=""]"#,
            "Download button under Images tab in View Blueprint page",
        )
        .await
    }

    pub async fn stop_button(&self) -> Result<Element, PageError> {
        self.locate("span=Stop", "Stop button in View Blueprint page").await
    }
}
