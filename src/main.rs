use std::collections::BTreeMap;
use std::io::Write;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use terminal_size::{terminal_size, Width};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use composer::api::{self, ComposerClient};
use composer::config;
use composer::models::Blueprint;
use composer::services::{ComposeService, ConsoleNotifier, UploadProviderCatalog, WizardHost};
use composer::wizard::{Step, WizardController, WizardError, WizardEvent, WizardServices};

#[derive(Parser)]
#[command(
    name = "composer",
    author,
    version,
    about = "Create and upload system images from blueprints",
    long_about = r#"composer: build bootable images from blueprints.

The create-image wizard asks for an image type and, for cloud image types,
optional upload credentials and settings. Blueprints with uncommitted changes
are committed before the compose starts.

Examples:
  1) Interactive wizard:
      composer create-image web-server
  2) Non-interactive qcow2 build:
      composer compose web-server --type qcow2
  3) Build an AMI and upload it to AWS:
      composer compose web-server --type ami --provider aws --image-name web \
          --set accessKeyID=AKIA... --set secretAccessKey=... \
          --set region=us-east-1 --set bucket=images
"#,
    after_help = "Use `composer <subcommand> --help` to get subcommand specific options and usage examples."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request/response logging
    #[arg(long, global = true)]
    silent: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and API connectivity
    #[command(long_about = "Check that COMPOSER_API_URL is set and that the API answers a compose types request.")]
    CheckConfig,
    /// List the image types the compose service can build
    Types,
    /// List upload providers and the fields they require
    Providers,
    /// Show the compose queue
    Queue,
    /// Walk through the create-image wizard interactively
    #[command(long_about = "Prompt for the image type and, when an upload provider is chosen, for its credentials and settings. Enter `b` to go back and `q` to cancel at any step.")]
    CreateImage {
        /// Blueprint name
        blueprint: String,
        /// Read the blueprint (including local pending changes) from a JSON file
        #[arg(long)]
        from_file: Option<String>,
    },
    /// Create an image without prompting
    Compose {
        /// Blueprint name
        blueprint: String,
        /// Image type, e.g. qcow2 or ami
        #[arg(long = "type")]
        image_type: String,
        /// Upload provider id, e.g. aws
        #[arg(long)]
        provider: Option<String>,
        /// Name of the uploaded image
        #[arg(long)]
        image_name: Option<String>,
        /// Provider field as KEY=VALUE (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
        /// Read the blueprint (including local pending changes) from a JSON file
        #[arg(long)]
        from_file: Option<String>,
    },
}

/// Reports blueprint updates and closing back to the terminal.
struct ConsoleHost;

impl WizardHost for ConsoleHost {
    fn set_blueprint(&self, blueprint: Blueprint) {
        println!(
            "{} {} {}",
            Paint::new("Blueprint").green(),
            blueprint.name,
            Paint::new(format!("is now at version {}", blueprint.version)).green()
        );
    }

    fn close(&self) {
        tracing::debug!("wizard closed");
    }
}

fn fail(msg: &str, err: impl std::fmt::Display) -> ! {
    tracing::error!(%err, "{}", msg);
    eprintln!("{}: {}", Paint::new(msg).red(), err);
    process::exit(1);
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

fn build_client() -> Arc<ComposerClient> {
    match ComposerClient::new(&config::get_api_url()) {
        Ok(c) => Arc::new(c),
        Err(e) => fail("Failed to create HTTP client", e),
    }
}

fn build_services(client: &Arc<ComposerClient>) -> WizardServices {
    WizardServices {
        blueprints: client.clone(),
        composes: client.clone(),
        uploads: client.clone(),
        notifier: Arc::new(ConsoleNotifier),
        host: Arc::new(ConsoleHost),
    }
}

async fn load_blueprint(client: &ComposerClient, name: &str, from_file: Option<&str>) -> Blueprint {
    match from_file {
        Some(path) => {
            let raw = match tokio::fs::read_to_string(path).await {
                Ok(r) => r,
                Err(e) => fail(&format!("Failed to read {}", path), e),
            };
            let mut blueprint: Blueprint = match serde_json::from_str(&raw) {
                Ok(b) => b,
                Err(e) => fail(&format!("Invalid blueprint file {}", path), e),
            };
            if blueprint.name.is_empty() {
                blueprint.name = name.to_string();
            }
            blueprint
        }
        None => match client.get_blueprint(name).await {
            Ok(b) => b,
            Err(e) => fail(&format!("Failed to load blueprint {}", name), e),
        },
    }
}

async fn open_wizard(client: &Arc<ComposerClient>, blueprint: Blueprint) -> WizardController {
    match WizardController::open(build_services(client), blueprint, Vec::new(), config::get_timeout()).await {
        Ok(w) => w,
        Err(e) => fail("Failed to open the create image wizard", e),
    }
}

/// Dispatches an event that may start image creation, with a spinner.
async fn advance(wizard: &mut WizardController) -> Result<(), WizardError> {
    if !wizard.state().advance_is_terminal() {
        return wizard.dispatch(WizardEvent::Next).await;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("{}...", wizard.advance_label()));
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = wizard.dispatch(WizardEvent::Next).await;
    pb.finish_and_clear();
    result
}

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Reads one trimmed line; end of input cancels the wizard.
    async fn ask(&mut self, label: &str) -> Option<String> {
        print!("{} ", Paint::new(label).bold());
        std::io::stdout().flush().ok();
        self.lines.next_line().await.ok().flatten().map(|s| s.trim().to_string())
    }

    /// Like [`ask`](Self::ask) but an empty answer keeps `current`.
    async fn ask_field(&mut self, label: &str, current: Option<&str>, secret: bool) -> Option<String> {
        let shown = match current {
            Some(v) if !v.is_empty() && secret => format!(" [{}]", composer::wizard::mask_secret(v)),
            Some(v) if !v.is_empty() => format!(" [{}]", v),
            _ => String::new(),
        };
        let answer = self.ask(&format!("{}{}:", label, shown)).await?;
        if answer.is_empty() {
            Some(current.unwrap_or_default().to_string())
        } else {
            Some(answer)
        }
    }
}

fn report(err: &WizardError) {
    eprintln!("{}", Paint::new(err.to_string()).red());
    if err.is_retryable() {
        eprintln!("{}", Paint::new("Nothing was lost; you can try again.").yellow());
    } else if matches!(err, WizardError::Timeout { .. }) {
        eprintln!("{}", Paint::new("Check the compose queue before trying again.").yellow());
    }
}

fn print_step(wizard: &WizardController) {
    let steps: Vec<String> = wizard
        .visible_steps()
        .iter()
        .map(|s| {
            if *s == wizard.current_step() {
                Paint::new(s.title()).cyan().bold().to_string()
            } else {
                Paint::new(s.title()).dim().to_string()
            }
        })
        .collect();
    println!("\n{}", steps.join(" › "));
}

async fn run_interactive(wizard: &mut WizardController) {
    let mut prompt = Prompt::new();
    println!(
        "{} {}",
        Paint::new("Create image from blueprint").bold(),
        Paint::new(&wizard.blueprint().name).cyan()
    );
    if let Some(queue) = wizard.queue().filter(|q| !q.is_empty()) {
        println!("{}", Paint::new(format!("{} build(s) already in the compose queue", queue.len())).dim());
    }

    while wizard.is_open() {
        print_step(wizard);
        let filled = match wizard.current_step() {
            Step::ImageType => image_type_step(wizard, &mut prompt).await,
            Step::UploadAuth => field_step(wizard, &mut prompt, true).await,
            Step::UploadSettings => field_step(wizard, &mut prompt, false).await,
            Step::Review => {
                review_step(wizard);
                Some(())
            }
        };
        if filled.is_none() {
            if let Err(e) = wizard.dispatch(WizardEvent::Cancel).await {
                report(&e);
            }
            break;
        }

        let back = if wizard.can_go_back() { ", b = Back" } else { "" };
        let question = format!("[Enter] = {}{}, q = Cancel:", wizard.advance_label(), back);
        let event = match prompt.ask(&question).await.as_deref() {
            None | Some("q") => WizardEvent::Cancel,
            Some("b") => WizardEvent::Back,
            _ => WizardEvent::Next,
        };
        let result = if event == WizardEvent::Next {
            advance(wizard).await
        } else {
            wizard.dispatch(event).await
        };
        if let Err(e) = result {
            report(&e);
        }
    }
}

async fn image_type_step(wizard: &mut WizardController, prompt: &mut Prompt) -> Option<()> {
    for warning in wizard.warnings() {
        println!("{}", Paint::new(warning).yellow());
    }
    let mut table = new_table();
    table.set_header(vec!["Type", "Description", "Available"]);
    for t in wizard.image_types() {
        table.add_row(vec![t.name.as_str(), t.display_label(), if t.enabled { "yes" } else { "no" }]);
    }
    println!("{table}");

    let current = wizard.state().image_type.clone();
    let choice = prompt.ask_field("Image type", Some(&current), false).await?;
    if choice != current {
        if let Err(e) = wizard.dispatch(WizardEvent::SelectImageType(choice)).await {
            report(&e);
            return Some(());
        }
    }

    let image_type = wizard.state().image_type.clone();
    let offered: Vec<(String, String)> = wizard
        .providers()
        .offered_for(&image_type)
        .map(|p| (p.id.clone(), p.display_name().to_string()))
        .collect();
    for (id, display) in offered {
        let selected = wizard.state().provider.as_deref() == Some(id.as_str());
        let default = if selected { "Y/n" } else { "y/N" };
        let answer = prompt.ask(&format!("Upload to {}? [{}]", display, default)).await?;
        let wants = match answer.to_lowercase().as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => selected,
        };
        if wants != selected {
            if let Err(e) = wizard.dispatch(WizardEvent::ToggleProvider(id)).await {
                report(&e);
            }
        }
    }
    Some(())
}

async fn field_step(wizard: &mut WizardController, prompt: &mut Prompt, auth: bool) -> Option<()> {
    println!("{}", Paint::new("All fields are required.").dim());
    let Some(provider) = wizard.state().provider.as_deref().and_then(|id| wizard.providers().get(id)).cloned() else {
        return Some(());
    };

    if !auth {
        let current = wizard.state().image_name.clone();
        let name = prompt.ask_field("Image name", Some(&current), false).await?;
        if let Err(e) = wizard.dispatch(WizardEvent::SetImageName(name)).await {
            report(&e);
        }
    }

    let fields = if auth { &provider.auth } else { &provider.settings };
    for (key, descriptor) in fields {
        let current = wizard.state().upload_settings.get(key).cloned();
        let value = prompt
            .ask_field(&descriptor.display_text, current.as_deref(), descriptor.is_secret)
            .await?;
        let event = WizardEvent::SetField {
            name: key.clone(),
            value,
        };
        if let Err(e) = wizard.dispatch(event).await {
            report(&e);
        }
    }
    Some(())
}

fn review_step(wizard: &WizardController) {
    if wizard.missing_required_fields() {
        println!("{}", Paint::new("Required information is missing.").yellow());
    }
    println!(
        "Review the information below and click Finish to create the image and complete the tasks that were selected."
    );
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    for row in wizard.review_rows() {
        table.add_row(vec![row.label, row.value]);
    }
    println!("{table}");
}

fn parse_settings(raw: &[String]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for item in raw {
        match item.split_once('=') {
            Some((k, v)) => {
                map.insert(k.trim().to_string(), v.to_string());
            }
            None => fail("Invalid --set value, expected KEY=VALUE", item),
        }
    }
    map
}

async fn run_compose(
    wizard: &mut WizardController,
    image_type: String,
    provider: Option<String>,
    image_name: Option<String>,
    settings: BTreeMap<String, String>,
) -> Result<(), WizardError> {
    wizard.dispatch(WizardEvent::SelectImageType(image_type)).await?;
    if let Some(id) = provider {
        wizard.dispatch(WizardEvent::ToggleProvider(id.clone())).await?;
        let descriptor = wizard.providers().get(&id).cloned().unwrap_or_default();
        wizard.dispatch(WizardEvent::Next).await?;
        for (k, v) in settings.iter().filter(|(k, _)| descriptor.auth.contains_key(*k)) {
            wizard.dispatch(WizardEvent::SetField { name: k.clone(), value: v.clone() }).await?;
        }
        wizard.dispatch(WizardEvent::Next).await?;
        wizard.dispatch(WizardEvent::SetImageName(image_name.unwrap_or_default())).await?;
        for (k, v) in settings.iter().filter(|(k, _)| !descriptor.auth.contains_key(*k)) {
            wizard.dispatch(WizardEvent::SetField { name: k.clone(), value: v.clone() }).await?;
        }
        wizard.dispatch(WizardEvent::Next).await?;
        review_step(wizard);
    } else if !settings.is_empty() || image_name.is_some() {
        tracing::warn!("--set and --image-name are ignored without --provider");
    }
    advance(wizard).await
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }
    if cli.silent {
        api::set_silent(true);
    }
    config::load_env_file(cli.env_file.as_deref());
    let client = build_client();

    match cli.command {
        Commands::CheckConfig => {
            println!("API: {}", Paint::new(client.base_url()).cyan());
            match client.fetch_compose_types().await {
                Ok(types) => {
                    println!(
                        "{}",
                        Paint::new(format!("Configuration looks valid ({} image types returned)", types.len())).green()
                    );
                }
                Err(e) => fail("Configuration appears invalid", e),
            }
        }
        Commands::Types => {
            let types = match client.fetch_compose_types().await {
                Ok(t) => t,
                Err(e) => fail("Failed to load image types", e),
            };
            let mut table = new_table();
            table.set_header(vec!["Name", "Label", "Enabled"]);
            for t in &types {
                table.add_row(vec![t.name.clone(), t.display_label().to_string(), t.enabled.to_string()]);
            }
            println!("\n{table}\n");
        }
        Commands::Providers => {
            let catalog = match client.fetch_upload_providers().await {
                Ok(c) => c,
                Err(e) => fail("Failed to load upload providers", e),
            };
            let mut table = new_table();
            table.set_header(vec!["Provider", "Kind", "Field", "Label", "Secret"]);
            for p in catalog.iter() {
                let fields = p
                    .auth
                    .iter()
                    .map(|f| ("auth", f))
                    .chain(p.settings.iter().map(|f| ("settings", f)));
                for (kind, (key, d)) in fields {
                    table.add_row(vec![
                        p.display_name().to_string(),
                        kind.to_string(),
                        key.clone(),
                        d.display_text.clone(),
                        d.is_secret.to_string(),
                    ]);
                }
            }
            println!("\n{table}\n");
        }
        Commands::Queue => {
            let queue = match client.fetch_compose_queue().await {
                Ok(q) => q,
                Err(e) => fail("Failed to load the compose queue", e),
            };
            let mut table = new_table();
            table.set_header(vec!["State", "Blueprint", "Type", "ID"]);
            let entries = queue
                .new
                .iter()
                .map(|e| ("waiting", e))
                .chain(queue.run.iter().map(|e| ("running", e)));
            for (state, entry) in entries {
                let field = |k: &str| entry.get(k).and_then(|v| v.as_str()).unwrap_or("").to_string();
                table.add_row(vec![state.to_string(), field("blueprint"), field("compose_type"), field("id")]);
            }
            println!("\n{table}\n");
        }
        Commands::CreateImage { blueprint, from_file } => {
            let bp = load_blueprint(&client, &blueprint, from_file.as_deref()).await;
            let mut wizard = open_wizard(&client, bp).await;
            run_interactive(&mut wizard).await;
        }
        Commands::Compose {
            blueprint,
            image_type,
            provider,
            image_name,
            settings,
            from_file,
        } => {
            let settings = parse_settings(&settings);
            let bp = load_blueprint(&client, &blueprint, from_file.as_deref()).await;
            let mut wizard = open_wizard(&client, bp).await;
            if let Err(e) = run_compose(&mut wizard, image_type, provider, image_name, settings).await {
                fail("Image was not created", e);
            }
        }
    }
}
