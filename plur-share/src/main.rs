//! plur-share - Run a share session without a host application

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use libplurshare::host::memory::{
    MemoryProvider, RecordingContext, SceneScreenFactory, VecViewStack,
};
use libplurshare::host::{AttachmentProvider, Screen, ViewStack};
use libplurshare::{
    Action, Content, ContentItem, NavigationController, Scene, SceneTransition, ShareConfig,
    ShareError, ShareSession,
};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "plur-share")]
#[command(version, about = "Run a share session from the command line")]
#[command(long_about = r#"Run a share session from the command line.

Every TEXT argument, --url and --image becomes one shared item. Items are
extracted concurrently, then the navigation script is played against the
session and the collected content is printed once it finishes.

EXAMPLES:
    # Share a note, compose, finish
    plur-share "Release notes are up"

    # Text plus a link and a screenshot
    plur-share "Look at this" --url https://example.org --image shot.png

    # Walk the whole flow
    plur-share hi --script push:servers,push:rooms,push:compose,pop,finish

    # JSON output for scripting
    plur-share hi --format json | jq '.items[]'

SCRIPT STEPS:
    push:<scene>  - Present a scene (servers, rooms, compose)
    pop           - Go back one screen
    finish        - End the session
    none          - No-op

EXIT CODES:
    0 - Session finished
    1 - Error (bad config, logging setup, etc.)
    3 - Invalid input (bad script, script never finishes)
"#)]
struct Cli {
    /// Text items to share
    #[arg(value_name = "TEXT")]
    text: Vec<String>,

    /// Link to share (repeatable)
    #[arg(short, long, value_name = "URL")]
    url: Vec<Url>,

    /// Image file to share (repeatable)
    #[arg(short, long, value_name = "PATH")]
    image: Vec<PathBuf>,

    /// Comma-separated navigation steps
    #[arg(short, long, default_value = "push:compose,finish", value_name = "STEPS")]
    script: String,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Config file (defaults to PLURSHARE_CONFIG or the XDG location)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// View stack that logs every screen it presents or dismisses
struct LoggedStack {
    inner: VecViewStack,
}

impl ViewStack for LoggedStack {
    fn push_view(&mut self, screen: Box<dyn Screen>) {
        info!(scene = %screen.scene(), depth = self.inner.depth() + 1, "Presenting screen");
        self.inner.push_view(screen);
    }

    fn pop_view(&mut self) -> Option<Box<dyn Screen>> {
        let popped = self.inner.pop_view();
        if let Some(screen) = &popped {
            info!(scene = %screen.scene(), depth = self.inner.depth(), "Dismissed screen");
        }
        popped
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn top_scene(&self) -> Option<Scene> {
        self.inner.top_scene()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ItemSummary {
    Text { text: String },
    Image { width: u32, height: u32 },
}

impl From<&ContentItem> for ItemSummary {
    fn from(item: &ContentItem) -> Self {
        match item {
            ContentItem::Text(text) => ItemSummary::Text { text: text.clone() },
            ContentItem::Image(bitmap) => ItemSummary::Image {
                width: bitmap.width(),
                height: bitmap.height(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ShareSummary {
    session: String,
    presented: Vec<Scene>,
    items: Vec<ItemSummary>,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<ShareError>()
                .map(ShareError::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ShareConfig::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ShareConfig::load().context("Failed to load configuration")?,
    };
    config.logging = config.logging.with_env_overrides();
    config.logging.verbose = cli.verbose;
    config.logging.init()?;

    let script = parse_script(&cli.script)?;
    let providers = build_providers(&cli)?;
    debug!(providers = providers.len(), steps = script.len(), "plur-share started");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let session = ShareSession::new(config);
    let factory = SceneScreenFactory::new();
    let context = RecordingContext::new();
    let controller = NavigationController::new(
        Box::new(LoggedStack {
            inner: VecViewStack::new(),
        }),
        Box::new(factory.clone()),
        Box::new(context.clone()),
    );
    session.start(&controller);

    let ingestion = session.ingestion().ingest(providers, runtime.handle());
    let extracted = runtime.block_on(ingestion.join());
    let applied = session.pump();
    debug!(extracted, applied, "Ingestion finished");

    for step in script {
        session.store().dispatch(Action::MakeSceneTransition(step));
        if session.is_finished() {
            break;
        }
    }

    if !session.is_finished() {
        return Err(ShareError::InvalidInput(
            "Script ended without finishing the session (add a 'finish' step)".to_string(),
        )
        .into());
    }
    if let Some(reason) = context.last_error() {
        debug!(%reason, "Host received cancellation");
    }

    let content = session.store().state().content;
    match cli.format.as_str() {
        "json" => {
            let summary = ShareSummary {
                session: session.id().to_string(),
                presented: factory.made(),
                items: content.iter().map(ItemSummary::from).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => print_text(&content),
    }

    Ok(())
}

fn parse_script(script: &str) -> Result<Vec<SceneTransition>> {
    script
        .split(',')
        .filter(|step| !step.trim().is_empty())
        .map(|step| {
            step.parse::<SceneTransition>()
                .map_err(|e| anyhow::Error::from(ShareError::InvalidInput(e)))
        })
        .collect()
}

fn build_providers(cli: &Cli) -> Result<Vec<Arc<dyn AttachmentProvider>>> {
    let mut providers: Vec<Arc<dyn AttachmentProvider>> = Vec::new();

    for text in &cli.text {
        providers.push(Arc::new(MemoryProvider::text(text.as_str())));
    }
    for url in &cli.url {
        providers.push(Arc::new(MemoryProvider::url(url.clone())));
    }
    for path in &cli.image {
        let absolute = std::env::current_dir()
            .context("Failed to read working directory")?
            .join(path);
        let provider = MemoryProvider::image_file(&absolute).map_err(ShareError::from)?;
        providers.push(Arc::new(provider));
    }

    Ok(providers)
}

fn print_text(content: &Content) {
    for item in content {
        match item {
            ContentItem::Text(text) => println!("{}", text),
            ContentItem::Image(bitmap) => {
                println!("[image {}x{}]", bitmap.width(), bitmap.height())
            }
        }
    }
}
