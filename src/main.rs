use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vibrance::models::preset::{factory_preset, FACTORY_PRESET_NAMES};
use vibrance::models::{EnhancerConfig, StoredConfig};
use vibrance::services::{
    EnhancerController, JsonFileStore, MemoryDocument, MemoryStore, SettingsStore,
};

#[derive(Parser)]
#[command(name = "vibrance")]
#[command(about = "CSS/SVG filter-graph synthesis engine for in-page video enhancement")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation and print the synthesized output
    Render {
        /// Settings JSON file (factory defaults when omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Override the active preset
        #[arg(short, long)]
        preset: Option<String>,
    },
    /// Watch a settings file and re-print the output on every change
    Run {
        /// Settings JSON file
        #[arg(short, long)]
        settings: PathBuf,
    },
    /// Write a factory-default settings file
    Init {
        /// Destination path
        #[arg(short, long, default_value = "settings.json")]
        settings: PathBuf,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    match cli.command {
        Some(Commands::Render { settings, preset }) => run_render_command(settings, preset).await,
        Some(Commands::Run { settings }) => run_watch_command(settings).await,
        Some(Commands::Init { settings, force }) => run_init_command(&settings, force).await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibrance=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// One reconciliation against an in-memory document, output to stdout.
async fn run_render_command(
    settings: Option<PathBuf>,
    preset: Option<String>,
) -> anyhow::Result<()> {
    let stored = match settings {
        Some(path) => JsonFileStore::new(&path).get().await?,
        None => StoredConfig::factory(),
    };

    let mut config = stored.resolve();
    if let Some(name) = preset {
        anyhow::ensure!(
            config.presets.contains_key(&name),
            "unknown preset '{name}' (expected one of: {})",
            FACTORY_PRESET_NAMES.join(", ")
        );
        config.active_preset = name;
    }

    let document = Arc::new(MemoryDocument::new());
    let store = Arc::new(MemoryStore::new());
    let controller = EnhancerController::new(store, document.clone());
    controller.apply_config(&config).await;

    print_document(&config, &document);
    Ok(())
}

/// Live harness: reconcile on every settings-file change.
async fn run_watch_command(settings: PathBuf) -> anyhow::Result<()> {
    let store = Arc::new(JsonFileStore::new(&settings));
    let document = Arc::new(MemoryDocument::new());
    let mut changes = store.subscribe();

    let controller = EnhancerController::new(store.clone(), document.clone());
    controller.start();

    // Let the initial reconciliation land before the first print
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    print_document(&latest_config(store.as_ref()).await, &document);

    println!("-- watching {} (Ctrl-C to stop)", settings.display());

    loop {
        tokio::select! {
            result = changes.recv() => {
                match result {
                    Ok(_) | Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                        // The controller reconciles on the same
                        // notification; give it a moment, then show
                        // the result
                        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                        print_document(&latest_config(store.as_ref()).await, &document);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

/// Resolved configuration for display, mirroring the controller's own
/// fallback on read failure.
async fn latest_config(store: &dyn SettingsStore) -> EnhancerConfig {
    match store.get().await {
        Ok(stored) => stored.resolve(),
        Err(_) => EnhancerConfig::default(),
    }
}

async fn run_init_command(path: &PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let content = serde_json::to_string_pretty(&StoredConfig::factory())?;
    tokio::fs::write(path, content).await?;
    println!("Wrote factory settings to {}", path.display());
    Ok(())
}

fn run_status_command() {
    println!("vibrance - video enhancement filter synthesizer\n");
    println!("Factory presets:");
    for name in FACTORY_PRESET_NAMES {
        let p = factory_preset(name).expect("factory name");
        println!(
            "  {name:<10} brightness {:>3} contrast {:>3} saturate {:>3} warmth {:>4} ({:?}) sharpness {:>3}",
            p.brightness, p.contrast, p.saturate, p.warmth, p.warmth_mode, p.sharpness
        );
    }
    println!("\nRun 'vibrance render' to print the synthesized filters.");
}

fn print_document(config: &EnhancerConfig, document: &MemoryDocument) {
    println!("== active preset: {}", config.active_preset);

    match document.stylesheet() {
        Some(css) => println!("-- stylesheet --\n{css}"),
        None => println!("-- stylesheet -- (removed)"),
    }
    match document.graph_markup() {
        Some(svg) => println!("-- filter graph --\n{svg}"),
        None => println!("-- filter graph -- (none)"),
    }
}
