//! Vitrine CLI
//!
//! Renders stories from a content directory to HTML or to a JSON render tree.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vitrine_kernel::config::Config;
use vitrine_kernel::state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding story JSON files (overrides VITRINE_CONTENT_DIR)
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Directory holding Tera template overrides (overrides VITRINE_TEMPLATE_DIR)
    #[arg(long, global = true)]
    template_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a story
    Render {
        /// Story slug; empty renders the home story
        #[arg(default_value = "")]
        slug: String,

        /// Emit visual-editor attributes
        #[arg(long)]
        preview: bool,

        /// Print the render tree as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Wrap the output in a complete HTML document
        #[arg(long, conflicts_with = "json")]
        document: bool,

        /// Nesting ceiling (overrides VITRINE_MAX_DEPTH)
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Print a story's normalized content tree as JSON
    Inspect {
        /// Story slug
        #[arg(default_value = "")]
        slug: String,
    },
    /// List registered block types
    Blocks,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(dir) = args.content_dir {
        config.content_dir = dir;
    }
    if let Some(dir) = args.template_dir {
        config.template_dir = Some(dir);
    }
    info!(content_dir = %config.content_dir.display(), "configuration loaded");

    let state = AppState::new(&config).context("failed to initialize application state")?;

    match args.command {
        Command::Render {
            slug,
            preview,
            json,
            document,
            max_depth,
        } => {
            let mut options = state.options();
            if preview {
                options = options.preview(true);
            }
            if let Some(max_depth) = max_depth {
                anyhow::ensure!(max_depth > 0, "--max-depth must be at least 1");
                options = options.max_depth(max_depth);
            }

            let output = if json {
                let element = state
                    .render_story_with(&slug, options)
                    .with_context(|| format!("failed to render story {slug:?}"))?;
                serde_json::to_string_pretty(&element).context("failed to serialize render tree")?
            } else if document {
                state
                    .render_story_document(&slug, options)
                    .with_context(|| format!("failed to render story {slug:?}"))?
            } else {
                state
                    .render_story_html(&slug, options)
                    .with_context(|| format!("failed to render story {slug:?}"))?
            };
            println!("{output}");
        }
        Command::Inspect { slug } => {
            let root = state
                .load_story(&slug)
                .with_context(|| format!("failed to load story {slug:?}"))?;
            let json = serde_json::to_string_pretty(&root).context("failed to serialize content tree")?;
            println!("{json}");
        }
        Command::Blocks => {
            for name in state.registry().type_names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
