use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use video_annotator::{
    annotation::load_annotations, composition::RenderEngine, config::Config, video::VideoLoader,
};

#[derive(Parser)]
#[command(
    name = "video-annotator",
    version,
    about = "Burn time-anchored markers and captions into a video",
    long_about = "Video-Annotator draws markers, labels, callouts and headline bars onto every frame where an annotation is active, then copies the source audio back into the result."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render annotations onto a video
    Render {
        /// Source video file
        #[arg(short, long)]
        input: PathBuf,

        /// JSON file holding an array of annotations
        #[arg(short, long)]
        annotations: PathBuf,

        /// Output video file path
        #[arg(short, long)]
        output: PathBuf,

        /// Drop the source audio instead of remuxing it
        #[arg(long)]
        no_audio: bool,
    },

    /// Print a video's metadata as JSON
    Probe {
        /// Video file to inspect
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };
    config.validate()?;

    match cli.command {
        Command::Render {
            input,
            annotations,
            output,
            no_audio,
        } => render(config, input, annotations, output, !no_audio).await,
        Command::Probe { input } => probe(&config, &input),
    }
}

async fn render(
    config: Config,
    input: PathBuf,
    annotations_path: PathBuf,
    output: PathBuf,
    keep_audio: bool,
) -> Result<()> {
    info!("Starting Video-Annotator v{}", env!("CARGO_PKG_VERSION"));

    let annotations = load_annotations(&annotations_path)?;
    info!("Loaded {} annotations from {:?}", annotations.len(), annotations_path);

    // Rendering is blocking subprocess I/O from start to finish
    let outcome = tokio::task::spawn_blocking(move || {
        let engine = RenderEngine::new(config);
        engine.render(&input, &output, &annotations, keep_audio)
    })
    .await
    .context("render task panicked")?;

    match outcome {
        Ok(path) => {
            info!("Render complete! Output saved to: {:?}", path);
            Ok(())
        }
        Err(e) => {
            error!("{}", e.user_message());
            Err(e.into())
        }
    }
}

fn probe(config: &Config, input: &Path) -> Result<()> {
    let metadata = VideoLoader::new(&config.video).probe(input)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
