// Render the annotations active at one instant onto a plain frame and save it as PNG

use std::path::PathBuf;

use clap::Parser;
use video_annotator::{
    annotation::{load_annotations, Bgr, Timeline},
    config::Config,
    styles::AnnotationRenderer,
    video::Frame,
};

#[derive(Parser)]
#[command(name = "preview_frame", about = "Preview annotations on a still frame")]
struct Args {
    /// JSON file holding an array of annotations
    #[arg(short, long)]
    annotations: PathBuf,

    /// Playback time to preview, in seconds
    #[arg(short, long, default_value_t = 0.0)]
    time: f64,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Background color as #RRGGBB
    #[arg(long, default_value = "#202020")]
    background: String,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "preview.png")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("🎬 Previewing annotations at {:.2}s", args.time);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;

    let background = Bgr::from_hex(&args.background)
        .ok_or_else(|| anyhow::anyhow!("Invalid background color: {}", args.background))?;

    let annotations = load_annotations(&args.annotations)?;
    let timeline = Timeline::from_annotations(&annotations)?;
    let renderer = AnnotationRenderer::new(config.render);

    let mut frame = Frame::new_filled(args.width, args.height, background);
    let mut active = 0;
    for entry in timeline.active_at(args.time) {
        let placement = renderer.draw(&mut frame, entry.annotation, entry.rank);
        println!(
            "   #{} rank {} -> marker at ({}, {})",
            entry.annotation.id, entry.rank, placement.anchor.0, placement.anchor.1
        );
        active += 1;
    }
    println!("   {} of {} annotations active", active, timeline.len());

    frame.save_png(&args.output)?;
    println!("📁 Preview saved to: {}", args.output.display());
    Ok(())
}
