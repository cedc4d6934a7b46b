//! Diagram extraction command-line tool.
//!
//! Detects diagram regions on one document page and writes each of them as a
//! PNG crop into the output directory.
//!
//! # Usage
//!
//! ```bash
//! oar-diagram [OPTIONS] <IMAGE> <OUTPUT_DIR>
//! ```
//!
//! # Arguments
//!
//! * `--config` - JSON file overriding detector thresholds
//! * `--json` - Print the detection result as JSON instead of the written paths
//! * `--overlay` - Write a copy of the page with the detected boxes outlined
//! * `--dump-config` - Print the effective configuration as JSON and exit
//! * `<IMAGE>` - Page image to process
//! * `<OUTPUT_DIR>` - Directory receiving `diagram_<i>.png`
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=info oar-diagram --overlay out/overlay.png page.png out/
//! oar-diagram --dump-config > thresholds.json
//! ```

use clap::Parser;
use oar_diagram::pipeline::{DetectionResult, DetectorConfig, DiagramDetector};
use oar_diagram::utils::{draw_detections, init_tracing, load_image};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command-line arguments for diagram extraction
#[derive(Parser)]
#[command(name = "oar-diagram")]
#[command(about = "Detects diagrams on a document page and crops them into separate images")]
struct Args {
    /// Page image to process
    #[arg(required_unless_present = "dump_config")]
    image: Option<PathBuf>,

    /// Directory receiving the cropped diagrams
    #[arg(required_unless_present = "dump_config")]
    output_dir: Option<PathBuf>,

    /// JSON file with detector threshold overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the detection result as JSON to stdout
    #[arg(long)]
    json: bool,

    /// Write the page with detected boxes outlined to this path
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading detector config: {}", path.display());
            DetectorConfig::from_json_file(path)?
        }
        None => DetectorConfig::default(),
    };
    let detector = DiagramDetector::new(config)?;

    if args.dump_config {
        println!("{}", detector.config().to_json_string()?);
        return Ok(());
    }
    let (Some(image_path), Some(output_dir)) = (&args.image, &args.output_dir) else {
        return Err("an image and an output directory are required".into());
    };

    std::fs::create_dir_all(output_dir)?;

    let page = match load_image(image_path) {
        Ok(page) => page,
        Err(err) => {
            warn!("Could not read {}: {}", image_path.display(), err);
            if args.json {
                print_json(&DetectionResult::default(), &[])?;
            }
            return Ok(());
        }
    };

    let result = detector.detect(&page);
    info!("{}", result.stats);

    let paths = detector
        .config()
        .export
        .export(&page, &result.diagrams, output_dir)?;

    if let Some(overlay_path) = &args.overlay {
        draw_detections(&page, &result.diagrams).save(overlay_path)?;
        info!("Overlay saved to {}", overlay_path.display());
    }

    if args.json {
        print_json(&result, &paths)?;
    } else {
        for path in &paths {
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn print_json(result: &DetectionResult, paths: &[PathBuf]) -> Result<(), serde_json::Error> {
    let output = json!({
        "page": result.page,
        "diagrams": result.diagrams,
        "stats": result.stats,
        "files": paths,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
