//! lightbench CLI - run optical scenes from JSON files.
//!
//! Logs go to stderr (filter with `RUST_LOG`), results to stdout or a file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lightbench::{AnalysisConfig, Scene, SceneDocument};
use lightbench_trace::{LensModel, Source};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "lightbench")]
#[command(about = "2D optical bench: trace rays and measure focus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace a scene and print the result JSON
    Simulate {
        /// Scene JSON file
        scene: PathBuf,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
        /// Number of detector planes to scan
        #[arg(long)]
        scan_steps: Option<usize>,
        /// Histogram bins for the intensity profile
        #[arg(long)]
        profile_bins: Option<usize>,
    },
    /// Check a scene without tracing it
    Validate {
        /// Scene JSON file
        scene: PathBuf,
    },
    /// Display information about a scene
    Info {
        /// Scene JSON file
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            scene,
            output,
            compact,
            scan_steps,
            profile_bins,
        } => {
            let mut config = AnalysisConfig::default();
            if let Some(steps) = scan_steps {
                config.scan_steps = steps;
            }
            if let Some(bins) = profile_bins {
                config.profile_bins = bins;
            }
            simulate_file(&scene, output.as_deref(), compact, &config)?;
        }
        Commands::Validate { scene } => {
            validate_file(&scene)?;
        }
        Commands::Info { scene } => {
            show_info(&scene)?;
        }
    }

    Ok(())
}

fn load_document(path: &Path) -> Result<SceneDocument> {
    debug!(path = %path.display(), "Loading scene");
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    SceneDocument::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_scene(path: &Path) -> Result<Scene> {
    let doc = load_document(path)?;
    Scene::from_document(&doc).with_context(|| format!("invalid scene in {}", path.display()))
}

fn simulate_file(
    path: &Path,
    output: Option<&Path>,
    compact: bool,
    config: &AnalysisConfig,
) -> Result<()> {
    let doc = load_document(path)?;
    let result = lightbench::simulate_with(&doc, config)?;

    let json = if compact {
        result.to_json_compact()?
    } else {
        result.to_json()?
    };

    match output {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {} rays to {}", result.rays.len(), out.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn validate_file(path: &Path) -> Result<()> {
    let scene = load_scene(path)?;
    println!(
        "{}: ok ({} sources, {} rays)",
        path.display(),
        scene.sources.len(),
        scene.total_rays()
    );
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let scene = load_scene(path)?;

    println!("Scene: {}", path.display());
    println!();

    println!("Sources ({}):", scene.sources.len());
    for source in &scene.sources {
        match source {
            Source::Point {
                id,
                position,
                ray_count,
                ..
            } => println!(
                "  {id}: point at ({:.3}, {:.3}), {ray_count} rays",
                position.x, position.y
            ),
            Source::Collimated {
                id,
                position,
                theta,
                width,
                ray_count,
                ..
            } => println!(
                "  {id}: collimated at ({:.3}, {:.3}), theta {theta:.3} rad, width {width:.3}, {ray_count} rays",
                position.x, position.y
            ),
        }
    }

    println!("Lenses ({}):", scene.lenses.len());
    for lens in &scene.lenses {
        let model = match lens.model {
            LensModel::FresnelThin => "thin".to_string(),
            LensModel::FresnelFacet { n1, n2 } => format!("facet n1={n1} n2={n2}"),
        };
        println!(
            "  {}: {model}, f {:.3}, aperture {:.3}",
            lens.id, lens.f, lens.aperture
        );
    }

    println!("Mirrors ({}):", scene.mirrors.len());
    for mirror in &scene.mirrors {
        println!(
            "  {}: R {:.3}, kappa {:.3}, aperture {:.3}",
            mirror.id, mirror.r, mirror.kappa, mirror.aperture
        );
    }

    println!("Sensors ({}):", scene.sensors.len());
    for sensor in &scene.sensors {
        println!("  {}: length {:.3}", sensor.id, sensor.length);
    }

    let settings = &scene.settings;
    println!();
    println!(
        "Settings: max_bounces {}, max_distance {}, seed {}, angular_jitter {}",
        settings.max_bounces,
        settings.max_distance,
        settings
            .seed
            .map_or_else(|| "none".to_string(), |s| s.to_string()),
        settings.angular_jitter
    );

    Ok(())
}
