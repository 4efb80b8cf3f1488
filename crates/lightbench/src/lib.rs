#![warn(missing_docs)]

//! lightbench: a 2D optical bench in Rust.
//!
//! Point and collimated sources, Fresnel lenses (paraxial and Snell facet
//! models), conic mirrors and passive line sensors. One call takes a scene
//! document, traces every ray through the bounce loop and reports the ray
//! polylines with a focus/spot-size analysis.
//!
//! # Example
//!
//! ```rust,no_run
//! let scene = std::fs::read_to_string("bench.json").unwrap();
//! let result = lightbench::simulate_json(&scene).unwrap();
//! println!("{result}");
//! ```

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;

pub use lightbench_analysis::{AnalysisConfig, AnalysisError};
pub use lightbench_ir::{SceneDocument, SimulationResult};
pub use lightbench_trace::{Scene, SceneError};

use lightbench_analysis::{
    analyze, sensor_statistics, Analysis, DetectorScan, IntensityProfile, RayLine, SensorStat,
};
use lightbench_ir::{
    AnalysisReport, DetectorWindow, ProfilePeak, ProfileReport, RayPath, SensorReport,
};
use lightbench_math::Point2;
use lightbench_trace::{trace_scene, TraceOutput};

/// Errors returned by a simulation call.
///
/// Any error aborts the call; no partial result is produced.
#[derive(Error, Debug)]
pub enum SimulateError {
    /// The scene failed validation.
    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),
    /// The analysis configuration is invalid.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// The payload could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for simulation calls.
pub type Result<T> = std::result::Result<T, SimulateError>;

/// Everything one simulation call computed, before conversion to the
/// output payload.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// The validated scene.
    pub scene: Scene,
    /// Traced rays and sensor counts.
    pub trace: TraceOutput,
    /// Bundle analysis of the terminal lines.
    pub analysis: Analysis,
    /// Per-sensor statistics in declaration order.
    pub sensors: Vec<SensorStat>,
}

impl Simulation {
    /// Convert to the output payload.
    pub fn to_result(&self) -> SimulationResult {
        let rays = self
            .trace
            .rays
            .iter()
            .map(|traced| RayPath {
                points: traced.ray.polyline.iter().map(xy).collect(),
            })
            .collect();

        let sensors: BTreeMap<String, SensorReport> = self
            .sensors
            .iter()
            .map(|s| {
                (
                    s.id.clone(),
                    SensorReport {
                        ray_count: s.ray_count,
                        percentage: s.percentage,
                    },
                )
            })
            .collect();

        let focus = self.analysis.focus;
        SimulationResult {
            rays,
            analysis: AnalysisReport {
                focus: focus.map(|f| xy(&f.point)),
                spot_rms: focus.map(|f| f.rms),
                detector_scan: self.analysis.detector_scan.as_ref().map(scan_report),
                sensors,
                profile: self.analysis.profile.as_ref().map(profile_report),
            },
        }
    }
}

fn xy(p: &Point2) -> [f64; 2] {
    [p.x, p.y]
}

fn scan_report(scan: &DetectorScan) -> Vec<[f64; 2]> {
    scan.samples.iter().map(|s| [s.x, s.rms]).collect()
}

fn profile_report(profile: &IntensityProfile) -> ProfileReport {
    ProfileReport {
        detector: DetectorWindow {
            x: profile.x,
            y_min: profile.y_min,
            y_max: profile.y_max,
            bins: profile.counts.len() as u32,
        },
        counts: profile.counts.clone(),
        edges: profile.edges.clone(),
        peak: ProfilePeak {
            y: profile.peak_y,
            count: profile.peak_count,
        },
        samples: profile.samples as u32,
    }
}

/// Validate, trace and analyze a scene.
pub fn run(doc: &SceneDocument, config: &AnalysisConfig) -> Result<Simulation> {
    config.validate()?;
    let scene = Scene::from_document(doc)?;

    info!(
        sources = scene.sources.len(),
        rays = scene.total_rays(),
        max_bounces = scene.settings.max_bounces,
        max_distance = scene.settings.max_distance,
        "Simulating scene"
    );

    let trace = trace_scene(&scene);

    let lines: Vec<RayLine> = trace
        .rays
        .iter()
        .filter_map(|traced| traced.ray.terminal_segment())
        .map(|(point, dir)| RayLine { point, dir })
        .collect();

    let analysis = analyze(&lines, scene.settings.max_distance, config)?;

    let sensors = sensor_statistics(
        scene
            .sensors
            .iter()
            .zip(&trace.sensor_counts)
            .map(|(sensor, &count)| (sensor.id.as_str(), count)),
        trace.emitted,
    );

    info!(
        rays = trace.rays.len(),
        focus = ?analysis.focus.map(|f| (f.point.x, f.point.y)),
        spot_rms = ?analysis.focus.map(|f| f.rms),
        "Simulation complete"
    );

    Ok(Simulation {
        scene,
        trace,
        analysis,
        sensors,
    })
}

/// Simulate a scene document with the default analysis configuration.
pub fn simulate(doc: &SceneDocument) -> Result<SimulationResult> {
    simulate_with(doc, &AnalysisConfig::default())
}

/// Simulate a scene document with a custom analysis configuration.
pub fn simulate_with(doc: &SceneDocument, config: &AnalysisConfig) -> Result<SimulationResult> {
    Ok(run(doc, config)?.to_result())
}

/// Parse a JSON scene, simulate it and return the pretty-printed result.
pub fn simulate_json(json: &str) -> Result<String> {
    let doc = SceneDocument::from_json(json)?;
    Ok(simulate(&doc)?.to_json()?)
}
