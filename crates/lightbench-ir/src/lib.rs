//! Payload types for the lightbench optics engine.
//!
//! This crate defines the JSON shapes exchanged with the outside world: the
//! scene description consumed by a simulation and the ray/analysis result it
//! produces. Element kinds are tagged enums, so an unknown `type` string is a
//! parse error rather than a silent fallback.
//!
//! The IR is purely declarative. Validation, defaults for optional physical
//! constants, and all geometry live in `lightbench-trace`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A 2D point or vector as `[x, y]` (meters).
pub type Xy = [f64; 2];

/// A light source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum SourceDef {
    /// Emits rays evenly over the full circle.
    Point {
        /// Unique identifier.
        id: String,
        /// Emission point.
        pos: Xy,
        /// Total source power (split evenly across rays).
        power: f64,
        /// Number of rays to emit.
        ray_count: u32,
        /// Accepted for a uniform source shape; unused by point sources.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        theta: Option<f64>,
        /// Accepted for a uniform source shape; unused by point sources.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
    },
    /// Emits a parallel beam.
    Collimated {
        /// Unique identifier.
        id: String,
        /// Beam center.
        pos: Xy,
        /// Total source power (split evenly across rays).
        power: f64,
        /// Number of rays to emit.
        ray_count: u32,
        /// Beam direction in radians.
        theta: f64,
        /// Full beam width in meters.
        width: f64,
    },
}

impl SourceDef {
    /// Identifier of this source.
    pub fn id(&self) -> &str {
        match self {
            SourceDef::Point { id, .. } | SourceDef::Collimated { id, .. } => id,
        }
    }

    /// Number of rays this source emits.
    pub fn ray_count(&self) -> u32 {
        match self {
            SourceDef::Point { ray_count, .. } | SourceDef::Collimated { ray_count, .. } => {
                *ray_count
            }
        }
    }
}

/// A lens placed on the plane `x = 0` of its local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum LensDef {
    /// Paraxial thin lens (slope kick `m' = m - y/f`).
    FresnelThin {
        /// Unique identifier.
        id: String,
        /// Lens center.
        pos: Xy,
        /// Rotation of the lens frame in radians.
        theta: f64,
        /// Focal length in meters.
        f: f64,
        /// Full aperture height in meters.
        aperture: f64,
    },
    /// Flat refracting interface using the vector form of Snell's law.
    FresnelFacet {
        /// Unique identifier.
        id: String,
        /// Lens center.
        pos: Xy,
        /// Rotation of the lens frame in radians.
        theta: f64,
        /// Focal length in meters.
        f: f64,
        /// Full aperture height in meters.
        aperture: f64,
        /// Refractive index on the incident side (default 1.0).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n1: Option<f64>,
        /// Refractive index on the exit side (default 1.49).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        n2: Option<f64>,
    },
}

impl LensDef {
    /// Identifier of this lens.
    pub fn id(&self) -> &str {
        match self {
            LensDef::FresnelThin { id, .. } | LensDef::FresnelFacet { id, .. } => id,
        }
    }
}

/// Marker for the only mirror profile, accepted for compatibility with
/// payloads that spell it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorKind {
    /// Conic section `y² - 2Rx + (1+κ)x² = 0`.
    Conic,
}

/// A conic mirror whose vertex sits at the local origin, opening toward +x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorDef {
    /// Unique identifier.
    pub id: String,
    /// Optional explicit profile tag.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MirrorKind>,
    /// Vertex position.
    pub pos: Xy,
    /// Rotation of the mirror frame in radians.
    pub theta: f64,
    /// Vertex radius of curvature in meters.
    #[serde(rename = "R")]
    pub r: f64,
    /// Conic constant (default -1, the parabola).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kappa: Option<f64>,
    /// Full aperture height in meters.
    pub aperture: f64,
}

/// A passive sensor that counts ray crossings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum SensorDef {
    /// Straight segment along local y.
    Line {
        /// Unique identifier.
        id: String,
        /// Segment center.
        pos: Xy,
        /// Rotation of the sensor frame in radians.
        theta: f64,
        /// Full segment length in meters.
        length: f64,
    },
}

impl SensorDef {
    /// Identifier of this sensor.
    pub fn id(&self) -> &str {
        match self {
            SensorDef::Line { id, .. } => id,
        }
    }
}

/// Per-call tracing limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsDef {
    /// Maximum number of surface interactions per ray.
    pub max_bounces: u32,
    /// Maximum path length per ray in meters.
    pub max_distance: f64,
    /// Seed for stochastic sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Uniform angular jitter applied to emitted rays, in radians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_jitter: Option<f64>,
}

/// A complete scene, the simulation input payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDocument {
    /// Light sources, in emission order.
    pub sources: Vec<SourceDef>,
    /// Lenses, in declaration order.
    #[serde(default)]
    pub lenses: Vec<LensDef>,
    /// Mirrors, in declaration order.
    #[serde(default)]
    pub mirrors: Vec<MirrorDef>,
    /// Sensors, in declaration order.
    #[serde(default)]
    pub sensors: Vec<SensorDef>,
    /// Tracing limits.
    pub settings: SettingsDef,
}

impl SceneDocument {
    /// Total number of rays the scene emits.
    pub fn total_rays(&self) -> u64 {
        self.sources.iter().map(|s| u64::from(s.ray_count())).sum()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One traced ray as a polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayPath {
    /// Origin, every surface hit, then the terminal point.
    pub points: Vec<Xy>,
}

/// Crossing statistics for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    /// Number of crossings recorded across all rays.
    pub ray_count: u64,
    /// `ray_count / total_emitted_rays * 100`.
    pub percentage: f64,
}

/// Histogram window at the detector plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorWindow {
    /// Plane position along x.
    pub x: f64,
    /// Lower histogram bound.
    pub y_min: f64,
    /// Upper histogram bound.
    pub y_max: f64,
    /// Number of bins.
    pub bins: u32,
}

/// Tallest histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePeak {
    /// Bin center.
    pub y: f64,
    /// Samples in the bin.
    pub count: u32,
}

/// 1D intensity histogram of ray crossings at the focus plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    /// Histogram window.
    pub detector: DetectorWindow,
    /// Per-bin sample counts.
    pub counts: Vec<u32>,
    /// Bin edges (`bins + 1` values).
    pub edges: Vec<f64>,
    /// Tallest bin.
    pub peak: ProfilePeak,
    /// Number of crossings that went into the histogram.
    pub samples: u32,
}

/// Focus-quality metrics and sensor statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Best focus point, if one could be estimated.
    pub focus: Option<Xy>,
    /// Spot RMS at the focus.
    pub spot_rms: Option<f64>,
    /// Sampled `[x, rms]` pairs from the detector-plane scan.
    pub detector_scan: Option<Vec<Xy>>,
    /// Crossing statistics keyed by sensor id.
    pub sensors: BTreeMap<String, SensorReport>,
    /// Intensity profile at the focus plane.
    pub profile: Option<ProfileReport>,
}

/// The simulation output payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// One polyline per emitted ray, in emission order.
    pub rays: Vec<RayPath>,
    /// Analysis of the terminal ray segments.
    pub analysis: AnalysisReport,
}

impl SimulationResult {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to single-line JSON.
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
