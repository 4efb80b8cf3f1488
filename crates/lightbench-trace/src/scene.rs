//! Validated scene model.
//!
//! [`Scene::from_document`] is the only way in: it checks every invariant,
//! fills documented defaults, and dispatches element kinds into enums once so
//! the tracer never looks at a kind string.

use std::collections::HashSet;

use lightbench_ir::{LensDef, MirrorDef, SceneDocument, SensorDef, SettingsDef, SourceDef, Xy};
use lightbench_math::{Point2, Pose2};

use crate::error::{Result, SceneError};

/// Default incident-side index for facet lenses.
pub const DEFAULT_N1: f64 = 1.0;
/// Default glass index for facet lenses.
pub const DEFAULT_N2: f64 = 1.49;
/// Default conic constant (parabola).
pub const DEFAULT_KAPPA: f64 = -1.0;
/// Largest accepted angular jitter, in radians.
pub const MAX_ANGULAR_JITTER: f64 = 0.5;

/// A light source.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Rays evenly spread over the full circle.
    Point {
        /// Identifier.
        id: String,
        /// Emission point.
        position: Point2,
        /// Total power.
        power: f64,
        /// Number of rays (at least 1).
        ray_count: u32,
    },
    /// Parallel beam.
    Collimated {
        /// Identifier.
        id: String,
        /// Beam center.
        position: Point2,
        /// Beam direction in radians.
        theta: f64,
        /// Full beam width (non-negative).
        width: f64,
        /// Total power.
        power: f64,
        /// Number of rays (at least 1).
        ray_count: u32,
    },
}

impl Source {
    /// Identifier of this source.
    pub fn id(&self) -> &str {
        match self {
            Source::Point { id, .. } | Source::Collimated { id, .. } => id,
        }
    }

    /// Number of rays this source emits.
    pub fn ray_count(&self) -> u32 {
        match self {
            Source::Point { ray_count, .. } | Source::Collimated { ray_count, .. } => *ray_count,
        }
    }
}

/// How a lens bends rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LensModel {
    /// Paraxial slope kick.
    FresnelThin,
    /// Flat entry face plus a focusing facet, both refracting with Snell's law.
    FresnelFacet {
        /// Index on the incident side.
        n1: f64,
        /// Index of the lens material.
        n2: f64,
    },
}

/// A lens lying on local `x = 0`, aperture along local y.
#[derive(Debug, Clone, PartialEq)]
pub struct Lens {
    /// Identifier.
    pub id: String,
    /// Placement.
    pub pose: Pose2,
    /// Focal length (non-zero; negative diverges).
    pub f: f64,
    /// Full aperture height.
    pub aperture: f64,
    /// Refraction model.
    pub model: LensModel,
}

/// A conic mirror `y² - 2Rx + (1+κ)x² = 0` with its vertex at the local origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ConicMirror {
    /// Identifier.
    pub id: String,
    /// Placement.
    pub pose: Pose2,
    /// Vertex radius of curvature (non-zero).
    pub r: f64,
    /// Conic constant.
    pub kappa: f64,
    /// Full aperture height.
    pub aperture: f64,
}

/// A passive segment on local `x = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSensor {
    /// Identifier, used to key statistics.
    pub id: String,
    /// Placement.
    pub pose: Pose2,
    /// Full segment length.
    pub length: f64,
}

/// Per-call tracing limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Maximum surface interactions per ray.
    pub max_bounces: u32,
    /// Maximum path length per ray.
    pub max_distance: f64,
    /// Seed for angular jitter.
    pub seed: Option<u64>,
    /// Uniform angular jitter half-width in radians (0 disables).
    pub angular_jitter: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_bounces: 6,
            max_distance: 5.0,
            seed: None,
            angular_jitter: 0.0,
        }
    }
}

/// An immutable, validated scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Sources in emission order.
    pub sources: Vec<Source>,
    /// Lenses in declaration order.
    pub lenses: Vec<Lens>,
    /// Mirrors in declaration order.
    pub mirrors: Vec<ConicMirror>,
    /// Sensors in declaration order.
    pub sensors: Vec<LineSensor>,
    /// Tracing limits.
    pub settings: Settings,
}

impl Scene {
    /// Validate a payload and build the scene.
    pub fn from_document(doc: &SceneDocument) -> Result<Self> {
        let settings = convert_settings(&doc.settings)?;

        let sources = doc.sources.iter().map(convert_source).collect::<Result<Vec<_>>>()?;
        let lenses = doc.lenses.iter().map(convert_lens).collect::<Result<Vec<_>>>()?;
        let mirrors = doc.mirrors.iter().map(convert_mirror).collect::<Result<Vec<_>>>()?;
        let sensors = doc.sensors.iter().map(convert_sensor).collect::<Result<Vec<_>>>()?;

        check_unique("source", sources.iter().map(Source::id))?;
        check_unique("lens", lenses.iter().map(|l| l.id.as_str()))?;
        check_unique("mirror", mirrors.iter().map(|m| m.id.as_str()))?;
        check_unique("sensor", sensors.iter().map(|s| s.id.as_str()))?;

        Ok(Self {
            sources,
            lenses,
            mirrors,
            sensors,
            settings,
        })
    }

    /// Total number of rays emitted by all sources.
    pub fn total_rays(&self) -> u64 {
        self.sources.iter().map(|s| u64::from(s.ray_count())).sum()
    }
}

/// Field checks share one shape: a predicate plus the message it enforces.
struct Checker<'a> {
    element: &'static str,
    id: &'a str,
}

impl Checker<'_> {
    fn check(
        &self,
        field: &'static str,
        value: f64,
        requirement: &'static str,
        ok: impl Fn(f64) -> bool,
    ) -> Result<f64> {
        if value.is_finite() && ok(value) {
            Ok(value)
        } else {
            Err(SceneError::InvalidField {
                element: self.element,
                id: self.id.to_string(),
                field,
                requirement,
                value,
            })
        }
    }

    fn finite(&self, field: &'static str, value: f64) -> Result<f64> {
        self.check(field, value, "finite", |_| true)
    }

    fn positive(&self, field: &'static str, value: f64) -> Result<f64> {
        self.check(field, value, "positive", |v| v > 0.0)
    }

    fn non_zero(&self, field: &'static str, value: f64) -> Result<f64> {
        self.check(field, value, "non-zero", |v| v != 0.0)
    }

    fn point(&self, xy: &Xy) -> Result<Point2> {
        Ok(Point2::new(self.finite("pos", xy[0])?, self.finite("pos", xy[1])?))
    }

    fn pose(&self, xy: &Xy, theta: f64) -> Result<Pose2> {
        Ok(Pose2::new(self.point(xy)?, self.finite("theta", theta)?))
    }

    fn ray_count(&self, count: u32) -> Result<u32> {
        if count == 0 {
            return Err(SceneError::InvalidField {
                element: self.element,
                id: self.id.to_string(),
                field: "ray_count",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        Ok(count)
    }
}

fn convert_settings(def: &SettingsDef) -> Result<Settings> {
    if !(def.max_distance.is_finite() && def.max_distance > 0.0) {
        return Err(SceneError::InvalidSettings(format!(
            "max_distance must be positive, got {}",
            def.max_distance
        )));
    }
    let angular_jitter = def.angular_jitter.unwrap_or(0.0);
    if !(0.0..=MAX_ANGULAR_JITTER).contains(&angular_jitter) {
        return Err(SceneError::InvalidSettings(format!(
            "angular_jitter must be within [0, {MAX_ANGULAR_JITTER}], got {angular_jitter}"
        )));
    }
    Ok(Settings {
        max_bounces: def.max_bounces,
        max_distance: def.max_distance,
        seed: def.seed,
        angular_jitter,
    })
}

fn convert_source(def: &SourceDef) -> Result<Source> {
    let c = Checker {
        element: "source",
        id: def.id(),
    };
    Ok(match def {
        SourceDef::Point {
            id,
            pos,
            power,
            ray_count,
            ..
        } => Source::Point {
            id: id.clone(),
            position: c.point(pos)?,
            power: c.check("power", *power, "non-negative", |v| v >= 0.0)?,
            ray_count: c.ray_count(*ray_count)?,
        },
        SourceDef::Collimated {
            id,
            pos,
            power,
            ray_count,
            theta,
            width,
        } => Source::Collimated {
            id: id.clone(),
            position: c.point(pos)?,
            theta: c.finite("theta", *theta)?,
            width: c.check("width", *width, "non-negative", |v| v >= 0.0)?,
            power: c.check("power", *power, "non-negative", |v| v >= 0.0)?,
            ray_count: c.ray_count(*ray_count)?,
        },
    })
}

fn convert_lens(def: &LensDef) -> Result<Lens> {
    let c = Checker {
        element: "lens",
        id: def.id(),
    };
    Ok(match def {
        LensDef::FresnelThin {
            id,
            pos,
            theta,
            f,
            aperture,
        } => Lens {
            id: id.clone(),
            pose: c.pose(pos, *theta)?,
            f: c.non_zero("f", *f)?,
            aperture: c.positive("aperture", *aperture)?,
            model: LensModel::FresnelThin,
        },
        LensDef::FresnelFacet {
            id,
            pos,
            theta,
            f,
            aperture,
            n1,
            n2,
        } => Lens {
            id: id.clone(),
            pose: c.pose(pos, *theta)?,
            f: c.non_zero("f", *f)?,
            aperture: c.positive("aperture", *aperture)?,
            model: LensModel::FresnelFacet {
                n1: c.positive("n1", n1.unwrap_or(DEFAULT_N1))?,
                n2: c.positive("n2", n2.unwrap_or(DEFAULT_N2))?,
            },
        },
    })
}

fn convert_mirror(def: &MirrorDef) -> Result<ConicMirror> {
    let c = Checker {
        element: "mirror",
        id: &def.id,
    };
    Ok(ConicMirror {
        id: def.id.clone(),
        pose: c.pose(&def.pos, def.theta)?,
        r: c.non_zero("R", def.r)?,
        kappa: c.finite("kappa", def.kappa.unwrap_or(DEFAULT_KAPPA))?,
        aperture: c.positive("aperture", def.aperture)?,
    })
}

fn convert_sensor(def: &SensorDef) -> Result<LineSensor> {
    let c = Checker {
        element: "sensor",
        id: def.id(),
    };
    match def {
        SensorDef::Line {
            id,
            pos,
            theta,
            length,
        } => Ok(LineSensor {
            id: id.clone(),
            pose: c.pose(pos, *theta)?,
            length: c.positive("length", *length)?,
        }),
    }
}

fn check_unique<'a>(element: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SceneError::DuplicateId {
                element,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
