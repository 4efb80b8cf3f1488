#![warn(missing_docs)]

//! Analysis of traced ray bundles.
//!
//! Every function here works on plain geometry: the terminal line of each
//! ray ([`RayLine`]) and raw sensor counts. Nothing depends on how the rays
//! were traced.
//!
//! # Example
//!
//! ```ignore
//! use lightbench_analysis::{analyze, AnalysisConfig, RayLine};
//!
//! let lines: Vec<RayLine> = polylines
//!     .iter()
//!     .filter_map(|p| RayLine::from_polyline(p))
//!     .collect();
//! let analysis = analyze(&lines, 5.0, &AnalysisConfig::default())?;
//! if let Some(focus) = analysis.focus {
//!     println!("focus at {:?}, rms {:.3e}", focus.point, focus.rms);
//! }
//! ```

pub mod error;
pub mod focus;
pub mod line;
pub mod profile;
pub mod scan;
pub mod sensors;

pub use error::{AnalysisError, Result};
pub use focus::{estimate_focus, least_squares_point, spot_rms, FocusEstimate};
pub use line::{ys_at_x, RayLine};
pub use profile::{intensity_profile, percentile, IntensityProfile};
pub use scan::{scan_detector_planes, scan_range, DetectorScan, ScanSample};
pub use sensors::{sensor_statistics, SensorStat};

use lightbench_math::Tolerance;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of detector planes sampled by the scan.
    pub scan_steps: usize,
    /// Lines that must cross a plane for it to count (capped at the bundle size).
    pub scan_min_samples: usize,
    /// Histogram bins for the intensity profile.
    pub profile_bins: usize,
    /// Crossings needed before a profile is reported.
    pub profile_min_samples: usize,
    /// Least-squares systems with `|det|` below this have no focus.
    pub singular_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scan_steps: 240,
            scan_min_samples: 30,
            profile_bins: 200,
            profile_min_samples: 10,
            singular_tolerance: Tolerance::DEFAULT.singular,
        }
    }
}

impl AnalysisConfig {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.scan_steps < 2 {
            return Err(AnalysisError::InvalidConfig(
                "scan_steps must be at least 2".into(),
            ));
        }
        if self.profile_bins == 0 {
            return Err(AnalysisError::InvalidConfig(
                "profile_bins must be at least 1".into(),
            ));
        }
        if !(self.singular_tolerance.is_finite() && self.singular_tolerance >= 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "singular_tolerance must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Plane acceptance threshold for a bundle of `line_count` lines.
    pub fn scan_threshold(&self, line_count: usize) -> usize {
        self.scan_min_samples.min(line_count).max(2)
    }
}

/// Where the reported focus came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMethod {
    /// Least-squares intersection of the terminal lines.
    LeastSquares,
    /// Centroid of the tightest detector plane.
    DetectorScan,
}

/// Result of analyzing one bundle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analysis {
    /// Reported focus and spot size.
    pub focus: Option<FocusEstimate>,
    /// How `focus` was found.
    pub method: Option<FocusMethod>,
    /// Accepted detector planes, if any.
    pub detector_scan: Option<DetectorScan>,
    /// Histogram at the focus plane.
    pub profile: Option<IntensityProfile>,
    /// Number of terminal lines analyzed.
    pub line_count: usize,
}

/// Analyze a bundle of terminal lines.
///
/// The least-squares focus is computed first; the detector scan then covers
/// `max_distance` from the bundle in its mean direction, and its tightest
/// plane replaces the least-squares focus when its RMS is lower. Without a
/// least-squares focus (fewer than two lines, or a singular system) there is
/// no focus at all, whatever the scan found. A profile is taken at the chosen
/// focus plane.
pub fn analyze(lines: &[RayLine], max_distance: f64, config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;

    let lsq = estimate_focus(lines, config.singular_tolerance);

    let detector_scan = scan_range(lines, max_distance)
        .map(|(x_min, x_max)| {
            scan_detector_planes(
                lines,
                x_min,
                x_max,
                config.scan_steps,
                config.scan_threshold(lines.len()),
            )
        })
        .filter(|scan| !scan.is_empty());

    let scan_best = detector_scan.as_ref().and_then(DetectorScan::best).map(|s| FocusEstimate {
        point: s.centroid(),
        rms: s.rms,
    });

    // The scan only refines a least-squares focus; a singular bundle has none.
    let (focus, method) = match (lsq, scan_best) {
        (Some(l), Some(s)) if s.rms < l.rms => (Some(s), Some(FocusMethod::DetectorScan)),
        (Some(l), _) => (Some(l), Some(FocusMethod::LeastSquares)),
        (None, _) => (None, None),
    };

    if focus.is_none() && !lines.is_empty() {
        warn!(lines = lines.len(), "No focus found for bundle");
    }

    let profile = focus.and_then(|f| {
        intensity_profile(
            lines,
            f.point.x,
            config.profile_bins,
            config.profile_min_samples,
        )
    });

    debug!(
        lines = lines.len(),
        ?method,
        rms = ?focus.map(|f| f.rms),
        profile = profile.is_some(),
        "Bundle analyzed"
    );

    Ok(Analysis {
        focus,
        method,
        detector_scan,
        profile,
        line_count: lines.len(),
    })
}
