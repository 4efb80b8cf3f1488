//! Detector-plane scan for the circle of least confusion.
//!
//! Vertical planes `x = const` are sampled across a range; on each plane the
//! forward crossings of the terminal lines are collected and their spread
//! measured as the RMS of `y` about its mean. The plane with the smallest
//! spread approximates the best focus even when aberrations keep the rays
//! from meeting in a point.

use lightbench_math::Point2;
use tracing::debug;

use crate::line::{ys_at_x, RayLine};

/// One accepted detector plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSample {
    /// Plane position.
    pub x: f64,
    /// Mean crossing height.
    pub mean_y: f64,
    /// RMS of the crossing heights about `mean_y`.
    pub rms: f64,
    /// Number of lines crossing the plane.
    pub samples: usize,
}

impl ScanSample {
    /// Centroid of the spot on this plane.
    pub fn centroid(&self) -> Point2 {
        Point2::new(self.x, self.mean_y)
    }
}

/// Accepted planes in scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorScan {
    /// Accepted planes, increasing in `x`.
    pub samples: Vec<ScanSample>,
}

impl DetectorScan {
    /// Plane with the smallest RMS (the earliest one on ties).
    pub fn best(&self) -> Option<&ScanSample> {
        self.samples.iter().fold(None, |best, s| match best {
            Some(b) if s.rms >= b.rms => Some(b),
            _ => Some(s),
        })
    }

    /// Whether no plane was accepted.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Range of planes to scan for a bundle.
///
/// The range starts at the bundle and extends `max_distance` in the mean
/// travel direction: `[min x, min x + max_distance]` when the mean `dx` is
/// non-negative, `[max x - max_distance, max x]` otherwise. `None` for an
/// empty bundle.
pub fn scan_range(lines: &[RayLine], max_distance: f64) -> Option<(f64, f64)> {
    if lines.is_empty() {
        return None;
    }
    let mean_dx = lines.iter().map(|l| l.dir.x).sum::<f64>() / lines.len() as f64;
    let xs = lines.iter().map(|l| l.point.x);
    if mean_dx >= 0.0 {
        let x_min = xs.fold(f64::INFINITY, f64::min);
        Some((x_min, x_min + max_distance))
    } else {
        let x_max = xs.fold(f64::NEG_INFINITY, f64::max);
        Some((x_max - max_distance, x_max))
    }
}

/// RMS about the mean, with the mean.
fn spread(ys: &[f64]) -> (f64, f64) {
    let n = ys.len() as f64;
    let mean = ys.iter().sum::<f64>() / n;
    let var = ys.iter().map(|y| (y - mean) * (y - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Scan `steps` evenly spaced planes over `[x_min, x_max]` (both ends
/// included).
///
/// A plane is accepted when at least `min_samples` lines cross it forward.
/// Fewer than two steps yields an empty scan.
pub fn scan_detector_planes(
    lines: &[RayLine],
    x_min: f64,
    x_max: f64,
    steps: usize,
    min_samples: usize,
) -> DetectorScan {
    if steps < 2 {
        return DetectorScan::default();
    }

    let min_samples = min_samples.max(1);
    let samples: Vec<ScanSample> = (0..steps)
        .filter_map(|i| {
            let x = x_min + (x_max - x_min) * (i as f64 / (steps - 1) as f64);
            let ys = ys_at_x(lines, x);
            if ys.len() < min_samples {
                return None;
            }
            let (mean_y, rms) = spread(&ys);
            Some(ScanSample {
                x,
                mean_y,
                rms,
                samples: ys.len(),
            })
        })
        .collect();

    debug!(
        steps,
        accepted = samples.len(),
        x_min,
        x_max,
        "Detector scan"
    );

    DetectorScan { samples }
}
