//! Intensity histogram on a detector plane.

use crate::line::{ys_at_x, RayLine};

/// Histogram of ray crossings on the plane `x = const`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityProfile {
    /// Plane position.
    pub x: f64,
    /// Lower edge of the histogram range.
    pub y_min: f64,
    /// Upper edge of the histogram range.
    pub y_max: f64,
    /// Counts per bin.
    pub counts: Vec<u32>,
    /// Bin edges, `counts.len() + 1` values.
    pub edges: Vec<f64>,
    /// Center of the fullest bin (the lowest one on ties).
    pub peak_y: f64,
    /// Count in the fullest bin.
    pub peak_count: u32,
    /// Number of crossings found on the plane.
    pub samples: usize,
}

/// Percentile of sorted data with linear interpolation between ranks.
///
/// `sorted` must be non-empty and ascending; `q` is in `[0, 100]`.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Equal-width histogram over `[lo, hi]`.
///
/// Values outside the range are dropped; the last bin includes `hi`.
fn histogram(values: &[f64], bins: usize, lo: f64, hi: f64) -> (Vec<u32>, Vec<f64>) {
    let width = hi - lo;
    let mut counts = vec![0u32; bins];
    for &v in values {
        if v < lo || v > hi {
            continue;
        }
        let idx = (((v - lo) / width) * bins as f64) as usize;
        counts[idx.min(bins - 1)] += 1;
    }
    let edges = (0..=bins)
        .map(|i| lo + width * (i as f64 / bins as f64))
        .collect();
    (counts, edges)
}

/// Histogram of the forward crossings of `lines` with the plane `x`.
///
/// The range is the 5th to 95th percentile of the crossing heights padded on
/// both sides by `max(1e-6, 0.1 * span)`, so outliers fall off the edges.
/// Returns `None` when fewer than `min_samples` lines cross the plane or
/// `bins` is zero.
pub fn intensity_profile(
    lines: &[RayLine],
    x: f64,
    bins: usize,
    min_samples: usize,
) -> Option<IntensityProfile> {
    let mut ys = ys_at_x(lines, x);
    if bins == 0 || ys.is_empty() || ys.len() < min_samples {
        return None;
    }
    ys.sort_by(f64::total_cmp);

    let y05 = percentile(&ys, 5.0);
    let y95 = percentile(&ys, 95.0);
    let pad = (0.1 * (y95 - y05)).max(1e-6);
    let (y_min, y_max) = (y05 - pad, y95 + pad);

    let (counts, edges) = histogram(&ys, bins, y_min, y_max);

    let mut peak = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[peak] {
            peak = i;
        }
    }

    Some(IntensityProfile {
        x,
        y_min,
        y_max,
        peak_y: 0.5 * (edges[peak] + edges[peak + 1]),
        peak_count: counts[peak],
        counts,
        edges,
        samples: ys.len(),
    })
}
