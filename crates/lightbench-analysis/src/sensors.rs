//! Per-sensor crossing statistics.

/// Crossing statistics for one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStat {
    /// Sensor identifier.
    pub id: String,
    /// Number of crossing events.
    pub ray_count: u64,
    /// `ray_count` as a percentage of all emitted rays.
    pub percentage: f64,
}

/// Turn raw crossing counts into statistics.
///
/// A ray crossing the same sensor twice counts twice, so percentages can
/// exceed 100. With no emitted rays every percentage is 0.
pub fn sensor_statistics<'a, I>(counts: I, total_rays: u64) -> Vec<SensorStat>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    counts
        .into_iter()
        .map(|(id, ray_count)| SensorStat {
            id: id.to_string(),
            ray_count,
            percentage: if total_rays > 0 {
                ray_count as f64 / total_rays as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
