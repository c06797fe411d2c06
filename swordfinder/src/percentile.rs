// Pitch-quality percentiles by pitch type.
//
// Ranks a pitch's velocity, spin, movement and extension against every pitch
// of the same type in a reference pool. Used only to annotate featured swords;
// it never feeds the sword score.

use std::collections::HashMap;

use serde::Serialize;

use crate::sword::pitch::PitchRecord;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Pitch characteristics with percentile distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PitchMetric {
    ReleaseSpeed,
    ReleaseSpinRate,
    HorizontalMovement,
    VerticalMovement,
    Extension,
    EffectiveSpeed,
}

impl PitchMetric {
    pub const ALL: [PitchMetric; 6] = [
        PitchMetric::ReleaseSpeed,
        PitchMetric::ReleaseSpinRate,
        PitchMetric::HorizontalMovement,
        PitchMetric::VerticalMovement,
        PitchMetric::Extension,
        PitchMetric::EffectiveSpeed,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PitchMetric::ReleaseSpeed => "Velocity",
            PitchMetric::ReleaseSpinRate => "Spin Rate",
            PitchMetric::HorizontalMovement => "Horizontal Movement",
            PitchMetric::VerticalMovement => "Vertical Movement",
            PitchMetric::Extension => "Extension",
            PitchMetric::EffectiveSpeed => "Perceived Velocity",
        }
    }

    pub fn value_of(&self, pitch: &PitchRecord) -> Option<f64> {
        match self {
            PitchMetric::ReleaseSpeed => pitch.release_speed,
            PitchMetric::ReleaseSpinRate => pitch.release_spin_rate,
            PitchMetric::HorizontalMovement => pitch.pfx_x,
            PitchMetric::VerticalMovement => pitch.pfx_z,
            PitchMetric::Extension => pitch.release_extension,
            PitchMetric::EffectiveSpeed => pitch.effective_speed,
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Descriptive tier for a percentile.
pub fn percentile_label(percentile: f64) -> &'static str {
    if percentile >= 95.0 {
        "Elite"
    } else if percentile >= 90.0 {
        "Excellent"
    } else if percentile >= 75.0 {
        "Above Average"
    } else if percentile >= 60.0 {
        "Good"
    } else if percentile >= 40.0 {
        "Average"
    } else if percentile >= 25.0 {
        "Below Average"
    } else if percentile >= 10.0 {
        "Poor"
    } else {
        "Very Poor"
    }
}

/// Highlight tier for a featured pitch, or `None` for unremarkable values.
fn highlight_tier(percentile: f64) -> Option<&'static str> {
    if percentile >= 95.0 {
        Some("Elite")
    } else if percentile >= 85.0 {
        Some("Excellent")
    } else if percentile >= 75.0 {
        Some("Above Average")
    } else if percentile <= 15.0 {
        Some("Poor")
    } else if percentile <= 25.0 {
        Some("Below Average")
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// One metric's percentile for a specific pitch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPercentile {
    pub metric: PitchMetric,
    pub value: f64,
    pub percentile: f64,
    /// Tier from `percentile_label`.
    pub label: &'static str,
}

/// Sorted per-pitch-type distributions built from a reference pool.
#[derive(Debug, Clone, Default)]
pub struct PercentileAnalyzer {
    distributions: HashMap<(String, PitchMetric), Vec<f64>>,
}

impl PercentileAnalyzer {
    /// Build distributions from every pitch with a known type. Missing values
    /// are skipped per metric.
    pub fn from_pitches(pitches: &[PitchRecord]) -> Self {
        let mut distributions: HashMap<(String, PitchMetric), Vec<f64>> = HashMap::new();
        for pitch in pitches {
            let Some(pitch_type) = pitch.pitch_type.as_deref() else {
                continue;
            };
            for metric in PitchMetric::ALL {
                if let Some(v) = metric.value_of(pitch) {
                    distributions
                        .entry((pitch_type.to_string(), metric))
                        .or_default()
                        .push(v);
                }
            }
        }
        for values in distributions.values_mut() {
            values.sort_by(f64::total_cmp);
        }
        PercentileAnalyzer { distributions }
    }

    /// Share of same-type values strictly below `value`, as 0-100 rounded to
    /// one decimal. `None` when the pool has no data for this type and metric.
    pub fn percentile(&self, pitch_type: &str, metric: PitchMetric, value: f64) -> Option<f64> {
        let values = self.distributions.get(&(pitch_type.to_string(), metric))?;
        if values.is_empty() {
            return None;
        }
        let below = values.partition_point(|v| *v < value);
        let pct = below as f64 / values.len() as f64 * 100.0;
        Some((pct * 10.0).round() / 10.0)
    }

    /// Every available metric percentile for `pitch`, in `PitchMetric::ALL`
    /// order.
    pub fn analyze(&self, pitch: &PitchRecord) -> Vec<MetricPercentile> {
        let Some(pitch_type) = pitch.pitch_type.as_deref() else {
            return Vec::new();
        };
        PitchMetric::ALL
            .iter()
            .filter_map(|&metric| {
                let value = metric.value_of(pitch)?;
                let percentile = self.percentile(pitch_type, metric, value)?;
                Some(MetricPercentile {
                    metric,
                    value,
                    percentile,
                    label: percentile_label(percentile),
                })
            })
            .collect()
    }

    /// Human-readable highlights for the notable percentiles of `pitch`.
    pub fn highlights(&self, pitch: &PitchRecord) -> Vec<String> {
        self.analyze(pitch)
            .into_iter()
            .filter_map(|mp| {
                let tier = highlight_tier(mp.percentile)?;
                Some(format!(
                    "{} {} ({:.1}th percentile)",
                    tier,
                    mp.metric.display_name(),
                    mp.percentile
                ))
            })
            .collect()
    }
}
