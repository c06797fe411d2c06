// Sword scoring: raw difficulty metric and the universal display score.
//
// raw = 0.35 * (60 - bat_speed) / 60
//     + 0.25 * swing_path_tilt / 60
//     + 0.25 * intercept_y / 50
//     + 0.15 * zone_penalty_factor
//
// Components are not clamped. A bat speed above 60 mph drives the bat speed
// component negative, and a tilt or intercept beyond its reference pushes its
// component past 1.0.

use serde::Serialize;

use crate::sword::pitch::PitchRecord;
use crate::sword::zone::zone_penalty_for;

// ---------------------------------------------------------------------------
// Weights and reference scales
// ---------------------------------------------------------------------------

pub const WEIGHT_BAT_SPEED: f64 = 0.35;
pub const WEIGHT_SWING_TILT: f64 = 0.25;
pub const WEIGHT_INTERCEPT: f64 = 0.25;
pub const WEIGHT_ZONE: f64 = 0.15;

/// Bat speed (mph) at which the bat speed component reaches zero.
pub const BAT_SPEED_REFERENCE_MPH: f64 = 60.0;
/// Swing path tilt (degrees) that earns a full tilt component.
pub const SWING_TILT_REFERENCE_DEG: f64 = 60.0;
/// Intercept (inches) that earns a full intercept component.
pub const INTERCEPT_REFERENCE_IN: f64 = 50.0;

/// Universal scale: `sword_score = raw * SCALE + OFFSET`.
pub const UNIVERSAL_SCALE: f64 = 50.0;
pub const UNIVERSAL_OFFSET: f64 = 50.0;

// ---------------------------------------------------------------------------
// Swing metrics
// ---------------------------------------------------------------------------

/// The three swing measurements every candidate must carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwingMetrics {
    pub bat_speed: f64,
    pub swing_path_tilt: f64,
    pub intercept_y: f64,
}

impl SwingMetrics {
    /// Returns `None` if any of the three measurements is missing.
    pub fn from_pitch(pitch: &PitchRecord) -> Option<Self> {
        Some(SwingMetrics {
            bat_speed: pitch.bat_speed?,
            swing_path_tilt: pitch.swing_path_tilt?,
            intercept_y: pitch.intercept_y?,
        })
    }
}

/// Per-component breakdown of a raw metric, before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreComponents {
    pub bat_speed: f64,
    pub swing_tilt: f64,
    pub intercept: f64,
    pub zone: f64,
}

impl ScoreComponents {
    pub fn new(swing: &SwingMetrics, zone_penalty_factor: f64) -> Self {
        ScoreComponents {
            bat_speed: (BAT_SPEED_REFERENCE_MPH - swing.bat_speed) / BAT_SPEED_REFERENCE_MPH,
            swing_tilt: swing.swing_path_tilt / SWING_TILT_REFERENCE_DEG,
            intercept: swing.intercept_y / INTERCEPT_REFERENCE_IN,
            zone: zone_penalty_factor,
        }
    }

    /// Weighted sum of the components.
    pub fn weighted_sum(&self) -> f64 {
        WEIGHT_BAT_SPEED * self.bat_speed
            + WEIGHT_SWING_TILT * self.swing_tilt
            + WEIGHT_INTERCEPT * self.intercept
            + WEIGHT_ZONE * self.zone
    }
}

/// Raw sword metric: the ranking ground truth, comparable across dates.
pub fn raw_sword_metric(swing: &SwingMetrics, zone_penalty_factor: f64) -> f64 {
    ScoreComponents::new(swing, zone_penalty_factor).weighted_sum()
}

/// Map a raw metric onto the universal display scale.
///
/// Nominally 50-100, but not clamped: extreme inputs land outside that range.
pub fn universal_score(raw_sword_metric: f64) -> f64 {
    raw_sword_metric * UNIVERSAL_SCALE + UNIVERSAL_OFFSET
}

// ---------------------------------------------------------------------------
// SwordCandidate
// ---------------------------------------------------------------------------

/// An eligible pitch with its zone factor and raw metric computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwordCandidate {
    pub pitch: PitchRecord,
    pub swing: SwingMetrics,
    pub zone_penalty_factor: f64,
    pub raw_sword_metric: f64,
}

impl SwordCandidate {
    /// Score a pitch. Returns `None` if it lacks the swing measurements.
    pub fn score(pitch: &PitchRecord) -> Option<Self> {
        let swing = SwingMetrics::from_pitch(pitch)?;
        let zone_penalty_factor = zone_penalty_for(pitch);
        Some(SwordCandidate {
            pitch: pitch.clone(),
            swing,
            zone_penalty_factor,
            raw_sword_metric: raw_sword_metric(&swing, zone_penalty_factor),
        })
    }

    pub fn sword_score(&self) -> f64 {
        universal_score(self.raw_sword_metric)
    }

    pub fn components(&self) -> ScoreComponents {
        ScoreComponents::new(&self.swing, self.zone_penalty_factor)
    }
}

/// Score every selected pitch, preserving input order.
pub fn score_candidates(selected: &[&PitchRecord]) -> Vec<SwordCandidate> {
    selected
        .iter()
        .filter_map(|p| SwordCandidate::score(p))
        .collect()
}
