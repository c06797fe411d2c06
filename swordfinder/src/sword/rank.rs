// Ranking: top-N selection and day-relative normalization.

use serde::Serialize;

use crate::sword::pitch::PitchKey;
use crate::sword::score::SwordCandidate;

/// Number of swords featured per day.
pub const DAILY_TOP_N: usize = 5;

/// Lower and upper bound of the day-relative scale.
pub const DAILY_SCALE_FLOOR: f64 = 50.0;
pub const DAILY_SCALE_SPAN: f64 = 50.0;

/// A scored candidate placed in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSword {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub candidate: SwordCandidate,
    /// Universal 50-100 score, unclamped.
    pub sword_score: f64,
    /// Day-relative score; only present for daily rankings.
    pub daily_normalized_score: Option<f64>,
}

impl RankedSword {
    pub fn key(&self) -> PitchKey {
        self.candidate.pitch.key()
    }

    pub fn raw_sword_metric(&self) -> f64 {
        self.candidate.raw_sword_metric
    }

    pub fn scores(&self) -> SwordScores {
        SwordScores {
            zone_penalty_factor: self.candidate.zone_penalty_factor,
            raw_sword_metric: self.candidate.raw_sword_metric,
            sword_score: self.sword_score,
            daily_normalized_score: self.daily_normalized_score,
        }
    }
}

/// The numbers persisted and displayed for a sword, detached from its rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwordScores {
    pub zone_penalty_factor: f64,
    pub raw_sword_metric: f64,
    pub sword_score: f64,
    pub daily_normalized_score: Option<f64>,
}

/// Min and max raw metric over one day's full candidate pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    /// Range over `candidates`, or `None` for an empty pool.
    pub fn of(candidates: &[SwordCandidate]) -> Option<Self> {
        let mut iter = candidates.iter().map(|c| c.raw_sword_metric);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m)));
        Some(MetricRange { min, max })
    }

    /// Position of `metric` within the range, in `[0, 1]` for pool members.
    /// A degenerate range (single candidate or all equal) maps to 1.0.
    pub fn normalize(&self, metric: f64) -> f64 {
        if self.max > self.min {
            (metric - self.min) / (self.max - self.min)
        } else {
            1.0
        }
    }

    pub fn daily_score(&self, metric: f64) -> f64 {
        DAILY_SCALE_FLOOR + self.normalize(metric) * DAILY_SCALE_SPAN
    }
}

/// Sort by raw metric descending. Ties keep input order.
fn sort_by_metric_desc(candidates: &mut [SwordCandidate]) {
    candidates.sort_by(|a, b| b.raw_sword_metric.total_cmp(&a.raw_sword_metric));
}

/// Rank one day's candidates: the top `top_n` by raw metric, each with a
/// daily normalized score anchored on the whole day's min and max.
///
/// Returns fewer than `top_n` entries when the pool is smaller; never pads.
pub fn rank_daily(mut candidates: Vec<SwordCandidate>, top_n: usize) -> Vec<RankedSword> {
    let Some(range) = MetricRange::of(&candidates) else {
        return Vec::new();
    };

    sort_by_metric_desc(&mut candidates);
    candidates.truncate(top_n);

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| {
            let metric = candidate.raw_sword_metric;
            RankedSword {
                rank: i + 1,
                sword_score: candidate.sword_score(),
                daily_normalized_score: Some(range.daily_score(metric)),
                candidate,
            }
        })
        .collect()
}

/// Rank a multi-day pool by raw metric alone. No day-relative normalization
/// applies across dates, so `daily_normalized_score` is absent.
pub fn rank_all_time(mut candidates: Vec<SwordCandidate>, limit: usize) -> Vec<RankedSword> {
    sort_by_metric_desc(&mut candidates);
    candidates.truncate(limit);

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| RankedSword {
            rank: i + 1,
            sword_score: candidate.sword_score(),
            daily_normalized_score: None,
            candidate,
        })
        .collect()
}
