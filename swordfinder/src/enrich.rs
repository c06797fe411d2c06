// Result assembly: names, video links and percentile highlights.
//
// Runs strictly after ranking. It joins on a sword's pitch record and never
// feeds anything back into selection or scoring.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::percentile::PercentileAnalyzer;
use crate::sword::pitch::PitchRecord;
use crate::sword::rank::{RankedSword, SwordScores};

// ---------------------------------------------------------------------------
// Name lookup
// ---------------------------------------------------------------------------

/// Resolves MLBAM player ids to display names.
pub trait NameLookup {
    fn name_for(&self, player_id: i64) -> Option<String>;
}

impl NameLookup for HashMap<i64, String> {
    fn name_for(&self, player_id: i64) -> Option<String> {
        self.get(&player_id).cloned()
    }
}

/// A lookup that knows nobody. Pitcher names still come from Statcast's
/// `player_name` column.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNames;

impl NameLookup for NoNames {
    fn name_for(&self, _player_id: i64) -> Option<String> {
        None
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

fn round1<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((value * 10.0).round() / 10.0)
}

fn round1_opt<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => round1(v, s),
        None => s.serialize_none(),
    }
}

fn round4<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((value * 10_000.0).round() / 10_000.0)
}

/// Scores as presented: rounded on output only, full precision in memory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayScores {
    #[serde(serialize_with = "round4")]
    pub zone_penalty_factor: f64,
    #[serde(serialize_with = "round4")]
    pub raw_sword_metric: f64,
    #[serde(serialize_with = "round1")]
    pub sword_score: f64,
    #[serde(serialize_with = "round1_opt")]
    pub daily_normalized_score: Option<f64>,
}

impl From<SwordScores> for DisplayScores {
    fn from(s: SwordScores) -> Self {
        DisplayScores {
            zone_penalty_factor: s.zone_penalty_factor,
            raw_sword_metric: s.raw_sword_metric,
            sword_score: s.sword_score,
            daily_normalized_score: s.daily_normalized_score,
        }
    }
}

impl From<DisplayScores> for SwordScores {
    fn from(d: DisplayScores) -> Self {
        SwordScores {
            zone_penalty_factor: d.zone_penalty_factor,
            raw_sword_metric: d.raw_sword_metric,
            sword_score: d.sword_score,
            daily_normalized_score: d.daily_normalized_score,
        }
    }
}

/// A featured sword, ready to render or persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwordReport {
    pub rank: usize,
    #[serde(flatten)]
    pub pitch: PitchRecord,
    #[serde(flatten)]
    pub scores: DisplayScores,
    pub pitcher_name: Option<String>,
    pub batter_name: Option<String>,
    pub video_url: Option<String>,
    pub percentile_highlights: Vec<String>,
}

/// Savant video page for a play, or `None` without a play id.
pub fn video_url(base_url: &str, play_id: Option<&str>) -> Option<String> {
    let play_id = play_id?.trim();
    if play_id.is_empty() {
        return None;
    }
    Some(format!("{}?playId={}", base_url.trim_end_matches('/'), play_id))
}

// ---------------------------------------------------------------------------
// Enricher
// ---------------------------------------------------------------------------

/// Attaches presentation data to ranked swords.
pub struct Enricher<'a, N: NameLookup> {
    video_base_url: &'a str,
    names: &'a N,
    percentiles: &'a PercentileAnalyzer,
}

impl<'a, N: NameLookup> Enricher<'a, N> {
    pub fn new(video_base_url: &'a str, names: &'a N, percentiles: &'a PercentileAnalyzer) -> Self {
        Enricher {
            video_base_url,
            names,
            percentiles,
        }
    }

    /// Assemble a report from a pitch and its scores.
    pub fn assemble(&self, rank: usize, pitch: &PitchRecord, scores: SwordScores) -> SwordReport {
        let pitcher_name = pitch
            .pitcher
            .and_then(|id| self.names.name_for(id))
            .or_else(|| pitch.player_name.clone());
        let batter_name = pitch.batter.and_then(|id| self.names.name_for(id));

        SwordReport {
            rank,
            pitch: pitch.clone(),
            scores: scores.into(),
            pitcher_name,
            batter_name,
            video_url: video_url(self.video_base_url, pitch.play_id.as_deref()),
            percentile_highlights: self.percentiles.highlights(pitch),
        }
    }

    pub fn report(&self, ranked: &RankedSword) -> SwordReport {
        self.assemble(ranked.rank, &ranked.candidate.pitch, ranked.scores())
    }

    pub fn reports(&self, ranked: &[RankedSword]) -> Vec<SwordReport> {
        ranked.iter().map(|r| self.report(r)).collect()
    }
}
