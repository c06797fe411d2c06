// Sword detection engine: candidate selection, zone penalty, scoring, ranking.
//
// Everything here is pure in-memory computation over already fetched pitch
// records. Fetching, name lookups, video links and persistence live outside.

pub mod candidates;
pub mod pitch;
pub mod rank;
pub mod score;
pub mod zone;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::sword::candidates::select_candidates;
use crate::sword::pitch::PitchRecord;
use crate::sword::rank::{rank_all_time, rank_daily, RankedSword};
use crate::sword::score::{score_candidates, SwordCandidate};

/// Outcome of one daily detection pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySwords {
    pub date: NaiveDate,
    pub total_pitches: usize,
    pub candidate_count: usize,
    pub top: Vec<RankedSword>,
}

/// Select and score every candidate in a pool of pitches.
pub fn score_pool(pitches: &[PitchRecord]) -> Vec<SwordCandidate> {
    let selected = select_candidates(pitches);
    score_candidates(&selected)
}

/// Run the full daily pipeline over one date's pitches.
///
/// Pitches from other dates are ignored, so a caller may hand over a wider
/// snapshot without skewing the day's normalization range.
pub fn detect_daily(date: NaiveDate, pitches: &[PitchRecord], top_n: usize) -> DailySwords {
    let day: Vec<PitchRecord> = pitches
        .iter()
        .filter(|p| p.game_date == date)
        .cloned()
        .collect();

    let pool = score_pool(&day);
    let candidate_count = pool.len();
    let top = rank_daily(pool, top_n);

    info!(
        "{}: {} pitches, {} candidates, {} ranked",
        date,
        day.len(),
        candidate_count,
        top.len()
    );

    DailySwords {
        date,
        total_pitches: day.len(),
        candidate_count,
        top,
    }
}

/// Rank every candidate across all dates by raw metric.
pub fn detect_all_time(pitches: &[PitchRecord], limit: usize) -> Vec<RankedSword> {
    let pool = score_pool(pitches);
    info!("all-time pool: {} candidates", pool.len());
    rank_all_time(pool, limit)
}
