// Pitch record sources: the seam between the engine and whatever stores pitches.

use anyhow::Result;
use chrono::NaiveDate;

use crate::sword::pitch::PitchRecord;

/// Anything that can hand the engine a snapshot of pitch records.
///
/// Failures propagate to the caller; a source must never substitute partial
/// or stale data for a failed fetch.
pub trait PitchSource {
    /// Every pitch thrown on `date`.
    fn pitches_for_date(&self, date: NaiveDate) -> Result<Vec<PitchRecord>>;

    /// Every pitch in the source, across all dates.
    fn all_pitches(&self) -> Result<Vec<PitchRecord>>;
}

/// An in-memory pitch table, used for fixtures and one-off CSV analysis.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pitches: Vec<PitchRecord>,
}

impl MemorySource {
    pub fn new(pitches: Vec<PitchRecord>) -> Self {
        MemorySource { pitches }
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

impl PitchSource for MemorySource {
    fn pitches_for_date(&self, date: NaiveDate) -> Result<Vec<PitchRecord>> {
        Ok(self
            .pitches
            .iter()
            .filter(|p| p.game_date == date)
            .cloned()
            .collect())
    }

    fn all_pitches(&self) -> Result<Vec<PitchRecord>> {
        Ok(self.pitches.clone())
    }
}
