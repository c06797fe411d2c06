// Candidate selection: which pitches are structurally eligible to be swords.
//
// A sword is the decisive pitch of a strikeout at-bat that the batter swung
// through. Selection works at the at-bat level so every at-bat contributes at
// most one candidate, no matter how many times the batter whiffed before the
// final pitch.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::sword::pitch::PitchRecord;
use crate::sword::score::SwingMetrics;

/// Return the last pitch of every at-bat in `pitches`, keyed by
/// `(game_pk, at_bat_number)`, in first-seen input order.
///
/// When two records share the maximum `pitch_number`, the one with the lowest
/// store `row_id` wins, a record with a row id beats one without, and a
/// remaining tie keeps the earlier record.
pub fn last_pitches(pitches: &[PitchRecord]) -> Vec<&PitchRecord> {
    let (finals, ties) = resolve_last_pitches(pitches);
    for pitch in finals.iter().filter(|p| ties.contains(&p.at_bat())) {
        warn!(
            "duplicate final pitch_number for {}; applied row-id tie rule",
            pitch.key()
        );
    }
    finals
}

/// Last pitch per at-bat plus the at-bats whose final pitch_number is shared
/// by more than one record.
fn resolve_last_pitches(pitches: &[PitchRecord]) -> (Vec<&PitchRecord>, HashSet<(i64, i64)>) {
    let mut order: Vec<(i64, i64)> = Vec::new();
    let mut last: HashMap<(i64, i64), &PitchRecord> = HashMap::new();
    let mut ties: HashSet<(i64, i64)> = HashSet::new();

    for pitch in pitches {
        let at_bat = pitch.at_bat();
        match last.get(&at_bat) {
            None => {
                order.push(at_bat);
                last.insert(at_bat, pitch);
            }
            Some(incumbent) => {
                match pitch.pitch_number.cmp(&incumbent.pitch_number) {
                    Ordering::Equal => {
                        ties.insert(at_bat);
                    }
                    Ordering::Greater => {
                        ties.remove(&at_bat);
                    }
                    Ordering::Less => {}
                }
                if supersedes(pitch, incumbent) {
                    last.insert(at_bat, pitch);
                }
            }
        }
    }

    let finals = order
        .into_iter()
        .filter_map(|at_bat| last.get(&at_bat).copied())
        .collect();
    (finals, ties)
}

/// Whether `challenger` should replace `incumbent` as its at-bat's last pitch.
fn supersedes(challenger: &PitchRecord, incumbent: &PitchRecord) -> bool {
    match challenger.pitch_number.cmp(&incumbent.pitch_number) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => match (challenger.row_id, incumbent.row_id) {
            (Some(c), Some(i)) => c < i,
            (Some(_), None) => true,
            _ => false,
        },
    }
}

/// Select every sword candidate among one pool of pitch records.
///
/// Keeps the last pitch of each at-bat when that at-bat ended in a strikeout,
/// the pitch itself was a swinging strike (blocked or not), and bat speed,
/// swing path tilt and intercept are all present. The result is a set; its
/// order carries no meaning.
pub fn select_candidates(pitches: &[PitchRecord]) -> Vec<&PitchRecord> {
    let finals = last_pitches(pitches);
    let at_bats = finals.len();

    let candidates: Vec<&PitchRecord> = finals
        .into_iter()
        .filter(|p| p.is_strikeout())
        .filter(|p| p.is_swinging_strike())
        .filter(|p| SwingMetrics::from_pitch(p).is_some())
        .collect();

    debug!(
        "{} pitches, {} at-bats, {} sword candidates",
        pitches.len(),
        at_bats,
        candidates.len()
    );
    candidates
}
