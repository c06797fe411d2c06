// Pitch-level input records as read from the Statcast store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Statcast outcome strings
// ---------------------------------------------------------------------------

/// Plate-appearance outcome for a strikeout (`events` column).
pub const EVENT_STRIKEOUT: &str = "strikeout";

/// Pitch outcome for a swing and miss (`description` column).
pub const DESC_SWINGING_STRIKE: &str = "swinging_strike";

/// Pitch outcome for a swing and miss the catcher had to block.
pub const DESC_SWINGING_STRIKE_BLOCKED: &str = "swinging_strike_blocked";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable identifying key for a single pitch. Downstream enrichment joins
/// back to source data on this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PitchKey {
    pub game_pk: i64,
    pub at_bat_number: i64,
    pub pitch_number: i64,
}

impl fmt::Display for PitchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "game {} / AB {} / pitch {}",
            self.game_pk, self.at_bat_number, self.pitch_number
        )
    }
}

// ---------------------------------------------------------------------------
// PitchRecord
// ---------------------------------------------------------------------------

/// One pitch event. Every measurement Statcast may omit is an `Option`.
///
/// Only the identity, outcome, swing and location fields feed detection and
/// scoring. The remaining fields ride along for presentation (names, video,
/// percentile highlights) and never influence the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRecord {
    /// Store row id, when the record came from the database.
    pub row_id: Option<i64>,
    pub game_pk: i64,
    pub game_date: NaiveDate,
    pub at_bat_number: i64,
    pub pitch_number: i64,
    pub events: Option<String>,
    pub description: Option<String>,

    // Swing mechanics
    pub bat_speed: Option<f64>,
    pub swing_path_tilt: Option<f64>,
    /// `intercept_ball_minus_batter_pos_y_inches` in Statcast exports.
    pub intercept_y: Option<f64>,

    // Location (feet)
    pub plate_x: Option<f64>,
    pub plate_z: Option<f64>,
    pub sz_top: Option<f64>,
    pub sz_bot: Option<f64>,

    // Presentation-only context
    pub play_id: Option<String>,
    pub pitch_type: Option<String>,
    pub pitch_name: Option<String>,
    /// Statcast's `player_name`, which names the pitcher.
    pub player_name: Option<String>,
    pub batter: Option<i64>,
    pub pitcher: Option<i64>,
    pub inning: Option<i64>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub release_speed: Option<f64>,
    pub release_spin_rate: Option<f64>,
    pub release_extension: Option<f64>,
    pub effective_speed: Option<f64>,
    pub pfx_x: Option<f64>,
    pub pfx_z: Option<f64>,
}

impl PitchRecord {
    /// A record with identity fields set and every optional field empty.
    pub fn new(
        game_pk: i64,
        game_date: NaiveDate,
        at_bat_number: i64,
        pitch_number: i64,
    ) -> Self {
        PitchRecord {
            row_id: None,
            game_pk,
            game_date,
            at_bat_number,
            pitch_number,
            events: None,
            description: None,
            bat_speed: None,
            swing_path_tilt: None,
            intercept_y: None,
            plate_x: None,
            plate_z: None,
            sz_top: None,
            sz_bot: None,
            play_id: None,
            pitch_type: None,
            pitch_name: None,
            player_name: None,
            batter: None,
            pitcher: None,
            inning: None,
            home_team: None,
            away_team: None,
            release_speed: None,
            release_spin_rate: None,
            release_extension: None,
            effective_speed: None,
            pfx_x: None,
            pfx_z: None,
        }
    }

    pub fn key(&self) -> PitchKey {
        PitchKey {
            game_pk: self.game_pk,
            at_bat_number: self.at_bat_number,
            pitch_number: self.pitch_number,
        }
    }

    /// The at-bat this pitch belongs to.
    pub fn at_bat(&self) -> (i64, i64) {
        (self.game_pk, self.at_bat_number)
    }

    /// True when the plate appearance ended in a strikeout.
    pub fn is_strikeout(&self) -> bool {
        self.events.as_deref() == Some(EVENT_STRIKEOUT)
    }

    /// True when the pitch was a swing and miss (blocked or not).
    pub fn is_swinging_strike(&self) -> bool {
        matches!(
            self.description.as_deref(),
            Some(DESC_SWINGING_STRIKE) | Some(DESC_SWINGING_STRIKE_BLOCKED)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 24).unwrap()
    }

    #[test]
    fn swinging_strike_accepts_blocked_variant() {
        let mut p = PitchRecord::new(1, date(), 1, 1);
        p.description = Some("swinging_strike_blocked".into());
        assert!(p.is_swinging_strike());

        p.description = Some("called_strike".into());
        assert!(!p.is_swinging_strike());

        p.description = None;
        assert!(!p.is_swinging_strike());
    }

    #[test]
    fn strikeout_requires_exact_event() {
        let mut p = PitchRecord::new(1, date(), 1, 1);
        p.events = Some("strikeout_double_play".into());
        assert!(!p.is_strikeout());
        p.events = Some("strikeout".into());
        assert!(p.is_strikeout());
    }

    #[test]
    fn key_display_is_readable() {
        let p = PitchRecord::new(745_123, date(), 34, 6);
        assert_eq!(p.key().to_string(), "game 745123 / AB 34 / pitch 6");
    }
}
