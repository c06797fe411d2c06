// Statcast CSV loading.
//
// Reads Baseball Savant search exports (one row per pitch, Savant column
// names). Columns the engine does not use are ignored, and empty or
// unparseable numeric cells become `None`.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::sword::pitch::PitchRecord;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StatcastError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private), Savant format
// ---------------------------------------------------------------------------

/// One Savant export row. Numeric columns go through `csv::invalid_option`
/// so blanks and `NA` read as missing instead of failing the row.
#[derive(Debug, Deserialize)]
struct RawSavantPitch {
    game_pk: i64,
    game_date: NaiveDate,
    at_bat_number: i64,
    pitch_number: i64,
    #[serde(default)]
    events: Option<String>,
    #[serde(default)]
    description: Option<String>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    bat_speed: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    swing_path_tilt: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    intercept_ball_minus_batter_pos_y_inches: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    plate_x: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    plate_z: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    sz_top: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    sz_bot: Option<f64>,

    #[serde(default, alias = "sv_id")]
    play_id: Option<String>,
    #[serde(default)]
    pitch_type: Option<String>,
    #[serde(default)]
    pitch_name: Option<String>,
    #[serde(default)]
    player_name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    batter: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pitcher: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    inning: Option<i64>,
    #[serde(default)]
    home_team: Option<String>,
    #[serde(default)]
    away_team: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_speed: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_spin_rate: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    release_extension: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    effective_speed: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pfx_x: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pfx_z: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trim a text cell and drop it when empty.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Drop NaN/Infinity, which Savant occasionally emits for missing tracking.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl From<RawSavantPitch> for PitchRecord {
    fn from(raw: RawSavantPitch) -> Self {
        PitchRecord {
            row_id: None,
            game_pk: raw.game_pk,
            game_date: raw.game_date,
            at_bat_number: raw.at_bat_number,
            pitch_number: raw.pitch_number,
            events: text(raw.events),
            description: text(raw.description),
            bat_speed: finite(raw.bat_speed),
            swing_path_tilt: finite(raw.swing_path_tilt),
            intercept_y: finite(raw.intercept_ball_minus_batter_pos_y_inches),
            plate_x: finite(raw.plate_x),
            plate_z: finite(raw.plate_z),
            sz_top: finite(raw.sz_top),
            sz_bot: finite(raw.sz_bot),
            play_id: text(raw.play_id),
            pitch_type: text(raw.pitch_type),
            pitch_name: text(raw.pitch_name),
            player_name: text(raw.player_name),
            batter: raw.batter,
            pitcher: raw.pitcher,
            inning: raw.inning,
            home_team: text(raw.home_team),
            away_team: text(raw.away_team),
            release_speed: finite(raw.release_speed),
            release_spin_rate: finite(raw.release_spin_rate),
            release_extension: finite(raw.release_extension),
            effective_speed: finite(raw.effective_speed),
            pfx_x: finite(raw.pfx_x),
            pfx_z: finite(raw.pfx_z),
        }
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn load_pitches_from_reader<R: Read>(rdr: R) -> Result<Vec<PitchRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut pitches = Vec::new();
    for result in reader.deserialize::<RawSavantPitch>() {
        match result {
            Ok(raw) => pitches.push(PitchRecord::from(raw)),
            Err(e) => {
                warn!("skipping malformed Statcast row: {}", e);
            }
        }
    }
    Ok(pitches)
}

/// Load every pitch from a Savant CSV export.
///
/// Rows missing an identity column (`game_pk`, `game_date`, `at_bat_number`,
/// `pitch_number`) are skipped with a warning. A file that yields no valid
/// rows is a validation error.
pub fn load_statcast_csv(path: &Path) -> Result<Vec<PitchRecord>, StatcastError> {
    let file = std::fs::File::open(path).map_err(|e| StatcastError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let pitches = load_pitches_from_reader(file).map_err(|e| StatcastError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if pitches.is_empty() {
        return Err(StatcastError::Validation(format!(
            "{} produced zero valid pitch rows",
            path.display()
        )));
    }
    Ok(pitches)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
