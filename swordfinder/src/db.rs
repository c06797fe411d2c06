// SQLite persistence: Statcast pitches, scored swords, processed dates.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::enrich::SwordReport;
use crate::source::PitchSource;
use crate::sword::pitch::PitchRecord;
use crate::sword::rank::SwordScores;
use crate::sword::score::SwordCandidate;

/// Column list shared by every pitch query, in `row_to_pitch` order.
const PITCH_COLUMNS: &str = "id, game_pk, game_date, at_bat_number, pitch_number, events, description,
     bat_speed, swing_path_tilt, intercept_y, plate_x, plate_z, sz_top, sz_bot,
     play_id, pitch_type, pitch_name, player_name, batter, pitcher, inning, home_team, away_team,
     release_speed, release_spin_rate, release_extension, effective_speed, pfx_x, pfx_z";

/// A processed date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub total_pitches: usize,
    pub sword_swings_found: usize,
    pub processed_at: String,
}

/// A sword read back from the `sword_swings` table with its pitch.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSword {
    /// 1-based position in the day's ranking as it was saved.
    pub daily_rank: usize,
    pub pitch: PitchRecord,
    pub scores: SwordScores,
    pub percentile_highlights: Vec<String>,
    pub video_url: Option<String>,
}

/// SQLite-backed store for pitch records and sword results.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral database (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS statcast_pitches (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                game_pk           INTEGER NOT NULL,
                game_date         TEXT NOT NULL,
                at_bat_number     INTEGER NOT NULL,
                pitch_number      INTEGER NOT NULL,
                events            TEXT,
                description       TEXT,
                bat_speed         REAL,
                swing_path_tilt   REAL,
                intercept_y       REAL,
                plate_x           REAL,
                plate_z           REAL,
                sz_top            REAL,
                sz_bot            REAL,
                play_id           TEXT,
                pitch_type        TEXT,
                pitch_name        TEXT,
                player_name       TEXT,
                batter            INTEGER,
                pitcher           INTEGER,
                inning            INTEGER,
                home_team         TEXT,
                away_team         TEXT,
                release_speed     REAL,
                release_spin_rate REAL,
                release_extension REAL,
                effective_speed   REAL,
                pfx_x             REAL,
                pfx_z             REAL,
                created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                UNIQUE(game_pk, at_bat_number, pitch_number)
            );

            CREATE INDEX IF NOT EXISTS idx_statcast_pitches_game_date
                ON statcast_pitches(game_date);

            CREATE TABLE IF NOT EXISTS sword_swings (
                id                     INTEGER PRIMARY KEY AUTOINCREMENT,
                pitch_id               INTEGER NOT NULL UNIQUE REFERENCES statcast_pitches(id),
                zone_penalty_factor    REAL NOT NULL,
                raw_sword_metric       REAL NOT NULL,
                sword_score            REAL NOT NULL,
                daily_normalized_score REAL,
                daily_rank             INTEGER,
                percentile_highlights  TEXT,
                video_url              TEXT,
                updated_at             TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS daily_results (
                date               TEXT PRIMARY KEY,
                total_pitches      INTEGER NOT NULL,
                sword_swings_found INTEGER NOT NULL,
                processed_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Pitches
    // ------------------------------------------------------------------

    /// Insert pitches in a single transaction. Pitches already stored under
    /// the same `(game_pk, at_bat_number, pitch_number)` are left untouched.
    /// Returns the number of newly inserted rows.
    pub fn insert_pitches(&self, pitches: &[PitchRecord]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;
        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO statcast_pitches (
                        game_pk, game_date, at_bat_number, pitch_number, events, description,
                        bat_speed, swing_path_tilt, intercept_y, plate_x, plate_z, sz_top, sz_bot,
                        play_id, pitch_type, pitch_name, player_name, batter, pitcher, inning,
                        home_team, away_team, release_speed, release_spin_rate, release_extension,
                        effective_speed, pfx_x, pfx_z)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                             ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)",
                )
                .context("failed to prepare pitch insert")?;

            for p in pitches {
                inserted += stmt
                    .execute(params![
                        p.game_pk,
                        p.game_date,
                        p.at_bat_number,
                        p.pitch_number,
                        p.events,
                        p.description,
                        p.bat_speed,
                        p.swing_path_tilt,
                        p.intercept_y,
                        p.plate_x,
                        p.plate_z,
                        p.sz_top,
                        p.sz_bot,
                        p.play_id,
                        p.pitch_type,
                        p.pitch_name,
                        p.player_name,
                        p.batter,
                        p.pitcher,
                        p.inning,
                        p.home_team,
                        p.away_team,
                        p.release_speed,
                        p.release_spin_rate,
                        p.release_extension,
                        p.effective_speed,
                        p.pfx_x,
                        p.pfx_z,
                    ])
                    .with_context(|| format!("failed to insert pitch {}", p.key()))?;
            }
        }
        tx.commit().context("failed to commit import")?;
        Ok(inserted)
    }

    /// Load every pitch thrown on `date`, ordered by game, at-bat and pitch.
    pub fn pitches_for_date(&self, date: NaiveDate) -> Result<Vec<PitchRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PITCH_COLUMNS} FROM statcast_pitches
                 WHERE game_date = ?1
                 ORDER BY game_pk, at_bat_number, pitch_number, id"
            ))
            .context("failed to prepare pitches_for_date query")?;

        let pitches = stmt
            .query_map(params![date], row_to_pitch)
            .context("failed to query pitches for date")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map pitch rows")?;
        Ok(pitches)
    }

    /// Load every stored pitch.
    pub fn all_pitches(&self) -> Result<Vec<PitchRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PITCH_COLUMNS} FROM statcast_pitches
                 ORDER BY game_date, game_pk, at_bat_number, pitch_number, id"
            ))
            .context("failed to prepare all_pitches query")?;

        let pitches = stmt
            .query_map([], row_to_pitch)
            .context("failed to query all pitches")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map pitch rows")?;
        Ok(pitches)
    }

    /// Every stored pitch whose `pitch_type` is one of `pitch_types`.
    pub fn pitches_of_types(&self, pitch_types: &[String]) -> Result<Vec<PitchRecord>> {
        if pitch_types.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; pitch_types.len()].join(", ");
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PITCH_COLUMNS} FROM statcast_pitches
                 WHERE pitch_type IN ({placeholders})
                 ORDER BY game_date, game_pk, at_bat_number, pitch_number, id"
            ))
            .context("failed to prepare pitches_of_types query")?;

        let pitches = stmt
            .query_map(params_from_iter(pitch_types), row_to_pitch)
            .context("failed to query pitches by type")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map pitch rows")?;
        Ok(pitches)
    }

    /// Distinct game dates with at least one pitch, ascending.
    pub fn game_dates(&self) -> Result<Vec<NaiveDate>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT DISTINCT game_date FROM statcast_pitches ORDER BY game_date")
            .context("failed to prepare game_dates query")?;
        let dates = stmt
            .query_map([], |row| row.get(0))
            .context("failed to query game dates")?
            .collect::<std::result::Result<Vec<NaiveDate>, _>>()
            .context("failed to map game date rows")?;
        Ok(dates)
    }

    /// Total number of stored pitches.
    pub fn pitch_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM statcast_pitches", [], |row| row.get(0))
            .context("failed to count pitches")?;
        Ok(count as usize)
    }

    // ------------------------------------------------------------------
    // Sword swings
    // ------------------------------------------------------------------

    /// Insert or refresh the universal scores for a candidate. Leaves any
    /// daily score, highlights and video link from a daily run in place.
    pub fn upsert_sword_score(&self, candidate: &SwordCandidate) -> Result<()> {
        let pitch_id = candidate
            .pitch
            .row_id
            .with_context(|| format!("candidate {} has no stored row id", candidate.pitch.key()))?;
        let conn = self.conn();
        conn.execute(
            "INSERT INTO sword_swings (pitch_id, zone_penalty_factor, raw_sword_metric, sword_score)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(pitch_id) DO UPDATE SET
                zone_penalty_factor = excluded.zone_penalty_factor,
                raw_sword_metric    = excluded.raw_sword_metric,
                sword_score         = excluded.sword_score,
                updated_at          = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![
                pitch_id,
                candidate.zone_penalty_factor,
                candidate.raw_sword_metric,
                candidate.sword_score(),
            ],
        )
        .context("failed to upsert sword score")?;
        Ok(())
    }

    /// Persist one day's featured swords and mark the date processed, in a
    /// single transaction.
    ///
    /// Daily scores left over from an earlier run of the same date are
    /// cleared first, so a refreshed run never leaves stale members behind.
    pub fn save_daily(
        &self,
        date: NaiveDate,
        total_pitches: usize,
        reports: &[SwordReport],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin daily transaction")?;

        tx.execute(
            "UPDATE sword_swings SET daily_normalized_score = NULL, daily_rank = NULL
             WHERE pitch_id IN (SELECT id FROM statcast_pitches WHERE game_date = ?1)",
            params![date],
        )
        .context("failed to clear previous daily scores")?;

        for report in reports {
            let pitch_id = report
                .pitch
                .row_id
                .with_context(|| format!("sword {} has no stored row id", report.pitch.key()))?;
            let scores = SwordScores::from(report.scores);
            let highlights = serde_json::to_string(&report.percentile_highlights)
                .context("failed to serialize percentile highlights")?;
            tx.execute(
                "INSERT INTO sword_swings (pitch_id, zone_penalty_factor, raw_sword_metric, sword_score,
                                           daily_normalized_score, daily_rank, percentile_highlights,
                                           video_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(pitch_id) DO UPDATE SET
                    zone_penalty_factor    = excluded.zone_penalty_factor,
                    raw_sword_metric       = excluded.raw_sword_metric,
                    sword_score            = excluded.sword_score,
                    daily_normalized_score = excluded.daily_normalized_score,
                    daily_rank             = excluded.daily_rank,
                    percentile_highlights  = excluded.percentile_highlights,
                    video_url              = excluded.video_url,
                    updated_at             = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    pitch_id,
                    scores.zone_penalty_factor,
                    scores.raw_sword_metric,
                    scores.sword_score,
                    scores.daily_normalized_score,
                    report.rank as i64,
                    highlights,
                    report.video_url,
                ],
            )
            .context("failed to save daily sword")?;
        }

        tx.execute(
            "INSERT INTO daily_results (date, total_pitches, sword_swings_found)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET
                total_pitches      = excluded.total_pitches,
                sword_swings_found = excluded.sword_swings_found,
                processed_at       = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![date, total_pitches as i64, reports.len() as i64],
        )
        .context("failed to record daily result")?;

        tx.commit().context("failed to commit daily results")?;
        Ok(())
    }

    /// The processing record for `date`, if it was processed.
    pub fn daily_result(&self, date: NaiveDate) -> Result<Option<DailyResult>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT date, total_pitches, sword_swings_found, processed_at
                 FROM daily_results WHERE date = ?1",
            )
            .context("failed to prepare daily_result query")?;

        let mut rows = stmt
            .query_map(params![date], |row| {
                let total: i64 = row.get(1)?;
                let found: i64 = row.get(2)?;
                Ok(DailyResult {
                    date: row.get(0)?,
                    total_pitches: total as usize,
                    sword_swings_found: found as usize,
                    processed_at: row.get(3)?,
                })
            })
            .context("failed to query daily results")?;

        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read daily result row")?)),
            None => Ok(None),
        }
    }

    /// The featured swords persisted for `date`, in their saved rank order.
    pub fn cached_daily_swords(&self, date: NaiveDate) -> Result<Vec<StoredSword>> {
        let conn = self.conn();
        let columns = PITCH_COLUMNS
            .split(',')
            .map(|c| format!("p.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {columns}, s.zone_penalty_factor, s.raw_sword_metric, s.sword_score,
                        s.daily_normalized_score, s.percentile_highlights, s.video_url, s.daily_rank
                 FROM sword_swings s
                 JOIN statcast_pitches p ON p.id = s.pitch_id
                 WHERE p.game_date = ?1 AND s.daily_rank IS NOT NULL
                 ORDER BY s.daily_rank"
            ))
            .context("failed to prepare cached_daily_swords query")?;

        let swords = stmt
            .query_map(params![date], |row| {
                let pitch = row_to_pitch(row)?;
                let highlights_json: Option<String> = row.get(33)?;
                let percentile_highlights = match highlights_json {
                    Some(json) => serde_json::from_str::<Vec<String>>(&json).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(33, Type::Text, Box::new(e))
                    })?,
                    None => Vec::new(),
                };
                let daily_rank: i64 = row.get(35)?;
                Ok(StoredSword {
                    daily_rank: daily_rank as usize,
                    pitch,
                    scores: SwordScores {
                        zone_penalty_factor: row.get(29)?,
                        raw_sword_metric: row.get(30)?,
                        sword_score: row.get(31)?,
                        daily_normalized_score: row.get(32)?,
                    },
                    percentile_highlights,
                    video_url: row.get(34)?,
                })
            })
            .context("failed to query cached daily swords")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map cached sword rows")?;
        Ok(swords)
    }

    /// Number of rows in `sword_swings`.
    pub fn sword_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sword_swings", [], |row| row.get(0))
            .context("failed to count sword swings")?;
        Ok(count as usize)
    }
}

impl PitchSource for Database {
    fn pitches_for_date(&self, date: NaiveDate) -> Result<Vec<PitchRecord>> {
        Database::pitches_for_date(self, date)
    }

    fn all_pitches(&self) -> Result<Vec<PitchRecord>> {
        Database::all_pitches(self)
    }
}

/// Map a row selected with `PITCH_COLUMNS` (columns 0-28).
fn row_to_pitch(row: &Row<'_>) -> rusqlite::Result<PitchRecord> {
    Ok(PitchRecord {
        row_id: row.get(0)?,
        game_pk: row.get(1)?,
        game_date: row.get(2)?,
        at_bat_number: row.get(3)?,
        pitch_number: row.get(4)?,
        events: row.get(5)?,
        description: row.get(6)?,
        bat_speed: row.get(7)?,
        swing_path_tilt: row.get(8)?,
        intercept_y: row.get(9)?,
        plate_x: row.get(10)?,
        plate_z: row.get(11)?,
        sz_top: row.get(12)?,
        sz_bot: row.get(13)?,
        play_id: row.get(14)?,
        pitch_type: row.get(15)?,
        pitch_name: row.get(16)?,
        player_name: row.get(17)?,
        batter: row.get(18)?,
        pitcher: row.get(19)?,
        inning: row.get(20)?,
        home_team: row.get(21)?,
        away_team: row.get(22)?,
        release_speed: row.get(23)?,
        release_spin_rate: row.get(24)?,
        release_extension: row.get(25)?,
        effective_speed: row.get(26)?,
        pfx_x: row.get(27)?,
        pfx_z: row.get(28)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::{Enricher, NoNames};
    use crate::percentile::PercentileAnalyzer;
    use crate::sword::detect_daily;

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    /// Helper: a swinging strikeout with full swing and location data.
    fn sword_pitch(game_pk: i64, date: NaiveDate, ab: i64, bat_speed: f64) -> PitchRecord {
        let mut p = PitchRecord::new(game_pk, date, ab, 3);
        p.events = Some("strikeout".into());
        p.description = Some("swinging_strike".into());
        p.bat_speed = Some(bat_speed);
        p.swing_path_tilt = Some(40.0);
        p.intercept_y = Some(20.0);
        p.plate_x = Some(0.2);
        p.plate_z = Some(2.5);
        p.sz_top = Some(3.5);
        p.sz_bot = Some(1.6);
        p.play_id = Some(format!("play-{game_pk}-{ab}"));
        p.pitch_type = Some("SL".into());
        p.release_speed = Some(86.0);
        p
    }

    fn ball(game_pk: i64, date: NaiveDate, ab: i64, pitch: i64) -> PitchRecord {
        let mut p = PitchRecord::new(game_pk, date, ab, pitch);
        p.description = Some("ball".into());
        p
    }

    fn seeded_db() -> Database {
        let db = test_db();
        db.insert_pitches(&[
            ball(1, day(24), 1, 1),
            ball(1, day(24), 1, 2),
            sword_pitch(1, day(24), 1, 50.0),
            sword_pitch(1, day(24), 2, 45.0),
            sword_pitch(2, day(25), 7, 55.0),
        ])
        .unwrap();
        db
    }

    // ------------------------------------------------------------------
    // Schema / open
    // ------------------------------------------------------------------

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"statcast_pitches".to_string()));
        assert!(tables.contains(&"sword_swings".to_string()));
        assert!(tables.contains(&"daily_results".to_string()));
    }

    #[test]
    fn open_is_idempotent_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swords.db");
        let path = path.to_str().unwrap();

        Database::open(path).unwrap().insert_pitches(&[ball(1, day(1), 1, 1)]).unwrap();
        let reopened = Database::open(path).unwrap();
        assert_eq!(reopened.pitch_count().unwrap(), 1);
    }

    // ------------------------------------------------------------------
    // Pitches
    // ------------------------------------------------------------------

    #[test]
    fn insert_pitches_ignores_duplicates() {
        let db = seeded_db();
        assert_eq!(db.pitch_count().unwrap(), 5);

        let again = db.insert_pitches(&[sword_pitch(1, day(24), 2, 45.0)]).unwrap();
        assert_eq!(again, 0);
        assert_eq!(db.pitch_count().unwrap(), 5);
    }

    #[test]
    fn pitches_for_date_round_trips_fields() {
        let db = seeded_db();
        let pitches = db.pitches_for_date(day(24)).unwrap();
        assert_eq!(pitches.len(), 4);
        assert!(pitches.iter().all(|p| p.row_id.is_some()));
        assert!(pitches.iter().all(|p| p.game_date == day(24)));

        let stored = pitches
            .iter()
            .find(|p| p.at_bat_number == 2)
            .expect("second at-bat stored");
        let mut expected = sword_pitch(1, day(24), 2, 45.0);
        expected.row_id = stored.row_id;
        assert_eq!(stored, &expected);
    }

    #[test]
    fn pitches_for_unknown_date_is_empty() {
        let db = seeded_db();
        assert!(db.pitches_for_date(day(1)).unwrap().is_empty());
    }

    #[test]
    fn game_dates_are_distinct_and_sorted() {
        let db = seeded_db();
        assert_eq!(db.game_dates().unwrap(), vec![day(24), day(25)]);
        assert_eq!(db.all_pitches().unwrap().len(), 5);
    }

    #[test]
    fn pitches_of_types_filters_reference_pool() {
        let db = seeded_db();
        db.insert_pitches(&[{
            let mut p = ball(2, day(25), 8, 1);
            p.pitch_type = Some("FF".into());
            p
        }])
        .unwrap();

        let sliders = db.pitches_of_types(&["SL".to_string()]).unwrap();
        assert_eq!(sliders.len(), 3);
        assert!(sliders.iter().all(|p| p.pitch_type.as_deref() == Some("SL")));

        let both = db
            .pitches_of_types(&["SL".to_string(), "FF".to_string()])
            .unwrap();
        assert_eq!(both.len(), 4);
        assert!(db.pitches_of_types(&[]).unwrap().is_empty());
    }

    #[test]
    fn database_serves_as_pitch_source() {
        let db = seeded_db();
        let source: &dyn PitchSource = &db;
        assert_eq!(source.pitches_for_date(day(25)).unwrap().len(), 1);
        assert_eq!(source.all_pitches().unwrap().len(), 5);
    }

    // ------------------------------------------------------------------
    // Sword swings
    // ------------------------------------------------------------------

    #[test]
    fn upsert_sword_score_requires_stored_row() {
        let db = test_db();
        let candidate = SwordCandidate::score(&sword_pitch(1, day(24), 1, 50.0)).unwrap();
        assert!(db.upsert_sword_score(&candidate).is_err());
    }

    #[test]
    fn upsert_sword_score_overwrites() {
        let db = seeded_db();
        let pitches = db.pitches_for_date(day(24)).unwrap();
        let candidate = SwordCandidate::score(pitches.last().unwrap()).unwrap();

        db.upsert_sword_score(&candidate).unwrap();
        db.upsert_sword_score(&candidate).unwrap();
        assert_eq!(db.sword_count().unwrap(), 1);
    }

    #[test]
    fn save_daily_persists_reports_and_result() {
        let db = seeded_db();
        let pitches = db.pitches_for_date(day(24)).unwrap();
        let daily = detect_daily(day(24), &pitches, 5);
        assert_eq!(daily.top.len(), 2);

        let analyzer = PercentileAnalyzer::from_pitches(&pitches);
        let enricher = Enricher::new("https://savant.test/sporty-videos", &NoNames, &analyzer);
        let reports = enricher.reports(&daily.top);
        db.save_daily(day(24), pitches.len(), &reports).unwrap();

        let result = db.daily_result(day(24)).unwrap().expect("date recorded");
        assert_eq!(result.total_pitches, 4);
        assert_eq!(result.sword_swings_found, 2);
        assert!(db.daily_result(day(25)).unwrap().is_none());

        let cached = db.cached_daily_swords(day(24)).unwrap();
        assert_eq!(cached.len(), 2);
        // Slower swing ranks first.
        assert_eq!(cached[0].pitch.at_bat_number, 2);
        assert_eq!(cached[0].scores.daily_normalized_score, Some(100.0));
        assert_eq!(cached[1].scores.daily_normalized_score, Some(50.0));
        assert_eq!(
            cached[0].video_url.as_deref(),
            Some("https://savant.test/sporty-videos?playId=play-1-2")
        );
        assert_eq!(cached[0].scores, daily.top[0].scores());
    }

    #[test]
    fn save_daily_replaces_stale_members() {
        let db = seeded_db();
        let pitches = db.pitches_for_date(day(24)).unwrap();
        let analyzer = PercentileAnalyzer::default();
        let enricher = Enricher::new("https://savant.test", &NoNames, &analyzer);

        let both = enricher.reports(&detect_daily(day(24), &pitches, 5).top);
        db.save_daily(day(24), pitches.len(), &both).unwrap();

        let only_best = enricher.reports(&detect_daily(day(24), &pitches, 1).top);
        db.save_daily(day(24), pitches.len(), &only_best).unwrap();

        let cached = db.cached_daily_swords(day(24)).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].pitch.at_bat_number, 2);
        assert_eq!(db.daily_result(day(24)).unwrap().unwrap().sword_swings_found, 1);
        // The dropped member keeps its universal score row.
        assert_eq!(db.sword_count().unwrap(), 2);
    }

    #[test]
    fn upsert_sword_score_keeps_daily_annotations() {
        let db = seeded_db();
        let pitches = db.pitches_for_date(day(24)).unwrap();
        let daily = detect_daily(day(24), &pitches, 5);
        let analyzer = PercentileAnalyzer::default();
        let enricher = Enricher::new("https://savant.test", &NoNames, &analyzer);
        db.save_daily(day(24), pitches.len(), &enricher.reports(&daily.top)).unwrap();

        db.upsert_sword_score(&daily.top[0].candidate).unwrap();

        let cached = db.cached_daily_swords(day(24)).unwrap();
        assert_eq!(cached[0].scores.daily_normalized_score, Some(100.0));
        assert!(cached[0].video_url.is_some());
    }

    #[test]
    fn cached_swords_keep_saved_rank_order() {
        let db = seeded_db();
        let pitches = db.pitches_for_date(day(24)).unwrap();
        let analyzer = PercentileAnalyzer::default();
        let enricher = Enricher::new("https://savant.test", &NoNames, &analyzer);
        let mut reports = enricher.reports(&detect_daily(day(24), &pitches, 5).top);

        // Equal metrics: the saved rank decides, not the metric or row id.
        for report in &mut reports {
            report.scores.raw_sword_metric = 0.5;
        }
        reports.reverse();
        for (i, report) in reports.iter_mut().enumerate() {
            report.rank = i + 1;
        }
        db.save_daily(day(24), pitches.len(), &reports).unwrap();

        let cached = db.cached_daily_swords(day(24)).unwrap();
        let order: Vec<(usize, i64)> = cached
            .iter()
            .map(|s| (s.daily_rank, s.pitch.at_bat_number))
            .collect();
        assert_eq!(order, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn corrupt_highlights_are_an_error() {
        let db = seeded_db();
        let pitches = db.pitches_for_date(day(24)).unwrap();
        let analyzer = PercentileAnalyzer::default();
        let enricher = Enricher::new("https://savant.test", &NoNames, &analyzer);
        let reports = enricher.reports(&detect_daily(day(24), &pitches, 5).top);
        db.save_daily(day(24), pitches.len(), &reports).unwrap();

        db.conn()
            .execute("UPDATE sword_swings SET percentile_highlights = 'not json'", [])
            .unwrap();
        assert!(db.cached_daily_swords(day(24)).is_err());
    }
}
