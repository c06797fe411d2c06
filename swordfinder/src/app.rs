// Orchestration: wires the pitch store, the sword engine and result assembly
// into the commands the binary exposes.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{Database, StoredSword};
use crate::enrich::{Enricher, NameLookup, SwordReport};
use crate::percentile::PercentileAnalyzer;
use crate::source::PitchSource;
use crate::statcast;
use crate::sword::{self, score_pool};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of loading a Statcast export into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub rows_inserted: usize,
}

/// One date's featured swords.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRun {
    pub date: NaiveDate,
    pub total_pitches: usize,
    /// True when the swords were read back from an earlier run.
    pub cached: bool,
    pub swords: Vec<SwordReport>,
}

/// Result of scoring every candidate in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulateSummary {
    pub dates_processed: usize,
    pub swords_scored: usize,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Load a Statcast CSV export into the store. Already stored pitches are
/// skipped.
pub fn import_csv(db: &Database, path: &Path) -> Result<ImportSummary> {
    let pitches = statcast::load_statcast_csv(path)
        .with_context(|| format!("failed to load Statcast CSV {}", path.display()))?;
    let rows_inserted = db.insert_pitches(&pitches)?;
    info!(
        "imported {} of {} rows from {}",
        rows_inserted,
        pitches.len(),
        path.display()
    );
    Ok(ImportSummary {
        rows_read: pitches.len(),
        rows_inserted,
    })
}

/// Reject dates that have not been played yet.
pub fn check_not_future(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        bail!("cannot search future dates: {date} is after {today}");
    }
    Ok(())
}

/// Find, rank, enrich and persist the featured swords for `date`.
///
/// A date that was already processed is served from the store unless
/// `refresh` is set.
pub fn find_sword_swings<N: NameLookup>(
    db: &Database,
    config: &Config,
    names: &N,
    date: NaiveDate,
    refresh: bool,
) -> Result<DailyRun> {
    if !refresh {
        if let Some(done) = db.daily_result(date)? {
            debug!("{date}: serving cached result from {}", done.processed_at);
            let stored = db.cached_daily_swords(date)?;
            return Ok(DailyRun {
                date,
                total_pitches: done.total_pitches,
                cached: true,
                swords: cached_reports(config, names, stored),
            });
        }
    }

    let pitches = db
        .pitches_for_date(date)
        .with_context(|| format!("failed to load pitches for {date}"))?;
    if pitches.is_empty() {
        warn!("{date}: no pitches stored");
    }

    let daily = sword::detect_daily(date, &pitches, config.leaderboard.daily_top_n);

    let mut pitch_types: Vec<String> = daily
        .top
        .iter()
        .filter_map(|r| r.candidate.pitch.pitch_type.clone())
        .collect();
    pitch_types.sort();
    pitch_types.dedup();
    let reference = db
        .pitches_of_types(&pitch_types)
        .context("failed to load percentile reference pool")?;
    let percentiles = PercentileAnalyzer::from_pitches(&reference);
    let enricher = Enricher::new(&config.video.base_url, names, &percentiles);
    let swords = enricher.reports(&daily.top);

    db.save_daily(date, daily.total_pitches, &swords)
        .with_context(|| format!("failed to save swords for {date}"))?;
    info!("{date}: saved {} swords", swords.len());

    Ok(DailyRun {
        date,
        total_pitches: daily.total_pitches,
        cached: false,
        swords,
    })
}

fn cached_reports<N: NameLookup>(
    config: &Config,
    names: &N,
    stored: Vec<StoredSword>,
) -> Vec<SwordReport> {
    let no_percentiles = PercentileAnalyzer::default();
    let enricher = Enricher::new(&config.video.base_url, names, &no_percentiles);
    stored
        .into_iter()
        .map(|sword| {
            let mut report = enricher.assemble(sword.daily_rank, &sword.pitch, sword.scores);
            report.video_url = sword.video_url;
            report.percentile_highlights = sword.percentile_highlights;
            report
        })
        .collect()
}

/// Score every candidate of `date` (or of every stored date) and upsert its
/// universal score.
pub fn populate(db: &Database, date: Option<NaiveDate>) -> Result<PopulateSummary> {
    let dates = match date {
        Some(d) => vec![d],
        None => db.game_dates()?,
    };

    let mut swords_scored = 0;
    for d in &dates {
        let pitches = db
            .pitches_for_date(*d)
            .with_context(|| format!("failed to load pitches for {d}"))?;
        let pool = score_pool(&pitches);
        for candidate in &pool {
            db.upsert_sword_score(candidate)?;
        }
        debug!("{d}: scored {} candidates", pool.len());
        swords_scored += pool.len();
    }

    info!(
        "populate: {} swords scored across {} dates",
        swords_scored,
        dates.len()
    );
    Ok(PopulateSummary {
        dates_processed: dates.len(),
        swords_scored,
    })
}

/// The best swords across every stored date, without day-relative scores.
pub fn all_time_leaderboard<S: PitchSource, N: NameLookup>(
    source: &S,
    config: &Config,
    names: &N,
    limit: usize,
) -> Result<Vec<SwordReport>> {
    let pitches = source.all_pitches().context("failed to load pitches")?;
    let ranked = sword::detect_all_time(&pitches, limit);
    let percentiles = PercentileAnalyzer::from_pitches(&pitches);
    let enricher = Enricher::new(&config.video.base_url, names, &percentiles);
    Ok(enricher.reports(&ranked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::enrich::NoNames;
    use crate::source::MemorySource;
    use crate::sword::pitch::PitchRecord;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn test_config() -> Config {
        parse_config(
            r#"
            [database]
            path = ":memory:"

            [data_paths]
            statcast = "data/statcast.csv"

            [leaderboard]
            daily_top_n = 5
            all_time_limit = 10

            [video]
            base_url = "https://baseballsavant.mlb.com/sporty-videos"
            "#,
            &PathBuf::from("test.toml"),
        )
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 24).unwrap()
    }

    fn sword(game_pk: i64, ab: i64, bat_speed: f64, tilt: f64) -> PitchRecord {
        let mut p = PitchRecord::new(game_pk, date(), ab, 4);
        p.events = Some("strikeout".into());
        p.description = Some("swinging_strike_blocked".into());
        p.bat_speed = Some(bat_speed);
        p.swing_path_tilt = Some(tilt);
        p.intercept_y = Some(18.0);
        p.plate_x = Some(-0.5);
        p.plate_z = Some(1.2);
        p.sz_top = Some(3.4);
        p.sz_bot = Some(1.5);
        p.play_id = Some(format!("p{game_pk}{ab}"));
        p.pitcher = Some(600_000 + ab);
        p.batter = Some(700_000 + ab);
        p.player_name = Some(format!("Statcast, Name {ab}"));
        p
    }

    fn seeded_db(pitches: &[PitchRecord]) -> Database {
        let db = Database::open(":memory:").unwrap();
        db.insert_pitches(pitches).unwrap();
        db
    }

    #[test]
    fn future_dates_are_rejected() {
        let today = date();
        assert!(check_not_future(today, today).is_ok());
        assert!(check_not_future(today.pred_opt().unwrap(), today).is_ok());
        assert!(check_not_future(today.succ_opt().unwrap(), today).is_err());
    }

    #[test]
    fn daily_run_persists_then_serves_cache() {
        let db = seeded_db(&[sword(1, 1, 50.0, 30.0), sword(1, 2, 42.0, 45.0), sword(2, 9, 60.0, 20.0)]);
        let config = test_config();

        let fresh = find_sword_swings(&db, &config, &NoNames, date(), false).unwrap();
        assert!(!fresh.cached);
        assert_eq!(fresh.total_pitches, 3);
        assert_eq!(fresh.swords.len(), 3);
        assert_eq!(fresh.swords[0].pitch.at_bat_number, 2);
        assert_eq!(fresh.swords[0].scores.daily_normalized_score, Some(100.0));
        assert_eq!(fresh.swords[2].scores.daily_normalized_score, Some(50.0));

        let cached = find_sword_swings(&db, &config, &NoNames, date(), false).unwrap();
        assert!(cached.cached);
        assert_eq!(cached.total_pitches, 3);
        let keys = |run: &DailyRun| run.swords.iter().map(|s| s.pitch.key()).collect::<Vec<_>>();
        assert_eq!(keys(&cached), keys(&fresh));
        for (a, b) in cached.swords.iter().zip(&fresh.swords) {
            assert_eq!(a.rank, b.rank);
            assert_eq!(a.scores, b.scores);
            assert_eq!(a.video_url, b.video_url);
            assert_eq!(a.percentile_highlights, b.percentile_highlights);
        }
    }

    #[test]
    fn cached_run_keeps_tied_order() {
        // Identical swings; the later game is stored first, as Savant lists
        // the newest games at the top of an export.
        let db = seeded_db(&[sword(9, 1, 50.0, 30.0), sword(1, 1, 50.0, 30.0)]);
        let config = test_config();

        let fresh = find_sword_swings(&db, &config, &NoNames, date(), false).unwrap();
        let cached = find_sword_swings(&db, &config, &NoNames, date(), false).unwrap();
        assert!(cached.cached);

        let games = |run: &DailyRun| {
            run.swords
                .iter()
                .map(|s| (s.rank, s.pitch.game_pk))
                .collect::<Vec<_>>()
        };
        assert_eq!(games(&fresh), vec![(1, 1), (2, 9)]);
        assert_eq!(games(&cached), games(&fresh));
    }

    #[test]
    fn refresh_recomputes() {
        let db = seeded_db(&[sword(1, 1, 50.0, 30.0)]);
        let config = test_config();
        find_sword_swings(&db, &config, &NoNames, date(), false).unwrap();

        let refreshed = find_sword_swings(&db, &config, &NoNames, date(), true).unwrap();
        assert!(!refreshed.cached);
        assert_eq!(refreshed.swords.len(), 1);
        assert_eq!(db.sword_count().unwrap(), 1);
    }

    #[test]
    fn empty_date_records_zero_swords() {
        let db = seeded_db(&[]);
        let run = find_sword_swings(&db, &test_config(), &NoNames, date(), false).unwrap();
        assert!(run.swords.is_empty());
        let done = db.daily_result(date()).unwrap().unwrap();
        assert_eq!(done.sword_swings_found, 0);
    }

    #[test]
    fn names_come_from_lookup_with_statcast_fallback() {
        let db = seeded_db(&[sword(1, 1, 50.0, 30.0)]);
        let names: HashMap<i64, String> = HashMap::from([(700_001, "Batter One".to_string())]);
        let run = find_sword_swings(&db, &test_config(), &names, date(), false).unwrap();

        let report = &run.swords[0];
        assert_eq!(report.batter_name.as_deref(), Some("Batter One"));
        assert_eq!(report.pitcher_name.as_deref(), Some("Statcast, Name 1"));
        assert_eq!(
            report.video_url.as_deref(),
            Some("https://baseballsavant.mlb.com/sporty-videos?playId=p11")
        );
    }

    #[test]
    fn populate_scores_every_date() {
        let mut other_day = sword(3, 1, 48.0, 35.0);
        other_day.game_date = date().succ_opt().unwrap();
        let db = seeded_db(&[sword(1, 1, 50.0, 30.0), sword(1, 2, 42.0, 45.0), other_day]);

        let summary = populate(&db, None).unwrap();
        assert_eq!(summary.dates_processed, 2);
        assert_eq!(summary.swords_scored, 3);
        assert_eq!(db.sword_count().unwrap(), 3);

        // Re-running overwrites instead of duplicating.
        populate(&db, None).unwrap();
        assert_eq!(db.sword_count().unwrap(), 3);

        let one = populate(&db, Some(date())).unwrap();
        assert_eq!(one.dates_processed, 1);
        assert_eq!(one.swords_scored, 2);
    }

    #[test]
    fn leaderboard_has_no_daily_scores() {
        let mut other_day = sword(3, 1, 40.0, 50.0);
        other_day.game_date = date().succ_opt().unwrap();
        let source = MemorySource::new(vec![sword(1, 1, 50.0, 30.0), other_day]);

        let board = all_time_leaderboard(&source, &test_config(), &NoNames, 10).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].pitch.game_pk, 3);
        assert_eq!(board[0].rank, 1);
        assert!(board.iter().all(|r| r.scores.daily_normalized_score.is_none()));

        let capped = all_time_leaderboard(&source, &test_config(), &NoNames, 1).unwrap();
        assert_eq!(capped.len(), 1);
    }
}
