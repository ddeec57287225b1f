use std::rc::Rc;

use assert_matches::assert_matches;
use chrono::{Duration as ChronoDuration, Utc};
use tempfile::tempdir;

use reflex::auth::{IdentityProvider, LocalIdentityProvider};
use reflex::difficulty::DifficultyTier;
use reflex::error::AuthError;
use reflex::gateway::{save_session, SaveOutcome};
use reflex::profile::ProfileStats;
use reflex::session::SessionResult;
use reflex::store::{ReflexDb, LEADERBOARD_LIMIT};

fn result(mean: u64, accuracy: f64, difficulty: DifficultyTier) -> SessionResult {
    SessionResult {
        mean_reaction_ms: mean,
        accuracy_percent: accuracy,
        difficulty,
        target_hits: 10,
        total_targets: 10,
    }
}

#[test]
fn leaderboard_keeps_best_and_counts_tests() {
    let dir = tempdir().unwrap();
    let db = Rc::new(ReflexDb::open(&dir.path().join("reflex.db")).unwrap());
    let mut auth = LocalIdentityProvider::new(Rc::clone(&db), None);
    let ana = auth.sign_up("ana@example.com", "secret1", "ana").unwrap();

    let first = save_session(&*db, Some(&ana), &result(180, 90.0, DifficultyTier::Normal));
    assert_matches!(first, SaveOutcome::Saved { ref record, new_best: true } if record.best_reaction_ms == 180 && record.total_tests == 1);

    let better = save_session(&*db, Some(&ana), &result(170, 80.0, DifficultyTier::Normal));
    assert_matches!(better, SaveOutcome::Saved { ref record, new_best: true } if record.best_reaction_ms == 170 && record.total_tests == 2);

    let worse = save_session(&*db, Some(&ana), &result(190, 60.0, DifficultyTier::Normal));
    let SaveOutcome::Saved { record, new_best } = worse else {
        panic!("expected a saved outcome");
    };
    assert!(!new_best);
    assert_eq!(record.best_reaction_ms, 170);
    assert_eq!(record.total_tests, 3);
    // accuracy tracks the latest session, even when it was not a best
    assert_eq!(record.average_accuracy, 60.0);

    assert_eq!(db.count_results(ana.id).unwrap(), 3);
}

#[test]
fn anonymous_sessions_are_not_stored() {
    let db = ReflexDb::open_in_memory().unwrap();
    let outcome = save_session(&db, None, &result(150, 100.0, DifficultyTier::Hard));
    assert_eq!(outcome, SaveOutcome::Skipped);
    assert!(db
        .top_leaderboard(DifficultyTier::Hard, LEADERBOARD_LIMIT)
        .unwrap()
        .is_empty());
}

#[test]
fn leaderboard_orders_players_per_difficulty() {
    let db = Rc::new(ReflexDb::open_in_memory().unwrap());
    let mut auth = LocalIdentityProvider::new(Rc::clone(&db), None);
    let ana = auth.sign_up("ana@example.com", "secret1", "ana").unwrap();
    let bo = auth.sign_up("bo@example.com", "secret1", "bo_k").unwrap();
    let cy = auth.sign_up("cy@example.com", "secret1", "cyan").unwrap();

    let t0 = Utc::now();
    db.record_session(ana.id, &result(210, 90.0, DifficultyTier::Easy), t0)
        .unwrap();
    db.record_session(bo.id, &result(190, 95.0, DifficultyTier::Easy), t0)
        .unwrap();
    db.record_session(cy.id, &result(190, 99.0, DifficultyTier::Easy), t0 + ChronoDuration::seconds(5))
        .unwrap();
    db.record_session(cy.id, &result(140, 99.0, DifficultyTier::Hard), t0)
        .unwrap();

    let easy = db.top_leaderboard(DifficultyTier::Easy, LEADERBOARD_LIMIT).unwrap();
    let names: Vec<&str> = easy.iter().map(|e| e.username.as_str()).collect();
    // tie on 190 ms goes to whoever set it first
    assert_eq!(names, vec!["bo_k", "cyan", "ana"]);
    assert_eq!(easy.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);

    let hard = db.top_leaderboard(DifficultyTier::Hard, LEADERBOARD_LIMIT).unwrap();
    assert_eq!(hard.len(), 1);
    assert_eq!(hard[0].username, "cyan");

    assert_eq!(db.top_leaderboard(DifficultyTier::Easy, 2).unwrap().len(), 2);
}

#[test]
fn data_and_sign_in_survive_reopening() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("reflex.db");
    let session_path = dir.path().join("session.json");

    let ana_id = {
        let db = Rc::new(ReflexDb::open(&db_path).unwrap());
        let mut auth = LocalIdentityProvider::new(Rc::clone(&db), Some(session_path.clone()));
        let ana = auth.sign_up("ana@example.com", "secret1", "ana").unwrap();
        let start = Utc::now();
        for (i, mean) in [230u64, 200, 260].into_iter().enumerate() {
            db.record_session(
                ana.id,
                &result(mean, 90.0, DifficultyTier::Normal),
                start + ChronoDuration::seconds(i as i64),
            )
            .unwrap();
        }
        ana.id
    };

    let db = Rc::new(ReflexDb::open(&db_path).unwrap());
    let mut auth = LocalIdentityProvider::new(Rc::clone(&db), Some(session_path));
    let who = auth.current_session().expect("session restored from disk");
    assert_eq!(who.id, ana_id);

    let stats = ProfileStats::load(&db, who.id).unwrap();
    assert_eq!(stats.total_tests, 3);
    assert_eq!(stats.best_ms, 200);
    assert_eq!(stats.average_ms, 230);
    assert_eq!(
        stats.recent.iter().map(|e| e.reaction_ms).collect::<Vec<_>>(),
        vec![230, 200, 260]
    );

    auth.sign_out();
    assert_matches!(
        auth.sign_in("ana@example.com", "not-it"),
        Err(AuthError::InvalidCredentials)
    );
    assert!(auth.sign_in("ana@example.com", "secret1").is_ok());
}

#[test]
fn profile_keeps_the_latest_twenty() {
    let db = Rc::new(ReflexDb::open_in_memory().unwrap());
    let mut auth = LocalIdentityProvider::new(Rc::clone(&db), None);
    let ana = auth.sign_up("ana@example.com", "secret1", "ana").unwrap();

    let start = Utc::now();
    for i in 0..25u64 {
        db.record_session(
            ana.id,
            &result(300 - i, 100.0, DifficultyTier::Normal),
            start + ChronoDuration::seconds(i as i64),
        )
        .unwrap();
    }

    let stats = ProfileStats::load(&db, ana.id).unwrap();
    assert_eq!(stats.recent.len(), 20);
    assert_eq!(stats.total_tests, 25);
    assert_eq!(stats.recent.first().map(|e| e.reaction_ms), Some(295));
    assert_eq!(stats.recent.last().map(|e| e.reaction_ms), Some(276));
    assert_eq!(stats.best_ms, 276);
}
