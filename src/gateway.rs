//! Saving finished sessions for signed-in players.
//!
//! Persistence never blocks the result screen: failures are logged and
//! reported back as a [`SaveOutcome`], never retried.

use chrono::{DateTime, Utc};

use crate::auth::Identity;
use crate::error::StoreError;
use crate::session::SessionResult;
use crate::store::{LeaderboardRecord, RecordedSession, ReflexDb};

/// Destination for finished sessions
pub trait ResultSink {
    fn record_session(
        &self,
        user_id: i64,
        result: &SessionResult,
        at: DateTime<Utc>,
    ) -> Result<RecordedSession, StoreError>;
}

impl ResultSink for ReflexDb {
    fn record_session(
        &self,
        user_id: i64,
        result: &SessionResult,
        at: DateTime<Utc>,
    ) -> Result<RecordedSession, StoreError> {
        ReflexDb::record_session(self, user_id, result, at)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Anonymous play or saving disabled
    Skipped,
    Saved {
        record: LeaderboardRecord,
        new_best: bool,
    },
    Failed(String),
}

impl SaveOutcome {
    /// True when this session lowered the stored best; a tie does not count
    pub fn is_new_best(&self) -> bool {
        matches!(self, SaveOutcome::Saved { new_best: true, .. })
    }
}

pub fn save_session<S: ResultSink + ?Sized>(
    sink: &S,
    identity: Option<&Identity>,
    result: &SessionResult,
) -> SaveOutcome {
    let Some(identity) = identity else {
        tracing::debug!("anonymous session, skipping persistence");
        return SaveOutcome::Skipped;
    };

    match sink.record_session(identity.id, result, Utc::now()) {
        Ok(RecordedSession { record, improved }) => {
            tracing::info!(
                user = %identity.username,
                difficulty = %result.difficulty,
                mean_ms = result.mean_reaction_ms,
                best_ms = record.best_reaction_ms,
                total_tests = record.total_tests,
                new_best = improved,
                "session saved"
            );
            SaveOutcome::Saved {
                record,
                new_best: improved,
            }
        }
        Err(e) => {
            tracing::error!("Failed to save session result: {}", e);
            SaveOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyTier;
    use assert_matches::assert_matches;

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn record_session(
            &self,
            _user_id: i64,
            _result: &SessionResult,
            _at: DateTime<Utc>,
        ) -> Result<RecordedSession, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    fn result(mean: u64) -> SessionResult {
        SessionResult {
            mean_reaction_ms: mean,
            accuracy_percent: 100.0,
            difficulty: DifficultyTier::Normal,
            target_hits: 10,
            total_targets: 10,
        }
    }

    fn identity(db: &ReflexDb) -> Identity {
        let id = db
            .insert_user("ana@example.com", "ana", "hash", "salt", Utc::now())
            .unwrap();
        Identity {
            id,
            email: "ana@example.com".into(),
            username: "ana".into(),
        }
    }

    #[test]
    fn anonymous_play_is_skipped() {
        let db = ReflexDb::open_in_memory().unwrap();
        assert_eq!(save_session(&db, None, &result(200)), SaveOutcome::Skipped);
    }

    #[test]
    fn signed_in_play_is_saved() {
        let db = ReflexDb::open_in_memory().unwrap();
        let who = identity(&db);

        let outcome = save_session(&db, Some(&who), &result(200));
        assert_matches!(&outcome, SaveOutcome::Saved { record, .. } if record.best_reaction_ms == 200);
        assert!(outcome.is_new_best());

        let outcome = save_session(&db, Some(&who), &result(230));
        assert_matches!(
            &outcome,
            SaveOutcome::Saved { record, .. } if record.best_reaction_ms == 200 && record.total_tests == 2
        );
        assert!(!outcome.is_new_best());
        assert_eq!(db.count_results(who.id).unwrap(), 2);
    }

    #[test]
    fn matching_the_best_is_not_a_new_best() {
        let db = ReflexDb::open_in_memory().unwrap();
        let who = identity(&db);

        assert!(save_session(&db, Some(&who), &result(180)).is_new_best());
        let tie = save_session(&db, Some(&who), &result(180));
        assert_matches!(&tie, SaveOutcome::Saved { record, .. } if record.total_tests == 2);
        assert!(!tie.is_new_best());

        assert!(save_session(&db, Some(&who), &result(179)).is_new_best());
    }

    #[test]
    fn skipped_and_failed_are_never_a_best() {
        assert!(!SaveOutcome::Skipped.is_new_best());
        assert!(!SaveOutcome::Failed("disk full".into()).is_new_best());
    }

    #[test]
    fn failures_are_reported_not_raised() {
        let who = Identity {
            id: 1,
            email: "x@example.com".into(),
            username: "x".into(),
        };
        let outcome = save_session(&FailingSink, Some(&who), &result(200));
        assert_matches!(outcome, SaveOutcome::Failed(msg) if msg.contains("Database error"));
    }
}
