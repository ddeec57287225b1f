use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::difficulty::DifficultyTier;
use crate::error::StoreError;
use crate::session::SessionResult;

pub const LEADERBOARD_LIMIT: usize = 50;
pub const PROFILE_HISTORY_LIMIT: usize = 20;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS test_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    reaction_time INTEGER NOT NULL,
    accuracy REAL NOT NULL,
    difficulty TEXT NOT NULL,
    target_hits INTEGER NOT NULL,
    total_targets INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS leaderboard (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    difficulty TEXT NOT NULL,
    best_reaction_time INTEGER NOT NULL,
    average_accuracy REAL NOT NULL,
    total_tests INTEGER NOT NULL,
    last_test_at TEXT NOT NULL,
    UNIQUE (user_id, difficulty)
);

CREATE INDEX IF NOT EXISTS idx_test_results_user ON test_results(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_leaderboard_rank ON leaderboard(difficulty, best_reaction_time);
"#;

/// Best-per-user-per-difficulty row
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRecord {
    pub id: i64,
    pub user_id: i64,
    pub difficulty: DifficultyTier,
    pub best_reaction_ms: u64,
    pub average_accuracy: f64,
    pub total_tests: u32,
    pub last_test_at: DateTime<Utc>,
}

/// Leaderboard row after a save, and whether that save lowered the best time
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSession {
    pub record: LeaderboardRecord,
    /// First session on this difficulty, or strictly faster than the old best
    pub improved: bool,
}

/// Leaderboard row joined with the player's username
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub best_reaction_ms: u64,
    pub average_accuracy: f64,
    pub total_tests: u32,
}

/// One stored session
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub user_id: i64,
    pub reaction_ms: u64,
    pub accuracy: f64,
    pub difficulty: DifficultyTier,
    pub target_hits: u32,
    pub total_targets: u32,
    pub created_at: DateTime<Utc>,
}

/// Stored account row, including credentials
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
}

/// SQLite-backed results history, leaderboard and accounts
#[derive(Debug)]
pub struct ReflexDb {
    conn: Connection,
}

impl ReflexDb {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Open the database under the state directory
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("reflex.db"));
        Self::open(&path)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(ReflexDb { conn })
    }

    /// Append an immutable history row
    pub fn insert_result(
        &self,
        user_id: i64,
        result: &SessionResult,
        at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        Ok(insert_result_in(&self.conn, user_id, result, at)?)
    }

    pub fn leaderboard_record(
        &self,
        user_id: i64,
        difficulty: DifficultyTier,
    ) -> Result<Option<LeaderboardRecord>, StoreError> {
        Ok(leaderboard_record_in(&self.conn, user_id, difficulty)?)
    }

    pub fn upsert_leaderboard(
        &self,
        user_id: i64,
        result: &SessionResult,
        at: DateTime<Utc>,
    ) -> Result<RecordedSession, StoreError> {
        Ok(upsert_leaderboard_in(&self.conn, user_id, result, at)?)
    }

    /// History insert plus leaderboard upsert, committed together
    pub fn record_session(
        &self,
        user_id: i64,
        result: &SessionResult,
        at: DateTime<Utc>,
    ) -> Result<RecordedSession, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        insert_result_in(&tx, user_id, result, at)?;
        let saved = upsert_leaderboard_in(&tx, user_id, result, at)?;
        tx.commit()?;
        Ok(saved)
    }

    /// Fastest players for a difficulty, best time ascending
    pub fn top_leaderboard(
        &self,
        difficulty: DifficultyTier,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT u.username, l.best_reaction_time, l.average_accuracy, l.total_tests
            FROM leaderboard l
            JOIN users u ON u.id = l.user_id
            WHERE l.difficulty = ?1
            ORDER BY l.best_reaction_time ASC, l.last_test_at ASC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![difficulty.to_string(), limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, u32>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for (idx, row) in rows.enumerate() {
            let (username, best_reaction_ms, average_accuracy, total_tests) = row?;
            entries.push(LeaderboardEntry {
                rank: idx + 1,
                username,
                best_reaction_ms,
                average_accuracy,
                total_tests,
            });
        }
        Ok(entries)
    }

    /// The user's latest `limit` sessions, oldest first
    pub fn recent_results(&self, user_id: i64, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, reaction_time, accuracy, difficulty, target_hits, total_targets, created_at
            FROM test_results
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], history_from_row)?;
        let mut history = Vec::new();
        for entry in rows {
            history.push(entry?);
        }
        history.reverse();
        Ok(history)
    }

    pub fn count_results(&self, user_id: i64) -> Result<u32, StoreError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM test_results WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn insert_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        salt: &str,
        at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO users (email, username, password_hash, salt, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![email, username, password_hash, salt, format_timestamp(at)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, email, username, password_hash, salt FROM users WHERE email = ?1",
                [email],
                user_from_row,
            )
            .optional()?)
    }

    pub fn find_user_by_id(&self, id: i64) -> Result<Option<UserRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, email, username, password_hash, salt FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()?)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 COLLATE NOCASE",
            [username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn insert_result_in(
    conn: &Connection,
    user_id: i64,
    result: &SessionResult,
    at: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO test_results
        (user_id, reaction_time, accuracy, difficulty, target_hits, total_targets, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            user_id,
            result.mean_reaction_ms,
            result.accuracy_percent,
            result.difficulty.to_string(),
            result.target_hits,
            result.total_targets,
            format_timestamp(at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn leaderboard_record_in(
    conn: &Connection,
    user_id: i64,
    difficulty: DifficultyTier,
) -> rusqlite::Result<Option<LeaderboardRecord>> {
    conn.query_row(
        r#"
        SELECT id, user_id, difficulty, best_reaction_time, average_accuracy, total_tests, last_test_at
        FROM leaderboard
        WHERE user_id = ?1 AND difficulty = ?2
        "#,
        params![user_id, difficulty.to_string()],
        |row| {
            Ok(LeaderboardRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                difficulty: difficulty_column(row, 2)?,
                best_reaction_ms: row.get(3)?,
                average_accuracy: row.get(4)?,
                total_tests: row.get(5)?,
                last_test_at: timestamp_column(row, 6)?,
            })
        },
    )
    .optional()
}

/// Create the row on a first session; afterwards the best time only moves
/// down, the test count always grows and accuracy takes the latest value.
fn upsert_leaderboard_in(
    conn: &Connection,
    user_id: i64,
    result: &SessionResult,
    at: DateTime<Utc>,
) -> rusqlite::Result<RecordedSession> {
    match leaderboard_record_in(conn, user_id, result.difficulty)? {
        Some(mut record) => {
            let improved = result.mean_reaction_ms < record.best_reaction_ms;
            if improved {
                record.best_reaction_ms = result.mean_reaction_ms;
            }
            // latest session's accuracy, not a running average
            record.average_accuracy = result.accuracy_percent;
            record.total_tests += 1;
            record.last_test_at = at;

            conn.execute(
                r#"
                UPDATE leaderboard
                SET best_reaction_time = ?1, average_accuracy = ?2, total_tests = ?3, last_test_at = ?4
                WHERE id = ?5
                "#,
                params![
                    record.best_reaction_ms,
                    record.average_accuracy,
                    record.total_tests,
                    format_timestamp(record.last_test_at),
                    record.id,
                ],
            )?;
            Ok(RecordedSession {
                record,
                improved,
            })
        }
        None => {
            conn.execute(
                r#"
                INSERT INTO leaderboard
                (user_id, difficulty, best_reaction_time, average_accuracy, total_tests, last_test_at)
                VALUES (?1, ?2, ?3, ?4, 1, ?5)
                "#,
                params![
                    user_id,
                    result.difficulty.to_string(),
                    result.mean_reaction_ms,
                    result.accuracy_percent,
                    format_timestamp(at),
                ],
            )?;
            Ok(RecordedSession {
                record: LeaderboardRecord {
                    id: conn.last_insert_rowid(),
                    user_id,
                    difficulty: result.difficulty,
                    best_reaction_ms: result.mean_reaction_ms,
                    average_accuracy: result.accuracy_percent,
                    total_tests: 1,
                    last_test_at: at,
                },
                improved: true,
            })
        }
    }
}

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        user_id: row.get(0)?,
        reaction_ms: row.get(1)?,
        accuracy: row.get(2)?,
        difficulty: difficulty_column(row, 3)?,
        target_hits: row.get(4)?,
        total_targets: row.get(5)?,
        created_at: timestamp_column(row, 6)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        salt: row.get(4)?,
    })
}

fn difficulty_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DifficultyTier> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(idx, "difficulty".to_string(), rusqlite::types::Type::Text)
    })
}

/// Fixed-width UTC timestamps so text ordering matches time ordering
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), rusqlite::types::Type::Text)
        })
}
