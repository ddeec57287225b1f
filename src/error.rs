//! Error types for storage and identity.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the results/leaderboard database
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures surfaced to the sign-in and registration forms
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Username must be between {min} and {max} characters")]
    InvalidUsername { min: usize, max: usize },

    #[error("Accounts are unavailable: the results database could not be opened")]
    Unavailable,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        AuthError::Store(StoreError::Sqlite(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            AuthError::WeakPassword(6).to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            AuthError::InvalidUsername { min: 3, max: 20 }.to_string(),
            "Username must be between 3 and 20 characters"
        );
    }

    #[test]
    fn sqlite_errors_convert() {
        let err: AuthError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, AuthError::Store(StoreError::Sqlite(_))));
    }
}
