//! Player accounts.
//!
//! [`IdentityProvider`] is the boundary the game talks to. The bundled
//! [`LocalIdentityProvider`] keeps accounts in the results database and
//! remembers the signed-in player in a small JSON session file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::store::{ReflexDb, UserRow};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub username: String,
}

impl Identity {
    /// Name shown in the UI
    pub fn handle(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Identity {
            id: row.id,
            email: row.email,
            username: row.username,
        }
    }
}

pub type SessionListener = Box<dyn FnMut(Option<&Identity>)>;

pub trait IdentityProvider {
    fn current_session(&self) -> Option<Identity>;
    fn on_session_change(&mut self, listener: SessionListener);
    fn sign_in(&mut self, email: &str, password: &str) -> Result<Identity, AuthError>;
    fn sign_up(&mut self, email: &str, password: &str, username: &str)
        -> Result<Identity, AuthError>;
    fn sign_out(&mut self);
}

/// Stand-in used when no database is available; every account operation fails
#[derive(Default)]
pub struct OfflineIdentityProvider;

impl IdentityProvider for OfflineIdentityProvider {
    fn current_session(&self) -> Option<Identity> {
        None
    }

    fn on_session_change(&mut self, _listener: SessionListener) {}

    fn sign_in(&mut self, _email: &str, _password: &str) -> Result<Identity, AuthError> {
        Err(AuthError::Unavailable)
    }

    fn sign_up(
        &mut self,
        _email: &str,
        _password: &str,
        _username: &str,
    ) -> Result<Identity, AuthError> {
        Err(AuthError::Unavailable)
    }

    fn sign_out(&mut self) {}
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    user_id: i64,
}

pub struct LocalIdentityProvider {
    db: Rc<ReflexDb>,
    session_path: Option<PathBuf>,
    current: Option<Identity>,
    listeners: Vec<SessionListener>,
}

impl LocalIdentityProvider {
    /// `session_path` of `None` keeps the session in memory only
    pub fn new(db: Rc<ReflexDb>, session_path: Option<PathBuf>) -> Self {
        let mut provider = Self {
            db,
            session_path,
            current: None,
            listeners: Vec::new(),
        };
        provider.current = provider.restore_session();
        provider
    }

    fn restore_session(&self) -> Option<Identity> {
        let path = self.session_path.as_ref()?;
        let bytes = fs::read(path).ok()?;
        let stored: StoredSession = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                return None;
            }
        };
        match self.db.find_user_by_id(stored.user_id) {
            Ok(Some(row)) => {
                let identity = Identity::from(row);
                tracing::info!(user = %identity.username, "restored session");
                Some(identity)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to restore session: {}", e);
                None
            }
        }
    }

    fn persist_session(&self) {
        let Some(path) = self.session_path.as_ref() else {
            return;
        };
        let outcome = match &self.current {
            Some(identity) => write_session_file(
                path,
                &StoredSession {
                    user_id: identity.id,
                },
            ),
            None if path.exists() => fs::remove_file(path),
            None => Ok(()),
        };
        if let Err(e) = outcome {
            tracing::warn!("Failed to update session file {}: {}", path.display(), e);
        }
    }

    fn set_current(&mut self, identity: Option<Identity>) {
        self.current = identity;
        self.persist_session();
        for listener in &mut self.listeners {
            listener(self.current.as_ref());
        }
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn current_session(&self) -> Option<Identity> {
        self.current.clone()
    }

    fn on_session_change(&mut self, listener: SessionListener) {
        self.listeners.push(listener);
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        let row = self
            .db
            .find_user_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if hash_password(&row.salt, password) != row.password_hash {
            tracing::info!("rejected sign in for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity::from(row);
        tracing::info!(user = %identity.username, "signed in");
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        let username = username.trim();
        validate_sign_up(&email, password, username)?;

        if self.db.find_user_by_email(&email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if self.db.username_exists(username)? {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let salt = hex::encode(rand::random::<[u8; 16]>());
        let hash = hash_password(&salt, password);
        let id = self
            .db
            .insert_user(&email, username, &hash, &salt, Utc::now())?;

        let identity = Identity {
            id,
            email,
            username: username.to_string(),
        };
        tracing::info!(user = %identity.username, "registered");
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    fn sign_out(&mut self) {
        if let Some(identity) = &self.current {
            tracing::info!(user = %identity.username, "signed out");
        }
        self.set_current(None);
    }
}

fn write_session_file(path: &Path, stored: &StoredSession) -> io::Result<()> {
    let data = serde_json::to_vec(stored)?;
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
    .and_then(|()| fs::write(path, data))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_sign_up(email: &str, password: &str, username: &str) -> Result<(), AuthError> {
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    };
    if !valid_email {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
    }
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AuthError::InvalidUsername {
            min: USERNAME_MIN,
            max: USERNAME_MAX,
        });
    }
    Ok(())
}

/// Hex SHA-256 of salt followed by password
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
