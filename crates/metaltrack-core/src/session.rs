//! Login against Master sheet credentials and session persistence

use metaltrack_parser::MasterRow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::{CoreError, CoreResult};
use crate::models::User;
use crate::types::Role;

/// Session store reference type
pub type SessionStoreRef = Arc<dyn SessionStore>;

/// Persistence for the logged-in user
pub trait SessionStore: Send + Sync {
    fn load(&self) -> CoreResult<Option<User>>;
    fn save(&self, user: &User) -> CoreResult<()>;
    fn clear(&self) -> CoreResult<()>;
}

fn session_error(error: impl std::fmt::Display) -> CoreError {
    CoreError::Session { message: error.to_string() }
}

fn is_well_formed(user: &User) -> bool {
    !user.username.trim().is_empty() && !user.name.trim().is_empty()
}

/// JSON file session store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> CoreResult<Option<User>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(session_error)?;
        match serde_json::from_str::<User>(&content) {
            Ok(user) if is_well_formed(&user) => Ok(Some(user)),
            Ok(_) | Err(_) => {
                log::warn!("Discarding invalid session file: {:?}", self.path);
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, user: &User) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(session_error)?;
            }
        }
        let content = serde_json::to_string_pretty(user).map_err(session_error)?;
        fs::write(&self.path, content).map_err(session_error)
    }

    fn clear(&self) -> CoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(session_error(e)),
        }
    }
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: RwLock<Option<User>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> CoreResult<Option<User>> {
        let user = self.user.read().map_err(session_error)?;
        Ok(user.clone().filter(is_well_formed))
    }

    fn save(&self, user: &User) -> CoreResult<()> {
        *self.user.write().map_err(session_error)? = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        *self.user.write().map_err(session_error)? = None;
        Ok(())
    }
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Checks credentials and keeps the session in its store
pub struct Authenticator {
    store: SessionStoreRef,
}

impl Authenticator {
    pub fn new(store: SessionStoreRef) -> Self {
        Self { store }
    }

    /// Match credentials against the Master rows and persist the user
    pub fn login(&self, credentials: &Credentials, rows: &[MasterRow]) -> CoreResult<User> {
        let username = credentials.username.trim();
        let password = credentials.password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::validation("Please enter username and password"));
        }

        let row = rows
            .iter()
            .filter(|row| row.has_credentials())
            .find(|row| row.username.trim() == username && row.password.trim() == password)
            .ok_or(CoreError::InvalidCredentials)?;

        let user = User {
            username: row.username.trim().to_string(),
            role: Role::from_sheet(&row.role),
            name: row.display_name().trim().to_string(),
        };
        self.store.save(&user)?;
        log::info!("User {} logged in as {}", user.username, user.role);
        Ok(user)
    }

    pub fn logout(&self) -> CoreResult<()> {
        self.store.clear()?;
        log::info!("User logged out");
        Ok(())
    }

    pub fn current(&self) -> CoreResult<Option<User>> {
        self.store.load()
    }

    /// Current user, failing when nobody is logged in
    pub fn require_user(&self) -> CoreResult<User> {
        self.current()?.ok_or(CoreError::Unauthorized)
    }

    /// Current user, failing unless the role is admin
    pub fn require_admin(&self) -> CoreResult<User> {
        let user = self.require_user()?;
        if user.role.is_admin() {
            Ok(user)
        } else {
            Err(CoreError::Unauthorized)
        }
    }
}
