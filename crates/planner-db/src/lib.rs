pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use planner_types::{Mission, Platoon, User};

pub use memory::MemoryStore;

/// User records keyed by username.
pub trait CredentialStore: Send + Sync {
    /// Insert a new user. Returns `false` without writing anything when the
    /// username is already taken; the check and the write are atomic.
    fn insert_user(&self, user: &User) -> Result<bool>;

    /// Exact, case-sensitive lookup.
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Mission records keyed by id.
pub trait MissionStore: Send + Sync {
    fn get_mission(&self, id: Uuid) -> Result<Option<Mission>>;

    /// Insert or replace by id. A replaced mission keeps its insertion position.
    fn put_mission(&self, mission: &Mission) -> Result<()>;

    /// Returns `false` when there was nothing to remove.
    fn delete_mission(&self, id: Uuid) -> Result<bool>;

    /// Missions matching `filter`, `created_at` ascending, ties in insertion order.
    fn scan_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>>;
}

#[derive(Debug, Clone, Default)]
pub struct MissionFilter {
    pub platoon: Option<Platoon>,
}

impl MissionFilter {
    pub fn platoon(platoon: Platoon) -> Self {
        Self {
            platoon: Some(platoon),
        }
    }

    pub fn matches(&self, mission: &Mission) -> bool {
        self.platoon.is_none_or(|p| p == mission.platoon)
    }
}

/// SQLite-backed store. One connection, serialized behind a mutex.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}
