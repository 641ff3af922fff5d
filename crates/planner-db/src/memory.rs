use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use uuid::Uuid;

use planner_types::{Mission, User};

use crate::{CredentialStore, MissionFilter, MissionStore};

/// Process-local store for development and tests. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    missions: Mutex<MissionTable>,
}

#[derive(Default)]
struct MissionTable {
    /// id -> (insertion sequence, mission)
    rows: HashMap<Uuid, (u64, Mission)>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|e| anyhow!("store lock poisoned: {}", e))
}

impl CredentialStore for MemoryStore {
    fn insert_user(&self, user: &User) -> Result<bool> {
        let mut users = lock(&self.users)?;
        if users.contains_key(&user.username) {
            return Ok(false);
        }
        users.insert(user.username.clone(), user.clone());
        Ok(true)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(lock(&self.users)?.get(username).cloned())
    }
}

impl MissionStore for MemoryStore {
    fn get_mission(&self, id: Uuid) -> Result<Option<Mission>> {
        Ok(lock(&self.missions)?.rows.get(&id).map(|(_, m)| m.clone()))
    }

    fn put_mission(&self, mission: &Mission) -> Result<()> {
        let mut table = lock(&self.missions)?;
        let seq = match table.rows.get(&mission.id) {
            Some((seq, _)) => *seq,
            None => {
                table.next_seq += 1;
                table.next_seq
            }
        };
        table.rows.insert(mission.id, (seq, mission.clone()));
        Ok(())
    }

    fn delete_mission(&self, id: Uuid) -> Result<bool> {
        Ok(lock(&self.missions)?.rows.remove(&id).is_some())
    }

    fn scan_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>> {
        let table = lock(&self.missions)?;
        let mut hits: Vec<&(u64, Mission)> = table
            .rows
            .values()
            .filter(|(_, m)| filter.matches(m))
            .collect();
        hits.sort_by_key(|(seq, m)| (m.created_at, *seq));
        Ok(hits.into_iter().map(|(_, m)| m.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract;

    #[test]
    fn memory_usernames_are_unique_and_case_sensitive() {
        contract::usernames_are_unique_and_case_sensitive(&MemoryStore::new());
    }

    #[test]
    fn memory_missions_round_trip_and_delete() {
        contract::missions_round_trip_and_delete(&MemoryStore::new());
    }

    #[test]
    fn memory_scan_filters_and_orders() {
        contract::scan_filters_and_orders(&MemoryStore::new());
    }
}
