use crate::models::{MissionRow, UserRow};
use crate::{CredentialStore, Database, MissionFilter, MissionStore};
use anyhow::Result;
use planner_types::{Mission, User};
use rusqlite::{Connection, Row};
use uuid::Uuid;

impl CredentialStore for Database {
    fn insert_user(&self, user: &User) -> Result<bool> {
        let row = UserRow::from(user);
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password_hash, platoon, is_lieutenant, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(username) DO NOTHING",
                rusqlite::params![
                    row.id,
                    row.username,
                    row.password_hash,
                    row.platoon,
                    row.is_lieutenant,
                    row.created_at,
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user_by_username(conn, username))?
            .map(User::try_from)
            .transpose()
    }
}

impl MissionStore for Database {
    fn get_mission(&self, id: Uuid) -> Result<Option<Mission>> {
        self.with_conn(|conn| query_mission(conn, &id.to_string()))?
            .map(Mission::try_from)
            .transpose()
    }

    fn put_mission(&self, mission: &Mission) -> Result<()> {
        let row = MissionRow::from(mission);
        // Upsert rather than REPLACE so the rowid, and with it the insertion
        // position used for tie-breaking, survives an edit.
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO missions (id, platoon, mission_type, description, date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    platoon = excluded.platoon,
                    mission_type = excluded.mission_type,
                    description = excluded.description,
                    date = excluded.date",
                rusqlite::params![
                    row.id,
                    row.platoon,
                    row.mission_type,
                    row.description,
                    row.date,
                    row.created_at,
                ],
            )?;
            Ok(())
        })
    }

    fn delete_mission(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM missions WHERE id = ?1", [id.to_string()])?;
            Ok(removed > 0)
        })
    }

    fn scan_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>> {
        let platoon = filter.platoon.map(|p| p.to_string());
        self.with_conn(|conn| query_missions(conn, platoon.as_deref()))?
            .into_iter()
            .map(Mission::try_from)
            .collect()
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, platoon, is_lieutenant, created_at
         FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                platoon: row.get(3)?,
                is_lieutenant: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

const MISSION_COLUMNS: &str = "id, platoon, mission_type, description, date, created_at";

fn mission_row(row: &Row<'_>) -> rusqlite::Result<MissionRow> {
    Ok(MissionRow {
        id: row.get(0)?,
        platoon: row.get(1)?,
        mission_type: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_mission(conn: &Connection, id: &str) -> Result<Option<MissionRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM missions WHERE id = ?1", MISSION_COLUMNS))?;
    let row = stmt.query_row([id], mission_row).optional()?;
    Ok(row)
}

fn query_missions(conn: &Connection, platoon: Option<&str>) -> Result<Vec<MissionRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM missions
         WHERE ?1 IS NULL OR platoon = ?1
         ORDER BY created_at ASC, rowid ASC",
        MISSION_COLUMNS
    ))?;

    let rows = stmt
        .query_map([platoon], mission_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract;

    #[test]
    fn sqlite_usernames_are_unique_and_case_sensitive() {
        let db = Database::open_in_memory().unwrap();
        contract::usernames_are_unique_and_case_sensitive(&db);
    }

    #[test]
    fn sqlite_missions_round_trip_and_delete() {
        let db = Database::open_in_memory().unwrap();
        contract::missions_round_trip_and_delete(&db);
    }

    #[test]
    fn sqlite_scan_filters_and_orders() {
        let db = Database::open_in_memory().unwrap();
        contract::scan_filters_and_orders(&db);
    }

    #[test]
    fn corrupt_rows_surface_as_errors() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO missions (id, platoon, mission_type, description, date, created_at)
                 VALUES (?1, 'Red', 'Patrol', 'x', 'not-a-date', '2024-01-01T00:00:00.000000Z')",
                [id.to_string()],
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.get_mission(id).is_err());
    }
}
