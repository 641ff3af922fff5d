//! Database row types. These map directly to SQLite rows and are converted
//! into the `planner-types` models at the store boundary.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use planner_types::{Mission, User};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub platoon: String,
    pub is_lieutenant: bool,
    pub created_at: String,
}

pub struct MissionRow {
    pub id: String,
    pub platoon: String,
    pub mission_type: String,
    pub description: String,
    pub date: String,
    pub created_at: String,
}

/// Fixed-width RFC 3339 so that text ordering in SQLite matches time ordering.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("corrupt timestamp '{}'", raw))?
        .with_timezone(&Utc))
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            platoon: user.platoon.to_string(),
            is_lieutenant: user.is_lieutenant,
            created_at: encode_timestamp(&user.created_at),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: Uuid::parse_str(&row.id).with_context(|| format!("corrupt user id '{}'", row.id))?,
            platoon: row
                .platoon
                .parse()
                .with_context(|| format!("corrupt platoon on user '{}'", row.id))?,
            created_at: decode_timestamp(&row.created_at)?,
            username: row.username,
            password_hash: row.password_hash,
            is_lieutenant: row.is_lieutenant,
        })
    }
}

impl From<&Mission> for MissionRow {
    fn from(mission: &Mission) -> Self {
        Self {
            id: mission.id.to_string(),
            platoon: mission.platoon.to_string(),
            mission_type: mission.mission_type.clone(),
            description: mission.description.clone(),
            date: mission.date.format(DATE_FORMAT).to_string(),
            created_at: encode_timestamp(&mission.created_at),
        }
    }
}

impl TryFrom<MissionRow> for Mission {
    type Error = anyhow::Error;

    fn try_from(row: MissionRow) -> Result<Self> {
        Ok(Self {
            id: Uuid::parse_str(&row.id)
                .with_context(|| format!("corrupt mission id '{}'", row.id))?,
            platoon: row
                .platoon
                .parse()
                .with_context(|| format!("corrupt platoon on mission '{}'", row.id))?,
            date: NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
                .with_context(|| format!("corrupt date on mission '{}'", row.id))?,
            created_at: decode_timestamp(&row.created_at)?,
            mission_type: row.mission_type,
            description: row.description,
        })
    }
}
