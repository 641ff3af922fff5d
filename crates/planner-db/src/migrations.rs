use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            platoon         TEXT NOT NULL CHECK (platoon IN ('Red', 'Green', 'Blue')),
            is_lieutenant   INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS missions (
            id              TEXT PRIMARY KEY,
            platoon         TEXT NOT NULL CHECK (platoon IN ('Red', 'Green', 'Blue')),
            mission_type    TEXT NOT NULL,
            description     TEXT NOT NULL,
            date            TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_missions_platoon
            ON missions(platoon, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
