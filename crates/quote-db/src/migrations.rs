use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            color       TEXT NOT NULL,
            picture     TEXT NOT NULL DEFAULT '',
            pass        TEXT NOT NULL,
            perms       INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id          TEXT PRIMARY KEY,
            token       TEXT NOT NULL UNIQUE,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            issued      INTEGER NOT NULL,
            expiry      INTEGER NOT NULL,
            last_access INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS authors (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            obfname     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS quotes (
            id          TEXT PRIMARY KEY,
            context     TEXT,
            clearance   INTEGER NOT NULL DEFAULT 0,
            likes       INTEGER NOT NULL DEFAULT 0,
            timestamp   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS lines (
            id          TEXT PRIMARY KEY,
            quote_id    TEXT NOT NULL REFERENCES quotes(id) ON DELETE CASCADE,
            author_id   TEXT NOT NULL REFERENCES authors(id),
            position    INTEGER NOT NULL,
            content     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lines_quote
            ON lines(quote_id, position);

        CREATE INDEX IF NOT EXISTS idx_lines_author
            ON lines(author_id);

        CREATE TABLE IF NOT EXISTS logs (
            id          TEXT PRIMARY KEY,
            timestamp   INTEGER NOT NULL,
            actor       TEXT NOT NULL,
            subject     TEXT NOT NULL,
            action      TEXT NOT NULL,
            details     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_logs_timestamp
            ON logs(timestamp);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
