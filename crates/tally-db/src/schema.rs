//! Schema registration. Tables are declared as an ordered list of DDL
//! statements and applied idempotently when the database opens. Naming is
//! explicit throughout: singular table names, no implicit timestamp
//! columns. Deleting a user removes their posts and votes; deleting a post
//! removes its votes.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::Result;

const TABLES: &[(&str, &str)] = &[
    (
        "user",
        "CREATE TABLE IF NOT EXISTS user (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            username  TEXT NOT NULL,
            email     TEXT NOT NULL UNIQUE,
            password  TEXT NOT NULL
        )",
    ),
    (
        "post",
        "CREATE TABLE IF NOT EXISTS post (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            title    TEXT NOT NULL,
            content  TEXT NOT NULL,
            user_id  INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE
        )",
    ),
    (
        "vote",
        "CREATE TABLE IF NOT EXISTS vote (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id  INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            post_id  INTEGER NOT NULL REFERENCES post(id) ON DELETE CASCADE
        )",
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_post_user ON post(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_vote_post ON vote(post_id)",
];

pub fn apply(conn: &Connection) -> Result<()> {
    for (name, ddl) in TABLES {
        conn.execute_batch(ddl)?;
        debug!("ensured table {name}");
    }
    for ddl in INDEXES {
        conn.execute_batch(ddl)?;
    }

    info!("schema applied ({} tables)", TABLES.len());
    Ok(())
}
