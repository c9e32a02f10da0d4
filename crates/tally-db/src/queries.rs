use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{NewPost, NewUser, NewVote, PostPatch, PostRow, UserPatch, UserRow, VoteRow};
use crate::{Database, Result, StoreError, validate};

/// Posts are always read together with the owner's username and the
/// aggregated vote tally; a single statement avoids N+1 lookups.
const POST_SELECT: &str = "SELECT p.id, p.title, p.content, p.user_id, u.username,
        (SELECT COUNT(*) FROM vote v WHERE v.post_id = p.id) AS vote_count
     FROM post p
     JOIN user u ON u.id = p.user_id";

impl Database {
    // -- Users --

    /// Validate, hash, insert. The credential transform is part of the
    /// write path itself: callers hand over plaintext and the stored row
    /// only ever holds the hash.
    pub fn create_user(&self, new: &NewUser) -> Result<UserRow> {
        validate::username(&new.username)?;
        validate::email(&new.email)?;
        validate::password(&new.password)?;
        let hashed = tally_auth::hash_password(&new.password)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user (username, email, password) VALUES (?1, ?2, ?3)",
                params![new.username, new.email, hashed],
            )?;

            Ok(UserRow {
                id: conn.last_insert_rowid(),
                username: new.username.clone(),
                email: new.email.clone(),
                password: hashed,
            })
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, username, email, password FROM user WHERE email = ?1")?;
            Ok(stmt.query_row([email], map_user_row).optional()?)
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, username, email, password FROM user ORDER BY id")?;
            let rows = stmt
                .query_map([], map_user_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Partial update. A patch carrying `password` routes the new plaintext
    /// through validation and the hasher; a patch that does not leaves the
    /// stored hash byte-identical.
    pub fn update_user(&self, id: i64, patch: &UserPatch) -> Result<UserRow> {
        if let Some(username) = &patch.username {
            validate::username(username)?;
        }
        if let Some(email) = &patch.email {
            validate::email(email)?;
        }
        let hashed = match &patch.password {
            Some(plaintext) => {
                validate::password(plaintext)?;
                Some(tally_auth::hash_password(plaintext)?)
            }
            None => None,
        };

        self.with_conn(|conn| {
            let mut assignments: Vec<&str> = Vec::new();
            let mut values: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

            if let Some(username) = &patch.username {
                assignments.push("username = ?");
                values.push(username);
            }
            if let Some(email) = &patch.email {
                assignments.push("email = ?");
                values.push(email);
            }
            if let Some(hash) = &hashed {
                assignments.push("password = ?");
                values.push(hash);
            }

            if assignments.is_empty() {
                return query_user_by_id(conn, id)?.ok_or(StoreError::NotFound);
            }

            values.push(&id);
            let sql = format!("UPDATE user SET {} WHERE id = ?", assignments.join(", "));
            let changed = conn.execute(&sql, values.as_slice())?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }

            query_user_by_id(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    /// Removes the user's posts and votes with them (cascade).
    pub fn delete_user(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM user WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?))
    }

    // -- Posts --

    /// The owner must exist when the post is written; checked inside the
    /// insert transaction rather than left to the schema alone.
    pub fn create_post(&self, new: &NewPost) -> Result<PostRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            ensure_exists(&tx, "user", new.user_id)?;
            tx.execute(
                "INSERT INTO post (title, content, user_id) VALUES (?1, ?2, ?3)",
                params![new.title, new.content, new.user_id],
            )?;
            let id = tx.last_insert_rowid();
            let row = query_post_by_id(&tx, id)?.ok_or(StoreError::NotFound)?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post_by_id(conn, id))
    }

    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{POST_SELECT} ORDER BY p.id DESC"))?;
            let rows = stmt
                .query_map([], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_post(&self, id: i64, patch: &PostPatch) -> Result<PostRow> {
        self.with_conn(|conn| {
            let mut assignments: Vec<&str> = Vec::new();
            let mut values: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

            if let Some(title) = &patch.title {
                assignments.push("title = ?");
                values.push(title);
            }
            if let Some(content) = &patch.content {
                assignments.push("content = ?");
                values.push(content);
            }

            if assignments.is_empty() {
                return query_post_by_id(conn, id)?.ok_or(StoreError::NotFound);
            }

            values.push(&id);
            let sql = format!("UPDATE post SET {} WHERE id = ?", assignments.join(", "));
            let changed = conn.execute(&sql, values.as_slice())?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }

            query_post_by_id(conn, id)?.ok_or(StoreError::NotFound)
        })
    }

    /// Removes the post's votes with it (cascade).
    pub fn delete_post(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM post WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    pub fn count_posts(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM post", [], |row| row.get(0))?))
    }

    // -- Votes --

    /// Both parents must exist at write time. Nothing stops the same user
    /// voting on the same post twice; whether repeat voting should be
    /// constrained is a product call that has not been made, so the gateway
    /// deliberately does not add the uniqueness check.
    pub fn create_vote(&self, new: &NewVote) -> Result<VoteRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            ensure_exists(&tx, "user", new.user_id)?;
            ensure_exists(&tx, "post", new.post_id)?;
            tx.execute(
                "INSERT INTO vote (user_id, post_id) VALUES (?1, ?2)",
                params![new.user_id, new.post_id],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(VoteRow {
                id,
                user_id: new.user_id,
                post_id: new.post_id,
            })
        })
    }

    pub fn count_votes(&self, post_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM vote WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?)
        })
    }

    pub fn count_all_votes(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM vote", [], |row| row.get(0))?))
    }
}

fn ensure_exists(conn: &Connection, table: &'static str, id: i64) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(&format!("SELECT id FROM {table} WHERE id = ?1"), [id], |row| {
            row.get(0)
        })
        .optional()?;

    if found.is_none() {
        return Err(StoreError::ForeignKey(table));
    }
    Ok(())
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username, email, password FROM user WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_user_row).optional()?)
}

fn query_post_by_id(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(&format!("{POST_SELECT} WHERE p.id = ?1"))?;
    Ok(stmt.query_row([id], map_post_row).optional()?)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
    })
}

fn map_post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        vote_count: row.get(5)?,
    })
}
