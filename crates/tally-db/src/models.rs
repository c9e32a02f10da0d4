/// Row types mapping directly to SQLite rows, plus the write inputs the
/// gateway accepts. Distinct from the tally-types API models so the store
/// layer stays independent of the HTTP surface.

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Always the PHC hash string, never plaintext.
    pub password: String,
}

/// A post row joined with its owner's username and aggregated vote count.
#[derive(Debug)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub author_username: String,
    pub vote_count: i64,
}

#[derive(Debug)]
pub struct VoteRow {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
}

/// Input for user creation. `password` is plaintext here; the gateway
/// hashes it before anything is written.
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial user update. `None` keeps the stored value; a present `password`
/// is validated and re-hashed on the way in.
#[derive(Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct NewPost {
    pub title: String,
    pub content: String,
    pub user_id: i64,
}

#[derive(Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub struct NewVote {
    pub user_id: i64,
    pub post_id: i64,
}
