//! HTTP route layer for tally.
//!
//! A thin translation between HTTP and the persistence gateway. Handlers
//! check nothing beyond request shape and authentication; field rules and
//! the credential pipeline live behind [`tally_db::Database`].

pub mod error;
pub mod middleware;
pub mod posts;
pub mod routes;
pub mod users;

use std::sync::Arc;

use tally_db::{Database, StoreError};
use tracing::error;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Run a store call on the blocking pool. Store work holds a mutex and
/// touches the filesystem (and user writes pay for a hash), so it stays off
/// the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(err) => {
            error!("blocking task failed: {err}");
            Err(ApiError::Internal)
        }
    }
}
