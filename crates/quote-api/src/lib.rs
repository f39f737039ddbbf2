pub mod auth;
pub mod authors;
pub mod error;
pub mod logs;
pub mod quotes;
pub mod users;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_cookies::CookieManagerLayer;
use tracing::error;
use uuid::Uuid;

use quote_db::Database;
use quote_types::logs::LogAction;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

impl AppStateInner {
    pub fn new(db: Database) -> AppState {
        Arc::new(AppStateInner { db })
    }

    /// Run a rusqlite call off the async runtime.
    pub async fn blocking<F, T>(self: &Arc<Self>, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || f(&state.db))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {e}"))?
            .map_err(ApiError::from)
    }
}

/// The full route table. Assembled here, not in the server binary, so
/// tests can mount the service in-process.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async {}))
        .route("/health", get(|| async {}))
        .merge(auth::routes())
        .merge(users::routes())
        .merge(authors::routes())
        .merge(quotes::routes())
        .merge(logs::routes())
        .with_state(state)
        .layer(CookieManagerLayer::new())
}

/// Record an audit-log entry. Mutations must not fail because the log
/// write did; failures are logged and swallowed.
pub fn push_log(db: &Database, actor: Uuid, subject: Uuid, action: LogAction) {
    let details = match serde_json::to_string(&action) {
        Ok(json) => json,
        Err(e) => {
            error!("could not serialize log action {}: {e}", action.label());
            return;
        }
    };
    let id = Uuid::new_v4();
    let timestamp = chrono::Utc::now().timestamp();
    if let Err(e) = db.insert_log(
        &id.to_string(),
        timestamp,
        &actor.to_string(),
        &subject.to_string(),
        action.label(),
        &details,
    ) {
        error!("could not push log to database: {e}");
    }
}
