use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_cookies::Cookies;

use quote_types::api::Pagination;
use quote_types::logs::LogEntry;
use quote_types::perms::{Action, may};

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/logs", get(get_logs))
}

async fn get_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Query(p): Query<Pagination>,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    if !may(&actor, Action::InspectLogs) {
        return Err(ApiError::Forbidden);
    }

    let limit = u32::from(p.limit);
    let offset = limit.saturating_mul(u32::from(p.page) - 1);
    let rows = state.blocking(move |db| db.get_logs(limit, offset)).await?;

    let entries = rows
        .into_iter()
        .map(|row| {
            Ok(LogEntry {
                id: row.id.parse()?,
                timestamp: row.timestamp,
                actor: row.actor.parse()?,
                subject: row.subject.parse()?,
                action: serde_json::from_str(&row.details)?,
            })
        })
        .collect::<anyhow::Result<Vec<LogEntry>>>()?;

    if entries.is_empty() {
        return Ok((StatusCode::NOT_FOUND, "No logs found for query.").into_response());
    }
    Ok(Json(entries).into_response())
}
