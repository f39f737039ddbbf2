use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Duration, Utc};

use quote_types::models::{LineAuthor, Quote, QuoteLine};

use crate::AppState;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes/count", get(get_quotes_count))
        .route("/quotes/count/thisweek", get(get_quotes_count_week))
        .route("/quotes/count/thismonth", get(get_quotes_count_month))
        .route("/quotes/randompublic", get(get_random_public))
}

async fn get_quotes_count(State(state): State<AppState>) -> Result<Response, ApiError> {
    let count = state.blocking(|db| db.count_quotes()).await?;
    Ok(count.to_string().into_response())
}

async fn get_quotes_count_week(State(state): State<AppState>) -> Result<Response, ApiError> {
    count_since(&state, Duration::days(7)).await
}

async fn get_quotes_count_month(State(state): State<AppState>) -> Result<Response, ApiError> {
    count_since(&state, Duration::days(30)).await
}

async fn count_since(state: &AppState, window: Duration) -> Result<Response, ApiError> {
    // the timestamp column stores this exact format, so string comparison
    // against the cutoff is sound
    let cutoff = (Utc::now() - window).format("%Y-%m-%d %H:%M:%S").to_string();
    let count = state
        .blocking(move |db| db.count_quotes_since(&cutoff))
        .await?;
    Ok(count.to_string().into_response())
}

/// A random clearance-0 quote for the public landing card.
async fn get_random_public(State(state): State<AppState>) -> Result<Response, ApiError> {
    let quote = state
        .blocking(|db| {
            let Some(row) = db.random_public_quote()? else {
                return Ok(None);
            };
            let lines = db.get_lines_for_quote(&row.id)?;
            Ok(Some((row, lines)))
        })
        .await?;

    let Some((row, lines)) = quote else {
        return Ok((StatusCode::NOT_FOUND, "No public quotes.").into_response());
    };

    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(QuoteLine {
                id: line.id.parse()?,
                content: line.content,
                position: line.position as u8,
                author: LineAuthor {
                    id: line.author_id.parse()?,
                    name: line.author_name,
                    obfname: line.author_obfname,
                },
            })
        })
        .collect::<anyhow::Result<Vec<QuoteLine>>>()?;

    let quote = Quote {
        id: row.id.parse().map_err(anyhow::Error::from)?,
        context: row.context,
        clearance: row.clearance as u8,
        likes: row.likes,
        timestamp: parse_db_timestamp(&row.timestamp),
        lines,
    };
    Ok(Json(quote).into_response())
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC and convert; RFC 3339 input also accepted.
fn parse_db_timestamp(raw: &str) -> chrono::DateTime<Utc> {
    raw.parse::<chrono::DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("Corrupt quote timestamp '{raw}': {e}");
            chrono::DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::parse_db_timestamp;

    #[test]
    fn sqlite_and_rfc3339_timestamps_both_parse() {
        let sqlite = parse_db_timestamp("2026-02-01 09:30:00");
        assert_eq!(sqlite.to_rfc3339(), "2026-02-01T09:30:00+00:00");

        let rfc = parse_db_timestamp("2026-02-01T09:30:00Z");
        assert_eq!(rfc, sqlite);

        // corrupt input degrades instead of panicking
        let fallback = parse_db_timestamp("not a timestamp");
        assert_eq!(fallback, chrono::DateTime::<chrono::Utc>::default());
    }
}
