use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use quote_types::api::{AuthorPatch, NewAuthorRequest};
use quote_types::logs::LogAction;
use quote_types::models::{Author, ExtendedAuthor};
use quote_types::perms::{Action, may};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::{AppState, push_log};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/authors/extended", get(get_authors_extended))
        .route("/authors", post(post_author))
        .route(
            "/authors/{id}",
            get(get_author_by_id)
                .patch(patch_author)
                .delete(delete_author),
        )
        .route("/authors/count", get(get_authors_count))
        .route("/authors/quoted-count", get(get_quoted_count))
}

async fn get_authors_extended(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Result<Response, ApiError> {
    authenticate(&state, &headers, &cookies).await?;

    let rows = state.blocking(|db| db.get_authors_extended()).await?;
    let authors = rows
        .into_iter()
        .map(|row| {
            Ok(ExtendedAuthor {
                id: row.id.parse()?,
                name: row.name,
                obfname: row.obfname,
                quotecount: row.quotecount,
                linecount: row.linecount,
            })
        })
        .collect::<anyhow::Result<Vec<ExtendedAuthor>>>()?;
    Ok(Json(authors).into_response())
}

async fn get_author_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    authenticate(&state, &headers, &cookies).await?;

    match fetch_author(&state, id).await? {
        Some(author) => Ok(Json(author).into_response()),
        None => Ok((StatusCode::BAD_REQUEST, "No such author found.").into_response()),
    }
}

async fn get_authors_count(State(state): State<AppState>) -> Result<Response, ApiError> {
    let count = state.blocking(|db| db.count_authors()).await?;
    Ok(count.to_string().into_response())
}

/// Authors who actually appear on at least one line.
async fn get_quoted_count(State(state): State<AppState>) -> Result<Response, ApiError> {
    let count = state.blocking(|db| db.count_quoted_authors()).await?;
    Ok(count.to_string().into_response())
}

async fn post_author(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Json(body): Json<NewAuthorRequest>,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    if !may(&actor, Action::CreateAuthor) {
        return Err(ApiError::Forbidden);
    }
    if body.name.is_empty() {
        return Err(ApiError::BadRequest("Author name must not be empty.".into()));
    }

    let author = Author {
        id: Uuid::new_v4(),
        name: body.name,
        obfname: body.obfname,
    };

    let created = author.clone();
    state
        .blocking(move |db| {
            db.create_author(&created.id.to_string(), &created.name, &created.obfname)?;
            push_log(
                db,
                actor.id,
                created.id,
                LogAction::AuthorCreated(created.clone()),
            );
            Ok(())
        })
        .await?;

    Ok((StatusCode::CREATED, Json(author)).into_response())
}

async fn patch_author(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<Uuid>,
    Json(body): Json<AuthorPatch>,
) -> Result<Response, ApiError> {
    if body.all_none() {
        return Err(ApiError::BadRequest("No fields to update.".into()));
    }

    let actor = authenticate(&state, &headers, &cookies).await?;
    if !may(&actor, Action::RenameAuthor) {
        return Err(ApiError::Forbidden);
    }

    let Some(author) = fetch_author(&state, id).await? else {
        return Ok((StatusCode::BAD_REQUEST, "No such author found.").into_response());
    };

    let updated = Author {
        id: author.id,
        name: body.name.unwrap_or_else(|| author.name.clone()),
        obfname: body.obfname.unwrap_or_else(|| author.obfname.clone()),
    };

    let written = updated.clone();
    state
        .blocking(move |db| {
            db.update_author(&written.id.to_string(), &written.name, &written.obfname)?;
            push_log(
                db,
                actor.id,
                written.id,
                LogAction::AuthorUpdated {
                    old_name: author.name,
                    new_name: written.name.clone(),
                    old_obfname: author.obfname,
                    new_obfname: written.obfname.clone(),
                },
            );
            Ok(())
        })
        .await?;

    Ok(Json(updated).into_response())
}

async fn delete_author(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    if !may(&actor, Action::DeleteAuthor) {
        return Err(ApiError::Forbidden);
    }

    let Some(author) = fetch_author(&state, id).await? else {
        return Ok((StatusCode::BAD_REQUEST, "No such author found.").into_response());
    };

    let lines = {
        let id = author.id.to_string();
        state
            .blocking(move |db| db.count_lines_for_author(&id))
            .await?
    };
    if lines > 0 {
        return Ok((
            StatusCode::CONFLICT,
            "Author still has quote lines attached.",
        )
            .into_response());
    }

    state
        .blocking(move |db| {
            db.delete_author(&author.id.to_string())?;
            push_log(db, actor.id, author.id, LogAction::AuthorDeleted(author));
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn fetch_author(state: &AppState, id: Uuid) -> Result<Option<Author>, ApiError> {
    let row = state
        .blocking(move |db| db.get_author_by_id(&id.to_string()))
        .await?;
    match row {
        Some(row) => Ok(Some(Author {
            id: row.id.parse().map_err(anyhow::Error::from)?,
            name: row.name,
            obfname: row.obfname,
        })),
        None => Ok(None),
    }
}
