use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use quote_types::api::{ChangePasswordRequest, CreateUserRequest, UserPatch};
use quote_types::logs::LogAction;
use quote_types::models::{DEFAULT_COLOR, User};
use quote_types::perms::{Action, Permission, may};

use crate::auth::{authenticate, hash_password, wire_user};
use crate::error::ApiError;
use crate::{AppState, push_log};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users).post(post_user))
        .route("/users/self", get(get_self))
        .route("/users/me", get(get_self))
        .route(
            "/users/{id}",
            get(get_user_by_id).patch(patch_user).delete(delete_user),
        )
        .route("/users/{id}/changepassword", patch(change_password))
        .route("/users/count", get(get_users_count))
}

async fn get_self(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    Ok(Json(actor).into_response())
}

async fn get_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Result<Response, ApiError> {
    authenticate(&state, &headers, &cookies).await?;

    let rows = state.blocking(|db| db.get_users()).await?;
    let users = rows
        .iter()
        .map(wire_user)
        .collect::<anyhow::Result<Vec<User>>>()?;
    Ok(Json(users).into_response())
}

async fn get_user_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    authenticate(&state, &headers, &cookies).await?;

    match fetch_user(&state, id).await? {
        Some(user) => Ok(Json(user).into_response()),
        None => Ok((StatusCode::BAD_REQUEST, "No such user found.").into_response()),
    }
}

async fn get_users_count(State(state): State<AppState>) -> Result<Response, ApiError> {
    let count = state.blocking(|db| db.count_users()).await?;
    Ok(count.to_string().into_response())
}

async fn post_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Json(body): Json<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    if !may(&actor, Action::CreateUser) {
        return Err(ApiError::Forbidden);
    }

    validate_name(&body.name)?;
    validate_password(&body.pass)?;

    let id = Uuid::new_v4();
    let hash = hash_password(&body.pass)?;
    let created = state
        .blocking(move |db| {
            if db.get_user_by_name(&body.name)?.is_some() {
                return Ok(None);
            }
            db.create_user(
                &id.to_string(),
                &body.name,
                DEFAULT_COLOR,
                &hash,
                Permission::to_bits(&quote_types::perms::DEFAULT_PERMISSIONS),
            )?;
            db.get_user_by_id(&id.to_string())
        })
        .await?;

    let Some(row) = created else {
        return Ok((StatusCode::CONFLICT, "Username already taken.").into_response());
    };
    let user = wire_user(&row)?;

    let logged = user.clone();
    state
        .blocking(move |db| {
            push_log(db, actor.id, logged.id, LogAction::UserCreated(logged));
            Ok(())
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn patch_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<Uuid>,
    Json(body): Json<UserPatch>,
) -> Result<Response, ApiError> {
    if body.all_none() {
        return Err(ApiError::BadRequest("No fields to update.".into()));
    }

    let actor = authenticate(&state, &headers, &cookies).await?;
    let Some(target) = fetch_user(&state, id).await? else {
        return Ok((StatusCode::BAD_REQUEST, "No such user found.").into_response());
    };

    if (body.name.is_some() || body.color.is_some() || body.picture.is_some())
        && !may(&actor, Action::MutateUser(&target))
    {
        return Err(ApiError::Forbidden);
    }
    if body.perms.is_some() && !may(&actor, Action::MutatePermissions(&target)) {
        return Err(ApiError::Forbidden);
    }
    if let Some(name) = &body.name {
        validate_name(name)?;
    }

    let updated = User {
        id: target.id,
        name: body.name.clone().unwrap_or_else(|| target.name.clone()),
        color: body.color.clone().unwrap_or_else(|| target.color.clone()),
        picture: body
            .picture
            .clone()
            .unwrap_or_else(|| target.picture.clone()),
        perms: body.perms.clone().unwrap_or_else(|| target.perms.clone()),
    };

    let written = updated.clone();
    state
        .blocking(move |db| {
            db.update_user(
                &written.id.to_string(),
                &written.name,
                &written.color,
                &written.picture,
                Permission::to_bits(&written.perms),
            )?;
            for action in patch_log_actions(&target, &body) {
                push_log(db, actor.id, target.id, action);
            }
            Ok(())
        })
        .await?;

    Ok(Json(updated).into_response())
}

/// One audit entry per changed field.
fn patch_log_actions(target: &User, patch: &UserPatch) -> Vec<LogAction> {
    let mut actions = Vec::new();
    if let Some(name) = &patch.name {
        actions.push(LogAction::UserNameUpdated {
            old_name: target.name.clone(),
            new_name: name.clone(),
        });
    }
    if let Some(color) = &patch.color {
        actions.push(LogAction::UserColorUpdated {
            old_color: target.color.clone(),
            new_color: color.clone(),
        });
    }
    if let Some(picture) = &patch.picture {
        actions.push(LogAction::UserPictureUpdated {
            old_picture: target.picture.clone(),
            new_picture: picture.clone(),
        });
    }
    if let Some(perms) = &patch.perms {
        actions.push(LogAction::UserPermissionsUpdated {
            old_perms: target.perms.clone(),
            new_perms: perms.clone(),
        });
    }
    actions
}

async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    if actor.id == id {
        return Err(ApiError::BadRequest("You cannot delete yourself.".into()));
    }

    let Some(target) = fetch_user(&state, id).await? else {
        return Ok((StatusCode::BAD_REQUEST, "No such user found.").into_response());
    };
    if !may(&actor, Action::DeleteUser(&target)) {
        return Err(ApiError::Forbidden);
    }

    state
        .blocking(move |db| {
            db.delete_user(&target.id.to_string())?;
            push_log(db, actor.id, target.id, LogAction::UserDeleted(target));
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    let Some(target) = fetch_user(&state, id).await? else {
        return Ok((StatusCode::BAD_REQUEST, "No such user found.").into_response());
    };
    if !may(&actor, Action::ChangePassword(&target)) {
        return Err(ApiError::Forbidden);
    }

    validate_password(&body.pass)?;
    let hash = hash_password(&body.pass)?;

    state
        .blocking(move |db| {
            db.update_user_password(&target.id.to_string(), &hash)?;
            // a changed password invalidates every session the target holds
            db.delete_sessions_for_user(&target.id.to_string())?;
            push_log(db, actor.id, target.id, LogAction::UserPasswordUpdated);
            Ok(())
        })
        .await?;

    Ok((StatusCode::OK, "Password updated.").into_response())
}

async fn fetch_user(state: &AppState, id: Uuid) -> Result<Option<User>, ApiError> {
    let row = state
        .blocking(move |db| db.get_user_by_id(&id.to_string()))
        .await?;
    match row {
        Some(row) => Ok(Some(wire_user(&row)?)),
        None => Ok(None),
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() || name.len() > 32 {
        return Err(ApiError::BadRequest(
            "Username must be 1-32 characters long.".into(),
        ));
    }
    Ok(())
}

fn validate_password(pass: &str) -> Result<(), ApiError> {
    if pass.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters long.".into(),
        ));
    }
    Ok(())
}
