use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::RngCore;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use tracing::warn;
use uuid::Uuid;

use quote_db::Database;
use quote_db::models::UserRow;
use quote_types::api::LoginRequest;
use quote_types::logs::LogAction;
use quote_types::models::{DEFAULT_COLOR, User};
use quote_types::perms::Permission;

use crate::error::ApiError;
use crate::{AppState, push_log};

pub const AUTH_COOKIE_NAME: &str = "qauth";

/// Two weeks, sliding: refreshed on every authenticated request.
const SESSION_LENGTH_SECS: i64 = 14 * 24 * 60 * 60;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth_login))
        .route("/auth/clear", get(auth_clear).post(auth_clear))
        .route("/auth/check", get(auth_check))
}

// -- Handlers --

async fn auth_login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let LoginRequest { username, password } = body;
    let row = state
        .blocking(move |db| db.get_user_by_name(&username))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    verify_password(&password, &row.pass)?;

    let token = {
        let user_id = row.id.clone();
        state
            .blocking(move |db| create_session(db, &user_id))
            .await?
    };
    set_session_cookie(&cookies, token);

    Ok(StatusCode::OK.into_response())
}

async fn auth_clear(State(state): State<AppState>, cookies: Cookies) -> Result<Response, ApiError> {
    if let Some(cookie) = cookies.get(AUTH_COOKIE_NAME) {
        let token = cookie.value().to_string();
        state
            .blocking(move |db| db.delete_session_by_token(&token))
            .await?;
    }

    cookies.add(Cookie::build(AUTH_COOKIE_NAME).removal().path("/").build());
    Ok(StatusCode::OK.into_response())
}

async fn auth_check(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Result<Response, ApiError> {
    let actor = authenticate(&state, &headers, &cookies).await?;
    Ok(Json(actor).into_response())
}

// -- Session plumbing --

/// Resolve the current user from the `qauth` cookie, falling back to an
/// `Authorization: Bearer` header. Success slides the session window and
/// re-sets the cookie.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    cookies: &Cookies,
) -> Result<User, ApiError> {
    let token = match session_token(headers, cookies)? {
        Some(token) => token,
        None => return Err(ApiError::NoAuth),
    };

    let user = {
        let token = token.clone();
        state
            .blocking(move |db| resolve_session(db, &token))
            .await??
    };
    set_session_cookie(cookies, token);

    Ok(user)
}

fn session_token(headers: &HeaderMap, cookies: &Cookies) -> Result<Option<String>, ApiError> {
    if let Some(cookie) = cookies.get(AUTH_COOKIE_NAME)
        && !cookie.value().is_empty()
    {
        return Ok(Some(cookie.value().to_string()));
    }

    match headers.get(AUTHORIZATION) {
        Some(header) => {
            let header = header.to_str().map_err(|_| ApiError::UnsupportedScheme)?;
            match header.split_once(' ') {
                Some(("Bearer", token)) if !token.is_empty() => Ok(Some(token.to_string())),
                Some(_) => Err(ApiError::UnsupportedScheme),
                None => Err(ApiError::UnsupportedScheme),
            }
        }
        None => Ok(None),
    }
}

fn resolve_session(db: &Database, token: &str) -> anyhow::Result<Result<User, ApiError>> {
    let session = match db.get_session_by_token(token)? {
        Some(session) => session,
        // don't leak whether the token ever existed
        None => return Ok(Err(ApiError::SessionExpired)),
    };

    let now = Utc::now().timestamp();
    if now >= session.expiry {
        return Ok(Err(ApiError::SessionExpired));
    }
    db.refresh_session(&session.id, now + SESSION_LENGTH_SECS, now)?;

    match db.get_user_by_id(&session.user_id)? {
        Some(row) => Ok(Ok(wire_user(&row)?)),
        None => Ok(Err(ApiError::SessionExpired)),
    }
}

fn create_session(db: &Database, user_id: &str) -> anyhow::Result<String> {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let token = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    let now = Utc::now().timestamp();
    db.create_session(
        &Uuid::new_v4().to_string(),
        &token,
        user_id,
        now,
        now + SESSION_LENGTH_SECS,
    )?;
    Ok(token)
}

fn set_session_cookie(cookies: &Cookies, token: String) {
    let c = Cookie::build((AUTH_COOKIE_NAME, token))
        .max_age(tower_cookies::cookie::time::Duration::weeks(2))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .build();
    cookies.add(c);
}

// -- Passwords --

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::InvalidCredentials)
}

// -- Row conversion --

/// A db row as it may travel outward: password stays behind.
pub fn wire_user(row: &UserRow) -> anyhow::Result<User> {
    Ok(User {
        id: row.id.parse()?,
        name: row.name.clone(),
        color: row.color.clone(),
        picture: row.picture.clone(),
        perms: Permission::from_bits(row.perms),
    })
}

// -- First run --

/// When the users table is empty, create `admin` holding `Everything`
/// with a generated password, announced once at WARN.
pub fn seed_default_admin(db: &Database) -> anyhow::Result<()> {
    if db.count_users()? > 0 {
        return Ok(());
    }

    let mut bytes = [0u8; 18];
    rand::rng().fill_bytes(&mut bytes);
    let password = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    let id = Uuid::new_v4();
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("{e}"))?;
    db.create_user(
        &id.to_string(),
        "admin",
        DEFAULT_COLOR,
        &hash,
        Permission::Everything.bit(),
    )?;

    warn!("No accounts found. Created default admin.");
    warn!("Username: admin; Password: {password}");
    warn!("Please change these credentials as soon as possible.");

    if let Some(row) = db.get_user_by_id(&id.to_string())? {
        push_log(db, id, id, LogAction::UserCreatedBySystem(wire_user(&row)?));
    }
    Ok(())
}
