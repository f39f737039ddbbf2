use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("No authentication provided.")]
    NoAuth,
    #[error("Session expired or invalid.")]
    SessionExpired,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("Unsupported authorization scheme.")]
    UnsupportedScheme,
    #[error("Missing permission.")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("passwordhash error: {0}")]
    PassHash(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError as E;
        let status = match &self {
            E::NoAuth | E::SessionExpired | E::InvalidCredentials => StatusCode::UNAUTHORIZED,
            E::UnsupportedScheme | E::BadRequest(_) => StatusCode::BAD_REQUEST,
            E::Forbidden => StatusCode::FORBIDDEN,
            E::PassHash(_) | E::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{self}");
            return (status, "Internal error; logged.").into_response();
        }
        (status, self.to_string()).into_response()
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ApiError::PassHash(e.to_string())
    }
}
