//! The fetch wrapper the whole dashboard goes through: prefixes every path
//! with the configured base URL and carries the session cookie ambiently.
//! No retries, no timeouts beyond the transport default, no cancellation.

use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use quote_types::api::{
    AuthorPatch, ChangePasswordRequest, CreateUserRequest, LoginRequest, NewAuthorRequest,
    UserPatch,
};
use quote_types::logs::LogEntry;
use quote_types::models::{ExtendedAuthor, Quote, User};

use crate::ConsoleError;

/// A dashboard stat card's data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    QuoteCount,
    QuotedAuthorCount,
    UserCount,
    WeeklyQuoteCount,
    MonthlyQuoteCount,
}

impl Stat {
    fn path(self) -> &'static str {
        match self {
            Stat::QuoteCount => "/quotes/count",
            Stat::QuotedAuthorCount => "/authors/quoted-count",
            Stat::UserCount => "/users/count",
            Stat::WeeklyQuoteCount => "/quotes/count/thisweek",
            Stat::MonthlyQuoteCount => "/quotes/count/thismonth",
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// `base` is environment-selected by the caller, e.g.
    /// `http://localhost:2019` in development or the deployment's `/api`
    /// prefix behind its public origin.
    pub fn new(base: &str) -> Result<Self, ConsoleError> {
        let base = Url::parse(base)?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ConsoleError::Transport)?;
        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url, ConsoleError> {
        // plain prefixing, so a base with a path keeps it
        let joined = format!("{}{}", self.base.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&joined)?)
    }

    /// The binary outcome every call site reduces to: an ok status is a
    /// success, anything else is a failure carrying the body text.
    async fn check(res: Response) -> Result<Response, ConsoleError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        Err(ConsoleError::Status { status, body })
    }

    async fn get(&self, path: &str) -> Result<Response, ConsoleError> {
        let res = self.http.get(self.url(path)?).send().await?;
        Self::check(res).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConsoleError> {
        Ok(self.get(path).await?.json().await?)
    }

    async fn get_text(&self, path: &str) -> Result<String, ConsoleError> {
        Ok(self.get(path).await?.text().await?)
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ConsoleError> {
        let res = self.http.post(self.url(path)?).json(body).send().await?;
        Self::check(res).await
    }

    async fn patch_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ConsoleError> {
        let res = self.http.patch(self.url(path)?).json(body).send().await?;
        Self::check(res).await
    }

    async fn delete(&self, path: &str) -> Result<Response, ConsoleError> {
        let res = self.http.delete(self.url(path)?).send().await?;
        Self::check(res).await
    }

    // -- Auth --

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ConsoleError> {
        self.post_json(
            "/auth/login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    /// Clears the session server-side; the cookie store drops the cookie
    /// with the removal response.
    pub async fn clear_session(&self) -> Result<(), ConsoleError> {
        self.get("/auth/clear").await?;
        Ok(())
    }

    // -- Users --

    pub async fn fetch_self(&self) -> Result<User, ConsoleError> {
        self.get_json("/users/self").await
    }

    pub async fn fetch_users(&self) -> Result<Vec<User>, ConsoleError> {
        self.get_json("/users").await
    }

    pub async fn fetch_user(&self, id: Uuid) -> Result<User, ConsoleError> {
        self.get_json(&format!("/users/{id}")).await
    }

    pub async fn create_user(&self, name: &str, pass: &str) -> Result<(), ConsoleError> {
        self.post_json(
            "/users",
            &CreateUserRequest {
                name: name.to_string(),
                pass: pass.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    pub async fn patch_user(&self, id: Uuid, patch: &UserPatch) -> Result<(), ConsoleError> {
        self.patch_json(&format!("/users/{id}"), patch).await?;
        Ok(())
    }

    pub async fn change_password(&self, id: Uuid, pass: &str) -> Result<(), ConsoleError> {
        self.patch_json(
            &format!("/users/{id}/changepassword"),
            &ChangePasswordRequest {
                pass: pass.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), ConsoleError> {
        self.delete(&format!("/users/{id}")).await?;
        Ok(())
    }

    // -- Authors --

    pub async fn fetch_authors_extended(&self) -> Result<Vec<ExtendedAuthor>, ConsoleError> {
        self.get_json("/authors/extended").await
    }

    pub async fn create_author(&self, name: &str, obfname: &str) -> Result<(), ConsoleError> {
        self.post_json(
            "/authors",
            &NewAuthorRequest {
                name: name.to_string(),
                obfname: obfname.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    pub async fn patch_author(&self, id: Uuid, patch: &AuthorPatch) -> Result<(), ConsoleError> {
        self.patch_json(&format!("/authors/{id}"), patch).await?;
        Ok(())
    }

    pub async fn delete_author(&self, id: Uuid) -> Result<(), ConsoleError> {
        self.delete(&format!("/authors/{id}")).await?;
        Ok(())
    }

    // -- Logs & stats --

    pub async fn fetch_logs(&self, limit: u32, page: u32) -> Result<Vec<LogEntry>, ConsoleError> {
        self.get_json(&format!("/logs?limit={limit}&page={page}")).await
    }

    pub async fn fetch_stat(&self, stat: Stat) -> Result<String, ConsoleError> {
        self.get_text(stat.path()).await
    }

    pub async fn random_public_quote(&self) -> Result<Quote, ConsoleError> {
        self.get_json("/quotes/randompublic").await
    }
}

impl ConsoleError {
    /// The status a failed request came back with, if it got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ConsoleError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
