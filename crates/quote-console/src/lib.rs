//! The Quote Engine admin dashboard, minus the pixels: a typed client over
//! the REST API plus the page state machines the dashboard is made of.
//! Every management page follows one contract — fetch on mount, mutate
//! through a dialog, re-fetch the whole collection afterwards regardless of
//! outcome, and report success or failure through a toast.

pub mod api;
pub mod notice;
pub mod pages;
pub mod quote_card;
pub mod session;

/// Rendered by every gated page whose identity fetch came back non-ok.
pub const LOCKED_OUT_MESSAGE: &str = "You must be logged in to access this.";

/// Where a page wants the shell to navigate next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Users,
}

#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    /// The server answered with a non-ok status. Most call sites only care
    /// that it failed; the login and logs pages surface the body text.
    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}
