//! The header identity widget: fetches the current user on mount, renders
//! a login link when there is no session and a menu with a logout action
//! when there is one.

use quote_types::models::User;

use crate::Route;
use crate::api::ApiClient;
use crate::notice::Toaster;

pub struct SessionWidget {
    client: ApiClient,
    pub toaster: Toaster,
    user: Option<User>,
}

impl SessionWidget {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            toaster: Toaster::default(),
            user: None,
        }
    }

    pub async fn load(&mut self) {
        self.user = self.client.fetch_self().await.ok();
    }

    /// `None` renders the login link.
    pub fn signed_in(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login_route(&self) -> Route {
        Route::Login
    }

    /// Clears the session server-side, drops the displayed identity and
    /// sends the shell back to the landing route.
    pub async fn log_out(&mut self) -> Route {
        if let Err(e) = self.client.clear_session().await {
            tracing::warn!("session clear failed: {e}");
        }
        self.user = None;
        self.toaster.push("Logged out.");
        Route::Landing
    }
}
