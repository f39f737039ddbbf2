use crate::api::ApiClient;
use crate::notice::Toaster;
use crate::{ConsoleError, Route};

/// The login form. Uniquely among the pages, a failed submission surfaces
/// the raw response text instead of the generic failure toast.
pub struct LoginPage {
    client: ApiClient,
    pub toaster: Toaster,
    pub username: String,
    pub password: String,
}

impl LoginPage {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            toaster: Toaster::default(),
            username: String::new(),
            password: String::new(),
        }
    }

    /// `Some(route)` on success; `None` keeps the user on the form.
    pub async fn submit(&mut self) -> Option<Route> {
        match self.client.login(&self.username, &self.password).await {
            Ok(()) => {
                self.toaster.push("Logged in successfully.");
                Some(Route::Landing)
            }
            Err(ConsoleError::Status { body, .. }) => {
                self.toaster.push(body);
                None
            }
            Err(e) => {
                self.toaster.push(e.to_string());
                None
            }
        }
    }
}
