use uuid::Uuid;

use quote_types::models::User;
use quote_types::perms::{Action, may};

use crate::Route;
use crate::api::ApiClient;
use crate::notice::{GENERIC_FAILURE, Toaster};

/// The per-user password change page (`/users/{id}/change-password`).
pub struct PasswordPage {
    client: ApiClient,
    pub toaster: Toaster,
    user: Option<User>,
    target: TargetState,
    pub new_pass: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetState {
    /// Nothing fetched yet.
    None,
    /// The id in the route resolved to nobody.
    Invalid,
    Found(User),
}

impl PasswordPage {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            toaster: Toaster::default(),
            user: None,
            target: TargetState::None,
            new_pass: String::new(),
        }
    }

    pub async fn load(&mut self, target_id: Uuid) {
        let (user, target) = tokio::join!(
            self.client.fetch_self(),
            self.client.fetch_user(target_id)
        );
        self.user = user.ok();
        self.target = match target {
            Ok(user) => TargetState::Found(user),
            Err(_) => TargetState::Invalid,
        };
    }

    pub fn locked_out(&self) -> bool {
        self.user.is_none()
    }

    pub fn target(&self) -> &TargetState {
        &self.target
    }

    /// Whether the form renders at all.
    pub fn able_to_edit(&self) -> bool {
        match (&self.user, &self.target) {
            (Some(me), TargetState::Found(target)) => may(me, Action::ChangePassword(target)),
            _ => false,
        }
    }

    /// On success: changing your own password ends your session and lands
    /// on the login page; changing someone else's returns to the users
    /// list. Failure keeps the form open with the generic toast.
    pub async fn submit(&mut self) -> Option<Route> {
        if !self.able_to_edit() {
            return None;
        }
        let TargetState::Found(target) = &self.target else {
            return None;
        };
        let (target_id, own) = (
            target.id,
            self.user.as_ref().is_some_and(|me| me.id == target.id),
        );

        match self.client.change_password(target_id, &self.new_pass).await {
            Ok(()) => {
                self.toaster.push("Password changed!");
                if own {
                    let _ = self.client.clear_session().await;
                    self.user = None;
                    Some(Route::Login)
                } else {
                    Some(Route::Users)
                }
            }
            Err(_) => {
                self.toaster.push(GENERIC_FAILURE);
                None
            }
        }
    }
}
