use uuid::Uuid;

use quote_types::api::UserPatch;
use quote_types::models::User;
use quote_types::perms::{Action, may};

use crate::api::ApiClient;
use crate::notice::{GENERIC_FAILURE, Toaster};
use crate::pages::{FetchStat, fetch_stat_of};

/// The users management page: list of user cards, one shared dialog
/// parameterized by the pending action.
pub struct UsersPage {
    client: ApiClient,
    pub toaster: Toaster,
    user: Option<User>,
    users: Vec<User>,
    fetch_stat: Option<FetchStat>,
    dialog: Option<UserDialog>,
}

/// The pending dialog action, seeded from the selected card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDialog {
    Create { name: String, pass: String },
    EditName { user_id: Uuid, name: String },
    EditColor { user_id: Uuid, color: String },
    Delete { user_id: Uuid },
}

impl UsersPage {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            toaster: Toaster::default(),
            user: None,
            users: Vec::new(),
            fetch_stat: None,
            dialog: None,
        }
    }

    /// Mount: identity and collection fetches go out together; whichever
    /// resolves last wins its slot.
    pub async fn load(&mut self) {
        let (users, user) = tokio::join!(self.client.fetch_users(), self.client.fetch_self());

        match users {
            Ok(list) => {
                self.fetch_stat = Some(FetchStat { status: 200 });
                self.users = list;
            }
            Err(e) => {
                self.fetch_stat = Some(fetch_stat_of(&e));
                self.users = Vec::new();
            }
        }
        self.user = user.ok();
    }

    /// Non-ok collection fetch renders the locked-out message instead of
    /// the cards.
    pub fn locked_out(&self) -> bool {
        !self.fetch_stat.is_some_and(|stat| stat.ok())
    }

    /// What the page body shows in place of the cards, if anything.
    pub fn lockout_message(&self) -> Option<&'static str> {
        self.locked_out().then_some(crate::LOCKED_OUT_MESSAGE)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// All users, with the signed-in one in front.
    pub fn listed_users(&self) -> Vec<&User> {
        let mut list: Vec<&User> = Vec::new();
        if let Some(me) = &self.user {
            list.push(me);
        }
        list.extend(
            self.users
                .iter()
                .filter(|u| Some(u.id) != self.user.as_ref().map(|me| me.id)),
        );
        list
    }

    pub fn dialog(&self) -> Option<&UserDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut UserDialog> {
        self.dialog.as_mut()
    }

    fn target(&self, id: Uuid) -> Option<&User> {
        if let Some(me) = &self.user
            && me.id == id
        {
            return Some(me);
        }
        self.users.iter().find(|u| u.id == id)
    }

    // -- Gated dialog openers. A refused gate leaves the dialog closed and
    // issues no request.

    pub fn open_create(&mut self) -> bool {
        let Some(me) = &self.user else { return false };
        if !may(me, Action::CreateUser) {
            return false;
        }
        self.dialog = Some(UserDialog::Create {
            name: String::new(),
            pass: String::new(),
        });
        true
    }

    pub fn open_rename(&mut self, target_id: Uuid) -> bool {
        let Some(me) = &self.user else { return false };
        let Some(target) = self.target(target_id) else {
            return false;
        };
        if !may(me, Action::MutateUser(target)) {
            return false;
        }
        let dialog = UserDialog::EditName {
            user_id: target.id,
            name: target.name.clone(),
        };
        self.dialog = Some(dialog);
        true
    }

    pub fn open_recolor(&mut self, target_id: Uuid) -> bool {
        let Some(me) = &self.user else { return false };
        let Some(target) = self.target(target_id) else {
            return false;
        };
        if !may(me, Action::MutateUser(target)) {
            return false;
        }
        let dialog = UserDialog::EditColor {
            user_id: target.id,
            color: target.color.clone(),
        };
        self.dialog = Some(dialog);
        true
    }

    pub fn open_delete(&mut self, target_id: Uuid) -> bool {
        let Some(me) = &self.user else { return false };
        let Some(target) = self.target(target_id) else {
            return false;
        };
        if !may(me, Action::DeleteUser(target)) {
            return false;
        }
        self.dialog = Some(UserDialog::Delete { user_id: target_id });
        true
    }

    /// Gates the "New password" link on each card.
    pub fn can_change_password(&self, target: &User) -> bool {
        self.user
            .as_ref()
            .is_some_and(|me| may(me, Action::ChangePassword(target)))
    }

    /// One REST call for the open dialog, then — success or not — re-fetch
    /// and close, reporting the outcome through a toast.
    pub async fn submit(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };

        match dialog {
            UserDialog::Create { name, pass } => {
                match self.client.create_user(&name, &pass).await {
                    Ok(()) => self.toaster.push("User successfully created!"),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
                self.refetch_users().await;
            }
            UserDialog::EditName { user_id, name } => {
                let patch = UserPatch {
                    name: Some(name),
                    ..Default::default()
                };
                match self.client.patch_user(user_id, &patch).await {
                    Ok(()) => self.toaster.push("Username changed successfully!"),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
                self.refetch_all().await;
            }
            UserDialog::EditColor { user_id, color } => {
                let patch = UserPatch {
                    color: Some(color),
                    ..Default::default()
                };
                match self.client.patch_user(user_id, &patch).await {
                    Ok(()) => self.toaster.push("Colour changed successfully!"),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
                self.refetch_all().await;
            }
            UserDialog::Delete { user_id } => {
                match self.client.delete_user(user_id).await {
                    Ok(()) => self.toaster.push("User deleted."),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
                self.refetch_users().await;
            }
        }
    }

    async fn refetch_users(&mut self) {
        match self.client.fetch_users().await {
            Ok(list) => {
                self.fetch_stat = Some(FetchStat { status: 200 });
                self.users = list;
            }
            Err(e) => {
                self.fetch_stat = Some(fetch_stat_of(&e));
                self.users = Vec::new();
            }
        }
    }

    /// Edits may have touched the signed-in user; refresh both slots.
    async fn refetch_all(&mut self) {
        self.refetch_users().await;
        if let Ok(me) = self.client.fetch_self().await {
            self.user = Some(me);
        }
    }
}
