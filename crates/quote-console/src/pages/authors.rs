use uuid::Uuid;

use quote_types::api::AuthorPatch;
use quote_types::models::{ExtendedAuthor, User};
use quote_types::perms::{Action, may};

use crate::api::ApiClient;
use crate::notice::{GENERIC_FAILURE, Toaster};

/// The authors management page: extended author cards plus the shared
/// create/rename/recodename/delete dialog.
pub struct AuthorsPage {
    client: ApiClient,
    pub toaster: Toaster,
    user: Option<User>,
    authors: Option<Vec<ExtendedAuthor>>,
    dialog: Option<AuthorDialog>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorDialog {
    New { name: String, obfname: String },
    Rename { author_id: Uuid, name: String },
    Recodename { author_id: Uuid, obfname: String },
    Delete { author_id: Uuid },
}

impl AuthorsPage {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            toaster: Toaster::default(),
            user: None,
            authors: None,
            dialog: None,
        }
    }

    pub async fn load(&mut self) {
        let (user, authors) = tokio::join!(
            self.client.fetch_self(),
            self.client.fetch_authors_extended()
        );
        self.user = user.ok();
        self.authors = authors.ok();
    }

    /// Without an identity the page shows the locked-out message.
    pub fn locked_out(&self) -> bool {
        self.user.is_none()
    }

    pub fn lockout_message(&self) -> Option<&'static str> {
        self.locked_out().then_some(crate::LOCKED_OUT_MESSAGE)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn authors(&self) -> &[ExtendedAuthor] {
        self.authors.as_deref().unwrap_or_default()
    }

    pub fn dialog(&self) -> Option<&AuthorDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut AuthorDialog> {
        self.dialog.as_mut()
    }

    fn author(&self, id: Uuid) -> Option<&ExtendedAuthor> {
        self.authors
            .as_deref()
            .and_then(|list| list.iter().find(|a| a.id == id))
    }

    fn gate(&self, action: Action<'_>) -> bool {
        self.user.as_ref().is_some_and(|me| may(me, action))
    }

    // -- Gated dialog openers --

    pub fn open_new(&mut self) -> bool {
        if !self.gate(Action::CreateAuthor) {
            return false;
        }
        self.dialog = Some(AuthorDialog::New {
            name: String::new(),
            obfname: String::new(),
        });
        true
    }

    pub fn open_rename(&mut self, author_id: Uuid) -> bool {
        if !self.gate(Action::RenameAuthor) {
            return false;
        }
        let Some(author) = self.author(author_id) else {
            return false;
        };
        let dialog = AuthorDialog::Rename {
            author_id,
            name: author.name.clone(),
        };
        self.dialog = Some(dialog);
        true
    }

    pub fn open_recodename(&mut self, author_id: Uuid) -> bool {
        if !self.gate(Action::RenameAuthor) {
            return false;
        }
        let Some(author) = self.author(author_id) else {
            return false;
        };
        let dialog = AuthorDialog::Recodename {
            author_id,
            obfname: author.obfname.clone(),
        };
        self.dialog = Some(dialog);
        true
    }

    pub fn open_delete(&mut self, author_id: Uuid) -> bool {
        if !self.gate(Action::DeleteAuthor) {
            return false;
        }
        self.dialog = Some(AuthorDialog::Delete { author_id });
        true
    }

    /// One REST call, then an unconditional collection re-fetch and close.
    pub async fn submit(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };

        match dialog {
            AuthorDialog::New { name, obfname } => {
                match self.client.create_author(&name, &obfname).await {
                    Ok(()) => self.toaster.push("Author added successfully!"),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
            }
            AuthorDialog::Rename { author_id, name } => {
                let patch = AuthorPatch {
                    name: Some(name),
                    obfname: None,
                };
                match self.client.patch_author(author_id, &patch).await {
                    Ok(()) => self.toaster.push("Author updated."),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
            }
            AuthorDialog::Recodename { author_id, obfname } => {
                let patch = AuthorPatch {
                    name: None,
                    obfname: Some(obfname),
                };
                match self.client.patch_author(author_id, &patch).await {
                    Ok(()) => self.toaster.push("Author updated."),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
            }
            AuthorDialog::Delete { author_id } => {
                match self.client.delete_author(author_id).await {
                    Ok(()) => self.toaster.push("Author deleted."),
                    Err(_) => self.toaster.push(GENERIC_FAILURE),
                }
            }
        }

        self.refetch_authors().await;
    }

    async fn refetch_authors(&mut self) {
        self.authors = self.client.fetch_authors_extended().await.ok();
    }
}
