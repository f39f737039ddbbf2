use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Author, User};
use crate::perms::Permission;

/// One audit-log row. `actor` performed `action` upon `subject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    /// Unix seconds.
    pub timestamp: i64,
    pub actor: Uuid,
    pub subject: Uuid,
    pub action: LogAction,
}

/// Tagged action payload. Serde's external tagging gives the wire shape
/// the dashboard expects: unit variants become a plain string, payload
/// variants a single-key map of action-type to details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogAction {
    UserCreatedBySystem(User),
    UserCreated(User),
    UserDeleted(User),
    UserPasswordUpdated,
    UserNameUpdated {
        old_name: String,
        new_name: String,
    },
    UserColorUpdated {
        old_color: String,
        new_color: String,
    },
    UserPictureUpdated {
        old_picture: String,
        new_picture: String,
    },
    UserPermissionsUpdated {
        old_perms: Vec<Permission>,
        new_perms: Vec<Permission>,
    },
    AuthorCreated(Author),
    AuthorUpdated {
        old_name: String,
        new_name: String,
        old_obfname: String,
        new_obfname: String,
    },
    AuthorDeleted(Author),
}

impl LogAction {
    /// The action-type label: the string itself for unit variants, the
    /// single map key otherwise.
    pub fn label(&self) -> &'static str {
        use LogAction::*;
        match self {
            UserCreatedBySystem(_) => "UserCreatedBySystem",
            UserCreated(_) => "UserCreated",
            UserDeleted(_) => "UserDeleted",
            UserPasswordUpdated => "UserPasswordUpdated",
            UserNameUpdated { .. } => "UserNameUpdated",
            UserColorUpdated { .. } => "UserColorUpdated",
            UserPictureUpdated { .. } => "UserPictureUpdated",
            UserPermissionsUpdated { .. } => "UserPermissionsUpdated",
            AuthorCreated(_) => "AuthorCreated",
            AuthorUpdated { .. } => "AuthorUpdated",
            AuthorDeleted(_) => "AuthorDeleted",
        }
    }

    /// Details half of the single-key map, `None` for unit variants.
    pub fn details(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().next().map(|(_, v)| v),
            _ => None,
        }
    }
}
