use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::perms::Permission;

/// Fallback avatar color for users created without one.
pub const DEFAULT_COLOR: &str = "28166f";

/// A user as it travels over the wire. The password never leaves the
/// server; it lives only in the db row type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Hex color without the leading `#`.
    pub color: String,
    /// Picture URL; empty string when the user has none.
    pub picture: String,
    pub perms: Vec<Permission>,
}

impl User {
    pub fn has_permission(&self, perm: Permission) -> bool {
        Permission::check(perm, &self.perms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    /// Obfuscated codename, shown where the full name would identify.
    pub obfname: String,
}

/// Author with derived counts, as served by `GET /authors/extended`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtendedAuthor {
    pub id: Uuid,
    pub name: String,
    pub obfname: String,
    pub quotecount: i64,
    pub linecount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Visibility threshold; 0 is public.
    pub clearance: u8,
    pub likes: i64,
    pub timestamp: DateTime<Utc>,
    /// Ordered by position.
    pub lines: Vec<QuoteLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub id: Uuid,
    pub content: String,
    pub position: u8,
    pub author: LineAuthor,
}

/// The author reference a rendered line carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineAuthor {
    pub id: Uuid,
    pub name: String,
    pub obfname: String,
}
