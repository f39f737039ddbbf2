use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::perms::Permission;

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub name: String,
    pub pass: String,
}

/// Field edits for `PATCH /users/{id}`; only changed fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perms: Option<Vec<Permission>>,
}

impl UserPatch {
    pub fn all_none(&self) -> bool {
        self.name.is_none()
            && self.color.is_none()
            && self.picture.is_none()
            && self.perms.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub pass: String,
}

// -- Authors --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAuthorRequest {
    pub name: String,
    pub obfname: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfname: Option<String>,
}

impl AuthorPatch {
    pub fn all_none(&self) -> bool {
        self.name.is_none() && self.obfname.is_none()
    }
}

// -- Logs --

/// `?limit=&page=` query; page is 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: NonZeroU32,
    pub page: NonZeroU32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patches_serialize_changed_fields_only() {
        let patch = UserPatch {
            color: Some("a1b2c3".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "color": "a1b2c3" })
        );

        let patch = AuthorPatch {
            name: Some("Ada".into()),
            obfname: None,
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "name": "Ada" })
        );
    }

    #[test]
    fn empty_patch_is_detectable() {
        assert!(UserPatch::default().all_none());
        assert!(AuthorPatch::default().all_none());
        assert!(
            !UserPatch {
                name: Some("x".into()),
                ..Default::default()
            }
            .all_none()
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<UserPatch, _> = serde_json::from_str(r#"{"nickname":"q"}"#);
        assert!(res.is_err());
    }
}
