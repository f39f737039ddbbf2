use serde::{Deserialize, Serialize};

use crate::models::User;

/// Capability grants. `Everything` is the superset grant; every other
/// variant gates one family of actions. Stored in the db as a u32 bitmask
/// in declaration order, serialized on the wire as the variant name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Permission {
    Everything,
    MutateOwnUser,
    CreateUsers,
    DeleteUsers,
    MutateUsers,
    MutateUsersPermissions,
    MutateUsersPasswords,
    InspectLogs,
    CreateAuthors,
    ModifyAuthorsNames,
    DeleteAuthors,

    // OTHER ENTITLEMENTS
    DisplayFlower,
}

use Permission::*;

pub const PERMISSIONS: [Permission; 12] = [
    Everything,
    MutateOwnUser,
    CreateUsers,
    DeleteUsers,
    MutateUsers,
    MutateUsersPermissions,
    MutateUsersPasswords,
    InspectLogs,
    CreateAuthors,
    ModifyAuthorsNames,
    DeleteAuthors,
    DisplayFlower,
];

pub const DEFAULT_PERMISSIONS: [Permission; 1] = [MutateOwnUser];

impl Permission {
    /// A set passes a check when it holds the specific grant or `Everything`.
    pub fn check(checked: Permission, perms: &[Permission]) -> bool {
        perms.contains(&Everything) || perms.contains(&checked)
    }

    pub fn bit(self) -> u32 {
        match self {
            Everything => 1 << 0,
            MutateOwnUser => 1 << 1,
            CreateUsers => 1 << 2,
            DeleteUsers => 1 << 3,
            MutateUsers => 1 << 4,
            MutateUsersPermissions => 1 << 5,
            MutateUsersPasswords => 1 << 6,
            InspectLogs => 1 << 7,
            CreateAuthors => 1 << 8,
            ModifyAuthorsNames => 1 << 9,
            DeleteAuthors => 1 << 10,
            DisplayFlower => 1 << 11,
        }
    }

    pub fn from_bits(bits: u32) -> Vec<Permission> {
        PERMISSIONS
            .into_iter()
            .filter(|perm| bits & perm.bit() > 0)
            .collect()
    }

    pub fn to_bits(perms: &[Permission]) -> u32 {
        perms.iter().fold(0, |bits, perm| bits | perm.bit())
    }
}

/// An action a signed-in user may attempt from the dashboard. Targeted
/// variants carry the user the action would affect.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateUser,
    MutateUser(&'a User),
    MutatePermissions(&'a User),
    ChangePassword(&'a User),
    DeleteUser(&'a User),
    CreateAuthor,
    RenameAuthor,
    DeleteAuthor,
    InspectLogs,
}

/// The one authorization predicate every dashboard gate consults.
///
/// Advisory only: the server re-checks each mutation. Mirrors are kept
/// in sync by routing both sides through this function.
pub fn may(actor: &User, action: Action) -> bool {
    match action {
        Action::CreateUser => Permission::check(CreateUsers, &actor.perms),
        Action::MutateUser(target) => {
            actor.id == target.id && Permission::check(MutateOwnUser, &actor.perms)
                || Permission::check(MutateUsers, &actor.perms)
        }
        Action::MutatePermissions(target) => {
            actor.id != target.id && Permission::check(MutateUsersPermissions, &actor.perms)
        }
        // Three distinct grants admit a password change: editing yourself,
        // holding the blanket grant, or holding the password grant against
        // a target that does not itself hold Everything.
        Action::ChangePassword(target) => {
            actor.perms.contains(&Everything)
                || (actor.id == target.id && actor.perms.contains(&MutateOwnUser))
                || (actor.perms.contains(&MutateUsersPasswords)
                    && !target.perms.contains(&Everything))
        }
        Action::DeleteUser(target) => {
            actor.id != target.id && Permission::check(DeleteUsers, &actor.perms)
        }
        Action::CreateAuthor => Permission::check(CreateAuthors, &actor.perms),
        Action::RenameAuthor => Permission::check(ModifyAuthorsNames, &actor.perms),
        Action::DeleteAuthor => Permission::check(DeleteAuthors, &actor.perms),
        Action::InspectLogs => Permission::check(InspectLogs, &actor.perms),
    }
}
