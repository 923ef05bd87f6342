use crate::model::cos::Grant;

pub const ACL_PUBLIC_READ: &str = "public-read";
pub const ACL_PRIVATE: &str = "private";

/// Grantee URI suffix identifying the "all users" group.
const ALL_USERS_URI: &str = "global/AllUsers";

/// Abstract per-object visibility. Exactly two states; COS ACLs beyond
/// public-read are not modeled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// The canned ACL token sent when replacing an object's ACL.
    pub fn as_acl(&self) -> &'static str {
        match self {
            Visibility::Public => ACL_PUBLIC_READ,
            Visibility::Private => ACL_PRIVATE,
        }
    }

    /// Derives visibility from the grants of a get-object-acl response. A
    /// READ grant for the all-users group means public; anything else,
    /// including no grants at all, means private.
    pub fn from_grants(grants: &[Grant]) -> Visibility {
        for grant in grants {
            let is_all_users = grant
                .grantee_uri
                .as_deref()
                .is_some_and(|uri| uri.contains(ALL_USERS_URI));

            if is_all_users && grant.permission == "READ" {
                return Visibility::Public;
            }
        }

        Visibility::Private
    }
}
