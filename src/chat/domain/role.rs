//! Group member roles.

use super::ParseMemberRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a participant within a group conversation.
///
/// Exactly one participant is the super-admin. The super-admin is always
/// an admin as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// A regular participant.
    Member,
    /// A participant who may add and remove members.
    Admin,
    /// The single participant who may also promote and demote admins.
    SuperAdmin,
}

impl MemberRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Returns whether this role may promote members and demote admins.
    #[must_use]
    pub const fn can_manage_admins(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Returns whether this role may add or remove members.
    #[must_use]
    pub const fn can_manage_members(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = ParseMemberRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(ParseMemberRoleError(value.to_owned())),
        }
    }
}

/// Membership action checked against the acting participant's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipAction {
    /// Grant admin rights.
    Promote,
    /// Revoke admin rights.
    Demote,
    /// Add a participant.
    AddMember,
    /// Remove a participant.
    RemoveMember,
    /// Hand the super-admin role to another participant.
    TransferSuperAdmin,
}

impl MembershipAction {
    /// Returns a short description for error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Promote => "promote admin",
            Self::Demote => "demote admin",
            Self::AddMember => "add member",
            Self::RemoveMember => "remove member",
            Self::TransferSuperAdmin => "transfer super-admin",
        }
    }

    /// Returns whether `role` may perform this action.
    #[must_use]
    pub const fn permitted_for(self, role: MemberRole) -> bool {
        match self {
            Self::Promote | Self::Demote | Self::TransferSuperAdmin => role.can_manage_admins(),
            Self::AddMember | Self::RemoveMember => role.can_manage_members(),
        }
    }
}

impl fmt::Display for MembershipAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
