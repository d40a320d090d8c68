//! Conversation aggregate root and group membership rules.

use super::{ConversationError, ConversationId, MemberRole, MembershipAction, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Whether a conversation is one-to-one or a named group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationKind {
    /// A one-to-one conversation between exactly two participants.
    Direct,
    /// A named group conversation.
    Group {
        /// Display name of the group.
        name: String,
    },
}

/// Display metadata for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    /// Name shown next to the participant's messages.
    pub display_name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl ParticipantProfile {
    /// Creates a profile with a display name and no photo.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            photo_url: None,
        }
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }
}

/// Administrative roles of a group.
///
/// # Invariants
///
/// - `super_admin` is always contained in `admins`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRoles {
    super_admin: UserId,
    admins: BTreeSet<UserId>,
}

impl GroupRoles {
    fn founded_by(creator: &UserId) -> Self {
        Self {
            super_admin: creator.clone(),
            admins: BTreeSet::from([creator.clone()]),
        }
    }

    /// Returns the super-admin.
    #[must_use]
    pub const fn super_admin(&self) -> &UserId {
        &self.super_admin
    }

    /// Returns every admin, including the super-admin.
    #[must_use]
    pub const fn admins(&self) -> &BTreeSet<UserId> {
        &self.admins
    }
}

/// Denormalised last-message summary shown in conversation lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPreview {
    /// Short text derived from the body or the attachment kind.
    pub text: String,
    /// Effective timestamp of the previewed message.
    pub at: DateTime<Utc>,
}

/// Result of a participant leaving a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The participant left and others remain.
    Left,
    /// The last participant left; the group should be deleted.
    Emptied,
}

/// A conversation between participants.
///
/// # Invariants
///
/// - the participant set is never empty
/// - a direct conversation has exactly two participants and no roles
/// - a group's super-admin is an admin and a participant
/// - every admin is a participant
///
/// # Examples
///
/// ```
/// use colloquy::chat::domain::{Conversation, MemberRole, UserId};
/// use mockable::DefaultClock;
///
/// let owner = UserId::new("u1");
/// let group = Conversation::group(&owner, "Climbing", [UserId::new("u2")], &DefaultClock)
///     .expect("valid group");
///
/// assert_eq!(group.role_of(&owner), Some(MemberRole::SuperAdmin));
/// assert_eq!(group.role_of(&UserId::new("u2")), Some(MemberRole::Member));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: ConversationId,
    kind: ConversationKind,
    participants: BTreeSet<UserId>,
    created_by: UserId,
    #[serde(default)]
    profiles: BTreeMap<UserId, ParticipantProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roles: Option<GroupRoles>,
    #[serde(default)]
    last_message: Option<String>,
    #[serde(default)]
    last_message_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates a direct conversation between two distinct users.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::InvalidDirectParticipants`] when both
    /// users are the same.
    pub fn direct(
        creator: &UserId,
        peer: &UserId,
        clock: &impl Clock,
    ) -> Result<Self, ConversationError> {
        if creator == peer {
            return Err(ConversationError::InvalidDirectParticipants);
        }
        Ok(Self {
            id: ConversationId::new(),
            kind: ConversationKind::Direct,
            participants: BTreeSet::from([creator.clone(), peer.clone()]),
            created_by: creator.clone(),
            profiles: BTreeMap::new(),
            roles: None,
            last_message: None,
            last_message_at: None,
            created_at: clock.utc(),
        })
    }

    /// Creates a group with `creator` as super-admin.
    ///
    /// Duplicate members, and the creator listed as a member, are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::EmptyGroupName`] when `name` is blank.
    pub fn group(
        creator: &UserId,
        name: impl Into<String>,
        members: impl IntoIterator<Item = UserId>,
        clock: &impl Clock,
    ) -> Result<Self, ConversationError> {
        let group_name = name.into().trim().to_owned();
        if group_name.is_empty() {
            return Err(ConversationError::EmptyGroupName);
        }
        let mut participants: BTreeSet<UserId> = members.into_iter().collect();
        participants.insert(creator.clone());

        Ok(Self {
            id: ConversationId::new(),
            kind: ConversationKind::Group { name: group_name },
            participants,
            created_by: creator.clone(),
            profiles: BTreeMap::new(),
            roles: Some(GroupRoles::founded_by(creator)),
            last_message: None,
            last_message_at: None,
            created_at: clock.utc(),
        })
    }

    /// Returns the conversation identifier.
    #[must_use]
    pub const fn id(&self) -> ConversationId {
        self.id
    }

    /// Returns the conversation kind.
    #[must_use]
    pub const fn kind(&self) -> &ConversationKind {
        &self.kind
    }

    /// Returns `true` for group conversations.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, ConversationKind::Group { .. })
    }

    /// Returns the group name, if this is a group.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ConversationKind::Group { name } => Some(name),
            ConversationKind::Direct => None,
        }
    }

    /// Returns the participants.
    #[must_use]
    pub const fn participants(&self) -> &BTreeSet<UserId> {
        &self.participants
    }

    /// Returns the user who created the conversation.
    #[must_use]
    pub const fn created_by(&self) -> &UserId {
        &self.created_by
    }

    /// Returns `true` if `user` is a participant.
    #[must_use]
    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    /// Returns the group roles, if this is a group.
    #[must_use]
    pub const fn roles(&self) -> Option<&GroupRoles> {
        self.roles.as_ref()
    }

    /// Returns the per-participant display metadata.
    #[must_use]
    pub const fn profiles(&self) -> &BTreeMap<UserId, ParticipantProfile> {
        &self.profiles
    }

    /// Returns the last message preview text.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Returns the last message timestamp.
    #[must_use]
    pub const fn last_message_at(&self) -> Option<DateTime<Utc>> {
        self.last_message_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the time of the latest activity, used to order lists.
    #[must_use]
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(self.created_at)
    }

    /// Returns the role of `user`, or `None` if they are not a participant.
    ///
    /// Participants of direct conversations are plain members.
    #[must_use]
    pub fn role_of(&self, user: &UserId) -> Option<MemberRole> {
        if !self.is_participant(user) {
            return None;
        }
        let role = match &self.roles {
            Some(roles) if roles.super_admin == *user => MemberRole::SuperAdmin,
            Some(roles) if roles.admins.contains(user) => MemberRole::Admin,
            _ => MemberRole::Member,
        };
        Some(role)
    }

    /// Fails unless `user` is a participant.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::NotAParticipant`].
    pub fn require_participant(&self, user: &UserId) -> Result<(), ConversationError> {
        if self.is_participant(user) {
            Ok(())
        } else {
            Err(ConversationError::NotAParticipant(user.clone()))
        }
    }

    /// Returns the denormalised last-message fields, if a message was sent.
    #[must_use]
    pub fn preview(&self) -> Option<ConversationPreview> {
        match (&self.last_message, self.last_message_at) {
            (Some(text), Some(at)) => Some(ConversationPreview {
                text: text.clone(),
                at,
            }),
            _ => None,
        }
    }

    /// Replaces the denormalised last-message fields.
    pub fn set_preview(&mut self, preview: ConversationPreview) {
        self.last_message = Some(preview.text);
        self.last_message_at = Some(preview.at);
    }

    /// Sets the display metadata for a participant.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::NotAParticipant`] for outsiders.
    pub fn set_profile(
        &mut self,
        user: &UserId,
        profile: ParticipantProfile,
    ) -> Result<(), ConversationError> {
        self.require_participant(user)?;
        self.profiles.insert(user.clone(), profile);
        Ok(())
    }

    /// Grants admin rights to `target`. Only the super-admin may do this.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError`] when the actor lacks permission, the
    /// target is not a participant, or the target is already an admin.
    pub fn promote(&mut self, actor: &UserId, target: &UserId) -> Result<(), ConversationError> {
        self.authorize(actor, MembershipAction::Promote)?;
        self.require_participant(target)?;
        let roles = self.roles_mut()?;
        if !roles.admins.insert(target.clone()) {
            return Err(ConversationError::AlreadyAdmin(target.clone()));
        }
        Ok(())
    }

    /// Revokes admin rights from `target`. Only the super-admin may do this.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError`] when the actor lacks permission, the
    /// target is the super-admin, or the target is not an admin.
    pub fn demote(&mut self, actor: &UserId, target: &UserId) -> Result<(), ConversationError> {
        self.authorize(actor, MembershipAction::Demote)?;
        let roles = self.roles_mut()?;
        if roles.super_admin == *target {
            return Err(ConversationError::CannotTargetSuperAdmin);
        }
        if !roles.admins.remove(target) {
            return Err(ConversationError::NotAnAdmin(target.clone()));
        }
        Ok(())
    }

    /// Adds `target` to the group. Any admin may do this.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError`] when the actor lacks permission or the
    /// target is already a participant.
    pub fn add_member(&mut self, actor: &UserId, target: &UserId) -> Result<(), ConversationError> {
        self.authorize(actor, MembershipAction::AddMember)?;
        if !self.participants.insert(target.clone()) {
            return Err(ConversationError::AlreadyParticipant(target.clone()));
        }
        Ok(())
    }

    /// Removes `target` from the group. Any admin may do this, but never to
    /// the super-admin.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError`] when the actor lacks permission, the
    /// target is the super-admin, or the target is not a participant.
    pub fn remove_member(
        &mut self,
        actor: &UserId,
        target: &UserId,
    ) -> Result<(), ConversationError> {
        self.authorize(actor, MembershipAction::RemoveMember)?;
        let roles = self.roles_mut()?;
        if roles.super_admin == *target {
            return Err(ConversationError::CannotTargetSuperAdmin);
        }
        self.require_participant(target)?;
        self.expel(target);
        Ok(())
    }

    /// Hands the super-admin role to `successor`, who also becomes an admin.
    /// The previous super-admin keeps admin rights.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError`] when the actor is not the super-admin or
    /// the successor is not another participant.
    pub fn transfer_super_admin(
        &mut self,
        actor: &UserId,
        successor: &UserId,
    ) -> Result<(), ConversationError> {
        self.authorize(actor, MembershipAction::TransferSuperAdmin)?;
        if successor == actor || !self.is_participant(successor) {
            return Err(ConversationError::InvalidSuccessor(successor.clone()));
        }
        let roles = self.roles_mut()?;
        roles.admins.insert(successor.clone());
        roles.super_admin = successor.clone();
        Ok(())
    }

    /// Removes `user` from the group at their own request.
    ///
    /// A super-admin leaving while others remain must name a successor, who
    /// receives the role first. When the last participant leaves the group is
    /// left untouched and [`LeaveOutcome::Emptied`] tells the caller to
    /// delete it.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::NoSuccessorSelected`] when a super-admin
    /// leaves other members without a successor, and the errors of
    /// [`Self::transfer_super_admin`] for an unusable successor.
    pub fn leave(
        &mut self,
        user: &UserId,
        successor: Option<&UserId>,
    ) -> Result<LeaveOutcome, ConversationError> {
        if !self.is_group() {
            return Err(ConversationError::NotAGroup);
        }
        self.require_participant(user)?;
        if self.participants.len() == 1 {
            return Ok(LeaveOutcome::Emptied);
        }
        if self.role_of(user) == Some(MemberRole::SuperAdmin) {
            let next = successor.ok_or(ConversationError::NoSuccessorSelected)?;
            self.transfer_super_admin(user, next)?;
        }
        self.expel(user);
        Ok(LeaveOutcome::Left)
    }

    fn authorize(&self, actor: &UserId, action: MembershipAction) -> Result<(), ConversationError> {
        if !self.is_group() {
            return Err(ConversationError::NotAGroup);
        }
        let role = self
            .role_of(actor)
            .ok_or_else(|| ConversationError::NotAParticipant(actor.clone()))?;
        if action.permitted_for(role) {
            Ok(())
        } else {
            Err(ConversationError::PermissionDenied {
                actor: actor.clone(),
                action,
            })
        }
    }

    fn roles_mut(&mut self) -> Result<&mut GroupRoles, ConversationError> {
        self.roles.as_mut().ok_or(ConversationError::NotAGroup)
    }

    fn expel(&mut self, user: &UserId) {
        self.participants.remove(user);
        self.profiles.remove(user);
        if let Some(roles) = self.roles.as_mut() {
            roles.admins.remove(user);
        }
    }
}
