//! Then steps for group membership BDD scenarios.

use super::world::{MembershipWorld, run_async};
use colloquy::chat::{
    domain::{ConversationError, MemberRole, UserId},
    error::MembershipError,
};
use eyre::WrapErr;
use rstest_bdd_macros::then;

fn refusal(world: &MembershipWorld) -> eyre::Result<&ConversationError> {
    let result = world
        .last_change
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing membership change result"))?;
    match result {
        Err(MembershipError::Domain(err)) => Ok(err),
        other => Err(eyre::eyre!("expected a refused change, got {other:?}")),
    }
}

#[then(r#""{user}" has the role "{role}""#)]
fn has_role(world: &MembershipWorld, user: String, role: String) -> Result<(), eyre::Report> {
    let expected = MemberRole::try_from(role.as_str())
        .map_err(|err| eyre::eyre!("invalid expected role in scenario: {err}"))?;
    let group_id = world.group()?.id();
    let stored = run_async(world.directory.find(group_id)).wrap_err("find group")?;
    let actual = stored.role_of(&UserId::new(user));
    if actual != Some(expected) {
        return Err(eyre::eyre!("expected role {expected}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#""{user}" is no longer a participant"#)]
fn no_longer_participant(world: &MembershipWorld, user: String) -> Result<(), eyre::Report> {
    let group_id = world.group()?.id();
    let stored = run_async(world.directory.find(group_id)).wrap_err("find group")?;
    if stored.is_participant(&UserId::new(user.as_str())) {
        return Err(eyre::eyre!("{user} is still a participant"));
    }
    Ok(())
}

#[then("the membership change is refused as not permitted")]
fn refused_not_permitted(world: &MembershipWorld) -> Result<(), eyre::Report> {
    let err = refusal(world)?;
    if !matches!(err, ConversationError::PermissionDenied { .. }) {
        return Err(eyre::eyre!("expected PermissionDenied, got {err:?}"));
    }
    Ok(())
}

#[then("the membership change is refused for lack of a successor")]
fn refused_without_successor(world: &MembershipWorld) -> Result<(), eyre::Report> {
    let err = refusal(world)?;
    if *err != ConversationError::NoSuccessorSelected {
        return Err(eyre::eyre!("expected NoSuccessorSelected, got {err:?}"));
    }
    if world.last_leave.is_some() {
        return Err(eyre::eyre!("leave unexpectedly succeeded"));
    }
    Ok(())
}

#[then("the membership change is refused as targeting the super-admin")]
fn refused_targeting_super_admin(world: &MembershipWorld) -> Result<(), eyre::Report> {
    let err = refusal(world)?;
    if *err != ConversationError::CannotTargetSuperAdmin {
        return Err(eyre::eyre!("expected CannotTargetSuperAdmin, got {err:?}"));
    }
    Ok(())
}
