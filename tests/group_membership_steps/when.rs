//! When steps for group membership BDD scenarios.

use super::world::{MembershipWorld, run_async};
use colloquy::chat::{domain::UserId, services::MembershipResult};
use rstest_bdd_macros::when;

fn record<T>(world: &mut MembershipWorld, result: MembershipResult<T>) {
    world.last_change = Some(result.map(|_| ()));
}

#[when(r#""{actor}" promotes "{target}""#)]
fn promotes(
    world: &mut MembershipWorld,
    actor: String,
    target: String,
) -> Result<(), eyre::Report> {
    let group_id = world.group()?.id();
    let result = run_async(world.membership.promote_admin(
        group_id,
        &UserId::new(actor),
        &UserId::new(target),
    ));
    record(world, result);
    Ok(())
}

#[when(r#""{actor}" removes "{target}""#)]
fn removes(
    world: &mut MembershipWorld,
    actor: String,
    target: String,
) -> Result<(), eyre::Report> {
    let group_id = world.group()?.id();
    let result = run_async(world.membership.remove_member(
        group_id,
        &UserId::new(actor),
        &UserId::new(target),
    ));
    record(world, result);
    Ok(())
}

#[when(r#""{user}" leaves the group"#)]
fn leaves(world: &mut MembershipWorld, user: String) -> Result<(), eyre::Report> {
    let group_id = world.group()?.id();
    let result = run_async(
        world
            .membership
            .leave_group(group_id, &UserId::new(user), None),
    );
    world.last_leave = result.as_ref().ok().copied();
    record(world, result);
    Ok(())
}

#[when(r#""{user}" leaves the group naming "{successor}" as successor"#)]
fn leaves_naming_successor(
    world: &mut MembershipWorld,
    user: String,
    successor: String,
) -> Result<(), eyre::Report> {
    let group_id = world.group()?.id();
    let heir = UserId::new(successor);
    let result = run_async(
        world
            .membership
            .leave_group(group_id, &UserId::new(user), Some(&heir)),
    );
    world.last_leave = result.as_ref().ok().copied();
    record(world, result);
    Ok(())
}
