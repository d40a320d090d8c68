//! Given steps for group membership BDD scenarios.

use super::world::{MembershipWorld, run_async};
use colloquy::chat::domain::UserId;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a group "{name}" created by "{creator}" with members "{first}" and "{second}""#)]
fn group_created(
    world: &mut MembershipWorld,
    name: String,
    creator: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let group = run_async(world.directory.create_group(
        &UserId::new(creator),
        &name,
        [UserId::new(first), UserId::new(second)],
    ))
    .wrap_err("create group")?;
    world.group = Some(group);
    Ok(())
}

#[given(r#""{actor}" has promoted "{target}""#)]
fn has_promoted(
    world: &mut MembershipWorld,
    actor: String,
    target: String,
) -> Result<(), eyre::Report> {
    let group_id = world.group()?.id();
    let updated = run_async(world.membership.promote_admin(
        group_id,
        &UserId::new(actor),
        &UserId::new(target),
    ))
    .wrap_err("promote in scenario setup")?;
    world.group = Some(updated);
    Ok(())
}
