//! Given steps for conversation synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use colloquy::chat::domain::UserId;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a direct conversation between "{first}" and "{second}""#)]
fn direct_conversation(
    world: &mut SyncWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let conversation = run_async(
        world
            .directory
            .open_direct(&UserId::new(first), &UserId::new(second)),
    )
    .wrap_err("open direct conversation")?;
    world.conversation = Some(conversation);
    Ok(())
}

#[given(r#""{viewer}" is subscribed to the conversation"#)]
fn subscribed(world: &mut SyncWorld, viewer: String) -> Result<(), eyre::Report> {
    let conversation_id = world.conversation()?.id();
    let subscription = run_async(
        world
            .synchronizer
            .subscribe_channel(conversation_id, &UserId::new(viewer)),
    )
    .wrap_err("subscribe to conversation")?;
    world.subscription = Some(subscription);
    run_async(world.snapshot_with(0)).wrap_err("receive initial snapshot")?;
    Ok(())
}
