//! When steps for conversation synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use colloquy::attachment::domain::{AttachmentDescriptor, AttachmentKind};
use colloquy::chat::{domain::UserId, services::SubmitRequest};
use eyre::WrapErr;
use rstest_bdd_macros::when;

fn submit(world: &mut SyncWorld, request: SubmitRequest) {
    match run_async(world.submission.submit(request)) {
        Ok(message) => world.sent.push(message),
        Err(err) => world.last_submit_error = Some(err),
    }
}

#[when(r#""{sender}" sends "{body}""#)]
fn sends_text(world: &mut SyncWorld, sender: String, body: String) -> Result<(), eyre::Report> {
    let conversation_id = world.conversation()?.id();
    submit(
        world,
        SubmitRequest::new(conversation_id, UserId::new(sender)).with_body(body),
    );
    Ok(())
}

#[when(r#""{sender}" sends a photo"#)]
fn sends_photo(world: &mut SyncWorld, sender: String) -> Result<(), eyre::Report> {
    let conversation_id = world.conversation()?.id();
    let photo = AttachmentDescriptor::new(
        AttachmentKind::Image,
        "memory://attachments/scenario/photo.jpg",
        "image/jpeg",
        4096,
    )
    .with_dimensions(800, 600);
    submit(
        world,
        SubmitRequest::new(conversation_id, UserId::new(sender)).with_attachment(photo),
    );
    Ok(())
}

#[when(r#""{sender}" sends a blank message"#)]
fn sends_blank(world: &mut SyncWorld, sender: String) -> Result<(), eyre::Report> {
    let conversation_id = world.conversation()?.id();
    submit(
        world,
        SubmitRequest::new(conversation_id, UserId::new(sender)).with_body("   "),
    );
    Ok(())
}

#[when(r#""{viewer}" subscribes to the conversation"#)]
fn subscribes(world: &mut SyncWorld, viewer: String) -> Result<(), eyre::Report> {
    let conversation_id = world.conversation()?.id();
    let result = run_async(
        world
            .synchronizer
            .subscribe_channel(conversation_id, &UserId::new(viewer)),
    );
    match result {
        Ok(subscription) => {
            world.subscription = Some(subscription);
            world.subscribe_result = Some(Ok(()));
        }
        Err(err) => world.subscribe_result = Some(Err(err)),
    }
    Ok(())
}

#[when("the store connection drops")]
fn connection_drops(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    world.messages.disconnect().wrap_err("disconnect message store")?;
    Ok(())
}

#[when("the store connection returns")]
fn connection_returns(world: &mut SyncWorld) -> Result<(), eyre::Report> {
    world.messages.reconnect().wrap_err("reconnect message store")?;
    Ok(())
}
