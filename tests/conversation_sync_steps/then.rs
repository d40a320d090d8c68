//! Then steps for conversation synchronisation BDD scenarios.

use super::world::{SyncWorld, run_async};
use colloquy::chat::{
    domain::{MessageContentError, MessageId},
    error::{SubmitError, SyncError},
};
use eyre::WrapErr;
use rstest_bdd_macros::then;

#[then("the subscriber sees {count:usize} messages in send order")]
fn sees_messages_in_order(world: &mut SyncWorld, count: usize) -> Result<(), eyre::Report> {
    let snapshot = run_async(world.snapshot_with(count)).wrap_err("await snapshot")?;
    let expected: Vec<MessageId> = world.sent.iter().map(|message| message.id()).collect();
    if snapshot.ids() != expected {
        return Err(eyre::eyre!(
            "expected order {expected:?}, found {:?}",
            snapshot.ids()
        ));
    }
    Ok(())
}

#[then(r#"the conversation preview is "{text}""#)]
fn preview_is(world: &SyncWorld, text: String) -> Result<(), eyre::Report> {
    let conversation_id = world.conversation()?.id();
    let stored = run_async(world.directory.find(conversation_id)).wrap_err("find conversation")?;
    if stored.last_message() != Some(text.as_str()) {
        return Err(eyre::eyre!(
            "expected preview {text:?}, found {:?}",
            stored.last_message()
        ));
    }
    Ok(())
}

#[then("the subscription is refused as not permitted")]
fn subscription_refused(world: &SyncWorld) -> Result<(), eyre::Report> {
    let result = world
        .subscribe_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing subscribe result"))?;
    if !matches!(result, Err(SyncError::PermissionDenied { .. })) {
        return Err(eyre::eyre!("expected PermissionDenied, got {result:?}"));
    }
    Ok(())
}

#[then("the submission fails as empty")]
fn submission_fails_as_empty(world: &SyncWorld) -> Result<(), eyre::Report> {
    let error = world
        .last_submit_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected a failed submission"))?;
    if !matches!(
        error,
        SubmitError::Validation(MessageContentError::EmptyMessage)
    ) {
        return Err(eyre::eyre!("expected EmptyMessage, got {error:?}"));
    }
    Ok(())
}

#[then("no message is stored")]
fn no_message_stored(world: &SyncWorld) -> Result<(), eyre::Report> {
    if !world.messages.is_empty() {
        return Err(eyre::eyre!(
            "expected an empty store, found {} messages",
            world.messages.len()
        ));
    }
    Ok(())
}

#[then("the subscriber was told of an interruption while showing {count:usize} message")]
fn told_of_interruption(world: &SyncWorld, count: usize) -> Result<(), eyre::Report> {
    let (error, last_good) = world
        .interruptions
        .first()
        .ok_or_else(|| eyre::eyre!("no interruption was reported"))?;
    if !matches!(error, SyncError::Transient(_)) {
        return Err(eyre::eyre!("expected a transient error, got {error:?}"));
    }
    if last_good.len() != count {
        return Err(eyre::eyre!(
            "expected {count} retained messages, found {}",
            last_good.len()
        ));
    }
    Ok(())
}
