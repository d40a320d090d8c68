//! End-to-end conversation flows over the in-memory stores.
//!
//! Each test drives the public services together: a conversation is opened,
//! messages are submitted, and a live subscription observes the result.

use crate::in_memory::helpers::{ChatHarness, alice, bob, carol, harness, next_snapshot};
use colloquy::attachment::{
    adapters::memory::InMemoryAttachmentStore,
    ports::{AttachmentStore, UploadRequest},
};
use colloquy::chat::{
    adapters::memory::ServerTimestampMode,
    domain::{DeliveryStatus, Message, MessageId, UserId},
    error::{SubmitError, SyncError},
    services::SubmitRequest,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn text_and_photo_arrive_in_order(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
) -> eyre::Result<()> {
    let chat = harness.directory.open_direct(&alice, &bob).await?;
    let (_handle, mut updates) = harness
        .synchronizer
        .subscribe_channel(chat.id(), &bob)
        .await?;
    assert!(next_snapshot(&mut updates).await?.is_empty());

    let uploads = InMemoryAttachmentStore::new();
    let photo = uploads
        .upload(
            UploadRequest::new("beach.png", "image/png", vec![1, 2, 3]).with_dimensions(64, 48),
        )
        .await?;

    let m1 = harness
        .submission
        .submit(SubmitRequest::new(chat.id(), alice.clone()).with_body("hi"))
        .await?;
    assert_eq!(next_snapshot(&mut updates).await?.ids(), vec![m1.id()]);

    let m2 = harness
        .submission
        .submit(SubmitRequest::new(chat.id(), bob.clone()).with_attachment(photo))
        .await?;
    let snapshot = next_snapshot(&mut updates).await?;
    assert_eq!(snapshot.ids(), vec![m1.id(), m2.id()]);

    let listed = harness.directory.list_for(&alice).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed.first().and_then(|c| c.last_message()),
        Some("Photo")
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn late_subscriber_sees_full_history(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
    carol: UserId,
) -> eyre::Result<()> {
    let crew = harness
        .directory
        .create_group(&alice, "Crew", [bob.clone(), carol.clone()])
        .await?;
    let mut sent = Vec::new();
    for (sender, body) in [(&alice, "one"), (&bob, "two"), (&carol, "three")] {
        let message = harness
            .submission
            .submit(SubmitRequest::new(crew.id(), sender.clone()).with_body(body))
            .await?;
        sent.push(message.id());
    }

    let (_handle, mut updates) = harness
        .synchronizer
        .subscribe_channel(crew.id(), &carol)
        .await?;
    assert_eq!(next_snapshot(&mut updates).await?.ids(), sent);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removed_member_can_no_longer_send_or_subscribe(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
) -> eyre::Result<()> {
    let crew = harness
        .directory
        .create_group(&alice, "Crew", [bob.clone()])
        .await?;
    harness.membership.remove_member(crew.id(), &alice, &bob).await?;

    let send = harness
        .submission
        .submit(SubmitRequest::new(crew.id(), bob.clone()).with_body("still here?"))
        .await;
    assert!(matches!(send, Err(SubmitError::NotAParticipant { .. })));

    let subscribe = harness.synchronizer.subscribe_channel(crew.id(), &bob).await;
    assert!(matches!(subscribe, Err(SyncError::PermissionDenied { .. })));
    assert!(harness.messages.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn read_receipts_flow_through_the_subscription(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
) -> eyre::Result<()> {
    let chat = harness.directory.open_direct(&alice, &bob).await?;
    let (_handle, mut updates) = harness
        .synchronizer
        .subscribe_channel(chat.id(), &alice)
        .await?;
    next_snapshot(&mut updates).await?;

    let sent = harness
        .submission
        .submit(SubmitRequest::new(chat.id(), alice.clone()).with_body("seen?"))
        .await?;
    let unread = next_snapshot(&mut updates).await?;
    assert_eq!(
        harness.interaction.delivery_status(sent.id()).await?,
        DeliveryStatus::Sent
    );

    harness.presence.set_online(&bob, true);
    assert_eq!(
        harness.interaction.delivery_status(sent.id()).await?,
        DeliveryStatus::Delivered
    );

    assert_eq!(harness.interaction.mark_all_read(&unread, &bob).await?, 1);
    let read = next_snapshot(&mut updates).await?;
    assert!(
        read.get(sent.id())
            .is_some_and(|message| message.is_read_by(&bob))
    );
    assert_eq!(
        harness.interaction.delivery_status(sent.id()).await?,
        DeliveryStatus::Read
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deferred_server_time_settles_in_the_view(
    alice: UserId,
    bob: UserId,
) -> eyre::Result<()> {
    let harness = ChatHarness::with_mode(ServerTimestampMode::Deferred);
    let chat = harness.directory.open_direct(&alice, &bob).await?;
    let (_handle, mut updates) = harness
        .synchronizer
        .subscribe_channel(chat.id(), &bob)
        .await?;
    next_snapshot(&mut updates).await?;

    let sent = harness
        .submission
        .submit(SubmitRequest::new(chat.id(), alice.clone()).with_body("hello"))
        .await?;
    assert!(sent.is_pending());
    assert_eq!(next_snapshot(&mut updates).await?.pending_count(), 1);

    harness.messages.resolve_pending_timestamps()?;
    let settled = next_snapshot(&mut updates).await?;
    assert_eq!(settled.pending_count(), 0);
    assert_eq!(settled.ids(), vec![sent.id()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deferred_batch_settles_in_send_order(alice: UserId, bob: UserId) -> eyre::Result<()> {
    let harness = ChatHarness::with_mode(ServerTimestampMode::Deferred);
    let chat = harness.directory.open_direct(&alice, &bob).await?;
    let (_handle, mut updates) = harness
        .synchronizer
        .subscribe_channel(chat.id(), &bob)
        .await?;
    next_snapshot(&mut updates).await?;

    let mut sent = Vec::new();
    for body in ["one", "two", "three", "four", "five", "six"] {
        let message = harness
            .submission
            .submit(SubmitRequest::new(chat.id(), alice.clone()).with_body(body))
            .await?;
        sent.push(message.id());
        next_snapshot(&mut updates).await?;
    }

    assert_eq!(harness.messages.resolve_pending_timestamps()?, sent.len());
    let mut settled = next_snapshot(&mut updates).await?;
    while settled.pending_count() > 0 {
        settled = next_snapshot(&mut updates).await?;
    }
    assert_eq!(settled.ids(), sent);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mixed_feed_events_converge_on_live_ids_in_send_order(
    alice: UserId,
    bob: UserId,
) -> eyre::Result<()> {
    let harness = ChatHarness::with_mode(ServerTimestampMode::Deferred);
    let chat = harness.directory.open_direct(&alice, &bob).await?;
    let (_handle, mut updates) = harness
        .synchronizer
        .subscribe_channel(chat.id(), &bob)
        .await?;
    next_snapshot(&mut updates).await?;

    let mut sent: Vec<MessageId> = Vec::new();
    for body in ["a", "b", "c", "d", "e"] {
        let message = harness
            .submission
            .submit(SubmitRequest::new(chat.id(), alice.clone()).with_body(body))
            .await?;
        sent.push(message.id());
        next_snapshot(&mut updates).await?;
    }
    let &[first, second, doomed, ..] = sent.as_slice() else {
        return Err(eyre::eyre!("expected five messages"));
    };

    assert!(harness.messages.redeliver(second)?);
    harness.interaction.delete_message(doomed, &alice).await?;
    let after_delete = next_snapshot(&mut updates).await?;
    assert!(after_delete.get(doomed).is_none());
    assert_eq!(after_delete.len(), sent.len() - 1);

    harness.interaction.mark_read(first, &bob).await?;
    next_snapshot(&mut updates).await?;

    assert_eq!(harness.messages.resolve_pending_timestamps()?, sent.len() - 1);
    let mut settled = next_snapshot(&mut updates).await?;
    while settled.pending_count() > 0 {
        settled = next_snapshot(&mut updates).await?;
    }

    let expected: Vec<MessageId> = sent.iter().copied().filter(|id| *id != doomed).collect();
    assert_eq!(settled.ids(), expected);
    let keys: Vec<_> = settled.messages().iter().map(Message::ordering_key).collect();
    assert!(keys.is_sorted_by(|earlier, later| earlier < later));
    assert!(
        settled
            .get(first)
            .is_some_and(|message| message.is_read_by(&bob))
    );
    Ok(())
}
