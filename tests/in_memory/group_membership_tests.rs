//! Group administration flows over the in-memory conversation store.

use crate::in_memory::helpers::{ChatHarness, alice, bob, carol, harness};
use colloquy::chat::{
    domain::{ConversationError, LeaveOutcome, MemberRole, UserId},
    error::MembershipError,
    services::SubmitRequest,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn promoted_admin_grows_the_group(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
    carol: UserId,
) -> eyre::Result<()> {
    let crew = harness
        .directory
        .create_group(&alice, "Crew", [bob.clone()])
        .await?;
    harness.membership.promote_admin(crew.id(), &alice, &bob).await?;
    harness.membership.add_member(crew.id(), &bob, &carol).await?;

    harness
        .submission
        .submit(SubmitRequest::new(crew.id(), carol.clone()).with_body("thanks for the invite"))
        .await?;

    let stored = harness.directory.find(crew.id()).await?;
    assert_eq!(stored.role_of(&carol), Some(MemberRole::Member));
    assert_eq!(stored.last_message(), Some("thanks for the invite"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plain_member_cannot_promote(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
    carol: UserId,
) -> eyre::Result<()> {
    let crew = harness
        .directory
        .create_group(&alice, "Crew", [bob.clone(), carol.clone()])
        .await?;

    let result = harness.membership.promote_admin(crew.id(), &bob, &carol).await;
    assert!(matches!(
        result,
        Err(MembershipError::Domain(ConversationError::PermissionDenied { .. }))
    ));
    assert_eq!(harness.directory.find(crew.id()).await?, crew);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn super_admin_hands_over_before_leaving(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
    carol: UserId,
) -> eyre::Result<()> {
    let crew = harness
        .directory
        .create_group(&alice, "Crew", [bob.clone(), carol.clone()])
        .await?;

    let refused = harness.membership.leave_group(crew.id(), &alice, None).await;
    assert!(matches!(
        refused,
        Err(MembershipError::Domain(ConversationError::NoSuccessorSelected))
    ));

    let outcome = harness
        .membership
        .leave_group(crew.id(), &alice, Some(&carol))
        .await?;
    assert_eq!(outcome, LeaveOutcome::Left);

    let stored = harness.directory.find(crew.id()).await?;
    assert_eq!(stored.role_of(&carol), Some(MemberRole::SuperAdmin));
    assert_eq!(stored.role_of(&bob), Some(MemberRole::Member));
    assert!(!stored.is_participant(&alice));
    assert!(harness.directory.list_for(&alice).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn group_disappears_when_everyone_leaves(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
) -> eyre::Result<()> {
    let crew = harness
        .directory
        .create_group(&alice, "Crew", [bob.clone()])
        .await?;

    assert_eq!(
        harness.membership.leave_group(crew.id(), &bob, None).await?,
        LeaveOutcome::Left
    );
    assert_eq!(
        harness.membership.leave_group(crew.id(), &alice, None).await?,
        LeaveOutcome::Emptied
    );
    assert!(harness.conversations.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn direct_conversations_have_no_roles(
    harness: ChatHarness,
    alice: UserId,
    bob: UserId,
) -> eyre::Result<()> {
    let chat = harness.directory.open_direct(&alice, &bob).await?;

    let result = harness.membership.promote_admin(chat.id(), &alice, &bob).await;
    assert!(matches!(
        result,
        Err(MembershipError::Domain(ConversationError::NotAGroup))
    ));
    assert_eq!(chat.role_of(&alice), None);
    Ok(())
}
