//! Integration tests for the friendship lifecycle

use fitsocial::social::notify::NotificationKind;
use fitsocial::social::{FriendError, FriendshipStatus};
use fitsocial::storage::FriendshipStore;

use super::support::World;

/// Request, see it incoming, accept, both sides list each other.
#[tokio::test]
async fn test_request_accept_round_trip() {
    let world = World::new();
    let alice = world.user("Alice").await;
    let bob = world.user("Bob").await;

    let request = world.relationships.send_request(alice, bob).await.unwrap();
    assert_eq!(request.status, FriendshipStatus::Pending);

    let bob_pending = world.relationships.pending_requests(bob).await.unwrap();
    assert_eq!(bob_pending.incoming.len(), 1);
    assert!(bob_pending.outgoing.is_empty());
    assert_eq!(
        bob_pending.incoming[0]
            .profile
            .as_ref()
            .map(|p| p.display_name.as_str()),
        Some("Alice")
    );

    let alice_pending = world.relationships.pending_requests(alice).await.unwrap();
    assert_eq!(alice_pending.outgoing.len(), 1);
    assert!(alice_pending.incoming.is_empty());

    world.relationships.accept(request.id, bob).await.unwrap();

    let alice_friends = world.relationships.list_friends(alice).await.unwrap();
    let bob_friends = world.relationships.list_friends(bob).await.unwrap();
    assert_eq!(alice_friends.len(), 1);
    assert_eq!(bob_friends.len(), 1);
    assert_eq!(alice_friends[0].profile.id, bob);
    assert_eq!(bob_friends[0].profile.id, alice);

    // Exactly one accepted row, whichever side is asked.
    let accepted_as_requester = world
        .store
        .friendships_as_requester(alice, FriendshipStatus::Accepted)
        .await
        .unwrap();
    let accepted_as_recipient = world
        .store
        .friendships_as_recipient(alice, FriendshipStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted_as_requester.len() + accepted_as_recipient.len(), 1);

    assert_eq!(
        world
            .notifier
            .sent_to(bob, NotificationKind::FriendRequest)
            .len(),
        1
    );
    assert_eq!(
        world
            .notifier
            .sent_to(alice, NotificationKind::FriendAccepted)
            .len(),
        1
    );
}

/// A request in the other direction is refused while one is pending.
#[tokio::test]
async fn test_reverse_request_while_pending() {
    let world = World::new();
    let a = world.user("A").await;
    let b = world.user("B").await;

    world.relationships.send_request(a, b).await.unwrap();
    let err = world.relationships.send_request(b, a).await.unwrap_err();
    assert!(matches!(err, FriendError::RequestPending));
}

/// Decline, re-request and remove never create a second row for the pair.
#[tokio::test]
async fn test_single_row_through_history() {
    let world = World::new();
    let a = world.user("A").await;
    let b = world.user("B").await;

    let first = world.relationships.send_request(a, b).await.unwrap();
    world.relationships.decline(first.id, b).await.unwrap();

    // Reopened in the opposite direction on the same row.
    let second = world.relationships.send_request(b, a).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.requester_id, b);
    assert_eq!(second.status, FriendshipStatus::Pending);

    world.relationships.accept(second.id, a).await.unwrap();
    let err = world.relationships.send_request(a, b).await.unwrap_err();
    assert!(matches!(err, FriendError::AlreadyFriends));

    world.relationships.remove(second.id).await.unwrap();
    world.relationships.remove(second.id).await.unwrap();
    assert!(world.relationships.list_friends(a).await.unwrap().is_empty());

    let third = world.relationships.send_request(a, b).await.unwrap();
    assert_eq!(third.id, first.id);

    let edge = world.relationships.status(b, a).await.unwrap().unwrap();
    assert_eq!(edge.id, first.id);
    assert_eq!(edge.status, FriendshipStatus::Pending);
}

/// A block stops requests in both directions.
#[tokio::test]
async fn test_block_either_direction() {
    let world = World::new();
    let a = world.user("A").await;
    let b = world.user("B").await;
    world.befriend(a, b).await;

    let blocked = world.relationships.block(b, a).await.unwrap();
    assert_eq!(blocked.status, FriendshipStatus::Blocked);
    assert_eq!(blocked.requester_id, b);

    assert!(matches!(
        world.relationships.send_request(a, b).await.unwrap_err(),
        FriendError::Blocked
    ));
    assert!(matches!(
        world.relationships.send_request(b, a).await.unwrap_err(),
        FriendError::Blocked
    ));
    assert!(world.relationships.list_friends(a).await.unwrap().is_empty());
}

/// Only the recipient answers, only the requester cancels.
#[tokio::test]
async fn test_authorization_rules() {
    let world = World::new();
    let a = world.user("A").await;
    let b = world.user("B").await;
    let request = world.relationships.send_request(a, b).await.unwrap();

    assert!(matches!(
        world.relationships.accept(request.id, a).await.unwrap_err(),
        FriendError::NotAuthorized
    ));
    assert!(matches!(
        world.relationships.cancel(request.id, b).await.unwrap_err(),
        FriendError::NotAuthorized
    ));

    world.relationships.cancel(request.id, a).await.unwrap();
    assert!(world.relationships.status(a, b).await.unwrap().is_none());
    assert!(matches!(
        world.relationships.accept(request.id, b).await.unwrap_err(),
        FriendError::NotFound(_)
    ));
}

/// Friend lists come back sorted by display name.
#[tokio::test]
async fn test_friend_list_sorted() {
    let world = World::new();
    let me = world.user("Me").await;
    let zed = world.user("zed").await;
    let amy = world.user("Amy").await;
    let kim = world.user("Kim").await;

    world.befriend(me, zed).await;
    world.befriend(amy, me).await;
    world.befriend(me, kim).await;

    let names: Vec<String> = world
        .relationships
        .list_friends(me)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.profile.display_name)
        .collect();
    assert_eq!(names, vec!["Amy", "Kim", "zed"]);

    let ids = world.relationships.friend_ids(me).await.unwrap();
    assert_eq!(ids[0], me);
    assert_eq!(ids.len(), 4);
}

/// Nudges only go to accepted friends.
#[tokio::test]
async fn test_nudge_requires_friendship() {
    let world = World::new();
    let a = world.user("A").await;
    let b = world.user("B").await;

    assert!(matches!(
        world.relationships.nudge(a, b).await.unwrap_err(),
        FriendError::NotFriends
    ));

    world.befriend(a, b).await;
    world.relationships.nudge(a, b).await.unwrap();
    assert_eq!(world.notifier.sent_to(b, NotificationKind::Nudge).len(), 1);
}
