//! Friendship relationships.
//!
//! One row per unordered pair of users holds the whole relationship. Rows
//! are reopened in place rather than duplicated, and the store's pair
//! uniqueness constraint is how concurrent creators find out about each
//! other.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::notify::{display_name_or_default, Notification, NotificationDispatcher};
use super::types::{
    Friend, FriendRequest, Friendship, FriendshipStatus, PendingRequests, Profile,
};
use crate::storage::{DatabaseError, FriendshipStore, ProfileStore};

/// Relationship manager.
pub struct RelationshipManager {
    friendships: Arc<dyn FriendshipStore>,
    profiles: Arc<dyn ProfileStore>,
    notifier: NotificationDispatcher,
}

impl RelationshipManager {
    /// Create a new relationship manager.
    pub fn new(
        friendships: Arc<dyn FriendshipStore>,
        profiles: Arc<dyn ProfileStore>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            friendships,
            profiles,
            notifier,
        }
    }

    /// Send a friend request from `from` to `to`.
    ///
    /// A declined or removed edge for the pair is reopened with the new
    /// orientation instead of inserting a second row.
    pub async fn send_request(&self, from: Uuid, to: Uuid) -> Result<Friendship, FriendError> {
        if from == to {
            return Err(FriendError::InvalidState(
                "cannot send a friend request to yourself".to_string(),
            ));
        }

        let mut edge = None;
        for _ in 0..2 {
            match self.friendships.find_pair(from, to).await? {
                Some(existing) => {
                    edge = Some(self.reopen(existing, from, to).await?);
                    break;
                }
                None => {
                    let fresh = Friendship::new(from, to, FriendshipStatus::Pending);
                    match self.friendships.insert_friendship(&fresh).await {
                        Ok(()) => {
                            edge = Some(fresh);
                            break;
                        }
                        Err(e) if e.is_unique_violation() => {
                            tracing::debug!(%from, %to, "Pair row created concurrently, re-reading");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
        let edge = edge.ok_or_else(|| {
            FriendError::Database(DatabaseError::UniqueViolation(
                "friendship pair kept colliding".to_string(),
            ))
        })?;

        let name = display_name_or_default(self.profiles.as_ref(), from).await;
        self.notifier
            .dispatch(Notification::friend_request(to, from, &name, edge.id))
            .await;

        tracing::info!(%from, %to, friendship_id = %edge.id, "Friend request sent");
        Ok(edge)
    }

    async fn reopen(
        &self,
        mut existing: Friendship,
        from: Uuid,
        to: Uuid,
    ) -> Result<Friendship, FriendError> {
        match existing.status {
            FriendshipStatus::Accepted => Err(FriendError::AlreadyFriends),
            FriendshipStatus::Pending => Err(FriendError::RequestPending),
            FriendshipStatus::Blocked => Err(FriendError::Blocked),
            FriendshipStatus::Declined | FriendshipStatus::Removed => {
                existing.requester_id = from;
                existing.recipient_id = to;
                existing.status = FriendshipStatus::Pending;
                existing.updated_at = Utc::now();
                self.friendships.update_friendship(&existing).await?;
                Ok(existing)
            }
        }
    }

    /// Accept a pending request. Only the recipient may accept.
    pub async fn accept(&self, edge_id: Uuid, by: Uuid) -> Result<Friendship, FriendError> {
        let edge = self
            .respond(edge_id, by, FriendshipStatus::Accepted)
            .await?;

        let name = display_name_or_default(self.profiles.as_ref(), by).await;
        self.notifier
            .dispatch(Notification::friend_accepted(
                edge.requester_id,
                by,
                &name,
                edge.id,
            ))
            .await;

        tracing::info!(friendship_id = %edge.id, "Friend request accepted");
        Ok(edge)
    }

    /// Decline a pending request. Only the recipient may decline.
    pub async fn decline(&self, edge_id: Uuid, by: Uuid) -> Result<Friendship, FriendError> {
        self.respond(edge_id, by, FriendshipStatus::Declined).await
    }

    async fn respond(
        &self,
        edge_id: Uuid,
        by: Uuid,
        status: FriendshipStatus,
    ) -> Result<Friendship, FriendError> {
        let mut edge = self.get(edge_id).await?;
        if edge.recipient_id != by {
            return Err(FriendError::NotAuthorized);
        }
        if edge.status != FriendshipStatus::Pending {
            return Err(FriendError::InvalidState(format!(
                "request is {}, not pending",
                edge.status.as_str()
            )));
        }

        edge.status = status;
        edge.updated_at = Utc::now();
        self.friendships.update_friendship(&edge).await?;
        Ok(edge)
    }

    /// Withdraw a pending request. Only the requester may cancel.
    pub async fn cancel(&self, edge_id: Uuid, by: Uuid) -> Result<(), FriendError> {
        let edge = self.get(edge_id).await?;
        if edge.requester_id != by {
            return Err(FriendError::NotAuthorized);
        }
        if edge.status != FriendshipStatus::Pending {
            return Err(FriendError::InvalidState(format!(
                "request is {}, not pending",
                edge.status.as_str()
            )));
        }

        self.friendships.delete_friendship(edge_id).await?;
        Ok(())
    }

    /// Mark an edge as removed. Removing twice is fine.
    pub async fn remove(&self, edge_id: Uuid) -> Result<Friendship, FriendError> {
        let edge = self.get(edge_id).await?;
        self.mark_removed(edge).await
    }

    /// Like [`remove`](Self::remove), but only for one of the edge's two parties.
    pub async fn remove_by(&self, edge_id: Uuid, by: Uuid) -> Result<Friendship, FriendError> {
        let edge = self.get(edge_id).await?;
        if !edge.involves(by) {
            return Err(FriendError::NotAuthorized);
        }
        self.mark_removed(edge).await
    }

    async fn mark_removed(&self, mut edge: Friendship) -> Result<Friendship, FriendError> {
        edge.status = FriendshipStatus::Removed;
        edge.updated_at = Utc::now();
        self.friendships.update_friendship(&edge).await?;
        Ok(edge)
    }

    /// Block `target`, overwriting whatever edge the pair had.
    pub async fn block(&self, user: Uuid, target: Uuid) -> Result<Friendship, FriendError> {
        if user == target {
            return Err(FriendError::InvalidState("cannot block yourself".to_string()));
        }

        for _ in 0..2 {
            if let Some(mut existing) = self.friendships.find_pair(user, target).await? {
                existing.requester_id = user;
                existing.recipient_id = target;
                existing.status = FriendshipStatus::Blocked;
                existing.updated_at = Utc::now();
                self.friendships.update_friendship(&existing).await?;
                tracing::info!(%user, %target, "User blocked");
                return Ok(existing);
            }

            let fresh = Friendship::new(user, target, FriendshipStatus::Blocked);
            match self.friendships.insert_friendship(&fresh).await {
                Ok(()) => {
                    tracing::info!(%user, %target, "User blocked");
                    return Ok(fresh);
                }
                Err(e) if e.is_unique_violation() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(FriendError::Database(DatabaseError::UniqueViolation(
            "friendship pair kept colliding".to_string(),
        )))
    }

    /// Accepted friends of `user`, resolved to their profiles.
    ///
    /// Two independent queries (one per orientation) merged through an
    /// id-keyed profile lookup.
    pub async fn list_friends(&self, user: Uuid) -> Result<Vec<Friend>, FriendError> {
        let edges = self.accepted_edges(user).await?;

        let other_ids: Vec<Uuid> = edges.iter().map(|e| e.other_party(user)).collect();
        let profiles = self.profile_map(&other_ids).await?;

        let mut friends: Vec<Friend> = edges
            .into_iter()
            .filter_map(|edge| {
                let other = edge.other_party(user);
                match profiles.get(&other) {
                    Some(profile) => Some(Friend {
                        friendship_id: edge.id,
                        profile: profile.clone(),
                        since: edge.updated_at,
                    }),
                    None => {
                        tracing::debug!(%other, "Skipping friend without profile");
                        None
                    }
                }
            })
            .collect();

        friends.sort_by(|a, b| {
            a.profile
                .display_name
                .to_lowercase()
                .cmp(&b.profile.display_name.to_lowercase())
        });
        Ok(friends)
    }

    /// Pending requests addressed to and sent by `user`.
    pub async fn pending_requests(&self, user: Uuid) -> Result<PendingRequests, FriendError> {
        let (incoming, outgoing) = futures::try_join!(
            self.friendships
                .friendships_as_recipient(user, FriendshipStatus::Pending),
            self.friendships
                .friendships_as_requester(user, FriendshipStatus::Pending),
        )?;

        let ids: Vec<Uuid> = incoming
            .iter()
            .map(|e| e.requester_id)
            .chain(outgoing.iter().map(|e| e.recipient_id))
            .collect();
        let profiles = self.profile_map(&ids).await?;

        let resolve = |edges: Vec<Friendship>| -> Vec<FriendRequest> {
            edges
                .into_iter()
                .map(|friendship| {
                    let other = friendship.other_party(user);
                    FriendRequest {
                        profile: profiles.get(&other).cloned(),
                        friendship,
                    }
                })
                .collect()
        };

        Ok(PendingRequests {
            incoming: resolve(incoming),
            outgoing: resolve(outgoing),
        })
    }

    /// The edge between two users, whichever way it points.
    pub async fn status(&self, a: Uuid, b: Uuid) -> Result<Option<Friendship>, FriendError> {
        Ok(self.friendships.find_pair(a, b).await?)
    }

    /// Whether the two users are accepted friends.
    pub async fn are_friends(&self, a: Uuid, b: Uuid) -> Result<bool, FriendError> {
        Ok(matches!(
            self.status(a, b).await?,
            Some(edge) if edge.status == FriendshipStatus::Accepted
        ))
    }

    /// `user` followed by every accepted friend.
    pub async fn friend_ids(&self, user: Uuid) -> Result<Vec<Uuid>, FriendError> {
        let edges = self.accepted_edges(user).await?;
        let mut ids = vec![user];
        for edge in edges {
            let other = edge.other_party(user);
            if !ids.contains(&other) {
                ids.push(other);
            }
        }
        Ok(ids)
    }

    /// Nudge a friend to train.
    pub async fn nudge(&self, from: Uuid, to: Uuid) -> Result<(), FriendError> {
        if !self.are_friends(from, to).await? {
            return Err(FriendError::NotFriends);
        }

        let name = display_name_or_default(self.profiles.as_ref(), from).await;
        self.notifier
            .dispatch(Notification::nudge(to, from, &name))
            .await;
        Ok(())
    }

    async fn get(&self, edge_id: Uuid) -> Result<Friendship, FriendError> {
        self.friendships
            .get_friendship(edge_id)
            .await?
            .ok_or(FriendError::NotFound(edge_id))
    }

    async fn accepted_edges(&self, user: Uuid) -> Result<Vec<Friendship>, FriendError> {
        let (mut sent, received) = futures::try_join!(
            self.friendships
                .friendships_as_requester(user, FriendshipStatus::Accepted),
            self.friendships
                .friendships_as_recipient(user, FriendshipStatus::Accepted),
        )?;
        sent.extend(received);
        Ok(sent)
    }

    async fn profile_map(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Profile>, FriendError> {
        let profiles = self.profiles.profiles_by_ids(ids).await?;
        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }
}

/// Friendship errors.
#[derive(Debug, thiserror::Error)]
pub enum FriendError {
    #[error("Friendship not found: {0}")]
    NotFound(Uuid),

    #[error("Already friends")]
    AlreadyFriends,

    #[error("A friend request is already pending")]
    RequestPending,

    #[error("Relationship is blocked")]
    Blocked,

    #[error("Not friends")]
    NotFriends,

    #[error("Not authorized to change this request")]
    NotAuthorized,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
