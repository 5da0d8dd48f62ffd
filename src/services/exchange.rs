use crate::core::{AssignmentError, AssignmentGenerator};
use crate::models::{
    AddMemberRequest, AddWishlistItemRequest, AssignmentSet, AuthUser, Group, GroupDetailResponse,
    GroupMember, Member, MyAssignmentResponse, NewWishlistItem, Profile, WishlistItem, WishlistResponse,
};
use crate::services::supabase::{SupabaseClient, SupabaseError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by the group-management flow
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Backend error: {0}")]
    Store(#[from] SupabaseError),

    #[error("{0}")]
    Assignment(#[from] AssignmentError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Assignments have already been made for group {0}")]
    AlreadyAssigned(String),

    #[error("Assignments are already being created for group {0}")]
    AssignmentInProgress(String),
}

impl ExchangeError {
    pub fn status_code(&self) -> u16 {
        match self {
            ExchangeError::Store(SupabaseError::NotFound(_)) => 404,
            ExchangeError::Store(_) => 502,
            ExchangeError::Assignment(_) => 422,
            ExchangeError::NotFound(_) => 404,
            ExchangeError::Forbidden(_) => 403,
            ExchangeError::AlreadyAssigned(_) | ExchangeError::AssignmentInProgress(_) => 409,
        }
    }

    /// Short machine-readable error label
    pub fn label(&self) -> &'static str {
        match self {
            ExchangeError::Store(SupabaseError::NotFound(_)) | ExchangeError::NotFound(_) => "not_found",
            ExchangeError::Store(_) => "backend_error",
            ExchangeError::Assignment(AssignmentError::InsufficientMembers { .. }) => "insufficient_members",
            ExchangeError::Assignment(AssignmentError::NoEligibleGivers) => "no_eligible_givers",
            ExchangeError::Assignment(AssignmentError::UnresolvableAssignment { .. }) => "unresolvable_assignment",
            ExchangeError::Assignment(AssignmentError::DuplicateMember { .. }) => "duplicate_member",
            ExchangeError::Assignment(AssignmentError::Inconsistent(_)) => "inconsistent_assignment",
            ExchangeError::Forbidden(_) => "forbidden",
            ExchangeError::AlreadyAssigned(_) => "already_assigned",
            ExchangeError::AssignmentInProgress(_) => "assignment_in_progress",
        }
    }
}

/// Marks a group as having an assignment run in flight until dropped
struct RunGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    group_id: String,
}

impl RunGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<String>>>, group_id: &str) -> Result<Self, ExchangeError> {
        let mut running = in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(group_id.to_string()) {
            return Err(ExchangeError::AssignmentInProgress(group_id.to_string()));
        }

        Ok(Self {
            in_flight: Arc::clone(in_flight),
            group_id: group_id.to_string(),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut running = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        running.remove(&self.group_id);
    }
}

/// Group, membership, assignment and wishlist operations
///
/// Membership is read fresh from the backend on every call; nothing is cached
/// between requests.
#[derive(Clone)]
pub struct ExchangeService {
    store: Arc<SupabaseClient>,
    generator: AssignmentGenerator,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ExchangeService {
    pub fn new(store: Arc<SupabaseClient>, generator: AssignmentGenerator) -> Self {
        Self {
            store,
            generator,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn generator(&self) -> &AssignmentGenerator {
        &self.generator
    }

    /// Run the generator on a caller-supplied member list, without persisting
    pub fn preview_assignments(&self, members: &[Member]) -> Result<AssignmentSet, ExchangeError> {
        Ok(self.generator.generate(members)?)
    }

    pub async fn list_groups(&self, user: &AuthUser) -> Result<Vec<Group>, ExchangeError> {
        Ok(self.store.list_groups_for_user(&user.id).await?)
    }

    /// Create a group and add its creator as the first member
    pub async fn create_group(
        &self,
        user: &AuthUser,
        name: &str,
        description: Option<&str>,
    ) -> Result<Group, ExchangeError> {
        let group = self.store.create_group(name, description, &user.id).await?;
        self.store.add_group_member(&group.id, &user.id).await?;

        tracing::info!("User {} created group {}", user.id, group.id);
        Ok(group)
    }

    pub async fn group_detail(&self, user: &AuthUser, group_id: &str) -> Result<GroupDetailResponse, ExchangeError> {
        let group = self.store.get_group(group_id).await?;
        let members = self.store.list_group_members(group_id).await?;

        let is_creator = group.created_by == user.id;
        if !is_creator && !members.iter().any(|m| m.user_id == user.id) {
            return Err(ExchangeError::Forbidden(format!("not a member of group {}", group_id)));
        }

        Ok(GroupDetailResponse { group, members, is_creator })
    }

    /// Add a person to a group; only the creator may do this
    ///
    /// A new profile is created under a fresh id. A duplicate-profile
    /// rejection from the backend is tolerated.
    pub async fn add_member(
        &self,
        user: &AuthUser,
        group_id: &str,
        request: &AddMemberRequest,
    ) -> Result<GroupMember, ExchangeError> {
        let group = self.store.get_group(group_id).await?;
        if group.created_by != user.id {
            return Err(ExchangeError::Forbidden("only the group creator can add members".to_string()));
        }

        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: request.full_name.trim().to_string(),
            is_child: request.is_child,
        };

        match self.store.insert_profile(&profile).await {
            Ok(_) => {}
            Err(e) if e.is_duplicate() => {
                tracing::debug!("Profile {} already exists, reusing it", profile.id);
            }
            Err(e) => return Err(e.into()),
        }

        let mut membership = self.store.add_group_member(group_id, &profile.id).await?;
        if membership.profile.is_none() {
            membership.profile = Some(profile);
        }

        tracing::info!(
            "Added {} to group {} (child: {})",
            membership.user_id,
            group_id,
            request.is_child
        );

        Ok(membership)
    }

    /// Generate and persist assignments for a group
    ///
    /// Only the creator may run this, and only once per group. Each giver's
    /// receiver is written to their membership row; the group is flagged as
    /// completed only after every write succeeded. Generator errors happen
    /// before any write.
    pub async fn create_assignments(&self, user: &AuthUser, group_id: &str) -> Result<AssignmentSet, ExchangeError> {
        // The group is read under the guard so an earlier run's flag is visible
        let _guard = RunGuard::acquire(&self.in_flight, group_id)?;

        let group = self.store.get_group(group_id).await?;
        if group.created_by != user.id {
            return Err(ExchangeError::Forbidden("only the group creator can create assignments".to_string()));
        }
        if group.assignment_completed {
            return Err(ExchangeError::AlreadyAssigned(group_id.to_string()));
        }

        let rows = self.store.list_group_members(group_id).await?;
        let members: Vec<Member> = rows.iter().map(GroupMember::to_member).collect();

        let assignments = self.generator.generate(&members).map_err(|e| {
            tracing::warn!("Assignment generation failed for group {}: {}", group_id, e);
            e
        })?;

        let membership_ids: HashMap<&str, &str> = rows
            .iter()
            .map(|row| (row.user_id.as_str(), row.id.as_str()))
            .collect();

        for assignment in &assignments {
            let membership_id = membership_ids
                .get(assignment.giver_id.as_str())
                .ok_or_else(|| ExchangeError::NotFound(format!("membership for {}", assignment.giver_id)))?;

            self.store
                .update_member_assignment(membership_id, &assignment.receiver_id)
                .await?;
        }

        self.store.mark_assignment_completed(group_id).await?;

        tracing::info!(
            "Created {} assignments for group {} ({} members, strategy: {})",
            assignments.len(),
            group_id,
            members.len(),
            self.generator.strategy()
        );

        Ok(assignments)
    }

    /// The caller's receiver in a group, once assignments exist
    pub async fn my_assignment(&self, user: &AuthUser, group_id: &str) -> Result<MyAssignmentResponse, ExchangeError> {
        let group = self.store.get_group(group_id).await?;
        let membership = self
            .store
            .get_membership(group_id, &user.id)
            .await?
            .ok_or_else(|| ExchangeError::Forbidden(format!("not a member of group {}", group_id)))?;

        if !group.assignment_completed {
            return Ok(MyAssignmentResponse { assignment_completed: false, receiver: None });
        }

        let receiver = match membership.assigned_to {
            Some(receiver_id) => Some(self.store.get_profile(&receiver_id).await?),
            None => None,
        };

        Ok(MyAssignmentResponse { assignment_completed: true, receiver })
    }

    /// A member's wishlist; any member of the group may view it
    ///
    /// The owner must belong to the group too, otherwise this is `NotFound`.
    pub async fn wishlist(&self, user: &AuthUser, group_id: &str, owner_id: &str) -> Result<WishlistResponse, ExchangeError> {
        self.require_membership(group_id, &user.id).await?;
        if owner_id != user.id && self.store.get_membership(group_id, owner_id).await?.is_none() {
            return Err(ExchangeError::NotFound(format!("member {} in group {}", owner_id, group_id)));
        }

        let items = self.store.list_wishlist_items(group_id, owner_id).await?;
        let owner = match self.store.get_profile(owner_id).await {
            Ok(profile) => Some(profile),
            Err(SupabaseError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(WishlistResponse {
            owner,
            is_own_wishlist: owner_id == user.id,
            items,
        })
    }

    /// Add an item to the caller's own wishlist
    pub async fn add_wishlist_item(
        &self,
        user: &AuthUser,
        group_id: &str,
        request: &AddWishlistItemRequest,
    ) -> Result<WishlistItem, ExchangeError> {
        self.require_membership(group_id, &user.id).await?;

        let item = NewWishlistItem {
            group_id: group_id.to_string(),
            user_id: user.id.clone(),
            title: request.title.trim().to_string(),
            description: non_empty(&request.description),
            price: request.price,
            link: non_empty(&request.link),
            size: non_empty(&request.size),
            priority: request.priority.unwrap_or_default(),
        };

        let created = self.store.insert_wishlist_item(&item).await?;
        tracing::debug!("User {} added wishlist item {} in group {}", user.id, created.id, group_id);

        Ok(created)
    }

    /// Remove an item; only its owner may do this
    pub async fn delete_wishlist_item(&self, user: &AuthUser, group_id: &str, item_id: &str) -> Result<(), ExchangeError> {
        let item = self.store.get_wishlist_item(item_id).await?;
        if item.group_id != group_id {
            return Err(ExchangeError::NotFound(format!("wishlist item {}", item_id)));
        }
        if item.user_id != user.id {
            return Err(ExchangeError::Forbidden("only the owner can remove wishlist items".to_string()));
        }

        self.store.delete_wishlist_item(item_id).await?;
        Ok(())
    }

    /// Mark an item as purchased; the owner may not see or change this
    pub async fn set_purchased(
        &self,
        user: &AuthUser,
        group_id: &str,
        item_id: &str,
        purchased: bool,
    ) -> Result<(), ExchangeError> {
        let item = self.store.get_wishlist_item(item_id).await?;
        if item.group_id != group_id {
            return Err(ExchangeError::NotFound(format!("wishlist item {}", item_id)));
        }
        if item.user_id == user.id {
            return Err(ExchangeError::Forbidden("owners cannot mark their own items".to_string()));
        }
        self.require_membership(group_id, &user.id).await?;

        self.store.set_item_purchased(item_id, purchased).await?;
        tracing::debug!("Item {} purchased={} by {}", item_id, purchased, user.id);

        Ok(())
    }

    async fn require_membership(&self, group_id: &str, user_id: &str) -> Result<GroupMember, ExchangeError> {
        self.store
            .get_membership(group_id, user_id)
            .await?
            .ok_or_else(|| ExchangeError::Forbidden(format!("not a member of group {}", group_id)))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_guard_blocks_second_run() {
        let in_flight = Arc::new(Mutex::new(HashSet::new()));

        let first = RunGuard::acquire(&in_flight, "g1").unwrap();
        assert!(matches!(
            RunGuard::acquire(&in_flight, "g1"),
            Err(ExchangeError::AssignmentInProgress(_))
        ));
        assert!(RunGuard::acquire(&in_flight, "g2").is_ok());

        drop(first);
        assert!(RunGuard::acquire(&in_flight, "g1").is_ok());
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ExchangeError::from(AssignmentError::NoEligibleGivers).status_code(), 422);
        assert_eq!(ExchangeError::from(SupabaseError::NotFound("g".into())).status_code(), 404);
        assert_eq!(ExchangeError::from(SupabaseError::Unauthorized).status_code(), 502);
        assert_eq!(ExchangeError::AlreadyAssigned("g".into()).status_code(), 409);
        assert_eq!(
            ExchangeError::from(AssignmentError::InsufficientMembers { count: 1 }).label(),
            "insufficient_members"
        );
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&Some(" M ".to_string())), Some("M".to_string()));
        assert_eq!(non_empty(&None), None);
    }
}
