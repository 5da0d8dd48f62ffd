use serde::{Deserialize, Serialize};
use crate::models::domain::{AssignmentSet, Group, GroupMember, Profile, WishlistItem};

/// Response for the assignment preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAssignmentsResponse {
    pub assignments: AssignmentSet,
    pub strategy: String,
}

/// Group with its members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetailResponse {
    pub group: Group,
    pub members: Vec<GroupMember>,
    pub is_creator: bool,
}

/// Result of persisting assignments for a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignmentsResponse {
    pub group_id: String,
    pub assignments_created: usize,
    pub assignment_completed: bool,
}

/// The caller's own assignment within a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyAssignmentResponse {
    pub assignment_completed: bool,
    pub receiver: Option<Profile>,
}

/// A member's wishlist within a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistResponse {
    pub owner: Option<Profile>,
    pub is_own_wishlist: bool,
    pub items: Vec<WishlistItem>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
