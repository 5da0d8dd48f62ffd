use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::{Member, Priority};

/// Request to preview assignments for an ad-hoc member list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateAssignmentsRequest {
    #[validate(length(max = 500))]
    pub members: Vec<Member>,
}

/// Request to create a group
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to add a member to a group
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    #[serde(alias = "full_name", rename = "fullName")]
    pub full_name: String,
    // Invitations are not sent yet; the address is only validated
    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(alias = "is_child", rename = "isChild", default)]
    pub is_child: bool,
}

/// Request to add an item to the caller's wishlist
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddWishlistItemRequest {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub price: Option<f64>,
    #[validate(url)]
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Request to mark a wishlist item as purchased (or not)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPurchasedRequest {
    pub purchased: bool,
}

/// Names and titles are stored trimmed, so whitespace alone is empty
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
