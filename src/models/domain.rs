use serde::{Deserialize, Serialize};

/// A participant as seen by the assignment generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(rename = "canGive", default = "default_true")]
    pub can_give: bool,
}

impl Member {
    /// Member who gives and receives
    pub fn giver(id: impl Into<String>) -> Self {
        Self { id: id.into(), can_give: true }
    }

    /// Member who only receives (children)
    pub fn receiver_only(id: impl Into<String>) -> Self {
        Self { id: id.into(), can_give: false }
    }
}

fn default_true() -> bool { true }

/// One giver -> receiver pairing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "giverId")]
    pub giver_id: String,
    #[serde(rename = "receiverId")]
    pub receiver_id: String,
}

/// Complete output of one generator run, in giver input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentSet {
    assignments: Vec<Assignment>,
}

impl AssignmentSet {
    pub fn new(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.assignments.iter()
    }

    /// Receiver assigned to `giver_id`, if that member gives
    pub fn receiver_for(&self, giver_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.giver_id == giver_id)
            .map(|a| a.receiver_id.as_str())
    }

    pub fn into_inner(self) -> Vec<Assignment> {
        self.assignments
    }
}

impl<'a> IntoIterator for &'a AssignmentSet {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}

/// Gift-exchange group row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub assignment_completed: bool,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// User profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub is_child: bool,
}

/// Membership row, joined with the member's profile when listed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(rename = "profiles", alias = "profile", default)]
    pub profile: Option<Profile>,
}

impl GroupMember {
    pub fn is_child(&self) -> bool {
        self.profile.as_ref().map(|p| p.is_child).unwrap_or(false)
    }

    /// Generator view of this membership: children receive but never give
    pub fn to_member(&self) -> Member {
        Member {
            id: self.user_id.clone(),
            can_give: !self.is_child(),
        }
    }
}

/// Wishlist item priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// Wishlist item row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Insert payload for a wishlist item
#[derive(Debug, Clone, Serialize)]
pub struct NewWishlistItem {
    pub group_id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub link: Option<String>,
    pub size: Option<String>,
    pub priority: Priority,
}

/// Authenticated caller, resolved from a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}
