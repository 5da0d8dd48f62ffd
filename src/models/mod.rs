// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Member, Assignment, AssignmentSet, Group, Profile, GroupMember, Priority, WishlistItem, NewWishlistItem, AuthUser};
pub use requests::{GenerateAssignmentsRequest, CreateGroupRequest, AddMemberRequest, AddWishlistItemRequest, SetPurchasedRequest};
pub use responses::{GenerateAssignmentsResponse, GroupDetailResponse, CreateAssignmentsResponse, MyAssignmentResponse, WishlistResponse, HealthResponse, ErrorResponse};
