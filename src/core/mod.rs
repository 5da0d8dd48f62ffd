// Core algorithm exports
pub mod derangement;
pub mod generator;
pub mod swap_repair;
pub mod validation;

pub use generator::{AssignmentGenerator, AssignmentStrategy, AssignmentError};
pub use validation::{validate_members, verify_assignments};
