//! Secret Santa - gift-exchange service
//!
//! This library provides the assignment generator that pairs every
//! giver-eligible group member with a receiver, plus the group, wishlist and
//! session plumbing around it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{AssignmentGenerator, AssignmentStrategy, AssignmentError};
pub use models::{Member, Assignment, AssignmentSet};
