use std::collections::HashSet;
use crate::core::generator::AssignmentError;
use crate::models::{AssignmentSet, Member};

/// Check the generator preconditions and return the givers in input order
///
/// Checks run in a fixed order: member count, duplicate ids, then at least
/// one giver-eligible member.
pub fn validate_members(members: &[Member]) -> Result<Vec<&Member>, AssignmentError> {
    if members.len() < 2 {
        return Err(AssignmentError::InsufficientMembers { count: members.len() });
    }

    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        if !seen.insert(member.id.as_str()) {
            return Err(AssignmentError::DuplicateMember { id: member.id.clone() });
        }
    }

    let givers: Vec<&Member> = members.iter().filter(|m| m.can_give).collect();
    if givers.is_empty() {
        return Err(AssignmentError::NoEligibleGivers);
    }

    Ok(givers)
}

/// Check a generated set against the input it was built from
///
/// Every giver-eligible member appears exactly once as a giver, nobody else
/// gives, nobody gives to themself and every receiver is an input member.
pub fn verify_assignments(members: &[Member], set: &AssignmentSet) -> Result<(), AssignmentError> {
    let ids: HashSet<&str> = members.iter().map(|m| m.id.as_str()).collect();
    let givers: HashSet<&str> = members
        .iter()
        .filter(|m| m.can_give)
        .map(|m| m.id.as_str())
        .collect();

    let mut assigned = HashSet::with_capacity(set.len());
    for assignment in set {
        if assignment.giver_id == assignment.receiver_id {
            return Err(AssignmentError::UnresolvableAssignment {
                giver_id: assignment.giver_id.clone(),
            });
        }
        if !givers.contains(assignment.giver_id.as_str()) {
            return Err(AssignmentError::Inconsistent(format!(
                "{} is not eligible to give",
                assignment.giver_id
            )));
        }
        if !ids.contains(assignment.receiver_id.as_str()) {
            return Err(AssignmentError::Inconsistent(format!(
                "receiver {} is not a member",
                assignment.receiver_id
            )));
        }
        if !assigned.insert(assignment.giver_id.as_str()) {
            return Err(AssignmentError::Inconsistent(format!(
                "{} was assigned more than once",
                assignment.giver_id
            )));
        }
    }

    if assigned.len() != givers.len() {
        return Err(AssignmentError::Inconsistent(format!(
            "{} of {} givers assigned",
            assigned.len(),
            givers.len()
        )));
    }

    Ok(())
}
