use rand::seq::SliceRandom;
use rand::Rng;
use crate::core::generator::AssignmentError;
use crate::models::{Assignment, AssignmentSet, Member};

/// Shuffle every member into a receiver pool and walk the givers over it
pub fn assign<R: Rng + ?Sized>(
    givers: &[&Member],
    members: &[Member],
    rng: &mut R,
) -> Result<AssignmentSet, AssignmentError> {
    let mut receivers: Vec<&Member> = members.iter().collect();
    receivers.shuffle(rng);
    assign_from_pool(givers, &mut receivers)
}

/// Pair giver `i` with pool slot `i mod len`
///
/// On a self-match the slot is swapped with the next one (wrapping) and
/// re-read. A swap on the last slot can hand out a receiver an earlier giver
/// already holds, so receivers may repeat. A pool of one, or a pool whose
/// neighbour carries the same id, cannot be repaired.
pub fn assign_from_pool(
    givers: &[&Member],
    receivers: &mut [&Member],
) -> Result<AssignmentSet, AssignmentError> {
    let len = receivers.len();
    if len == 0 {
        return Err(AssignmentError::InsufficientMembers { count: 0 });
    }

    let mut assignments = Vec::with_capacity(givers.len());

    for (i, giver) in givers.iter().enumerate() {
        let slot = i % len;

        if receivers[slot].id == giver.id {
            receivers.swap(slot, (slot + 1) % len);
        }

        let receiver = receivers[slot];
        if receiver.id == giver.id {
            return Err(AssignmentError::UnresolvableAssignment {
                giver_id: giver.id.clone(),
            });
        }

        assignments.push(Assignment {
            giver_id: giver.id.clone(),
            receiver_id: receiver.id.clone(),
        });
    }

    Ok(AssignmentSet::new(assignments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_match_swaps_with_next_slot() {
        let a = Member::giver("A");
        let b = Member::giver("B");
        let c = Member::receiver_only("C");
        let mut pool = vec![&a, &b, &c];

        let set = assign_from_pool(&[&a, &b], &mut pool).unwrap();

        assert_eq!(set.receiver_for("A"), Some("B"));
        assert_eq!(set.receiver_for("B"), Some("A"));
    }

    #[test]
    fn test_wrap_around_swap_repeats_receiver() {
        let a = Member::giver("A");
        let b = Member::giver("B");
        let c = Member::giver("C");
        let mut pool = vec![&b, &a, &c];

        let set = assign_from_pool(&[&a, &b, &c], &mut pool).unwrap();

        assert_eq!(set.receiver_for("A"), Some("B"));
        assert_eq!(set.receiver_for("B"), Some("A"));
        // C met itself in the last slot and took the first slot's receiver
        assert_eq!(set.receiver_for("C"), Some("B"));
    }

    #[test]
    fn test_single_member_pool_is_unresolvable() {
        let a = Member::giver("A");
        let mut pool = vec![&a];

        assert_eq!(
            assign_from_pool(&[&a], &mut pool),
            Err(AssignmentError::UnresolvableAssignment { giver_id: "A".to_string() })
        );
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let a = Member::giver("A");
        let mut pool: Vec<&Member> = vec![];

        assert!(matches!(
            assign_from_pool(&[&a], &mut pool),
            Err(AssignmentError::InsufficientMembers { .. })
        ));
    }
}
