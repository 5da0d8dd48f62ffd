use rand::seq::SliceRandom;
use rand::Rng;
use crate::core::generator::AssignmentError;
use crate::models::{Assignment, AssignmentSet, Member};

/// Assign receivers from a random permutation with no giver as a fixed point
///
/// Permutations are drawn uniformly and rejected while any giver maps to
/// itself. After `max_attempts` rejections a Sattolo cycle is used, which has
/// no fixed points at all for two or more members. Receivers never repeat.
pub fn assign<R: Rng + ?Sized>(
    members: &[Member],
    rng: &mut R,
    max_attempts: u32,
) -> Result<AssignmentSet, AssignmentError> {
    if members.len() < 2 {
        return Err(AssignmentError::InsufficientMembers { count: members.len() });
    }

    let giver_slots: Vec<usize> = members
        .iter()
        .enumerate()
        .filter(|(_, m)| m.can_give)
        .map(|(i, _)| i)
        .collect();

    let mut permutation: Vec<usize> = (0..members.len()).collect();
    let mut accepted = false;

    for _ in 0..max_attempts {
        permutation.shuffle(rng);
        if giver_slots.iter().all(|&g| permutation[g] != g) {
            accepted = true;
            break;
        }
    }

    if !accepted {
        tracing::debug!(
            "No giver derangement after {} draws over {} members, using a single cycle",
            max_attempts,
            members.len()
        );
        sattolo_cycle(&mut permutation, rng);
    }

    let assignments = giver_slots
        .into_iter()
        .map(|g| Assignment {
            giver_id: members[g].id.clone(),
            receiver_id: members[permutation[g]].id.clone(),
        })
        .collect();

    Ok(AssignmentSet::new(assignments))
}

/// Overwrite `permutation` with a uniformly random cyclic permutation
///
/// Every element lands in one cycle of full length, so for length >= 2
/// `permutation[i] != i` for all `i`.
pub fn sattolo_cycle<R: Rng + ?Sized>(permutation: &mut [usize], rng: &mut R) {
    for (i, slot) in permutation.iter_mut().enumerate() {
        *slot = i;
    }
    for i in (1..permutation.len()).rev() {
        let j = rng.gen_range(0..i);
        permutation.swap(i, j);
    }
}
