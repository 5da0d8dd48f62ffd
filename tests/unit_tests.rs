// Property tests for the assignment generator

use rand::rngs::StdRng;
use rand::SeedableRng;
use secret_santa::core::{AssignmentError, AssignmentGenerator, AssignmentStrategy};
use secret_santa::models::{AssignmentSet, Member};
use std::collections::HashSet;

const STRATEGIES: [AssignmentStrategy; 2] = [AssignmentStrategy::Derangement, AssignmentStrategy::SwapRepair];

/// Members m0..m{n-1}; bit i of `giver_mask` makes member i giver-eligible
fn members_from_mask(n: usize, giver_mask: u32) -> Vec<Member> {
    (0..n)
        .map(|i| Member {
            id: format!("m{}", i),
            can_give: giver_mask & (1 << i) != 0,
        })
        .collect()
}

fn assert_valid(members: &[Member], set: &AssignmentSet) {
    let ids: HashSet<&str> = members.iter().map(|m| m.id.as_str()).collect();
    let givers: HashSet<&str> = members.iter().filter(|m| m.can_give).map(|m| m.id.as_str()).collect();

    let mut seen_givers = HashSet::new();
    for assignment in set {
        assert_ne!(assignment.giver_id, assignment.receiver_id, "self-assignment in {:?}", set);
        assert!(givers.contains(assignment.giver_id.as_str()), "ineligible giver in {:?}", set);
        assert!(ids.contains(assignment.receiver_id.as_str()), "unknown receiver in {:?}", set);
        assert!(seen_givers.insert(assignment.giver_id.as_str()), "giver repeated in {:?}", set);
    }
    assert_eq!(seen_givers, givers);
}

#[test]
fn test_all_small_shapes_produce_valid_sets() {
    for strategy in STRATEGIES {
        let generator = AssignmentGenerator::with_strategy(strategy);

        for n in 2..=6usize {
            for giver_mask in 1..(1u32 << n) {
                let members = members_from_mask(n, giver_mask);

                for seed in 0..40 {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let set = generator
                        .generate_with_rng(&members, &mut rng)
                        .unwrap_or_else(|e| panic!("{:?} failed on {:?}: {}", strategy, members, e));
                    assert_valid(&members, &set);
                }
            }
        }
    }
}

#[test]
fn test_derangement_never_repeats_receivers() {
    let generator = AssignmentGenerator::with_strategy(AssignmentStrategy::Derangement);

    for n in 2..=7usize {
        for giver_mask in 1..(1u32 << n) {
            let members = members_from_mask(n, giver_mask);
            let mut rng = StdRng::seed_from_u64(giver_mask as u64);

            for _ in 0..10 {
                let set = generator.generate_with_rng(&members, &mut rng).unwrap();
                let receivers: HashSet<&str> = set.iter().map(|a| a.receiver_id.as_str()).collect();
                assert_eq!(receivers.len(), set.len(), "repeated receiver in {:?}", set);
            }
        }
    }
}

#[test]
fn test_entropy_seeded_runs_are_valid() {
    let members = vec![
        Member::giver("ana"),
        Member::giver("ben"),
        Member::receiver_only("cal"),
        Member::giver("dee"),
        Member::receiver_only("eli"),
    ];

    for strategy in STRATEGIES {
        let generator = AssignmentGenerator::with_strategy(strategy);
        for _ in 0..200 {
            let set = generator.generate(&members).unwrap();
            assert_valid(&members, &set);
        }
    }
}

#[test]
fn test_rejects_insufficient_members() {
    for strategy in STRATEGIES {
        let generator = AssignmentGenerator::with_strategy(strategy);

        assert_eq!(
            generator.generate(&[]),
            Err(AssignmentError::InsufficientMembers { count: 0 })
        );
        assert_eq!(
            generator.generate(&[Member::giver("solo")]),
            Err(AssignmentError::InsufficientMembers { count: 1 })
        );
    }
}

#[test]
fn test_rejects_no_eligible_givers() {
    let members = vec![Member::receiver_only("a"), Member::receiver_only("b")];

    for strategy in STRATEGIES {
        let generator = AssignmentGenerator::with_strategy(strategy);
        assert_eq!(generator.generate(&members), Err(AssignmentError::NoEligibleGivers));
    }
}

#[test]
fn test_rejects_duplicate_ids() {
    let members = vec![Member::giver("a"), Member::giver("b"), Member::giver("a")];

    assert_eq!(
        AssignmentGenerator::default().generate(&members),
        Err(AssignmentError::DuplicateMember { id: "a".to_string() })
    );
}

#[test]
fn test_concrete_scenario() {
    let members = vec![
        Member::giver("A"),
        Member::giver("B"),
        Member::receiver_only("C"),
    ];

    for strategy in STRATEGIES {
        let generator = AssignmentGenerator::with_strategy(strategy);
        for _ in 0..100 {
            let set = generator.generate(&members).unwrap();

            assert_eq!(set.len(), 2);
            let a = set.receiver_for("A").unwrap();
            let b = set.receiver_for("B").unwrap();
            assert!(["B", "C"].contains(&a));
            assert!(["A", "C"].contains(&b));
        }
    }
}

#[test]
fn test_different_seeds_give_different_sets() {
    // 5 members, 3 eligible givers
    let members = vec![
        Member::giver("a"),
        Member::giver("b"),
        Member::giver("c"),
        Member::receiver_only("d"),
        Member::receiver_only("e"),
    ];

    for strategy in STRATEGIES {
        let generator = AssignmentGenerator::with_strategy(strategy);
        let distinct: HashSet<Vec<(String, String)>> = (0..50)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                generator
                    .generate_with_rng(&members, &mut rng)
                    .unwrap()
                    .into_inner()
                    .into_iter()
                    .map(|a| (a.giver_id, a.receiver_id))
                    .collect()
            })
            .collect();

        assert!(distinct.len() > 1, "{:?} produced the same set for 50 seeds", strategy);
    }
}

#[test]
fn test_derangement_reaches_every_cycle() {
    // Three givers have exactly two derangements: a->b->c->a and a->c->b->a
    let members = vec![Member::giver("a"), Member::giver("b"), Member::giver("c")];
    let generator = AssignmentGenerator::with_strategy(AssignmentStrategy::Derangement);
    let mut rng = StdRng::seed_from_u64(2024);

    let mut forward = 0;
    let mut backward = 0;
    for _ in 0..400 {
        let set = generator.generate_with_rng(&members, &mut rng).unwrap();
        match set.receiver_for("a") {
            Some("b") => forward += 1,
            Some("c") => backward += 1,
            other => panic!("unexpected receiver {:?}", other),
        }
    }

    assert!(forward > 100 && backward > 100, "skewed: {} vs {}", forward, backward);
}

#[test]
fn test_generator_is_shareable_across_threads() {
    let generator = std::sync::Arc::new(AssignmentGenerator::default());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let generator = std::sync::Arc::clone(&generator);
            std::thread::spawn(move || {
                let members: Vec<Member> = (0..6).map(|i| Member::giver(format!("t{}-{}", t, i))).collect();
                for _ in 0..50 {
                    let set = generator.generate(&members).unwrap();
                    assert_valid(&members, &set);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
