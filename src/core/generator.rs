use std::fmt;
use std::str::FromStr;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::core::{
    derangement,
    swap_repair,
    validation::{validate_members, verify_assignments},
};
use crate::models::{AssignmentSet, Member};

/// Errors reported by the assignment generator
///
/// None of these are retried internally. Calling `generate` again draws
/// fresh randomness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("At least 2 members are required, got {count}")]
    InsufficientMembers { count: usize },

    #[error("No member is eligible to give gifts")]
    NoEligibleGivers,

    #[error("Could not avoid assigning {giver_id} to themself")]
    UnresolvableAssignment { giver_id: String },

    #[error("Member {id} appears more than once")]
    DuplicateMember { id: String },

    #[error("Generated assignments are inconsistent: {0}")]
    Inconsistent(String),
}

/// How receivers are drawn for each giver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Random permutation with no giver as a fixed point; receivers never repeat
    #[default]
    Derangement,
    /// Shuffle, then swap with the next slot on a self-match
    SwapRepair,
}

impl fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStrategy::Derangement => write!(f, "derangement"),
            AssignmentStrategy::SwapRepair => write!(f, "swap_repair"),
        }
    }
}

impl FromStr for AssignmentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "derangement" => Ok(AssignmentStrategy::Derangement),
            "swap_repair" => Ok(AssignmentStrategy::SwapRepair),
            other => Err(format!(
                "unknown assignment strategy '{}', expected derangement or swap_repair",
                other
            )),
        }
    }
}

/// Pairs every giver-eligible member with a receiver from the whole group
///
/// The generator is stateless: each call re-derives everything from the
/// member list it is given, so one instance can be shared freely across
/// threads and requests.
#[derive(Debug, Clone)]
pub struct AssignmentGenerator {
    strategy: AssignmentStrategy,
    max_attempts: u32,
}

impl AssignmentGenerator {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

    pub fn new(strategy: AssignmentStrategy, max_attempts: u32) -> Self {
        Self { strategy, max_attempts }
    }

    pub fn with_strategy(strategy: AssignmentStrategy) -> Self {
        Self::new(strategy, Self::DEFAULT_MAX_ATTEMPTS)
    }

    pub fn strategy(&self) -> AssignmentStrategy {
        self.strategy
    }

    /// Generate assignments using a fresh entropy-seeded RNG
    ///
    /// # Errors
    /// * `InsufficientMembers` - fewer than 2 members
    /// * `DuplicateMember` - two members share an id
    /// * `NoEligibleGivers` - nobody may give
    /// * `UnresolvableAssignment` - swap repair could not avoid a self-match
    pub fn generate(&self, members: &[Member]) -> Result<AssignmentSet, AssignmentError> {
        let mut rng = StdRng::from_entropy();
        self.generate_with_rng(members, &mut rng)
    }

    /// Generate assignments drawing randomness from `rng`
    ///
    /// Either a complete, verified set is returned or an error; never a
    /// partial set.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        members: &[Member],
        rng: &mut R,
    ) -> Result<AssignmentSet, AssignmentError> {
        let givers = validate_members(members)?;

        let set = match self.strategy {
            AssignmentStrategy::Derangement => derangement::assign(members, rng, self.max_attempts)?,
            AssignmentStrategy::SwapRepair => swap_repair::assign(&givers, members, rng)?,
        };

        verify_assignments(members, &set)?;

        Ok(set)
    }
}

impl Default for AssignmentGenerator {
    fn default() -> Self {
        Self::with_strategy(AssignmentStrategy::default())
    }
}
