//! Determinism testing utilities.
//!
//! Provides a harness for verifying that battles produce identical results
//! given identical seeds and inputs.
//!
//! # Testing Strategy
//!
//! Replays and high-score verification depend on battles being fully
//! reproducible. Sources of non-determinism include:
//!
//! - **Floating-point math**: percentages are integer arithmetic in
//!   [`aurora_core::math`].
//!
//! - **HashMap iteration order**: state uses `BTreeMap`/`BTreeSet` only.
//!
//! - **System randomness**: every roll goes through
//!   [`aurora_core::rng::BattleRng`] seeded from a `u64`.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual processors with [`ScriptedRng`]
//! 2. **Property tests**: Random input sequences stay deterministic
//! 3. **Parallel tests**: Running N battles on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use aurora_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a computation several times and verify the hashes agree.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance by one step (receives the step index)
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: usize,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, usize),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for index in 0..steps {
            step(&mut state, index);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Apply one recorded input to an engine.
pub fn apply_step<R: BattleRng>(battle: &mut Battle<R>, step: &ReplayStep) {
    match step {
        ReplayStep::Action {
            actor,
            kind,
            ability,
        } => {
            battle.dispatch(*actor, *kind, ability);
        }
        ReplayStep::AdvanceRound => {
            battle.advance_round();
        }
    }
}

/// Final state hash of a seeded battle after `inputs`.
#[must_use]
pub fn run_battle(seed: u64, inputs: &[ReplayStep]) -> u64 {
    let mut battle = Battle::seeded("Ada", "Bo", seed);
    for step in inputs {
        apply_step(&mut battle, step);
    }
    battle.state().state_hash()
}

/// Play the same seed and inputs `runs` times and compare final hashes.
#[must_use]
pub fn verify_battle_determinism(seed: u64, inputs: &[ReplayStep], runs: usize) -> DeterminismResult {
    verify_determinism(
        runs,
        inputs.len(),
        || Battle::seeded("Ada", "Bo", seed),
        |battle, index| apply_step(battle, &inputs[index]),
        |battle| battle.state().state_hash(),
    )
}

/// Play the same seed and inputs on `threads` scoped threads.
///
/// Catches state that leaks between threads or depends on scheduling.
#[must_use]
pub fn run_parallel_battles(seed: u64, inputs: &[ReplayStep], threads: usize) -> DeterminismResult {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| run_battle(seed, inputs)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: inputs.len(),
    }
}

/// Compare two runs step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match throughout, `Some(index)` of the first step
/// after which the states differ.
#[must_use]
pub fn find_first_divergence(seed: u64, inputs: &[ReplayStep]) -> Option<usize> {
    let mut first = Battle::seeded("Ada", "Bo", seed);
    let mut second = Battle::seeded("Ada", "Bo", seed);

    for (index, step) in inputs.iter().enumerate() {
        apply_step(&mut first, step);
        apply_step(&mut second, step);
        if first.state() != second.state() {
            return Some(index);
        }
    }
    None
}

/// Verify that a RON round-trip preserves the state exactly.
#[must_use]
pub fn verify_serialization_determinism(state: &BattleState) -> bool {
    let Ok(text) = ron::to_string(state) else {
        return false;
    };
    match ron::from_str::<BattleState>(&text) {
        Ok(restored) => restored.state_hash() == state.state_hash(),
        Err(err) => {
            tracing::warn!(%err, "State did not survive RON round-trip");
            false
        }
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle inputs.
pub mod strategies {
    use aurora_core::prelude::*;
    use proptest::prelude::*;

    /// Any actor.
    pub fn arb_actor() -> impl Strategy<Value = ActorRole> {
        prop_oneof![Just(ActorRole::Player1), Just(ActorRole::Player2)]
    }

    /// Any action kind, legal for the actor or not.
    pub fn arb_kind() -> impl Strategy<Value = ActionKind> {
        prop_oneof![
            Just(ActionKind::Attack),
            Just(ActionKind::Defend),
            Just(ActionKind::Item),
            Just(ActionKind::Skip),
        ]
    }

    /// Any built-in ability or item name, plus an unknown one.
    pub fn arb_ability_name() -> impl Strategy<Value = String> {
        let content = ContentTables::builtin();
        let names: Vec<String> = content
            .offensive
            .iter()
            .chain(&content.defensive)
            .map(|a| a.name.clone())
            .chain(content.items.iter().map(|i| i.name.clone()))
            .chain(std::iter::once("Unknown Exploit".to_string()))
            .collect();
        proptest::sample::select(names)
    }

    /// A well-formed action for whoever's turn it is, or a random one.
    pub fn arb_step() -> impl Strategy<Value = ReplayStep> {
        prop_oneof![
            8 => (arb_actor(), arb_kind(), arb_ability_name()).prop_map(|(actor, kind, ability)| {
                ReplayStep::Action { actor, kind, ability }
            }),
            1 => Just(ReplayStep::AdvanceRound),
        ]
    }

    /// A legal action for `actor` with a built-in ability.
    pub fn arb_legal_action(actor: ActorRole) -> impl Strategy<Value = ReplayStep> {
        let role = actor.role();
        let abilities: Vec<String> = get_abilities_for_role(role)
            .iter()
            .map(|a| a.name.clone())
            .collect();
        let kind = match role {
            PlayerRole::Offense => ActionKind::Attack,
            PlayerRole::Defense => ActionKind::Defend,
        };
        prop_oneof![
            3 => proptest::sample::select(abilities).prop_map(move |ability| {
                ReplayStep::Action { actor, kind, ability }
            }),
            1 => Just(ReplayStep::Action {
                actor,
                kind: ActionKind::Skip,
                ability: String::new(),
            }),
        ]
    }

    /// Sequence of steps.
    pub fn arb_step_sequence(max_len: usize) -> impl Strategy<Value = Vec<ReplayStep>> {
        proptest::collection::vec(arb_step(), 0..max_len)
    }

    /// Sequence of alternating legal player 1 / player 2 turns.
    pub fn arb_turn_sequence(max_turns: usize) -> impl Strategy<Value = Vec<ReplayStep>> {
        proptest::collection::vec(
            (
                arb_legal_action(ActorRole::Player1),
                arb_legal_action(ActorRole::Player2),
            ),
            1..max_turns,
        )
        .prop_map(|turns| {
            turns
                .into_iter()
                .flat_map(|(first, second)| [first, second, ReplayStep::AdvanceRound])
                .collect()
        })
    }
}
