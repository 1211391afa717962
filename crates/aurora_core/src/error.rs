//! Error types for the battle core.
//!
//! Player-facing failures (wrong turn, unknown ability, not enough energy)
//! never escape [`dispatch`](crate::battle::dispatch): the state machine
//! renders them into the battle log via their `Display` text. The remaining
//! variants cover content loading and replay files.

use thiserror::Error;

use crate::state::{ActionKind, ActorRole, Phase, TurnPhase};

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for the battle core.
#[derive(Debug, Error)]
pub enum BattleError {
    /// Actor and action kind do not combine (e.g. player 2 attacking).
    #[error("Invalid action: {actor} cannot {kind}.")]
    InvalidAction {
        /// Acting player.
        actor: ActorRole,
        /// Requested action.
        kind: ActionKind,
    },

    /// Malformed action request from a string-driven caller.
    #[error("Invalid action parameters: '{0}'.")]
    MalformedAction(String),

    /// The actor does not own the current turn phase.
    #[error("It is not {actor}'s turn (current phase: {turn_phase}).")]
    WrongTurn {
        /// Acting player.
        actor: ActorRole,
        /// Phase the battle is in.
        turn_phase: TurnPhase,
    },

    /// The round already ended.
    #[error("The battle is over ({0}); no further actions are accepted.")]
    BattleOver(Phase),

    /// Ability identifier not found for the actor's role.
    #[error("Ability '{0}' not found.")]
    UnknownAbility(String),

    /// Item identifier not found in Aurora's inventory.
    #[error("Item {0} not found in inventory.")]
    UnknownItem(String),

    /// Ability exists but cannot be used through the requested action.
    #[error("{ability} cannot be used to {kind}.")]
    AbilityMismatch {
        /// Ability name.
        ability: String,
        /// Requested action.
        kind: ActionKind,
    },

    /// Ability is still cooling down.
    #[error("{ability} is on cooldown for {turns} more turns.")]
    OnCooldown {
        /// Ability name.
        ability: String,
        /// Turns remaining.
        turns: u32,
    },

    /// Aurora lacks the energy to pay for the ability.
    #[error("Not enough energy to use {ability}. Need {required} energy.")]
    InsufficientEnergy {
        /// Ability name.
        ability: String,
        /// Energy cost.
        required: i32,
        /// Energy Aurora has.
        available: u32,
    },

    /// Content tables are missing an entry the game needs.
    #[error("Missing content: {0}")]
    MissingContent(String),

    /// Content tables failed validation.
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Replay file could not be written, read or verified.
    #[error("Replay error: {0}")]
    Replay(String),

    /// Underlying IO failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BattleError {
    /// Whether this error is an expected, player-caused rejection.
    ///
    /// These are logged at `debug` level; everything else at `warn`.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAction { .. }
                | Self::MalformedAction(_)
                | Self::WrongTurn { .. }
                | Self::BattleOver(_)
                | Self::UnknownAbility(_)
                | Self::UnknownItem(_)
                | Self::AbilityMismatch { .. }
                | Self::OnCooldown { .. }
                | Self::InsufficientEnergy { .. }
        )
    }
}
