//! The resolution contract every game type implements.

use wager_types::{GameType, Outcome, Result, Seat, WagerError};

/// `apply(state, action, actor) -> (new_state, outcome)`.
///
/// Implementations never mutate `self`; a rejected action leaves the caller
/// holding the unchanged state. Once [`GameRules::outcome`] is terminal,
/// every further `apply` fails with [`WagerError::AlreadyResolved`].
pub trait GameRules: Clone {
    type Action;

    fn game_type(&self) -> GameType;

    /// Outcome reached so far.
    fn outcome(&self) -> Outcome;

    fn apply(&self, actor: Seat, action: &Self::Action) -> Result<(Self, Outcome)>;
}

/// Shared guard: no action is legal after a terminal outcome.
pub(crate) fn ensure_unresolved(outcome: Outcome) -> Result<()> {
    if outcome.is_terminal() {
        Err(WagerError::AlreadyResolved)
    } else {
        Ok(())
    }
}
