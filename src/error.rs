//! Error taxonomy for pool operations.
//!
//! Three kinds of failure, per the error-handling design:
//!
//! - **Validation errors**: a precondition was not met. Reported to the
//!   caller immediately, never retried, no partial effect.
//! - **Connectivity errors**: the store rejected the operation. Wrapped as
//!   [`PoolError::Store`], logged by the caller, not retried.
//! - **Data-integrity anomalies** (malformed scores, axis lookup misses)
//!   are NOT errors: they surface as `Undetermined` outcomes or skipped
//!   documents elsewhere in the crate.

use crate::store::StoreError;

/// Error returned by claim and lifecycle operations.
///
/// No variant is fatal to the process; every failure is scoped to the
/// single requested action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The caller is anonymous; claiming requires a signed-in identity.
    #[error("not signed in")]
    NotSignedIn,

    /// Axes are assigned; squares can no longer change hands.
    #[error("the game has started; squares are locked")]
    GameLocked,

    /// The target cell already has an owner (first-writer-wins).
    #[error("this square has already been taken")]
    CellAlreadyOwned,

    /// The target cell is absent or owned by someone else.
    #[error("this square is not yours to release")]
    NotCellOwner,

    /// `start_game` requires all 100 cells to be claimed.
    #[error("all 100 squares must be filled before the game can start ({filled} filled)")]
    GridIncomplete { filled: usize },

    /// The four quarter payouts must total exactly 100.
    #[error("quarter payouts must total exactly 100 (got {total})")]
    PayoutSumInvalid { total: u32 },

    /// The caller is not the administrator.
    #[error("administrator access required")]
    NotAuthorized,

    /// The store rejected the operation (transient connectivity).
    #[error(transparent)]
    Store(#[from] StoreError),
}
