//! Claim engine: claim and unclaim of grid cells.
//!
//! Both operations are optimistic: preconditions are checked against the
//! caller's current snapshot, then a plain write is issued. There is no
//! compare-and-swap at the store, so two simultaneous first claims on the
//! same free cell race and the store keeps whichever write lands last.
//! That residual window is a documented property of the system, not
//! something this engine papers over; post-conditions re-verify on the
//! next state refresh.

use std::sync::Arc;

use tracing::debug;

use crate::auth::AuthState;
use crate::error::PoolError;
use crate::model::{CellKey, Claim, GameConfiguration};
use crate::store::DocumentStore;

use super::grid::GridState;
use super::SQUARES_COLLECTION;

/// Business rules for square ownership.
pub struct ClaimEngine {
    store: Arc<dyn DocumentStore>,
}

impl ClaimEngine {
    /// Create an engine over the shared store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Claim a free cell for the caller.
    ///
    /// Rejected with [`PoolError::GameLocked`] once axes are assigned,
    /// [`PoolError::CellAlreadyOwned`] if the cell is occupied (including
    /// by the caller: a repeat claim is an error, not a no-op), and
    /// [`PoolError::NotSignedIn`] for anonymous callers.
    pub fn claim(
        &self,
        grid: &GridState,
        config: &GameConfiguration,
        cell: CellKey,
        caller: &AuthState,
    ) -> Result<Claim, PoolError> {
        if config.is_locked() {
            return Err(PoolError::GameLocked);
        }
        if grid.claim_at(cell).is_some() {
            return Err(PoolError::CellAlreadyOwned);
        }
        let identity = caller.identity().ok_or(PoolError::NotSignedIn)?;

        let claim = Claim::new(cell, identity, self.store.server_timestamp());
        self.store
            .put(SQUARES_COLLECTION, &cell.doc_id(), claim.to_document(), false)?;
        debug!(cell = %cell, owner = %identity.id, "cell claimed");
        Ok(claim)
    }

    /// Release a cell the caller owns.
    ///
    /// Rejected with [`PoolError::GameLocked`] once axes are assigned,
    /// [`PoolError::NotSignedIn`] for anonymous callers, and
    /// [`PoolError::NotCellOwner`] when the cell is free or held by
    /// someone else.
    pub fn unclaim(
        &self,
        grid: &GridState,
        config: &GameConfiguration,
        cell: CellKey,
        caller: &AuthState,
    ) -> Result<(), PoolError> {
        if config.is_locked() {
            return Err(PoolError::GameLocked);
        }
        let identity = caller.identity().ok_or(PoolError::NotSignedIn)?;
        match grid.claim_at(cell) {
            Some(claim) if claim.owner_id == identity.id => {
                self.store.delete(SQUARES_COLLECTION, &cell.doc_id())?;
                debug!(cell = %cell, owner = %identity.id, "cell released");
                Ok(())
            }
            _ => Err(PoolError::NotCellOwner),
        }
    }
}
