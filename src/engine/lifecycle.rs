//! Game lifecycle: start, restart, payout and score entry.
//!
//! Every operation is administrator-only, gated by the injected
//! [`AdminPolicy`]. No other component writes axes, payouts, or scores.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::auth::{AdminPolicy, AuthState, Identity};
use crate::error::PoolError;
use crate::model::{AxisAssignment, GameConfiguration, PayoutTable, ScoreTable};
use crate::store::DocumentStore;

use super::grid::GridState;
use super::rng::PoolRng;
use super::{CONFIG_COLLECTION, CONFIG_DOC_ID, SQUARES_COLLECTION};

/// Explicit confirmation step required before a restart executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartConfirmation {
    Confirmed,
    Cancelled,
}

/// What a restart actually cleared.
///
/// Deletions are issued independently per cell; failures leave the grid
/// partially cleared, an accepted and manually-recoverable state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestartReport {
    pub cells_deleted: usize,
    pub cells_failed: usize,
}

/// Administrator-only lifecycle operations.
pub struct LifecycleController {
    store: Arc<dyn DocumentStore>,
    policy: Arc<dyn AdminPolicy>,
}

impl LifecycleController {
    /// Create a controller over the shared store with an authorization
    /// policy.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, policy: Arc<dyn AdminPolicy>) -> Self {
        Self { store, policy }
    }

    fn authorize<'a>(&self, caller: &'a AuthState) -> Result<&'a Identity, PoolError> {
        match caller.identity() {
            Some(identity) if self.policy.is_administrator(identity) => Ok(identity),
            _ => Err(PoolError::NotAuthorized),
        }
    }

    /// Assign random axes and lock the grid.
    ///
    /// Requires a fully filled grid ([`PoolError::GridIncomplete`]) and no
    /// existing assignment ([`PoolError::GameLocked`]: axes are assigned
    /// exactly once per game). Merges only the `axes` field, preserving
    /// payouts and scores already entered.
    pub fn start_game(
        &self,
        grid: &GridState,
        config: &GameConfiguration,
        caller: &AuthState,
        rng: &mut PoolRng,
    ) -> Result<AxisAssignment, PoolError> {
        self.authorize(caller)?;
        if config.is_locked() {
            return Err(PoolError::GameLocked);
        }
        if !grid.is_full() {
            return Err(PoolError::GridIncomplete {
                filled: grid.filled_count(),
            });
        }

        // Two independent draws, one permutation per team.
        let axes = AxisAssignment {
            rows: rng.random_axis(),
            cols: rng.random_axis(),
        };
        self.store.put(
            CONFIG_COLLECTION,
            CONFIG_DOC_ID,
            json!({ "axes": axes }),
            true,
        )?;
        info!(rows = ?axes.rows.digits(), cols = ?axes.cols.digits(), "game started, axes assigned");
        Ok(axes)
    }

    /// Save the payout table.
    ///
    /// The four amounts must sum to exactly 100
    /// ([`PoolError::PayoutSumInvalid`] otherwise, nothing written).
    pub fn save_payouts(&self, table: PayoutTable, caller: &AuthState) -> Result<(), PoolError> {
        self.authorize(caller)?;
        let total = table.total();
        if total != 100 {
            return Err(PoolError::PayoutSumInvalid { total });
        }
        self.store.put(
            CONFIG_COLLECTION,
            CONFIG_DOC_ID,
            json!({ "payouts": table }),
            true,
        )?;
        debug!(total, "payouts saved");
        Ok(())
    }

    /// Save entered quarter scores.
    ///
    /// No numeric validation: scores are free text and may describe
    /// blank or in-progress quarters. The `scores` field is replaced
    /// wholesale by the merge.
    pub fn save_scores(&self, table: &ScoreTable, caller: &AuthState) -> Result<(), PoolError> {
        self.authorize(caller)?;
        self.store.put(
            CONFIG_COLLECTION,
            CONFIG_DOC_ID,
            json!({ "scores": table }),
            true,
        )?;
        debug!(quarters = table.len(), "scores saved");
        Ok(())
    }

    /// Wipe every claim and the whole configuration.
    ///
    /// Returns `Ok(None)` without touching anything unless `confirmation`
    /// is [`RestartConfirmation::Confirmed`]. Cell deletions that fail are
    /// logged and counted but do not stop the remaining deletions or the
    /// config clear — the only wholesale (non-merge) write in the system.
    pub fn restart_game(
        &self,
        caller: &AuthState,
        confirmation: RestartConfirmation,
    ) -> Result<Option<RestartReport>, PoolError> {
        self.authorize(caller)?;
        if confirmation == RestartConfirmation::Cancelled {
            debug!("restart cancelled before execution");
            return Ok(None);
        }

        let squares = self.store.get_all(SQUARES_COLLECTION)?;
        let mut report = RestartReport::default();
        for id in squares.keys() {
            match self.store.delete(SQUARES_COLLECTION, id) {
                Ok(()) => report.cells_deleted += 1,
                Err(error) => {
                    warn!(id = id.as_str(), %error, "failed to delete square during restart");
                    report.cells_failed += 1;
                }
            }
        }

        self.store
            .put(CONFIG_COLLECTION, CONFIG_DOC_ID, json!({}), false)?;
        info!(
            deleted = report.cells_deleted,
            failed = report.cells_failed,
            "game restarted"
        );
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::FixedEmailAdmin;
    use crate::model::{CellKey, Claim, Quarter, QuarterScore};
    use crate::store::{MemoryStore, Timestamp};

    const ADMIN_EMAIL: &str = "commissioner@example.com";

    fn admin() -> AuthState {
        AuthState::SignedIn(Identity::new("u-admin", "The Commissioner", ADMIN_EMAIL))
    }

    fn player() -> AuthState {
        AuthState::SignedIn(Identity::new("u-player", "Some Player", "player@example.com"))
    }

    fn controller(store: &Arc<MemoryStore>) -> LifecycleController {
        LifecycleController::new(
            store.clone(),
            Arc::new(FixedEmailAdmin::new(ADMIN_EMAIL)),
        )
    }

    fn full_grid() -> GridState {
        let owner = Identity::new("u1", "Ann", "ann@example.com");
        GridState::from_claims(CellKey::all().map(|cell| Claim::new(cell, &owner, Timestamp(0))))
    }

    fn stored_config(store: &MemoryStore) -> GameConfiguration {
        GameConfiguration::from_document(store.get(CONFIG_COLLECTION, CONFIG_DOC_ID).unwrap().as_ref())
    }

    #[test]
    fn test_start_game_requires_full_grid() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);

        // 99 of 100 cells.
        let owner = Identity::new("u1", "Ann", "ann@example.com");
        let grid = GridState::from_claims(
            CellKey::all().skip(1).map(|cell| Claim::new(cell, &owner, Timestamp(0))),
        );

        let err = lifecycle
            .start_game(&grid, &GameConfiguration::default(), &admin(), &mut PoolRng::new(42))
            .unwrap_err();
        assert_eq!(err, PoolError::GridIncomplete { filled: 99 });
        assert!(!stored_config(&store).is_locked()); // no partial effect
    }

    #[test]
    fn test_start_game_assigns_valid_axes_and_preserves_config() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);

        lifecycle.save_payouts(PayoutTable::new(25, 25, 25, 25), &admin()).unwrap();

        let axes = lifecycle
            .start_game(&full_grid(), &GameConfiguration::default(), &admin(), &mut PoolRng::new(42))
            .unwrap();
        assert!(axes.rows.is_permutation());
        assert!(axes.cols.is_permutation());

        let config = stored_config(&store);
        assert_eq!(config.axes, Some(axes));
        // Existing payouts survive the merge.
        assert_eq!(config.payouts, Some(PayoutTable::new(25, 25, 25, 25)));
    }

    #[test]
    fn test_start_game_is_once_only() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);
        let mut rng = PoolRng::new(42);

        lifecycle
            .start_game(&full_grid(), &GameConfiguration::default(), &admin(), &mut rng)
            .unwrap();
        let config = stored_config(&store);

        let err = lifecycle
            .start_game(&full_grid(), &config, &admin(), &mut rng)
            .unwrap_err();
        assert_eq!(err, PoolError::GameLocked);
        assert_eq!(stored_config(&store), config); // axes unchanged
    }

    #[test]
    fn test_save_payouts_validates_sum() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);

        lifecycle.save_payouts(PayoutTable::new(25, 25, 25, 25), &admin()).unwrap();
        assert_eq!(stored_config(&store).payouts, Some(PayoutTable::new(25, 25, 25, 25)));

        let err = lifecycle
            .save_payouts(PayoutTable::new(25, 25, 25, 30), &admin())
            .unwrap_err();
        assert_eq!(err, PoolError::PayoutSumInvalid { total: 105 });
        // Prior payouts untouched.
        assert_eq!(stored_config(&store).payouts, Some(PayoutTable::new(25, 25, 25, 25)));
    }

    #[test]
    fn test_save_scores_accepts_anything() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);

        let mut scores = ScoreTable::new();
        scores.insert(Quarter::Q1, QuarterScore::new("24", "17"));
        scores.insert(Quarter::Q2, QuarterScore::new("", "in progress"));
        lifecycle.save_scores(&scores, &admin()).unwrap();

        assert_eq!(stored_config(&store).scores, scores);
    }

    #[test]
    fn test_save_scores_replaces_field_wholesale() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);

        let mut first = ScoreTable::new();
        first.insert(Quarter::Q1, QuarterScore::new("7", "3"));
        lifecycle.save_scores(&first, &admin()).unwrap();

        let mut second = ScoreTable::new();
        second.insert(Quarter::Q2, QuarterScore::new("14", "10"));
        lifecycle.save_scores(&second, &admin()).unwrap();

        let config = stored_config(&store);
        assert_eq!(config.scores, second);
        assert!(!config.scores.contains_key(&Quarter::Q1));
    }

    #[test]
    fn test_restart_clears_everything() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);

        for cell in CellKey::all() {
            let owner = Identity::new("u1", "Ann", "ann@example.com");
            store
                .put(
                    SQUARES_COLLECTION,
                    &cell.doc_id(),
                    Claim::new(cell, &owner, Timestamp(0)).to_document(),
                    false,
                )
                .unwrap();
        }
        lifecycle.save_payouts(PayoutTable::new(25, 25, 25, 25), &admin()).unwrap();
        lifecycle
            .start_game(&full_grid(), &GameConfiguration::default(), &admin(), &mut PoolRng::new(1))
            .unwrap();

        let report = lifecycle
            .restart_game(&admin(), RestartConfirmation::Confirmed)
            .unwrap()
            .unwrap();
        assert_eq!(report, RestartReport { cells_deleted: 100, cells_failed: 0 });

        assert!(store.get_all(SQUARES_COLLECTION).unwrap().is_empty());
        let config = stored_config(&store);
        assert_eq!(config, GameConfiguration::default());
    }

    #[test]
    fn test_restart_requires_confirmation() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);
        store
            .put(SQUARES_COLLECTION, "0_0", serde_json::json!({}), false)
            .unwrap();

        let outcome = lifecycle
            .restart_game(&admin(), RestartConfirmation::Cancelled)
            .unwrap();
        assert_eq!(outcome, None);
        assert_eq!(store.get_all(SQUARES_COLLECTION).unwrap().len(), 1);
    }

    #[test]
    fn test_every_operation_is_admin_gated() {
        let store = MemoryStore::shared();
        let lifecycle = controller(&store);
        let mut rng = PoolRng::new(42);

        for caller in [player(), AuthState::Anonymous] {
            assert_eq!(
                lifecycle
                    .start_game(&full_grid(), &GameConfiguration::default(), &caller, &mut rng)
                    .unwrap_err(),
                PoolError::NotAuthorized
            );
            assert_eq!(
                lifecycle
                    .save_payouts(PayoutTable::new(25, 25, 25, 25), &caller)
                    .unwrap_err(),
                PoolError::NotAuthorized
            );
            assert_eq!(
                lifecycle.save_scores(&ScoreTable::new(), &caller).unwrap_err(),
                PoolError::NotAuthorized
            );
            assert_eq!(
                lifecycle
                    .restart_game(&caller, RestartConfirmation::Confirmed)
                    .unwrap_err(),
                PoolError::NotAuthorized
            );
        }
        // Nothing was written.
        assert!(store.get(CONFIG_COLLECTION, CONFIG_DOC_ID).unwrap().is_none());
    }
}
