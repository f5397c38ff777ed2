//! Per-client session: subscriptions, cached views, and operations bound
//! to the current identity.
//!
//! One-way data flow: operations write to the store, the store's change
//! feed flows back into the cached [`GridState`] and [`GameConfiguration`],
//! and every derived view recomputes from those caches. Each notification
//! replaces the cached view wholesale; staleness is bounded only by
//! notification latency, never by merge logic.
//!
//! Overlapping operations from one client are the caller's responsibility
//! to serialize; across clients the store is the sole arbiter of ordering.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::auth::{AdminPolicy, AuthError, AuthState, Identity, IdentityProvider};
use crate::engine::{
    quarter_results, winner_for_quarter, ClaimEngine, GridState, LifecycleController, PlayerTally,
    PoolRng, QuarterOutcome, QuarterResult, RestartConfirmation, RestartReport,
    CONFIG_COLLECTION, CONFIG_DOC_ID, SQUARES_COLLECTION,
};
use crate::error::PoolError;
use crate::model::{AxisAssignment, CellKey, Claim, GameConfiguration, PayoutTable, Quarter, ScoreTable};
use crate::store::{DocumentStore, SubscriptionId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A client's connection to the pool.
///
/// Dropping the session releases its store subscriptions. In-flight
/// single-shot operations are not cancellable once issued.
pub struct PoolSession {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn IdentityProvider>,
    claims: ClaimEngine,
    lifecycle: LifecycleController,
    grid: Arc<Mutex<GridState>>,
    config: Arc<Mutex<GameConfiguration>>,
    rng: Mutex<PoolRng>,
    subscriptions: Vec<SubscriptionId>,
}

impl PoolSession {
    /// Connect: read the current state, then subscribe to both feeds.
    ///
    /// `rng` seeds axis generation; pass [`PoolRng::from_entropy`] outside
    /// of tests.
    pub fn connect(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn IdentityProvider>,
        policy: Arc<dyn AdminPolicy>,
        rng: PoolRng,
    ) -> Result<Self, PoolError> {
        let grid = Arc::new(Mutex::new(GridState::from_snapshot(
            &store.get_all(SQUARES_COLLECTION)?,
        )));
        let config = Arc::new(Mutex::new(GameConfiguration::from_document(
            store.get(CONFIG_COLLECTION, CONFIG_DOC_ID)?.as_ref(),
        )));

        let grid_cache = Arc::clone(&grid);
        let grid_subscription = store.subscribe_collection(
            SQUARES_COLLECTION,
            Box::new(move |snapshot| {
                *lock(&grid_cache) = GridState::from_snapshot(snapshot);
            }),
        );

        let config_cache = Arc::clone(&config);
        let config_subscription = store.subscribe_document(
            CONFIG_COLLECTION,
            CONFIG_DOC_ID,
            Box::new(move |document| {
                *lock(&config_cache) = GameConfiguration::from_document(document);
            }),
        );

        debug!("session connected");
        Ok(Self {
            claims: ClaimEngine::new(Arc::clone(&store)),
            lifecycle: LifecycleController::new(Arc::clone(&store), policy),
            store,
            provider,
            grid,
            config,
            rng: Mutex::new(rng),
            subscriptions: vec![grid_subscription, config_subscription],
        })
    }

    // === Cached Views ===

    /// Latest observed grid state.
    #[must_use]
    pub fn grid(&self) -> GridState {
        lock(&self.grid).clone()
    }

    /// Latest observed game configuration.
    #[must_use]
    pub fn config(&self) -> GameConfiguration {
        lock(&self.config).clone()
    }

    // === Identity ===

    /// Current authentication state.
    #[must_use]
    pub fn auth(&self) -> AuthState {
        self.provider.current()
    }

    /// Sign in via the identity provider.
    pub fn sign_in(&self) -> Result<Identity, AuthError> {
        self.provider.sign_in()
    }

    /// Sign out.
    pub fn sign_out(&self) {
        self.provider.sign_out();
    }

    // === Claims ===

    /// Claim a free cell for the signed-in caller.
    pub fn claim(&self, cell: CellKey) -> Result<Claim, PoolError> {
        let (grid, config) = (self.grid(), self.config());
        self.claims.claim(&grid, &config, cell, &self.provider.current())
    }

    /// Release a cell the signed-in caller owns.
    pub fn unclaim(&self, cell: CellKey) -> Result<(), PoolError> {
        let (grid, config) = (self.grid(), self.config());
        self.claims.unclaim(&grid, &config, cell, &self.provider.current())
    }

    // === Lifecycle (administrator only) ===

    /// Assign random axes and lock the grid.
    pub fn start_game(&self) -> Result<AxisAssignment, PoolError> {
        let (grid, config) = (self.grid(), self.config());
        let mut rng = lock(&self.rng);
        self.lifecycle
            .start_game(&grid, &config, &self.provider.current(), &mut rng)
    }

    /// Save the payout table.
    pub fn save_payouts(&self, table: PayoutTable) -> Result<(), PoolError> {
        self.lifecycle.save_payouts(table, &self.provider.current())
    }

    /// Save entered quarter scores.
    pub fn save_scores(&self, table: &ScoreTable) -> Result<(), PoolError> {
        self.lifecycle.save_scores(table, &self.provider.current())
    }

    /// Wipe every claim and the whole configuration.
    pub fn restart_game(
        &self,
        confirmation: RestartConfirmation,
    ) -> Result<Option<RestartReport>, PoolError> {
        self.lifecycle.restart_game(&self.provider.current(), confirmation)
    }

    // === Derived Views ===

    /// Winner for one quarter, from the latest cached state.
    #[must_use]
    pub fn winner_for(&self, quarter: Quarter) -> QuarterOutcome {
        let (grid, config) = (self.grid(), self.config());
        winner_for_quarter(quarter, &config, &grid)
    }

    /// All four quarters for the results view.
    #[must_use]
    pub fn results(&self) -> [QuarterResult; 4] {
        let (grid, config) = (self.grid(), self.config());
        quarter_results(&config, &grid)
    }

    /// Squares held per player.
    #[must_use]
    pub fn player_tally(&self) -> Vec<PlayerTally> {
        self.grid().player_tally()
    }
}

impl Drop for PoolSession {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            self.store.unsubscribe(subscription);
        }
        debug!("session disconnected");
    }
}
