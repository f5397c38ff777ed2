//! End-to-end pool flow: claiming, locking, scoring, and restart across
//! multiple sessions sharing one store.

use std::sync::Arc;

use squares_pool::{
    AuthState, CellKey, FixedEmailAdmin, GridState, Identity, LocalIdentityProvider, MemoryStore,
    PayoutTable, PoolError, PoolRng, PoolSession, Quarter, QuarterOutcome, QuarterScore,
    RestartConfirmation, ScoreTable,
};

const ADMIN_EMAIL: &str = "commissioner@example.com";

fn connect(store: &Arc<MemoryStore>, identity: Identity, seed: u64) -> PoolSession {
    PoolSession::connect(
        store.clone(),
        Arc::new(LocalIdentityProvider::signed_in(identity)),
        Arc::new(FixedEmailAdmin::new(ADMIN_EMAIL)),
        PoolRng::new(seed),
    )
    .expect("connect")
}

fn admin_session(store: &Arc<MemoryStore>, seed: u64) -> PoolSession {
    connect(
        store,
        Identity::new("u-admin", "The Commissioner", ADMIN_EMAIL),
        seed,
    )
}

fn player_session(store: &Arc<MemoryStore>, n: u32) -> PoolSession {
    connect(
        store,
        Identity::new(format!("u{n}"), format!("Player {n}"), format!("p{n}@example.com")),
        n as u64,
    )
}

/// Claim every cell, alternating between the given sessions.
fn fill_grid(sessions: &[&PoolSession]) {
    for (index, cell) in CellKey::all().enumerate() {
        sessions[index % sessions.len()].claim(cell).expect("claim");
    }
}

#[test]
fn test_full_game_flow() {
    let store = MemoryStore::shared();
    let admin = admin_session(&store, 42);
    let ann = player_session(&store, 1);
    let bob = player_session(&store, 2);

    // Starting with a partial grid is rejected with no effect.
    ann.claim(CellKey::new(0, 0)).unwrap();
    let err = admin.start_game().unwrap_err();
    assert_eq!(err, PoolError::GridIncomplete { filled: 1 });
    assert!(!admin.config().is_locked());

    ann.unclaim(CellKey::new(0, 0)).unwrap();
    fill_grid(&[&ann, &bob]);
    assert!(admin.grid().is_full());

    // Payouts: invalid sum rejected, valid sum saved.
    let err = admin.save_payouts(PayoutTable::new(25, 25, 25, 30)).unwrap_err();
    assert_eq!(err, PoolError::PayoutSumInvalid { total: 105 });
    admin.save_payouts(PayoutTable::new(10, 20, 30, 40)).unwrap();

    // Start: axes become visible to every session and freeze the grid.
    let axes = admin.start_game().unwrap();
    assert!(axes.rows.is_permutation());
    assert!(axes.cols.is_permutation());
    assert_eq!(ann.config().axes, Some(axes));
    assert_eq!(ann.claim(CellKey::new(0, 0)).unwrap_err(), PoolError::GameLocked);
    assert_eq!(bob.unclaim(CellKey::new(0, 1)).unwrap_err(), PoolError::GameLocked);

    // Payouts entered earlier survived the axes merge.
    assert_eq!(admin.config().payouts, Some(PayoutTable::new(10, 20, 30, 40)));

    // Before scores are entered, every quarter is undetermined.
    for quarter in Quarter::ALL {
        assert_eq!(ann.winner_for(quarter), QuarterOutcome::Undetermined);
    }

    // Enter Q1 and resolve the winner from the returned axes.
    let mut scores = ScoreTable::new();
    scores.insert(Quarter::Q1, QuarterScore::new("24", "17"));
    admin.save_scores(&scores).unwrap();

    let col = axes.cols.position_of(4).unwrap() as u8; // 24 mod 10
    let row = axes.rows.position_of(7).unwrap() as u8; // 17 mod 10
    let expected = CellKey::new(row, col);

    let outcome = bob.winner_for(Quarter::Q1);
    let claim = outcome.winning_claim().expect("the grid is full, so someone won");
    assert_eq!(claim.cell(), expected);
    assert_eq!(ann.grid().claim_at(expected).unwrap(), claim);

    // The winner is a pure derivation: every session agrees.
    assert_eq!(ann.winner_for(Quarter::Q1), outcome);
    assert_eq!(admin.winner_for(Quarter::Q1), outcome);

    // Results view carries scores, payouts, and outcomes together.
    let results = admin.results();
    assert_eq!(results[0].payout, 10);
    assert_eq!(results[0].score, Some(QuarterScore::new("24", "17")));
    assert_eq!(results[1].outcome, QuarterOutcome::Undetermined);
}

#[test]
fn test_player_tally_tracks_claims() {
    let store = MemoryStore::shared();
    let ann = player_session(&store, 1);
    let bob = player_session(&store, 2);

    ann.claim(CellKey::new(0, 0)).unwrap();
    ann.claim(CellKey::new(0, 1)).unwrap();
    bob.claim(CellKey::new(5, 5)).unwrap();

    let tally = ann.player_tally();
    assert_eq!(tally.len(), 2);
    assert_eq!(tally[0].owner_id, "u1");
    assert_eq!(tally[0].squares, 2);
    assert_eq!(tally[1].owner_id, "u2");
    assert_eq!(tally[1].squares, 1);

    ann.unclaim(CellKey::new(0, 1)).unwrap();
    assert!(bob.player_tally().iter().all(|t| t.squares == 1));
}

#[test]
fn test_restart_wipes_grid_and_configuration() {
    let store = MemoryStore::shared();
    let admin = admin_session(&store, 7);
    let ann = player_session(&store, 1);

    fill_grid(&[&ann]);
    admin.save_payouts(PayoutTable::new(25, 25, 25, 25)).unwrap();
    admin.start_game().unwrap();

    let mut scores = ScoreTable::new();
    scores.insert(Quarter::Q1, QuarterScore::new("7", "3"));
    admin.save_scores(&scores).unwrap();

    // A cancelled restart changes nothing.
    assert_eq!(admin.restart_game(RestartConfirmation::Cancelled).unwrap(), None);
    assert!(admin.grid().is_full());

    let report = admin
        .restart_game(RestartConfirmation::Confirmed)
        .unwrap()
        .expect("confirmed restart executes");
    assert_eq!(report.cells_deleted, GridState::TOTAL_CELLS);
    assert_eq!(report.cells_failed, 0);

    // Both sessions observe an empty pool with default configuration.
    for session in [&admin, &ann] {
        assert_eq!(session.grid().filled_count(), 0);
        assert!(!session.config().is_locked());
        assert_eq!(session.config().payouts, None);
        assert!(session.config().scores.is_empty());
        assert_eq!(session.winner_for(Quarter::Q1), QuarterOutcome::Undetermined);
    }

    // The grid is open again.
    ann.claim(CellKey::new(4, 4)).unwrap();
}

#[test]
fn test_lifecycle_is_admin_only_through_sessions() {
    let store = MemoryStore::shared();
    let ann = player_session(&store, 1);

    fill_grid(&[&ann]);
    assert_eq!(ann.start_game().unwrap_err(), PoolError::NotAuthorized);
    assert_eq!(
        ann.save_payouts(PayoutTable::new(25, 25, 25, 25)).unwrap_err(),
        PoolError::NotAuthorized
    );
    assert_eq!(
        ann.restart_game(RestartConfirmation::Confirmed).unwrap_err(),
        PoolError::NotAuthorized
    );
    assert!(!ann.config().is_locked());
}

#[test]
fn test_anonymous_observer_sees_state_but_cannot_claim() {
    let store = MemoryStore::shared();
    let ann = player_session(&store, 1);
    ann.claim(CellKey::new(3, 3)).unwrap();

    let observer = PoolSession::connect(
        store.clone(),
        Arc::new(LocalIdentityProvider::new(Identity::new(
            "u-later",
            "Late Arrival",
            "late@example.com",
        ))),
        Arc::new(FixedEmailAdmin::new(ADMIN_EMAIL)),
        PoolRng::new(9),
    )
    .unwrap();

    assert_eq!(observer.auth(), AuthState::Anonymous);
    assert_eq!(observer.grid().filled_count(), 1);
    assert_eq!(observer.claim(CellKey::new(3, 4)).unwrap_err(), PoolError::NotSignedIn);
}

#[test]
fn test_connectivity_loss_surfaces_and_recovers() {
    let store = MemoryStore::shared();
    let ann = player_session(&store, 1);

    store.set_offline(true);
    let err = ann.claim(CellKey::new(6, 6)).unwrap_err();
    assert!(matches!(err, PoolError::Store(_)));

    // No retry happened behind the caller's back.
    store.set_offline(false);
    assert!(ann.grid().is_free(CellKey::new(6, 6)));
    ann.claim(CellKey::new(6, 6)).unwrap();
}
