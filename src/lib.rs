//! # squares-pool
//!
//! Shared-grid state machine and scoring engine for a Super Bowl squares
//! pool: a 10×10 grid of claimable cells with a server-controlled transition
//! from "open for claims" to "locked with randomized axis labels," followed
//! by quarter-by-quarter score entry and automatic winner computation.
//!
//! ## Design Principles
//!
//! 1. **Store-Owned State**: the external document store is the single
//!    source of truth. Local views are full-rebuilt projections of each
//!    change notification, never incrementally patched.
//!
//! 2. **Pure Derived Views**: quarter winners and per-player tallies are
//!    recomputed on demand from (grid, configuration). No cached "winner"
//!    field exists to drift out of sync.
//!
//! 3. **Adapters at the Seams**: identity, authorization, and storage are
//!    traits (`IdentityProvider`, `AdminPolicy`, `DocumentStore`) with
//!    in-process implementations for tests and local use.
//!
//! ## Modules
//!
//! - `auth`: identities, the identity-provider adapter, admin policy
//! - `store`: document store adapter and in-memory implementation
//! - `model`: cells, claims, axes, payouts, scores, game configuration
//! - `engine`: claim engine, lifecycle controller, winner resolver, RNG
//! - `session`: per-client wiring of subscriptions and cached views

pub mod auth;
pub mod engine;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use crate::auth::{
    AdminPolicy, AuthError, AuthState, FixedEmailAdmin, Identity, IdentityProvider,
    LocalIdentityProvider,
};

pub use crate::error::PoolError;

pub use crate::model::{
    Axis, AxisAssignment, CellKey, Claim, GameConfiguration, PayoutTable, Quarter, QuarterScore,
    ScoreTable,
};

pub use crate::store::{
    CollectionSnapshot, Document, DocumentStore, MemoryStore, StoreError, SubscriptionId,
    Timestamp,
};

pub use crate::engine::{
    quarter_results, winner_for_quarter, ClaimEngine, GridState, LifecycleController, PlayerTally,
    PoolRng, QuarterOutcome, QuarterResult, RestartConfirmation, RestartReport,
    CONFIG_COLLECTION, CONFIG_DOC_ID, SQUARES_COLLECTION,
};

pub use crate::session::PoolSession;
