//! Pool engine: claim rules, game lifecycle, winner resolution, axis RNG.
//!
//! The engine mutates only through the document store; it holds no state
//! of its own beyond the snapshots callers pass in.

pub mod claims;
pub mod grid;
pub mod lifecycle;
pub mod rng;
pub mod winner;

pub use claims::ClaimEngine;
pub use grid::{GridState, PlayerTally};
pub use lifecycle::{LifecycleController, RestartConfirmation, RestartReport};
pub use rng::PoolRng;
pub use winner::{quarter_results, winner_for_quarter, QuarterOutcome, QuarterResult};

/// Collection holding up to 100 claim documents keyed `"{row}_{col}"`.
pub const SQUARES_COLLECTION: &str = "squares";

/// Collection holding the singleton configuration document.
pub const CONFIG_COLLECTION: &str = "config";

/// Fixed id of the configuration document.
pub const CONFIG_DOC_ID: &str = "game";
