//! Data model: cells, claims, axes, payouts, scores, game configuration.
//!
//! All persisted types are plain serde structs; the document layout is a
//! `squares` collection of up to 100 claims keyed `"{row}_{col}"` and a
//! single `config/game` document holding the [`GameConfiguration`].

pub mod cell;
pub mod config;

pub use cell::{CellKey, Claim, GRID_SIDE};
pub use config::{
    Axis, AxisAssignment, GameConfiguration, PayoutTable, Quarter, QuarterScore, ScoreTable,
};
