//! Winner resolution: pure functions over (configuration, grid).
//!
//! A quarter's winner is the claim at the cell where the two score-unit
//! digits meet on the assigned axes. Nothing here is cached or stored;
//! every outcome is re-derivable at any time from its inputs, so there is
//! no second source of truth to desynchronize from the grid.

use crate::model::{CellKey, Claim, GameConfiguration, Quarter, QuarterScore};

use super::grid::GridState;

/// Result of resolving one quarter.
#[derive(Clone, Debug, PartialEq)]
pub enum QuarterOutcome {
    /// Axes absent, score missing or unparseable, or an axis lookup miss.
    Undetermined,
    /// The winning cell exists but nobody claimed it.
    Unclaimed { cell: CellKey },
    /// The claim holding the winning cell.
    Winner { claim: Claim },
}

impl QuarterOutcome {
    /// The winning claim, if one exists.
    #[must_use]
    pub fn winning_claim(&self) -> Option<&Claim> {
        match self {
            QuarterOutcome::Winner { claim } => Some(claim),
            _ => None,
        }
    }
}

/// Per-quarter summary for the results view.
#[derive(Clone, Debug, PartialEq)]
pub struct QuarterResult {
    pub quarter: Quarter,
    /// The score entry as typed, if any.
    pub score: Option<QuarterScore>,
    /// Payout amount, 0 if no table is saved.
    pub payout: u32,
    pub outcome: QuarterOutcome,
}

/// Resolve the winner for one quarter.
///
/// `col` comes from the home team's unit digit on the column axis, `row`
/// from the away team's unit digit on the row axis. A valid permutation
/// always satisfies both lookups; a miss means a corrupt axis and resolves
/// to [`QuarterOutcome::Undetermined`] rather than an error.
#[must_use]
pub fn winner_for_quarter(
    quarter: Quarter,
    config: &GameConfiguration,
    grid: &GridState,
) -> QuarterOutcome {
    let Some(axes) = &config.axes else {
        return QuarterOutcome::Undetermined;
    };
    let Some(entry) = config.scores.get(&quarter) else {
        return QuarterOutcome::Undetermined;
    };
    let Some((home, away)) = entry.parsed() else {
        return QuarterOutcome::Undetermined;
    };

    let home_unit = (home % 10) as u8;
    let away_unit = (away % 10) as u8;
    let (Some(col), Some(row)) = (
        axes.cols.position_of(home_unit),
        axes.rows.position_of(away_unit),
    ) else {
        return QuarterOutcome::Undetermined;
    };

    let cell = CellKey::new(row as u8, col as u8);
    match grid.claim_at(cell) {
        Some(claim) => QuarterOutcome::Winner { claim: claim.clone() },
        None => QuarterOutcome::Unclaimed { cell },
    }
}

/// Resolve all four quarters for the results view.
#[must_use]
pub fn quarter_results(config: &GameConfiguration, grid: &GridState) -> [QuarterResult; 4] {
    Quarter::ALL.map(|quarter| QuarterResult {
        quarter,
        score: config.scores.get(&quarter).cloned(),
        payout: config.payouts.map_or(0, |table| table.amount(quarter)),
        outcome: winner_for_quarter(quarter, config, grid),
    })
}
