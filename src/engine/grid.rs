//! Grid state: the 100-cell ownership map.
//!
//! A pure read-model over the `squares` collection. Every change
//! notification rebuilds the whole map from the snapshot; nothing is
//! patched incrementally, so the cached view can never drift from the
//! store beyond notification latency.

use im::HashMap as ImHashMap;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::model::{CellKey, Claim};
use crate::store::CollectionSnapshot;

/// Mapping from cell to claim; absence means the cell is free.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridState {
    cells: ImHashMap<CellKey, Claim>,
}

/// One row of the players view: squares held per owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerTally {
    pub owner_id: String,
    pub owner_name: String,
    pub squares: usize,
}

impl GridState {
    /// Cells in a full grid.
    pub const TOTAL_CELLS: usize = 100;

    /// Rebuild the grid from a full collection snapshot.
    ///
    /// Documents with unparseable ids or bodies, or whose body disagrees
    /// with the id about the cell, are skipped with a warning; a stray
    /// document must not poison the rest of the grid.
    #[must_use]
    pub fn from_snapshot(snapshot: &CollectionSnapshot) -> Self {
        let mut cells = ImHashMap::new();
        for (id, document) in snapshot {
            let Some(cell) = CellKey::parse_doc_id(id) else {
                warn!(id = id.as_str(), "skipping square document with malformed id");
                continue;
            };
            let Some(claim) = Claim::from_document(document) else {
                warn!(id = id.as_str(), "skipping malformed square document");
                continue;
            };
            if claim.cell() != cell {
                warn!(
                    id = id.as_str(),
                    claim_cell = %claim.cell(),
                    "skipping square document keyed under the wrong cell"
                );
                continue;
            }
            cells.insert(cell, claim);
        }
        Self { cells }
    }

    /// Build a grid directly from claims (views and tests).
    #[must_use]
    pub fn from_claims(claims: impl IntoIterator<Item = Claim>) -> Self {
        let cells = claims.into_iter().map(|claim| (claim.cell(), claim)).collect();
        Self { cells }
    }

    /// The claim at `cell`, if any.
    #[must_use]
    pub fn claim_at(&self, cell: CellKey) -> Option<&Claim> {
        self.cells.get(&cell)
    }

    /// True if `cell` has no owner.
    #[must_use]
    pub fn is_free(&self, cell: CellKey) -> bool {
        !self.cells.contains_key(&cell)
    }

    /// Number of claimed cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.len()
    }

    /// True once every cell is claimed.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.len() == Self::TOTAL_CELLS
    }

    /// Iterate all claims.
    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &Claim)> {
        self.cells.iter()
    }

    /// Squares held per player, most squares first, ties by name.
    ///
    /// Recomputed on demand; never cached.
    #[must_use]
    pub fn player_tally(&self) -> Vec<PlayerTally> {
        let mut counts: FxHashMap<&str, (&str, usize)> = FxHashMap::default();
        for claim in self.cells.values() {
            let entry = counts
                .entry(claim.owner_id.as_str())
                .or_insert((claim.owner_name.as_str(), 0));
            entry.1 += 1;
        }

        let mut tally: Vec<PlayerTally> = counts
            .into_iter()
            .map(|(owner_id, (owner_name, squares))| PlayerTally {
                owner_id: owner_id.to_string(),
                owner_name: owner_name.to_string(),
                squares,
            })
            .collect();
        tally.sort_by(|a, b| {
            b.squares
                .cmp(&a.squares)
                .then_with(|| a.owner_name.cmp(&b.owner_name))
        });
        tally
    }
}
