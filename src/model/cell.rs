//! Grid cells and ownership claims.

use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::store::{Document, Timestamp};

/// Cells per grid axis.
pub const GRID_SIDE: u8 = 10;

/// Position of one cell, row and column each in [0, 9].
///
/// The cell's document id is `"{row}_{col}"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    row: u8,
    col: u8,
}

impl CellKey {
    /// Create a cell key.
    ///
    /// Panics if either coordinate is out of range; out-of-range cells are
    /// a programmer error, not user input.
    #[must_use]
    pub fn new(row: u8, col: u8) -> Self {
        assert!(row < GRID_SIDE, "row out of range: {row}");
        assert!(col < GRID_SIDE, "col out of range: {col}");
        Self { row, col }
    }

    /// Row index, in [0, 9].
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Column index, in [0, 9].
    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// Document id for this cell.
    #[must_use]
    pub fn doc_id(self) -> String {
        format!("{}_{}", self.row, self.col)
    }

    /// Parse a document id back into a cell key.
    ///
    /// Returns `None` for anything that is not a valid `"{row}_{col}"`
    /// within range; callers skip such documents.
    #[must_use]
    pub fn parse_doc_id(id: &str) -> Option<Self> {
        let (row, col) = id.split_once('_')?;
        let row: u8 = row.parse().ok()?;
        let col: u8 = col.parse().ok()?;
        if row < GRID_SIDE && col < GRID_SIDE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Iterate all 100 cell keys in row-major order.
    pub fn all() -> impl Iterator<Item = CellKey> {
        (0..GRID_SIDE).flat_map(|row| (0..GRID_SIDE).map(move |col| CellKey { row, col }))
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Ownership record for one grid cell.
///
/// Claims are replace-or-delete, never patched: a successful claim creates
/// one, a successful unclaim deletes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Stable identity of the claiming user. Immutable once set.
    pub owner_id: String,
    /// Display name at time of claim. A snapshot, not live-updated.
    pub owner_name: String,
    /// Row of the claimed cell.
    pub row: u8,
    /// Column of the claimed cell.
    pub col: u8,
    /// Store-assigned claim time. Display/audit only.
    #[serde(default)]
    pub claimed_at: Timestamp,
}

impl Claim {
    /// Build the claim written when `owner` takes `cell`.
    #[must_use]
    pub fn new(cell: CellKey, owner: &Identity, claimed_at: Timestamp) -> Self {
        Self {
            owner_id: owner.id.clone(),
            owner_name: owner.display_name.clone(),
            row: cell.row(),
            col: cell.col(),
            claimed_at,
        }
    }

    /// The claimed cell.
    #[must_use]
    pub fn cell(&self) -> CellKey {
        CellKey::new(self.row, self.col)
    }

    /// Decode a stored document, `None` if malformed.
    #[must_use]
    pub fn from_document(document: &Document) -> Option<Self> {
        serde_json::from_value(document.clone()).ok()
    }

    /// Encode for storage.
    #[must_use]
    pub fn to_document(&self) -> Document {
        serde_json::to_value(self).unwrap_or_default()
    }
}
