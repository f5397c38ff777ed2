//! Game configuration: axes, payouts, scores.
//!
//! One singleton document for the whole pool. Administrator writes are
//! partial merges into this document; only a restart replaces it wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::store::Document;

/// One of the four fixed scoring checkpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// All quarters in game order.
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        f.write_str(label)
    }
}

/// A permutation of the digits 0-9 assigned to one team, mapping
/// score-unit digits to grid rows or columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis([u8; 10]);

impl Axis {
    /// Wrap ten digits as an axis.
    ///
    /// Generation always produces a valid permutation; axes decoded from
    /// the store are trusted as-is, and a downstream lookup miss resolves
    /// to an undetermined winner rather than an error.
    #[must_use]
    pub const fn new(digits: [u8; 10]) -> Self {
        Self(digits)
    }

    /// The digits in axis order.
    #[must_use]
    pub const fn digits(&self) -> [u8; 10] {
        self.0
    }

    /// Position of `digit` along this axis.
    #[must_use]
    pub fn position_of(&self, digit: u8) -> Option<usize> {
        self.0.iter().position(|&d| d == digit)
    }

    /// True if this axis contains each digit 0-9 exactly once.
    #[must_use]
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; 10];
        for &digit in &self.0 {
            let Some(slot) = seen.get_mut(digit as usize) else {
                return false;
            };
            if *slot {
                return false;
            }
            *slot = true;
        }
        true
    }
}

/// The pair of axis permutations assigned at game start, one per team.
///
/// `cols` is the home team's axis (column lookup), `rows` the away team's
/// (row lookup). Once present, immutable until an explicit restart; its
/// presence is what locks the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisAssignment {
    /// Row axis (away team).
    pub rows: Axis,
    /// Column axis (home team).
    pub cols: Axis,
}

/// Payout amount per quarter, in whole currency units.
///
/// Validated at write time (the four amounts sum to exactly 100); trusted
/// as-is once persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct PayoutTable {
    pub q1: u32,
    pub q2: u32,
    pub q3: u32,
    pub q4: u32,
}

impl PayoutTable {
    /// Create a payout table.
    #[must_use]
    pub const fn new(q1: u32, q2: u32, q3: u32, q4: u32) -> Self {
        Self { q1, q2, q3, q4 }
    }

    /// Sum of the four amounts.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.q1 + self.q2 + self.q3 + self.q4
    }

    /// Amount for one quarter.
    #[must_use]
    pub const fn amount(&self, quarter: Quarter) -> u32 {
        match quarter {
            Quarter::Q1 => self.q1,
            Quarter::Q2 => self.q2,
            Quarter::Q3 => self.q3,
            Quarter::Q4 => self.q4,
        }
    }
}

/// Score entry for one quarter, one value per team, as typed.
///
/// Score entry is user-typed free text; values that fail to parse are
/// "not yet known," not zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterScore {
    /// Home team's score entry (column axis).
    #[serde(default, deserialize_with = "score_field")]
    pub home: String,
    /// Away team's score entry (row axis).
    #[serde(default, deserialize_with = "score_field")]
    pub away: String,
}

impl QuarterScore {
    /// Create a score entry.
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    /// Both scores as integers, `None` if either is absent or unparseable.
    #[must_use]
    pub fn parsed(&self) -> Option<(u32, u32)> {
        let home = self.home.trim().parse().ok()?;
        let away = self.away.trim().parse().ok()?;
        Some((home, away))
    }
}

/// Accept score values stored as text or bare numbers.
fn score_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(raw) => raw,
        serde_json::Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

/// Scores per quarter. Entries may be partially filled.
pub type ScoreTable = BTreeMap<Quarter, QuarterScore>;

/// The singleton `config/game` document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfiguration {
    /// Axis permutations, once assigned. Absent while the grid is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<AxisAssignment>,
    /// Payout amounts per quarter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payouts: Option<PayoutTable>,
    /// Entered scores per quarter.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: ScoreTable,
}

impl GameConfiguration {
    /// True once axes are assigned: claims and unclaims are frozen.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.axes.is_some()
    }

    /// Rebuild from the stored document, `None`/absent meaning defaults.
    ///
    /// Decoding is lenient field by field: a malformed `axes`, `payouts`,
    /// or `scores` value degrades to its default instead of discarding the
    /// rest of the configuration.
    #[must_use]
    pub fn from_document(document: Option<&Document>) -> Self {
        let Some(serde_json::Value::Object(fields)) = document else {
            return Self::default();
        };
        Self {
            axes: fields
                .get("axes")
                .and_then(|value| serde_json::from_value(value.clone()).ok()),
            payouts: fields
                .get("payouts")
                .and_then(|value| serde_json::from_value(value.clone()).ok()),
            scores: fields
                .get("scores")
                .and_then(|value| serde_json::from_value(value.clone()).ok())
                .unwrap_or_default(),
        }
    }
}
