//! Pure alert decisions over the two most recent daily snapshots.

use crate::db::entity::price_snapshot;
use crate::enums::{ Condition, ConditionKind };

/// Prices of the previous and latest snapshot of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePair {
    pub previous: i64,
    pub latest: i64,
}

impl PricePair {
    /// Build from snapshots ordered newest first. `None` with fewer than two,
    /// so a product's first observation never triggers anything.
    pub fn from_latest(snapshots: &[price_snapshot::Model]) -> Option<Self> {
        match snapshots {
            [latest, previous, ..] => Some(Self {
                previous: previous.price,
                latest: latest.price,
            }),
            _ => None,
        }
    }
}

/// Whether a whole condition class fires regardless of thresholds.
/// `Equal` is decided per condition and always returns false here.
pub fn class_triggered(kind: ConditionKind, pair: PricePair) -> bool {
    match kind {
        ConditionKind::LessThan => pair.latest < pair.previous,
        ConditionKind::GreaterThan => pair.latest > pair.previous,
        ConditionKind::Equal => false,
    }
}

pub fn qualifies(condition: Condition, pair: PricePair) -> bool {
    match condition {
        Condition::LessThan | Condition::GreaterThan => class_triggered(condition.kind(), pair),
        Condition::Equal { threshold } => pair.latest <= threshold,
    }
}

/// Keep the entries whose condition qualifies, preserving order.
pub fn evaluate<T>(pair: PricePair, candidates: Vec<(Condition, T)>) -> Vec<(Condition, T)> {
    candidates
        .into_iter()
        .filter(|(condition, _)| qualifies(*condition, pair))
        .collect()
}
