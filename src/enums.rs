use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── Condition ───────────────────────────────────────────────────────

/// A user's alert rule on a tracked product.
///
/// `LessThan` and `GreaterThan` carry no threshold: they fire on any decrease
/// or increase between the two most recent daily snapshots. `Equal` fires once
/// the latest price is at or below its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    LessThan,
    GreaterThan,
    Equal {
        threshold: i64,
    },
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Condition::LessThan => ConditionKind::LessThan,
            Condition::GreaterThan => ConditionKind::GreaterThan,
            Condition::Equal { .. } => ConditionKind::Equal,
        }
    }

    pub fn threshold(&self) -> Option<i64> {
        match self {
            Condition::Equal { threshold } => Some(*threshold),
            _ => None,
        }
    }

    /// Rebuild from the stored `(kind, threshold)` pair.
    pub fn from_parts(kind: &str, threshold: Option<i64>) -> Result<Self, AppError> {
        match kind.parse::<ConditionKind>()? {
            ConditionKind::LessThan => Ok(Condition::LessThan),
            ConditionKind::GreaterThan => Ok(Condition::GreaterThan),
            ConditionKind::Equal => {
                let threshold = threshold.ok_or_else(|| {
                    AppError::InvalidInput("equal condition requires a threshold".to_string())
                })?;
                Ok(Condition::Equal { threshold })
            }
        }
    }
}

/// The discriminant stored in the database (no payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    LessThan,
    GreaterThan,
    Equal,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::LessThan => "less_than",
            ConditionKind::GreaterThan => "greater_than",
            ConditionKind::Equal => "equal",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "less_than" => Ok(ConditionKind::LessThan),
            "greater_than" => Ok(ConditionKind::GreaterThan),
            "equal" => Ok(ConditionKind::Equal),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid condition: {}. Supported: less_than, greater_than, equal",
                s
            ))),
        }
    }
}
