//! # Aggregation State
//!
//! Lifecycle of a single best-offer aggregation.
//!
//! ```text
//! Idle ──► Dispatched ──► AwaitingAll ──► Resolved(Success)
//!                                    └──► Resolved(AllFailed)
//! ```
//!
//! An aggregation with no enabled providers never leaves `Idle`.

use serde::Serialize;
use std::fmt;

/// How an aggregation resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    /// At least one provider produced a usable offer.
    Success,
    /// Every provider failed.
    AllFailed,
}

/// State of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationState {
    /// Nothing dispatched yet.
    Idle,
    /// One unit of work has been spawned per provider.
    Dispatched {
        /// Number of units spawned.
        providers: usize,
    },
    /// Waiting on the join barrier.
    AwaitingAll,
    /// Every unit has settled.
    Resolved(Resolution),
}

impl AggregationState {
    /// Returns true once every unit has settled.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns true if `next` is a legal successor of this state.
    #[must_use]
    pub fn can_transition_to(&self, next: &AggregationState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Dispatched { .. })
                | (Self::Dispatched { .. }, Self::AwaitingAll)
                | (Self::AwaitingAll, Self::Resolved(_))
        )
    }
}

impl fmt::Display for AggregationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("IDLE"),
            Self::Dispatched { providers } => write!(f, "DISPATCHED({providers})"),
            Self::AwaitingAll => f.write_str("AWAITING_ALL"),
            Self::Resolved(Resolution::Success) => f.write_str("RESOLVED(SUCCESS)"),
            Self::Resolved(Resolution::AllFailed) => f.write_str("RESOLVED(ALL_FAILED)"),
        }
    }
}
