//! Option Payoff Functions
//!
//! European options only look at the terminal price, so payoffs take a
//! single `f64` rather than a path. The tracking phase still hands over
//! `path.last()`; the fast phase never materializes a path at all.
//!
//! - **Call**: max(S_T - K, 0)
//! - **Put**: max(K - S_T, 0)

use serde::{Deserialize, Serialize};
use std::fmt;

/// European option side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    #[default]
    Call,
    Put,
}

impl OptionKind {
    /// Undiscounted payoff at expiry for strike `k`.
    pub fn payoff(self, terminal: f64, k: f64) -> f64 {
        match self {
            OptionKind::Call => (terminal - k).max(0.0),
            OptionKind::Put => (k - terminal).max(0.0),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => write!(f, "call"),
            OptionKind::Put => write!(f, "put"),
        }
    }
}
