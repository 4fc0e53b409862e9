//! Match shapes: groups for the pre-Swiss phases and unordered duel pairs.

use crate::models::candidate::CandidateName;
use serde::{Deserialize, Serialize};

/// Candidates compared together; the user names one winner.
pub type Group = Vec<CandidateName>;

/// Unordered pair of candidates that already duelled. Always stored sorted,
/// including when read back from a saved session.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "(CandidateName, CandidateName)")]
pub struct PairKey(CandidateName, CandidateName);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            PairKey(a.to_owned(), b.to_owned())
        } else {
            PairKey(b.to_owned(), a.to_owned())
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }
}

impl From<(CandidateName, CandidateName)> for PairKey {
    fn from((a, b): (CandidateName, CandidateName)) -> Self {
        PairKey::new(&a, &b)
    }
}
