//! Candidate rating record, enrichment data, and the keys derived from it.

use serde::{Deserialize, Serialize};

/// Candidates are identified by their display name.
pub type CandidateName = String;

/// Data supplied by the enrichment provider. The core only reads it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enrichment {
    /// Count of display items available for the candidate.
    pub richness: u32,
    pub attribute: Option<String>,
    pub race: Option<String>,
}

impl Enrichment {
    pub fn new(richness: u32, attribute: Option<&str>, race: Option<&str>) -> Self {
        Self {
            richness,
            attribute: attribute.map(str::to_owned),
            race: race.map(str::to_owned),
        }
    }

    pub fn theme_key(&self) -> ThemeKey {
        ThemeKey::from_tags(self.attribute.as_deref(), self.race.as_deref())
    }
}

/// Coarse thematic clustering key built from the two categorical tags.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKey {
    /// At least one tag is known; a missing one stays `None`.
    Tagged {
        attribute: Option<String>,
        race: Option<String>,
    },
    /// Both tags missing: the catch-all cluster.
    Unknown,
}

impl ThemeKey {
    pub fn from_tags(attribute: Option<&str>, race: Option<&str>) -> Self {
        let clean = |t: Option<&str>| t.map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned);
        match (clean(attribute), clean(race)) {
            (None, None) => ThemeKey::Unknown,
            (attribute, race) => ThemeKey::Tagged { attribute, race },
        }
    }
}

/// Richness bucket; higher tiers are processed first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RichnessTier(pub u32);

impl RichnessTier {
    pub fn of(richness: u32, cap: u32) -> Self {
        RichnessTier(richness.min(cap))
    }
}

/// Rating record of one candidate.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub enrichment: Enrichment,
}

impl CandidateRecord {
    /// Fresh record at the given starting rating.
    pub fn new(initial_rating: i32) -> Self {
        Self {
            rating: initial_rating,
            wins: 0,
            losses: 0,
            enrichment: Enrichment::default(),
        }
    }

    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Wins minus losses, the Swiss score.
    pub fn score(&self) -> i64 {
        i64::from(self.wins) - i64::from(self.losses)
    }

    pub fn tier(&self, cap: u32) -> RichnessTier {
        RichnessTier::of(self.enrichment.richness, cap)
    }

    pub fn theme_key(&self) -> ThemeKey {
        self.enrichment.theme_key()
    }

    /// Apply a rating delta and record a win.
    pub fn record_win(&mut self, delta: i32) {
        self.rating += delta;
        self.wins += 1;
    }

    /// Apply a rating delta and record a loss.
    pub fn record_loss(&mut self, delta: i32) {
        self.rating += delta;
        self.losses += 1;
    }

    /// Reverse `record_win`.
    pub fn revert_win(&mut self, delta: i32) {
        self.rating -= delta;
        self.wins = self.wins.saturating_sub(1);
    }

    /// Reverse `record_loss`.
    pub fn revert_loss(&mut self, delta: i32) {
        self.rating -= delta;
        self.losses = self.losses.saturating_sub(1);
    }
}
