//! Seeded shuffle and seed derivation.
//!
//! Grouping must be a pure function of `(seed, round)`, so nothing here
//! touches an external entropy source.

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LCG_MASK: u64 = (1 << 31) - 1;

/// Linear-congruential generator over `mod 2^31`.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed & LCG_MASK,
        }
    }

    /// Advance one step and return the new state.
    pub fn next_value(&mut self) -> u64 {
        // state < 2^31 and multiplier < 2^31, so the product fits in u64
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) & LCG_MASK;
        self.state
    }

    /// Value in `[0, bound)`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_value() % bound as u64) as usize
    }
}

/// Fisher-Yates shuffle driven by [`Lcg`]. Equal inputs give equal output on every platform.
pub fn shuffle<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle_in_place(&mut out, seed);
    out
}

pub fn shuffle_in_place<T>(items: &mut [T], seed: u64) {
    let mut rng = Lcg::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// What a derived seed is used for. Each purpose gets its own stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeedPurpose {
    CoverageClusterOrder,
    CoverageClusterMembers,
    ProximityClusterOrder,
    ProximityGroupOrder,
}

impl SeedPurpose {
    fn tag(self) -> u64 {
        match self {
            SeedPurpose::CoverageClusterOrder => 0x636f_765f_6f72_6400,
            SeedPurpose::CoverageClusterMembers => 0x636f_765f_6d65_6d00,
            SeedPurpose::ProximityClusterOrder => 0x7072_785f_6f72_6400,
            SeedPurpose::ProximityGroupOrder => 0x7072_785f_6772_7000,
        }
    }
}

/// Position of a derivation inside the tournament: round, richness tier, cluster or group slot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SeedIndex {
    pub round: u32,
    pub tier: u32,
    pub slot: u32,
}

impl SeedIndex {
    pub fn new(round: u32, tier: u32, slot: u32) -> Self {
        Self { round, tier, slot }
    }

    fn packed(self) -> u64 {
        (u64::from(self.round & 0xFFFF) << 48) | (u64::from(self.tier & 0xFFFF) << 32) | u64::from(self.slot)
    }
}

/// splitmix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive an independent 31-bit shuffle seed from the session seed.
pub fn derive_seed(base_seed: u64, purpose: SeedPurpose, index: SeedIndex) -> u64 {
    let z = mix(base_seed ^ purpose.tag());
    mix(z ^ index.packed()) & LCG_MASK
}
