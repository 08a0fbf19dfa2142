// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-memorable agent names.
//!
//! Agents get adjective+noun names ("GreenCastle") that survive pane churn.
//! A seeded generator produces a deterministic sequence for tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const ADJECTIVES: &[&str] = &[
    "Amber", "Blue", "Bold", "Brave", "Bright", "Calm", "Clever", "Copper", "Coral", "Crimson",
    "Eager", "Emerald", "Gentle", "Golden", "Green", "Grey", "Humble", "Iron", "Ivory", "Jade",
    "Keen", "Lively", "Lucid", "Mellow", "Noble", "Olive", "Opal", "Quiet", "Rapid", "Royal",
    "Ruby", "Rustic", "Silent", "Silver", "Steady", "Swift", "Teal", "Vivid", "Warm", "Wise",
];

const NOUNS: &[&str] = &[
    "Anchor", "Arrow", "Badger", "Beacon", "Bridge", "Canyon", "Castle", "Cedar", "Comet",
    "Compass", "Condor", "Coyote", "Falcon", "Fjord", "Forge", "Garnet", "Glacier", "Harbor",
    "Hawk", "Heron", "Island", "Lantern", "Lynx", "Maple", "Meadow", "Orchid", "Osprey", "Otter",
    "Peak", "Pine", "Prairie", "Raven", "Reef", "River", "Sparrow", "Summit", "Thicket", "Tiger",
    "Valley", "Willow",
];

/// Generator of roster names, optionally seeded for determinism.
pub struct NameGenerator {
    rng: StdRng,
}

impl NameGenerator {
    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// OS-entropy generator for production spawns.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Next name not present in `taken`.
    ///
    /// Falls back to a numeric suffix once the combination space is
    /// saturated, so this always terminates.
    pub fn next_name(&mut self, taken: &HashSet<String>) -> String {
        for _ in 0..ADJECTIVES.len() * NOUNS.len() {
            let name = self.candidate();
            if !taken.contains(&name) {
                return name;
            }
        }
        let base = self.candidate();
        let mut n = 2u32;
        loop {
            let name = format!("{}{}", base, n);
            if !taken.contains(&name) {
                return name;
            }
            n += 1;
        }
    }

    fn candidate(&mut self) -> String {
        let adj = ADJECTIVES[self.rng.random_range(0..ADJECTIVES.len())];
        let noun = NOUNS[self.rng.random_range(0..NOUNS.len())];
        format!("{}{}", adj, noun)
    }
}
