//! Match decision sources: who wins a pairing.

use crate::models::{MatchResult, Pairing};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::collections::VecDeque;

/// Supplies the outcome of a pairing. The result must name exactly the pairing's two players.
pub trait MatchDecider {
    fn decide(&mut self, pairing: &Pairing) -> MatchResult;
}

impl<F> MatchDecider for F
where
    F: FnMut(&Pairing) -> MatchResult,
{
    fn decide(&mut self, pairing: &Pairing) -> MatchResult {
        self(pairing)
    }
}

/// Uniform random winner per pairing.
#[derive(Debug)]
pub struct CoinFlip<R = ThreadRng> {
    rng: R,
}

impl CoinFlip<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for CoinFlip<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> CoinFlip<R> {
    /// Coin flip driven by a caller-supplied generator (e.g. a seeded one).
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MatchDecider for CoinFlip<R> {
    fn decide(&mut self, pairing: &Pairing) -> MatchResult {
        if self.rng.gen_bool(0.5) {
            pairing.first_wins()
        } else {
            pairing.second_wins()
        }
    }
}

/// The higher-ranked seat always wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct HigherSeedWins;

impl MatchDecider for HigherSeedWins {
    fn decide(&mut self, pairing: &Pairing) -> MatchResult {
        pairing.first_wins()
    }
}

/// Replays a fixed list of results in order. Once exhausted, the first seat wins.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDecider {
    script: VecDeque<MatchResult>,
}

impl ScriptedDecider {
    pub fn new(script: impl IntoIterator<Item = MatchResult>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl MatchDecider for ScriptedDecider {
    fn decide(&mut self, pairing: &Pairing) -> MatchResult {
        self.script
            .pop_front()
            .unwrap_or_else(|| pairing.first_wins())
    }
}
