//! Streams of scored board indices and the running statistics folded from them

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use std::collections::{BTreeMap, BTreeSet};
use std::iter::FromIterator;
use std::ops::Range;

use crate::codec::decode;
use crate::MAX_INDEX;

/// Running statistics over scored boards: how many boards reached each score,
/// and which indices reached the highest score seen so far
///
/// Tallies of disjoint index sets can be [`merge`](ScoreTally::merge)d in any
/// order with the same result as recording every board into one tally.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ScoreTally {
    counts: BTreeMap<u32, u64>,
    best_score: Option<u32>,
    best_indices: BTreeSet<u64>,
}

impl ScoreTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a tally from stored parts, as read back from a checkpoint
    pub fn from_parts(
        counts: BTreeMap<u32, u64>,
        best_score: Option<u32>,
        best_indices: BTreeSet<u64>,
    ) -> Self {
        Self {
            counts,
            best_score,
            best_indices,
        }
    }

    /// Folds in one scored board, returning true if it reached or beat the
    /// best score so far
    pub fn record(&mut self, index: u64, score: u32) -> bool {
        *self.counts.entry(score).or_insert(0) += 1;
        match self.best_score {
            Some(best) if score < best => false,
            Some(best) if score == best => {
                self.best_indices.insert(index);
                true
            }
            _ => {
                self.best_score = Some(score);
                self.best_indices.clear();
                self.best_indices.insert(index);
                true
            }
        }
    }

    /// Folds another tally over a disjoint set of indices into this one
    pub fn merge(&mut self, other: ScoreTally) {
        for (score, count) in other.counts {
            *self.counts.entry(score).or_insert(0) += count;
        }
        let other_best = match other.best_score {
            Some(best) => best,
            None => return,
        };
        match self.best_score {
            Some(best) if other_best < best => {}
            Some(best) if other_best == best => self.best_indices.extend(other.best_indices),
            _ => {
                self.best_score = Some(other_best);
                self.best_indices = other.best_indices;
            }
        }
    }

    /// [`merge`](ScoreTally::merge) by value, for use as a reduction
    pub fn merged(mut self, other: ScoreTally) -> Self {
        self.merge(other);
        self
    }

    /// Number of boards at each score, lowest score first
    pub fn counts(&self) -> &BTreeMap<u32, u64> {
        &self.counts
    }

    pub fn count(&self, score: u32) -> u64 {
        self.counts.get(&score).copied().unwrap_or(0)
    }

    pub fn boards_scored(&self) -> u64 {
        self.counts.values().sum()
    }

    /// The highest score recorded, or `None` if nothing has been recorded
    pub fn best_score(&self) -> Option<u32> {
        self.best_score
    }

    /// Every index recorded with the best score, ascending
    pub fn best_indices(&self) -> &BTreeSet<u64> {
        &self.best_indices
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Extend<(u64, u32)> for ScoreTally {
    fn extend<I: IntoIterator<Item = (u64, u32)>>(&mut self, results: I) {
        for (index, score) in results {
            self.record(index, score);
        }
    }
}

impl FromIterator<(u64, u32)> for ScoreTally {
    fn from_iter<I: IntoIterator<Item = (u64, u32)>>(results: I) -> Self {
        let mut tally = Self::new();
        tally.extend(results);
        tally
    }
}

/// Scores every index in `range` across the rayon thread pool
pub fn tally_range(range: Range<u64>) -> ScoreTally {
    let end = range.end.min(MAX_INDEX);
    (range.start.min(end)..end)
        .into_par_iter()
        .fold(ScoreTally::new, |mut tally, index| {
            tally.record(index, decode(index).score());
            tally
        })
        .reduce(ScoreTally::new, ScoreTally::merged)
}

enum IndexSource {
    Sequential { next: u64, end: u64 },
    Sampled(SmallRng),
}

/// A lazy stream of `(index, score)` pairs
///
/// Sequential streams visit every index of a range in increasing order and
/// stop at its end. Sampled streams draw indices uniformly from the whole
/// index space, possibly repeating, and never stop on their own.
pub struct Enumerator {
    source: IndexSource,
}

impl Enumerator {
    /// Enumerates `range` in order, clamped to the valid index space
    pub fn sequential(range: Range<u64>) -> Self {
        let end = range.end.min(MAX_INDEX);
        Self {
            source: IndexSource::Sequential {
                next: range.start.min(end),
                end,
            },
        }
    }

    /// Enumerates from `start` to the last board
    pub fn starting_at(start: u64) -> Self {
        Self::sequential(start..MAX_INDEX)
    }

    /// Samples indices with a generator seeded from `seed`
    pub fn sampled(seed: u64) -> Self {
        Self {
            source: IndexSource::Sampled(SmallRng::seed_from_u64(seed)),
        }
    }

    /// Samples indices with a generator seeded from system entropy
    pub fn sampled_from_entropy() -> Self {
        Self {
            source: IndexSource::Sampled(SmallRng::from_entropy()),
        }
    }

    /// The next sequential index to be produced, which is where an
    /// interrupted sweep resumes. Sampled streams have no position.
    pub fn position(&self) -> Option<u64> {
        match &self.source {
            IndexSource::Sequential { next, .. } => Some(*next),
            IndexSource::Sampled(_) => None,
        }
    }

    /// The next index without scoring it
    pub fn next_index(&mut self) -> Option<u64> {
        match &mut self.source {
            IndexSource::Sequential { next, end } => {
                if *next >= *end {
                    return None;
                }
                let index = *next;
                *next += 1;
                Some(index)
            }
            IndexSource::Sampled(rng) => Some(rng.gen_range(0..MAX_INDEX)),
        }
    }
}

impl Iterator for Enumerator {
    type Item = (u64, u32);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_index().map(|index| (index, decode(index).score()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.source {
            IndexSource::Sequential { next, end } => {
                let remaining = (end - next) as usize;
                (remaining, Some(remaining))
            }
            IndexSource::Sampled(_) => (usize::MAX, None),
        }
    }
}
