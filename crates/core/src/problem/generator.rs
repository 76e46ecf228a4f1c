use std::collections::VecDeque;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::problem::{Note, Problem};

/// Largest interval ever generated (an octave).
pub const MAX_INTERVAL: u8 = 12;

/// Default home pitches: middle C and the F below it.
pub const DEFAULT_ROOTS: [Note; 2] = [Note(0x3c), Note(0x35)];

/// Source of uniformly distributed integers.
pub trait UniformSource {
    /// Draw a value uniformly from `range` (inclusive).
    fn next_in_range(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// Uniform source backed by any `rand` generator.
pub struct RngSource<R: Rng>(R);

impl RngSource<StdRng> {
    /// Seeded from the operating system.
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> UniformSource for RngSource<R> {
    fn next_in_range(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.0.random_range(range)
    }
}

/// Replays a fixed sequence of draws. Once exhausted it yields the low end of
/// each requested range. Values outside the requested range are clamped.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    values: VecDeque<u32>,
}

impl FixedSource {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl UniformSource for FixedSource {
    fn next_in_range(&mut self, range: RangeInclusive<u32>) -> u32 {
        match self.values.pop_front() {
            Some(value) => value.clamp(*range.start(), *range.end()),
            None => *range.start(),
        }
    }
}

/// Produces random interval problems.
pub struct IntervalGenerator<S> {
    source: S,
    roots: Vec<Note>,
}

impl<S: UniformSource> IntervalGenerator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            roots: DEFAULT_ROOTS.to_vec(),
        }
    }

    /// Use a custom set of root pitches.
    ///
    /// Roots that cannot carry an octave above them are dropped. If nothing is
    /// left the default roots are used.
    pub fn with_roots(source: S, roots: &[u8]) -> Self {
        let usable: Vec<Note> = roots
            .iter()
            .map(|p| Note(*p))
            .filter(|root| root.up(MAX_INTERVAL).is_some())
            .collect();

        if usable.len() != roots.len() {
            log::warn!(
                "Ignoring root pitches without room for an octave: {:?}",
                roots
                    .iter()
                    .filter(|p| Note(**p).up(MAX_INTERVAL).is_none())
                    .collect::<Vec<_>>()
            );
        }

        if usable.is_empty() {
            return Self::new(source);
        }

        Self {
            source,
            roots: usable,
        }
    }

    pub fn roots(&self) -> &[Note] {
        &self.roots
    }

    /// Draw the interval size, then the root.
    pub fn generate(&mut self) -> Problem {
        let interval_size = self.source.next_in_range(1..=MAX_INTERVAL as u32) as u8;
        let choice = self
            .source
            .next_in_range(0..=(self.roots.len() - 1) as u32) as usize;
        let root = self.roots[choice];

        // Roots are filtered on construction so the top note always fits.
        Problem::from_validated(root, interval_size)
    }
}
