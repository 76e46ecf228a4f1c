//! Matching incoming notes against the notes a problem still expects.

use super::problem::{Note, Problem};

/// Result of feeding one note-on into a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The note matched the next expected note and was consumed.
    Consumed,
    /// The note did not match. The expected note stays pending.
    Mismatch,
    /// Nothing was left to match; the problem is unchanged.
    AlreadyComplete,
}

/// Reduce a note-on against the head of `remaining_input`.
///
/// A mismatch marks the round as a mistake for good but never advances the
/// expected input, so the round only completes once every played note has
/// been received in order.
pub fn on_note_on(problem: &Problem, pitch: Note) -> (Problem, MatchOutcome) {
    match problem.remaining_input().first() {
        None => (problem.clone(), MatchOutcome::AlreadyComplete),
        Some(expected) if *expected == pitch => {
            (problem.with_head_consumed(), MatchOutcome::Consumed)
        }
        Some(_) => (problem.with_mistake(), MatchOutcome::Mismatch),
    }
}
