pub mod answer;
pub mod generator;
pub mod interval;
pub mod problem;

pub use answer::{on_note_on, MatchOutcome};
pub use generator::{
    FixedSource, IntervalGenerator, RngSource, UniformSource, DEFAULT_ROOTS, MAX_INTERVAL,
};
pub use interval::IntervalName;
pub use problem::{Note, Problem};
