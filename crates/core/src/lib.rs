pub use config::{ConfigError, ConfigManager, ConfigSchema, Settings, Timing};
pub use error::{PortDirection, Result, TrainerError};
pub use messages::TrainerCommand;
pub use midi::{
    list_ports, select_port, MidiMessage, MidiModule, MidiPorts, MidiSink, PortSelection,
    RecordingSink, SharedSink,
};
pub use problem::{
    on_note_on, FixedSource, IntervalGenerator, IntervalName, MatchOutcome, Note, Problem,
    RngSource, UniformSource, DEFAULT_ROOTS, MAX_INTERVAL,
};
pub use round::{
    Continuation, Effect, Player, RoundController, RoundSnapshot, RoundState, Verdict,
    MISTAKE_CUE, SUCCESS_CUE,
};
pub use score::{JsonFileStore, MemoryStore, ScoreLedger, ScoreStore, Scores, SCORE_KEY, SCORE_SLOTS};
pub use session::{Session, SessionHandle, SessionInput};

mod config;
mod error;
pub mod messages;
pub mod midi;
pub mod problem;
pub mod round;
pub mod score;
pub mod session;
