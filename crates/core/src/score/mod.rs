pub mod score_ledger;
pub mod store;

pub use score_ledger::{ScoreLedger, Scores, SCORE_KEY, SCORE_SLOTS};
pub use store::{JsonFileStore, MemoryStore, ScoreStore};
