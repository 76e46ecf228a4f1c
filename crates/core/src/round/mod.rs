pub mod playback;
pub mod round_controller;

pub use playback::Player;
pub use round_controller::{
    Continuation, Effect, RoundController, RoundSnapshot, RoundState, Verdict, MISTAKE_CUE,
    SUCCESS_CUE,
};
