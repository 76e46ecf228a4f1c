/// Commands sent from the keyboard or UI to the training session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerCommand {
    /// Abandon the current round and start a new one.
    NewProblem,
    /// Play the current problem again.
    Replay,
    /// Stop the session loop.
    Shutdown,
}
