//! Async driver for the round controller.
//!
//! A single task owns the controller and handles one input at a time. Effect
//! sequences run on their own tasks and report back through the same channel,
//! so the controller is never touched concurrently.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::messages::TrainerCommand;
use crate::midi::MidiMessage;
use crate::problem::UniformSource;
use crate::round::{Continuation, Effect, Player, RoundController, RoundSnapshot};
use crate::score::ScoreStore;

const CHANNEL_CAPACITY: usize = 1000;

/// Everything the session loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Midi(MidiMessage),
    Command(TrainerCommand),
    Resume(Continuation),
}

impl From<MidiMessage> for SessionInput {
    fn from(message: MidiMessage) -> Self {
        SessionInput::Midi(message)
    }
}

impl From<TrainerCommand> for SessionInput {
    fn from(command: TrainerCommand) -> Self {
        SessionInput::Command(command)
    }
}

/// Create the channel feeding a session. The sender can be handed to the
/// MIDI input before the session is started.
pub fn channel() -> (mpsc::Sender<SessionInput>, mpsc::Receiver<SessionInput>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

pub struct Session;

impl Session {
    /// Spawn the session loop. Must be called inside a tokio runtime.
    pub fn start<S, T>(
        controller: RoundController<S, T>,
        player: Player,
        tx: mpsc::Sender<SessionInput>,
        rx: mpsc::Receiver<SessionInput>,
    ) -> SessionHandle
    where
        S: UniformSource + Send + 'static,
        T: ScoreStore + Send + 'static,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let weak_tx = tx.downgrade();

        let task = tokio::spawn(async move {
            run(controller, player, weak_tx, rx, snapshot_tx).await;
        });

        log::info!("Training session started");

        SessionHandle {
            tx,
            snapshots: snapshot_rx,
            task: Some(task),
        }
    }
}

async fn run<S, T>(
    mut controller: RoundController<S, T>,
    player: Player,
    tx: mpsc::WeakSender<SessionInput>,
    mut rx: mpsc::Receiver<SessionInput>,
    snapshots: watch::Sender<RoundSnapshot>,
) where
    S: UniformSource,
    T: ScoreStore,
{
    while let Some(input) = rx.recv().await {
        let effects = match input {
            SessionInput::Command(TrainerCommand::Shutdown) => {
                log::info!("Training session received shutdown");
                break;
            }
            SessionInput::Command(command) => controller.handle_command(command),
            SessionInput::Midi(message) => controller.handle_midi(message),
            SessionInput::Resume(continuation) => controller.resume(continuation),
        };

        if !effects.is_empty() {
            tokio::spawn(run_effects(effects, player.clone(), tx.clone()));
        }

        snapshots.send_replace(controller.snapshot());
    }

    log::info!("Training session stopped");
}

/// Execute one effect sequence. Nothing cancels it once started.
async fn run_effects(effects: Vec<Effect>, player: Player, tx: mpsc::WeakSender<SessionInput>) {
    for effect in effects {
        match effect {
            Effect::Play(notes) => player.play_phrase(&notes).await,
            Effect::Start(notes) => {
                let player = player.clone();
                tokio::spawn(async move { player.play_phrase(&notes).await });
            }
            Effect::Wait(duration) => tokio::time::sleep(duration).await,
            Effect::Resume(continuation) => {
                let Some(tx) = tx.upgrade() else {
                    log::debug!("Session gone, dropping {:?}", continuation);
                    return;
                };
                if let Err(e) = tx.send(SessionInput::Resume(continuation)).await {
                    log::debug!("Session gone, dropping continuation: {}", e);
                }
            }
        }
    }
}

/// Handle to a running session. Dropping it stops the loop.
pub struct SessionHandle {
    tx: mpsc::Sender<SessionInput>,
    snapshots: watch::Receiver<RoundSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn sender(&self) -> mpsc::Sender<SessionInput> {
        self.tx.clone()
    }

    pub async fn send(&self, command: TrainerCommand) {
        if let Err(e) = self.tx.send(command.into()).await {
            log::warn!("Failed to send {:?} to session: {}", command, e);
        }
    }

    pub fn snapshots(&self) -> watch::Receiver<RoundSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Ask the loop to stop and wait for it.
    pub async fn stop(mut self) {
        let _ = self.tx.send(TrainerCommand::Shutdown.into()).await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("Training session ended with error: {}", e);
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Timing;
    use crate::midi::RecordingSink;
    use crate::problem::{FixedSource, IntervalGenerator, Note};
    use crate::round::RoundState;
    use crate::score::{MemoryStore, ScoreLedger};

    fn start(draws: &[u32]) -> (SessionHandle, RecordingSink, MemoryStore) {
        let sink = RecordingSink::new();
        let store = MemoryStore::new();
        let controller = RoundController::new(
            IntervalGenerator::new(FixedSource::new(draws.iter().copied())),
            ScoreLedger::load(store.clone()),
            Timing::default(),
            Note(24),
        );
        let player = Player::new(sink.shared(), 0x28, Timing::default());
        let (tx, rx) = channel();
        (Session::start(controller, player, tx, rx), sink, store)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_problem_is_played() {
        let (handle, sink, _) = start(&[7, 0]);
        assert_eq!(handle.snapshot().state, RoundState::Idle);

        handle.send(TrainerCommand::NewProblem).await;
        advance(700).await;

        assert_eq!(sink.notes_played(), vec![60, 67]);
        assert_eq!(handle.snapshot().state, RoundState::AwaitingInput);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_loop() {
        let (handle, _, _) = start(&[]);
        assert!(handle.is_running());
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_command_plays_again() {
        let (handle, sink, _) = start(&[7, 0]);
        handle.send(TrainerCommand::NewProblem).await;
        advance(700).await;
        sink.clear();

        handle.send(TrainerCommand::Replay).await;
        advance(700).await;
        assert_eq!(sink.notes_played(), vec![60, 67]);
        assert_eq!(handle.snapshot().remaining, vec![Note(60), Note(67)]);
        handle.stop().await;
    }
}
