use std::time::Duration;

use crate::config::{Settings, Timing};
use crate::messages::TrainerCommand;
use crate::midi::MidiMessage;
use crate::problem::{
    on_note_on, IntervalGenerator, IntervalName, MatchOutcome, Note, Problem, UniformSource,
};
use crate::score::{ScoreLedger, ScoreStore, Scores};

/// Played after a round with at least one wrong note.
pub const MISTAKE_CUE: [Note; 1] = [Note(30)];

/// Played after a clean round: a C major arpeggio.
pub const SUCCESS_CUE: [Note; 4] = [Note(60), Note(64), Note(67), Note(72)];

/// Where the current round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundState {
    /// No problem is being asked.
    #[default]
    Idle,
    /// The problem has been played and answers are being matched.
    AwaitingInput,
    /// The round is complete and its feedback is pending.
    Scoring,
    /// A replay was requested from the keyboard and is waiting to play.
    Replaying,
}

impl RoundState {
    /// True while note-on events count as answers.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::AwaitingInput | Self::Replaying)
    }
}

/// Work the controller wants to pick up again after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Replay,
    FeedbackCue { mistake: bool },
    NextProblem,
}

/// One step of a sequence the session executes on the controller's behalf.
///
/// Steps within a sequence run in order. Separate sequences run
/// concurrently and are never cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Play the notes one after another.
    Play(Vec<Note>),
    /// Start playing the notes in the background and move on at once.
    Start(Vec<Note>),
    Wait(Duration),
    /// Hand a continuation back to the controller.
    Resume(Continuation),
}

/// How the current round looks to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Pending,
    Right,
    Wrong,
}

/// Read-only view of the controller for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundSnapshot {
    pub state: RoundState,
    pub played: Vec<Note>,
    pub remaining: Vec<Note>,
    pub interval_size: Option<u8>,
    pub verdict: Verdict,
    pub scores: Scores,
}

/// Drives rounds: generate, play, match answers, score, schedule the next.
///
/// The controller never sleeps or touches MIDI itself. Every operation
/// returns the effect sequence the caller must run.
pub struct RoundController<S, T> {
    generator: IntervalGenerator<S>,
    ledger: ScoreLedger<T>,
    problem: Option<Problem>,
    state: RoundState,
    timing: Timing,
    replay_pitch: Note,
}

impl<S: UniformSource, T: ScoreStore> RoundController<S, T> {
    pub fn new(
        generator: IntervalGenerator<S>,
        ledger: ScoreLedger<T>,
        timing: Timing,
        replay_pitch: Note,
    ) -> Self {
        Self {
            generator,
            ledger,
            problem: None,
            state: RoundState::Idle,
            timing,
            replay_pitch,
        }
    }

    pub fn from_settings(settings: &Settings, source: S, store: T) -> Self {
        Self::new(
            IntervalGenerator::with_roots(source, &settings.root_pitches),
            ScoreLedger::load(store),
            settings.timing(),
            Note(settings.replay_pitch),
        )
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn scores(&self) -> &Scores {
        self.ledger.scores()
    }

    /// Replace the current round with a fresh one and play it.
    ///
    /// An unfinished round is dropped without being scored.
    pub fn new_problem(&mut self) -> Vec<Effect> {
        if self.state.accepts_input() {
            log::debug!("Abandoning unscored round");
        }
        self.state = RoundState::Idle;

        let problem = self.generator.generate();
        log::debug!(
            "New problem: {:?} ({})",
            problem.played_interval(),
            IntervalName::from_semitones(problem.interval_size())
                .map(|name| name.to_string())
                .unwrap_or_default()
        );

        let effects = vec![Effect::Play(problem.played_interval().to_vec())];
        self.problem = Some(problem);
        self.state = RoundState::AwaitingInput;
        effects
    }

    /// Replay the current problem right away. Never changes the round.
    pub fn replay(&self) -> Vec<Effect> {
        match &self.problem {
            Some(problem) => vec![Effect::Play(problem.played_interval().to_vec())],
            None => Vec::new(),
        }
    }

    pub fn handle_command(&mut self, command: TrainerCommand) -> Vec<Effect> {
        match command {
            TrainerCommand::NewProblem => self.new_problem(),
            TrainerCommand::Replay => self.replay(),
            TrainerCommand::Shutdown => Vec::new(),
        }
    }

    /// Only note-ons with a non-zero velocity matter; everything else is inert.
    pub fn handle_midi(&mut self, message: MidiMessage) -> Vec<Effect> {
        match message {
            MidiMessage::NoteOn(pitch, velocity) if velocity > 0 => {
                self.handle_note_on(Note(pitch))
            }
            _ => Vec::new(),
        }
    }

    pub fn handle_note_on(&mut self, pitch: Note) -> Vec<Effect> {
        if !self.state.accepts_input() {
            log::debug!("Ignoring note {} while {:?}", pitch, self.state);
            return Vec::new();
        }

        if pitch == self.replay_pitch {
            self.state = RoundState::Replaying;
            return vec![
                Effect::Wait(self.timing.settle_delay),
                Effect::Resume(Continuation::Replay),
            ];
        }

        let Some(problem) = self.problem.as_ref() else {
            return Vec::new();
        };

        let (next, outcome) = on_note_on(problem, pitch);
        log::debug!("Note {} -> {:?}", pitch, outcome);
        let complete = outcome == MatchOutcome::Consumed && next.is_complete();
        self.problem = Some(next);

        if complete {
            self.finish_round()
        } else {
            Vec::new()
        }
    }

    /// Pick up a delayed sequence.
    pub fn resume(&mut self, continuation: Continuation) -> Vec<Effect> {
        match continuation {
            Continuation::Replay => {
                if self.state == RoundState::Replaying {
                    self.state = RoundState::AwaitingInput;
                }
                self.replay()
            }
            Continuation::FeedbackCue { mistake } => {
                let cue = if mistake {
                    MISTAKE_CUE.to_vec()
                } else {
                    SUCCESS_CUE.to_vec()
                };
                vec![
                    Effect::Start(cue),
                    Effect::Wait(self.timing.next_problem_delay),
                    Effect::Resume(Continuation::NextProblem),
                ]
            }
            Continuation::NextProblem => self.new_problem(),
        }
    }

    fn finish_round(&mut self) -> Vec<Effect> {
        self.state = RoundState::Scoring;

        let Some(problem) = self.problem.as_ref() else {
            return Vec::new();
        };
        let size = problem.interval_size();
        let mistake = problem.mistake();

        if let Err(e) = self.ledger.record_outcome(size, mistake) {
            log::error!("Failed to save scores: {}", e);
        }

        log::info!(
            "{} {}: {} right, {} wrong",
            if mistake { "Missed" } else { "Got" },
            IntervalName::from_semitones(size)
                .map(|name| name.to_string())
                .unwrap_or_default(),
            self.ledger.scores().right(size),
            self.ledger.scores().wrong(size)
        );

        vec![
            Effect::Wait(self.timing.settle_delay),
            Effect::Resume(Continuation::FeedbackCue { mistake }),
        ]
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let (played, remaining, interval_size, verdict) = match &self.problem {
            Some(problem) => {
                let verdict = if problem.mistake() {
                    Verdict::Wrong
                } else if problem.is_complete() {
                    Verdict::Right
                } else {
                    Verdict::Pending
                };
                (
                    problem.played_interval().to_vec(),
                    problem.remaining_input().to_vec(),
                    Some(problem.interval_size()),
                    verdict,
                )
            }
            None => (Vec::new(), Vec::new(), None, Verdict::Pending),
        };

        RoundSnapshot {
            state: self.state,
            played,
            remaining,
            interval_size,
            verdict,
            scores: self.ledger.scores().clone(),
        }
    }
}
