use thiserror::Error;

/// Direction of a MIDI port, used when reporting port problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Errors surfaced by the trainer core.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// No suitable MIDI port was found. The trainer cannot run without both ports.
    #[error("no suitable MIDI {0} port found")]
    DeviceUnavailable(PortDirection),

    #[error("failed to initialize MIDI: {0}")]
    MidiInit(#[from] midir::InitError),

    #[error("failed to connect MIDI {direction} port '{port}': {reason}")]
    MidiConnect {
        direction: PortDirection,
        port: String,
        reason: String,
    },

    #[error("failed to send MIDI message: {0}")]
    MidiSend(#[from] midir::SendError),

    #[error("score storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to serialize scores: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no home directory available for score storage")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, TrainerError>;
