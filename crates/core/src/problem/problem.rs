use serde::{Deserialize, Serialize};

/// A single MIDI pitch (0-127).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Note(pub u8);

impl Note {
    pub fn pitch(&self) -> u8 {
        self.0
    }

    /// Transpose upward by `semitones`, or `None` if the result leaves the MIDI range.
    pub fn up(&self, semitones: u8) -> Option<Note> {
        self.0
            .checked_add(semitones)
            .filter(|p| *p <= 127)
            .map(Note)
    }
}

impl From<u8> for Note {
    fn from(pitch: u8) -> Self {
        Note(pitch)
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The currently active round: two notes played to the user and the notes
/// they still have to play back.
///
/// Problems are values. The matcher produces a new `Problem` for every note it
/// consumes instead of mutating the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    played_interval: [Note; 2],
    interval_size: u8,
    remaining_input: Vec<Note>,
    mistake: bool,
}

impl Problem {
    /// Build a fresh problem from a root note and an interval size.
    ///
    /// Returns `None` if the upper note would fall outside the MIDI range.
    pub fn new(root: Note, interval_size: u8) -> Option<Self> {
        root.up(interval_size)?;
        Some(Self::from_validated(root, interval_size))
    }

    /// Caller guarantees `root + interval_size` stays within the MIDI range.
    pub(crate) fn from_validated(root: Note, interval_size: u8) -> Self {
        let top = Note(root.0.saturating_add(interval_size).min(127));
        let played_interval = [root, top];
        Self {
            played_interval,
            interval_size,
            remaining_input: played_interval.to_vec(),
            mistake: false,
        }
    }

    pub fn played_interval(&self) -> &[Note; 2] {
        &self.played_interval
    }

    pub fn interval_size(&self) -> u8 {
        self.interval_size
    }

    pub fn remaining_input(&self) -> &[Note] {
        &self.remaining_input
    }

    pub fn mistake(&self) -> bool {
        self.mistake
    }

    /// True once every played note has been matched.
    pub fn is_complete(&self) -> bool {
        self.remaining_input.is_empty()
    }

    pub(crate) fn with_head_consumed(&self) -> Self {
        Self {
            remaining_input: self.remaining_input[1..].to_vec(),
            ..self.clone()
        }
    }

    pub(crate) fn with_mistake(&self) -> Self {
        Self {
            mistake: true,
            ..self.clone()
        }
    }

    #[cfg(test)]
    pub(crate) fn with_remaining(&self, remaining: &[u8]) -> Self {
        Self {
            remaining_input: remaining.iter().copied().map(Note).collect(),
            ..self.clone()
        }
    }
}
