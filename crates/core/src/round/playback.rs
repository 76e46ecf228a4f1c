use crate::config::{Settings, Timing};
use crate::midi::{MidiMessage, MidiSink, SharedSink};
use crate::problem::Note;

/// Plays notes on a shared MIDI output.
///
/// Clones share the output, so several sequences can play at once.
#[derive(Clone)]
pub struct Player {
    sink: SharedSink,
    velocity: u8,
    timing: Timing,
}

impl Player {
    pub fn new(sink: SharedSink, velocity: u8, timing: Timing) -> Self {
        Self {
            sink,
            velocity,
            timing,
        }
    }

    pub fn from_settings(sink: SharedSink, settings: &Settings) -> Self {
        Self::new(sink, settings.velocity, settings.timing())
    }

    /// Note-on, hold, note-off, gap.
    pub async fn play_note(&self, note: Note) {
        self.send(MidiMessage::NoteOn(note.pitch(), self.velocity));
        tokio::time::sleep(self.timing.note_hold).await;
        self.send(MidiMessage::NoteOff(note.pitch()));
        tokio::time::sleep(self.timing.note_gap).await;
    }

    /// Play each note in turn.
    pub async fn play_phrase(&self, notes: &[Note]) {
        for note in notes {
            self.play_note(*note).await;
        }
    }

    fn send(&self, message: MidiMessage) {
        let result = self.sink.lock().send(&message.to_bytes());
        if let Err(e) = result {
            log::warn!("Failed to send {:?}: {}", message, e);
        }
    }
}
