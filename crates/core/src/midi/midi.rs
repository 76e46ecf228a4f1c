pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const CLOCK: u8 = 0xF8;

// MIDI message types we care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn(u8, u8),        // (note, velocity)
    NoteOff(u8),           // note
    ControlChange(u8, u8), // (controller number, value)
    Clock,                 // MIDI clock messages
}

impl MidiMessage {
    /// Decode a raw message from an input port. Only channel 1 is listened
    /// to; channel messages on other channels decode to `None`.
    ///
    /// A note-on with velocity 0 is reported as a note-off.
    pub fn parse(message: &[u8]) -> Option<Self> {
        let status = *message.first()?;
        if status == CLOCK {
            return Some(MidiMessage::Clock);
        }
        if message.len() < 3 {
            return None;
        }

        match status {
            NOTE_ON => {
                if message[2] > 0 {
                    Some(MidiMessage::NoteOn(message[1], message[2]))
                } else {
                    Some(MidiMessage::NoteOff(message[1]))
                }
            }
            NOTE_OFF => Some(MidiMessage::NoteOff(message[1])),
            CONTROL_CHANGE => Some(MidiMessage::ControlChange(message[1], message[2])),
            _ => None,
        }
    }

    /// Encode for sending on channel 1. Note-offs are sent with velocity 0.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOn(note, velocity) => vec![NOTE_ON, note, velocity],
            MidiMessage::NoteOff(note) => vec![NOTE_OFF, note, 0],
            MidiMessage::ControlChange(cc, value) => vec![CONTROL_CHANGE, cc, value],
            MidiMessage::Clock => vec![CLOCK],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 100]),
            Some(MidiMessage::NoteOn(60, 100))
        );
        assert_eq!(
            MidiMessage::parse(&[0x90, 61, 1]),
            Some(MidiMessage::NoteOn(61, 1))
        );
    }

    #[test]
    fn test_other_channels_are_ignored() {
        assert_eq!(MidiMessage::parse(&[0x91, 60, 100]), None);
        assert_eq!(MidiMessage::parse(&[0x9F, 60, 100]), None);
        assert_eq!(MidiMessage::parse(&[0x83, 60, 0]), None);
        assert_eq!(MidiMessage::parse(&[0xB1, 7, 127]), None);
    }

    #[test]
    fn test_zero_velocity_note_on_is_note_off() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 0]),
            Some(MidiMessage::NoteOff(60))
        );
    }

    #[test]
    fn test_parse_other_messages() {
        assert_eq!(MidiMessage::parse(&[0x80, 60, 64]), Some(MidiMessage::NoteOff(60)));
        assert_eq!(
            MidiMessage::parse(&[0xB0, 7, 127]),
            Some(MidiMessage::ControlChange(7, 127))
        );
        assert_eq!(MidiMessage::parse(&[0xF8]), Some(MidiMessage::Clock));
        assert_eq!(MidiMessage::parse(&[0xE0, 0, 64]), None);
        assert_eq!(MidiMessage::parse(&[0x90, 60]), None);
        assert_eq!(MidiMessage::parse(&[]), None);
    }

    #[test]
    fn test_encode() {
        assert_eq!(MidiMessage::NoteOn(60, 0x28).to_bytes(), vec![0x90, 60, 0x28]);
        assert_eq!(MidiMessage::NoteOff(60).to_bytes(), vec![0x80, 60, 0]);
    }
}
