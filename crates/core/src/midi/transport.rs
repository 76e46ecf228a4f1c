use std::sync::Arc;

use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::midi::MidiMessage;
use crate::error::{PortDirection, Result, TrainerError};

const CLIENT_NAME: &str = "intervals";

/// Anything that accepts raw outgoing MIDI messages.
pub trait MidiSink: Send {
    fn send(&mut self, message: &[u8]) -> Result<()>;
}

/// An output shared between concurrently running playback sequences.
pub type SharedSink = Arc<Mutex<dyn MidiSink>>;

impl MidiSink for MidiOutputConnection {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        MidiOutputConnection::send(self, message)?;
        Ok(())
    }
}

/// Sink that records every message with the (tokio) time it was sent.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<(Instant, Vec<u8>)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> SharedSink {
        Arc::new(Mutex::new(self.clone()))
    }

    pub fn messages(&self) -> Vec<Vec<u8>> {
        self.sent.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn timed_messages(&self) -> Vec<(Instant, Vec<u8>)> {
        self.sent.lock().clone()
    }

    /// Pitches of every note-on sent so far, in order.
    pub fn notes_played(&self) -> Vec<u8> {
        self.sent
            .lock()
            .iter()
            .filter_map(|(_, m)| match MidiMessage::parse(m) {
                Some(MidiMessage::NoteOn(note, _)) => Some(note),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl MidiSink for RecordingSink {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.sent.lock().push((Instant::now(), message.to_vec()));
        Ok(())
    }
}

/// Names of the currently available ports.
#[derive(Debug, Clone, Default)]
pub struct MidiPorts {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

pub fn list_ports() -> Result<MidiPorts> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    let midi_out = MidiOutput::new(CLIENT_NAME)?;

    let inputs = midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect();
    let outputs = midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect();

    Ok(MidiPorts { inputs, outputs })
}

/// How to pick a port out of the enumerated ones.
#[derive(Debug, Clone, Default)]
pub struct PortSelection {
    /// Substring a port name must contain. Takes precedence over the exclusion.
    pub preferred: Option<String>,
    /// Case-insensitive substring that disqualifies a port (loopback ports).
    pub exclude: String,
}

/// Index of the first port matching `selection`.
pub fn select_port(names: &[String], selection: &PortSelection) -> Option<usize> {
    if let Some(preferred) = &selection.preferred {
        return names.iter().position(|name| name.contains(preferred.as_str()));
    }

    let exclude = selection.exclude.to_lowercase();
    names
        .iter()
        .position(|name| exclude.is_empty() || !name.to_lowercase().contains(&exclude))
}

/// Owns the MIDI input and output connections used for a training session.
///
/// Inbound messages are decoded in the midir callback and forwarded into a
/// tokio channel. Dropping the module closes the input.
pub struct MidiModule {
    input_selection: PortSelection,
    output_selection: PortSelection,
    input_connection: Option<MidiInputConnection<()>>,
}

impl MidiModule {
    pub fn new(input_selection: PortSelection, output_selection: PortSelection) -> Self {
        Self {
            input_selection,
            output_selection,
            input_connection: None,
        }
    }

    /// Connect both ports. Inbound messages are sent to `tx`.
    pub fn connect<T>(&mut self, tx: mpsc::Sender<T>) -> Result<SharedSink>
    where
        T: From<MidiMessage> + Send + 'static,
    {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let midi_out = MidiOutput::new(CLIENT_NAME)?;

        // Find the device port for output
        let out_ports = midi_out.ports();
        let out_names: Vec<String> = out_ports
            .iter()
            .map(|port| midi_out.port_name(port).unwrap_or_default())
            .collect();
        let out_index = select_port(&out_names, &self.output_selection)
            .ok_or(TrainerError::DeviceUnavailable(PortDirection::Output))?;
        let out_name = out_names[out_index].clone();

        // Find the device port for input
        let in_ports = midi_in.ports();
        let in_names: Vec<String> = in_ports
            .iter()
            .map(|port| midi_in.port_name(port).unwrap_or_default())
            .collect();
        let in_index = select_port(&in_names, &self.input_selection)
            .ok_or(TrainerError::DeviceUnavailable(PortDirection::Input))?;
        let in_name = in_names[in_index].clone();

        let output_connection = midi_out
            .connect(&out_ports[out_index], "intervals-output")
            .map_err(|e| TrainerError::MidiConnect {
                direction: PortDirection::Output,
                port: out_name.clone(),
                reason: e.to_string(),
            })?;

        let input_connection = midi_in
            .connect(
                &in_ports[in_index],
                "intervals-input",
                move |_timestamp, message, _| {
                    if let Some(midi_msg) = MidiMessage::parse(message) {
                        // Since we're in a callback, we need to use try_send
                        // to avoid blocking if the channel is full
                        if let Err(e) = tx.try_send(T::from(midi_msg)) {
                            log::warn!("Failed to forward MIDI message: {}", e);
                        }
                    }
                },
                (),
            )
            .map_err(|e| TrainerError::MidiConnect {
                direction: PortDirection::Input,
                port: in_name.clone(),
                reason: e.to_string(),
            })?;

        log::info!("MIDI input: {}", in_name);
        log::info!("MIDI output: {}", out_name);

        let output: SharedSink = Arc::new(Mutex::new(output_connection));
        self.input_connection = Some(input_connection);
        Ok(output)
    }

    /// Stop listening. The output closes once every clone of the returned
    /// sink is dropped.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.input_connection.take() {
            let _ = connection.close();
            log::info!("MIDI input closed");
        }
    }
}

impl Drop for MidiModule {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_disconnect_without_connection() {
        let mut module = MidiModule::new(PortSelection::default(), PortSelection::default());
        module.disconnect();
        module.disconnect();
    }

    fn exclude_through() -> PortSelection {
        PortSelection {
            preferred: None,
            exclude: "through".to_string(),
        }
    }

    #[test]
    fn test_select_skips_through_ports() {
        let ports = names(&["Midi Through Port-0", "USB Keyboard", "Synth"]);
        assert_eq!(select_port(&ports, &exclude_through()), Some(1));

        let ports = names(&["MIDI THROUGH", "IAC through bus"]);
        assert_eq!(select_port(&ports, &exclude_through()), None);
    }

    #[test]
    fn test_select_preferred_port() {
        let ports = names(&["Midi Through Port-0", "USB Keyboard", "Synth"]);
        let selection = PortSelection {
            preferred: Some("Synth".to_string()),
            exclude: "through".to_string(),
        };
        assert_eq!(select_port(&ports, &selection), Some(2));

        let selection = PortSelection {
            preferred: Some("Missing".to_string()),
            exclude: String::new(),
        };
        assert_eq!(select_port(&ports, &selection), None);
    }

    #[test]
    fn test_select_without_exclusion() {
        let ports = names(&["Midi Through Port-0"]);
        assert_eq!(select_port(&ports, &PortSelection::default()), Some(0));
        assert_eq!(select_port(&[], &PortSelection::default()), None);
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        let shared = sink.shared();
        shared.lock().send(&[0x90, 60, 40]).unwrap();
        shared.lock().send(&[0x80, 60, 0]).unwrap();
        assert_eq!(sink.messages(), vec![vec![0x90, 60, 40], vec![0x80, 60, 0]]);
        assert_eq!(sink.notes_played(), vec![60]);
    }
}
