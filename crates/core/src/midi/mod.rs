pub mod midi;
pub mod transport;

pub use midi::MidiMessage;
pub use transport::{
    list_ports, select_port, MidiModule, MidiPorts, MidiSink, PortSelection, RecordingSink,
    SharedSink,
};
