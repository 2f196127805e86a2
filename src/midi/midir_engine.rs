use crate::midi::{MidiEngine, MidiError, MidiMessage, Result};
use log::{debug, info, trace};
use midir::{MidiOutput, MidiOutputConnection};

pub struct MidirEngine {
    output: Option<MidiOutputConnection>,
}

impl MidirEngine {
    /// Connects to the first output port whose name contains `device_name`.
    /// Without a name no port is opened and messages are only traced.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let Some(name) = device_name else {
            info!("No MIDI output selected; clock messages will not leave the process");
            return Ok(MidirEngine { output: None });
        };

        let midi_out = MidiOutput::new("tempoclock-out")
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|p| midi_out.port_name(p).unwrap_or_default().contains(name))
            .ok_or_else(|| MidiError::DeviceNotFound(name.to_string()))?;

        let port_name = midi_out
            .port_name(out_port)
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out
            .connect(out_port, "tempoclock-output")
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        Ok(MidirEngine {
            output: Some(connection),
        })
    }

    pub fn list_devices() -> Vec<String> {
        let mut devices = Vec::new();

        match MidiOutput::new("tempoclock-list") {
            Ok(midi_out) => {
                for port in midi_out.ports() {
                    if let Ok(name) = midi_out.port_name(&port) {
                        devices.push(name);
                    }
                }
            }
            Err(e) => debug!("Unable to enumerate MIDI outputs: {}", e),
        }

        devices
    }

    pub fn is_connected(&self) -> bool {
        self.output.is_some()
    }
}

impl MidiEngine for MidirEngine {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        match &mut self.output {
            Some(output) => output
                .send(&[msg.status_byte()])
                .map_err(|e| MidiError::SendError(e.to_string())),
            None => {
                trace!("Dropping {:?}, no output connected", msg);
                Ok(())
            }
        }
    }
}
