//! The connection to the organ-sound engine: a pair of virtual MIDI ports the engine connects to.
//!
//! Outbound messages are sent straight from the console task. Inbound messages arrive on a MIDI thread and are
//! queued in [`ENGINE_INBOX`], where [`wait_for_ready`] looks for the engine's ready handshake.

use crate::error::PanelError;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver},
};
use midir::os::unix::{VirtualInput, VirtualOutput};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use organ_panel_lib::console::Engine;
use organ_panel_lib::sysex;
use std::io;
use tracing::{debug, info, warn};

/// How many inbound messages may wait before newer ones are dropped.
pub const INBOX_DEPTH: usize = 8;

/// A queue of messages received from the engine.
pub type Inbox = Channel<CriticalSectionRawMutex, Vec<u8>, INBOX_DEPTH>;

/// Messages received from the engine.
pub static ENGINE_INBOX: Inbox = Channel::new();

/// An [`Engine`] reached through virtual MIDI ports.
pub struct MidiEngine {
    output: MidiOutputConnection,
    _input: MidiInputConnection<()>,
}

impl MidiEngine {
    /// Creates an input and an output port, both called `name`. Messages received on the input are queued in
    /// [`ENGINE_INBOX`].
    pub fn open(name: &str) -> Result<Self, PanelError> {
        let mut input = MidiInput::new(name).map_err(|e| PanelError::Midi(e.to_string()))?;
        // System Exclusive messages are ignored by default, and the handshake is one
        input.ignore(Ignore::None);
        let input = input
            .create_virtual(
                name,
                |_timestamp, message, _| {
                    if ENGINE_INBOX.try_send(message.to_vec()).is_err() {
                        warn!("Engine inbox full, dropping message");
                    }
                },
                (),
            )
            .map_err(|e| PanelError::Midi(e.to_string()))?;

        let output = MidiOutput::new(name)
            .map_err(|e| PanelError::Midi(e.to_string()))?
            .create_virtual(name)
            .map_err(|e| PanelError::Midi(e.to_string()))?;

        info!("Created MIDI port {}", name);
        Ok(Self {
            output,
            _input: input,
        })
    }
}

impl Engine for MidiEngine {
    fn send(&mut self, message: &[u8]) -> io::Result<()> {
        self.output
            .send(message)
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

/// Waits, without a timeout, until the engine reports that it is ready. Everything else received in the meantime is
/// discarded.
pub async fn wait_for_ready(inbox: Receiver<'_, CriticalSectionRawMutex, Vec<u8>, INBOX_DEPTH>) {
    loop {
        let message = inbox.receive().await;
        if sysex::is_ready(&message) {
            info!("Engine ready");
            return;
        }
        match sysex::decode(&message) {
            Some((event, value)) => debug!(?event, value, "ignoring control message"),
            None => debug!(?message, "ignoring message"),
        }
    }
}
