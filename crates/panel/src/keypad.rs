//! Reads the display/keypad unit.
//!
//! A thread performs the blocking reads and forwards each byte into [`KEYPAD`]. The [`keypad_task`] assembles escape
//! sequences from those bytes and turns them into key events, or into a sleep event when the keypad has been idle for
//! too long. While the engine loads an instrument the input is muted, and every byte received is thrown away.

use crate::error::{PanelError, fatal};
use crate::events::EVENTS;
use embassy_futures::block_on;
use embassy_sync::{
    blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex},
    channel::{Channel, Receiver},
};
use embassy_time::{Duration, with_timeout};
use organ_panel_lib::console::Event;
use organ_panel_lib::keypad::{EscapeSequence, Key};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::debug;

const BYTES_DEPTH: usize = 32;

/// The keypad's input, shared between the reader thread, the keypad task and the console task.
pub static KEYPAD: KeypadInput = KeypadInput::new();

/// Bytes received from the keypad, and whether they are currently wanted.
pub struct KeypadInput {
    bytes: Channel<CriticalSectionRawMutex, u8, BYTES_DEPTH>,
    muted: AtomicBool,
}

impl KeypadInput {
    /// Constructs a muted input: nothing gets through until the engine is ready for the first time.
    pub const fn new() -> Self {
        Self {
            bytes: Channel::new(),
            muted: AtomicBool::new(true),
        }
    }

    /// Starts discarding keypad input.
    pub fn mute(&self) {
        self.muted.store(true, Ordering::Release);
    }

    /// Lets keypad input through again. Bytes that arrived while muted and haven't been read yet are dropped.
    pub fn unmute(&self) {
        self.bytes.clear();
        self.muted.store(false, Ordering::Release);
    }

    /// Whether keypad input is being discarded.
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }
}

impl Default for KeypadInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Starts the thread reading the keypad. Running out of input, or failing to read, ends the process.
pub fn spawn_reader(reader: impl Read + Send + 'static) -> Result<(), PanelError> {
    thread::Builder::new()
        .name("keypad".to_owned())
        .spawn(move || read_keypad(reader))?;
    Ok(())
}

fn read_keypad(reader: impl Read) {
    match forward_bytes(reader, &KEYPAD.bytes) {
        Ok(()) => fatal(io::Error::new(io::ErrorKind::UnexpectedEof, "keypad closed")),
        Err(error) => fatal(error),
    }
}

/// Copies bytes from `reader` into `channel` until the input ends.
pub fn forward_bytes<M: RawMutex, const N: usize>(
    mut reader: impl Read,
    channel: &Channel<M, u8, N>,
) -> io::Result<()> {
    let mut buffer = [0u8; 1];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(_) => block_on(channel.send(buffer[0])),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}

/// Waits for the next value, for at most `timeout` if one is given. Returns `None` if the time ran out.
pub async fn next_input<M: RawMutex, T, const N: usize>(
    receiver: Receiver<'_, M, T, N>,
    timeout: Option<Duration>,
) -> Option<T> {
    match timeout {
        Some(timeout) => with_timeout(timeout, receiver.receive()).await.ok(),
        None => Some(receiver.receive().await),
    }
}

/// Turns keypad bytes into console events.
pub struct Keypad {
    sequence: EscapeSequence,
    blank_after: Option<Duration>,
    timeout: Option<Duration>,
}

impl Keypad {
    /// Constructs a keypad which asks for the display to be blanked after `blank_after` without a key press.
    pub fn new(blank_after: Option<Duration>) -> Self {
        Self {
            sequence: EscapeSequence::new(),
            blank_after,
            timeout: blank_after,
        }
    }

    /// Waits for the next key press, or for the keypad to have been idle long enough to blank the display.
    ///
    /// After an [`Event::Sleep`] the idle timer stops until the next key press. Bytes received while `input` is muted
    /// are discarded, together with any partial sequence.
    pub async fn next_event(&mut self, input: &KeypadInput) -> Event {
        loop {
            let Some(byte) = next_input(input.bytes.receiver(), self.timeout).await else {
                self.sequence.clear();
                self.timeout = None;
                return Event::Sleep;
            };

            if input.is_muted() {
                self.sequence.clear();
                continue;
            }
            let Some(sequence) = self.sequence.push(byte) else {
                continue;
            };
            match Key::from_sequence(&sequence) {
                Some(key) => {
                    self.timeout = self.blank_after;
                    return Event::Key(key);
                }
                None => debug!(?sequence, "ignoring unknown key sequence"),
            }
        }
    }
}

/// Task feeding keypad events into the console's queue.
#[embassy_executor::task]
pub async fn keypad_task(blank_after: Option<Duration>) -> ! {
    let mut keypad = Keypad::new(blank_after);
    loop {
        let event = keypad.next_event(&KEYPAD).await;
        EVENTS.send(event).await;
    }
}
