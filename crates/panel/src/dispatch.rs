//! The console's event loop.
//!
//! The loop waits for the engine's ready handshake at startup and again after every instrument change. Keypad input
//! is muted while it waits. Queued register lines and sleep requests are held back and handled once the engine is
//! ready, ahead of anything newer.

use crate::engine::{Inbox, wait_for_ready};
use crate::events::{EventQueue, held_events};
use crate::keypad::KeypadInput;
use organ_panel_lib::console::{Console, Engine, Event, PistonStore, Step};
use organ_panel_lib::display::TextDisplay;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::io;

/// Runs the console, returning only on a transport fault.
pub async fn serve<D: TextDisplay, E: Engine, S: PistonStore>(
    console: &mut Console<D, E, S>,
    events: &EventQueue,
    inbox: &Inbox,
    keypad: &KeypadInput,
) -> io::Result<Infallible> {
    console.show_loading()?;
    let mut pending = finish_loading(events, inbox, keypad).await;
    console.start()?;

    loop {
        let event = match pending.pop_front() {
            Some(event) => event,
            None => events.receive().await,
        };
        // a stale ready message must not end the next handshake early
        inbox.clear();

        if console.handle(event)? == Step::AwaitReady {
            keypad.mute();
            pending.extend(finish_loading(events, inbox, keypad).await);
            console.finish_reload()?;
        }
    }
}

/// Waits for the engine, lets keypad input through again, and returns the events held back meanwhile.
async fn finish_loading(events: &EventQueue, inbox: &Inbox, keypad: &KeypadInput) -> VecDeque<Event> {
    wait_for_ready(inbox.receiver()).await;
    keypad.unmute();
    held_events(events).into()
}
