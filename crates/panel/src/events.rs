//! The queue through which every input reaches the console.
//!
//! Producers (the keypad task and the register reader thread) push [`Event`]s in arrival order; the console task is
//! the only consumer.

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use organ_panel_lib::console::Event;
use tracing::debug;

/// How many events may wait before producers have to wait.
pub const QUEUE_DEPTH: usize = 16;

/// A queue of console events.
pub type EventQueue = Channel<CriticalSectionRawMutex, Event, QUEUE_DEPTH>;

/// The console's input queue.
pub static EVENTS: EventQueue = Channel::new();

/// Empties the queue after the engine has finished loading, returning the events to replay.
///
/// Keys pressed while the loading screen was up are dropped. Register lines and sleep requests still describe the
/// state of the console, so they are kept in order.
pub fn held_events(queue: &EventQueue) -> Vec<Event> {
    let mut held = Vec::new();
    while let Ok(event) = queue.try_receive() {
        match event {
            Event::Key(key) => debug!(?key, "ignoring key pressed while loading"),
            event => held.push(event),
        }
    }
    held
}

#[cfg(test)]
mod tests {
    use super::*;
    use organ_panel_lib::keypad::Key;

    #[test]
    fn keys_are_dropped_and_the_rest_kept_in_order() {
        let queue = EventQueue::new();
        for event in [
            Event::Key(Key::Down),
            Event::Registers("stop on 1".to_owned()),
            Event::Key(Key::Left),
            Event::Sleep,
            Event::Registers("piston P1".to_owned()),
        ] {
            queue.try_send(event).unwrap();
        }

        assert_eq!(
            vec![
                Event::Registers("stop on 1".to_owned()),
                Event::Sleep,
                Event::Registers("piston P1".to_owned()),
            ],
            held_events(&queue),
            "Expected left but got right"
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_queue_holds_nothing() {
        assert!(held_events(&EventQueue::new()).is_empty());
    }
}
