use super::{Effect, Interact, Neighbors, Response};
use crate::display::{Lines, format_arrows};
use crate::keypad::Key;
use crate::registration::Registration;

/// A screen that starts and stops something on the engine, such as the metronome.
///
/// Down starts the action and up stops it. While the action runs, the screen holds the keypad: left and right do
/// nothing until it has been stopped.
#[derive(Debug)]
pub struct Toggle {
    name: String,
    idle_text: String,
    active_text: String,
    enter: Vec<u8>,
    exit: Vec<u8>,
    active: bool,
}

impl Toggle {
    /// Constructs an idle toggle.
    ///
    /// `idle_text` is shown while the action is stopped and `active_text` while it runs. `enter` and `exit` are the
    /// messages sent on starting and stopping.
    pub fn new(
        name: impl Into<String>,
        idle_text: impl Into<String>,
        active_text: impl Into<String>,
        enter: Vec<u8>,
        exit: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            idle_text: idle_text.into(),
            active_text: active_text.into(),
            enter,
            exit,
            active: false,
        }
    }

    /// Whether the action is running.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Interact for Toggle {
    fn process_key(&mut self, key: Key, _registration: &Registration) -> Response {
        match (self.active, key) {
            (true, Key::Up) => {
                self.active = false;
                Response::Apply(Effect::Send(self.exit.clone()))
            }
            (false, Key::Down) => {
                self.active = true;
                Response::Apply(Effect::Send(self.enter.clone()))
            }
            (false, Key::Left | Key::Right) => Response::Navigate(key),
            _ => Response::Unchanged,
        }
    }

    fn render(&self, neighbors: Neighbors, _registration: &Registration) -> Lines {
        let idle = !self.active;
        let status = if self.active {
            &self.active_text
        } else {
            &self.idle_text
        };
        [
            format_arrows(&self.name, idle && neighbors.left, idle && neighbors.right),
            status.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{PistonMemory, StopSet};

    fn recorder() -> Toggle {
        Toggle::new("Record audio", "  START REC", "^ STOP REC", vec![0xA], vec![0xB])
    }

    fn registration() -> Registration {
        Registration::new("manual", StopSet::new(), PistonMemory::new())
    }

    #[test]
    fn down_then_up_sends_both_messages() {
        let mut toggle = recorder();
        let registration = registration();

        assert_eq!(
            Response::Apply(Effect::Send(vec![0xA])),
            toggle.process_key(Key::Down, &registration),
            "Expected left but got right"
        );
        assert!(toggle.is_active());
        assert_eq!(Response::Unchanged, toggle.process_key(Key::Down, &registration));

        assert_eq!(
            Response::Apply(Effect::Send(vec![0xB])),
            toggle.process_key(Key::Up, &registration),
            "Expected left but got right"
        );
        assert!(!toggle.is_active());
        assert_eq!(Response::Unchanged, toggle.process_key(Key::Up, &registration));
    }

    #[test]
    fn navigation_only_while_idle() {
        let mut toggle = recorder();
        let registration = registration();

        assert_eq!(Response::Navigate(Key::Right), toggle.process_key(Key::Right, &registration));
        toggle.process_key(Key::Down, &registration);
        assert_eq!(Response::Unchanged, toggle.process_key(Key::Right, &registration));
        assert_eq!(Response::Unchanged, toggle.process_key(Key::Left, &registration));
    }

    #[test]
    fn renders_state() {
        let mut toggle = recorder();
        let registration = registration();

        assert_eq!(
            ["< Record audio >".to_owned(), "  START REC".to_owned()],
            toggle.render(Neighbors::BOTH, &registration),
            "Expected left but got right"
        );

        toggle.process_key(Key::Down, &registration);
        assert_eq!(
            ["  Record audio".to_owned(), "^ STOP REC".to_owned()],
            toggle.render(Neighbors::BOTH, &registration),
            "Arrows should be hidden while the action runs"
        );
    }

    #[test]
    fn reset_keeps_state() {
        let mut toggle = recorder();
        toggle.process_key(Key::Down, &registration());
        toggle.reset();
        assert!(toggle.is_active());
    }
}
