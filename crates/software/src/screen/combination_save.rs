use super::{Effect, Interact, Neighbors, Response};
use crate::display::{Lines, format_arrows};
use crate::keypad::Key;
use crate::registration::Registration;

/// A screen that stores the current stop selection under the current piston.
///
/// What it shows depends on the piston and selection, which change without any key being pressed, so it asks to be
/// redrawn after every event.
#[derive(Debug)]
pub struct CombinationSave {
    name: String,
}

impl CombinationSave {
    /// Constructs the screen.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Interact for CombinationSave {
    fn process_key(&mut self, key: Key, registration: &Registration) -> Response {
        match key {
            Key::Left | Key::Right => Response::Navigate(key),
            Key::Down if registration.can_save() => Response::Apply(Effect::SaveCombination),
            Key::Down | Key::Up => Response::Unchanged,
        }
    }

    fn render(&self, neighbors: Neighbors, registration: &Registration) -> Lines {
        let status = match registration.piston() {
            Some(piston) if registration.can_save() => {
                let verb = if registration.is_saved() { "SAVED" } else { "SAVE" };
                format!("  {verb} {piston}")
            }
            _ => String::new(),
        };
        [format_arrows(&self.name, neighbors.left, neighbors.right), status]
    }

    fn needs_redraw(&self) -> bool {
        true
    }
}
