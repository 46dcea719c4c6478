//! The screens of the console menu.
//!
//! A screen reacts to navigation keys and renders itself onto the display. Screens never talk to the engine
//! themselves: they answer each key with a [`Response`], and whatever owns the menu carries out the [`Effect`]s.

use crate::display::Lines;
use crate::keypad::Key;
use crate::registration::Registration;
use enum_dispatch::enum_dispatch;

mod combination_save;
mod toggle;
mod value_select;

pub use combination_save::*;
pub use toggle::*;
pub use value_select::*;

/// Every kind of screen the menu can hold.
#[enum_dispatch]
#[derive(Debug)]
pub enum Screen {
    /// A bounded number or a choice from a list.
    ValueSelect,
    /// An action that is started and stopped.
    Toggle,
    /// Stores the current selection under the current piston.
    CombinationSave,
}

/// Behavior shared by all screens.
#[enum_dispatch(Screen)]
pub trait Interact {
    /// Reacts to a navigation key.
    ///
    /// The registration is provided for screens whose behavior depends on stop state; screens never modify it.
    fn process_key(&mut self, key: Key, registration: &Registration) -> Response;

    /// Produces both display lines. `neighbors` tells the screen which navigation arrows may be drawn.
    fn render(&self, neighbors: Neighbors, registration: &Registration) -> Lines;

    /// Returns the screen to its initial value. Called on instrument reload for reload-sensitive screens.
    fn reset(&mut self) {}

    /// Whether the screen must be redrawn after every event, not only after its own transitions.
    fn needs_redraw(&self) -> bool {
        false
    }
}

/// What the owner of a screen should do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Nothing changed.
    Unchanged,
    /// Move to the neighboring screen in the direction of the key, if there is one.
    Navigate(Key),
    /// The screen changed and must be redrawn.
    Redraw,
    /// Carry out an effect, then redraw.
    Apply(Effect),
}

/// Work a screen asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a message to the engine.
    Send(Vec<u8>),
    /// Send a message which makes the engine reload its instrument, then wait until it is ready again.
    LoadInstrument(Vec<u8>),
    /// Store the current selection under the current piston.
    SaveCombination,
}

/// Maps a freshly edited value to the effect it should have.
pub type OnUpdate = fn(i16) -> Effect;

/// Which neighbors a screen has in the menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// A screen exists to the left.
    pub left: bool,
    /// A screen exists to the right.
    pub right: bool,
}

impl Neighbors {
    /// A screen with neighbors on both sides.
    pub const BOTH: Self = Self {
        left: true,
        right: true,
    };
}
