//! The horizontal chain of screens shown on the console, and which of them is current.
//!
//! Screens are linked once, left to right, in the order they are added. The chain never changes afterwards, so it
//! cannot form cycles.

use crate::display::Lines;
use crate::keypad::Key;
use crate::registration::Registration;
use crate::screen::{Effect, Interact, Neighbors, Response, Screen};

/// Whether a screen returns to its default value when the engine loads another instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// The screen keeps its value across instrument reloads.
    Keep,
    /// The screen is reset on instrument reload, as the engine forgets the setting.
    Reset,
}

#[derive(Debug)]
struct Node {
    screen: Screen,
    left: Option<usize>,
    right: Option<usize>,
    policy: ReloadPolicy,
}

/// What happened to the menu as a result of a key press.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Work to be carried out on behalf of the current screen.
    pub effect: Option<Effect>,
    /// Whether the display no longer matches the menu.
    pub redraw: bool,
}

/// The console menu.
#[derive(Debug)]
pub struct Menu {
    nodes: Vec<Node>,
    current: usize,
}

impl Menu {
    /// Starts a menu with its first screen, which is also the current one.
    pub fn new(first: impl Into<Screen>, policy: ReloadPolicy) -> Self {
        Self {
            nodes: vec![Node {
                screen: first.into(),
                left: None,
                right: None,
                policy,
            }],
            current: 0,
        }
    }

    /// Appends a screen to the right of the last one.
    pub fn then(mut self, screen: impl Into<Screen>, policy: ReloadPolicy) -> Self {
        let index = self.nodes.len();
        let previous = index - 1;
        self.nodes[previous].right = Some(index);
        self.nodes.push(Node {
            screen: screen.into(),
            left: Some(previous),
            right: None,
            policy,
        });
        self
    }

    /// Passes a key to the current screen and follows any navigation it asks for.
    pub fn process_key(&mut self, key: Key, registration: &Registration) -> Transition {
        let node = &mut self.nodes[self.current];
        match node.screen.process_key(key, registration) {
            Response::Unchanged => Transition::default(),
            Response::Redraw => Transition {
                effect: None,
                redraw: true,
            },
            Response::Apply(effect) => Transition {
                effect: Some(effect),
                redraw: true,
            },
            Response::Navigate(direction) => {
                let target = match direction {
                    Key::Left => node.left,
                    Key::Right => node.right,
                    Key::Up | Key::Down => None,
                };
                match target {
                    Some(index) => {
                        self.current = index;
                        Transition {
                            effect: None,
                            redraw: true,
                        }
                    }
                    None => Transition::default(),
                }
            }
        }
    }

    /// Renders the current screen.
    pub fn render(&self, registration: &Registration) -> Lines {
        let node = &self.nodes[self.current];
        let neighbors = Neighbors {
            left: node.left.is_some(),
            right: node.right.is_some(),
        };
        node.screen.render(neighbors, registration)
    }

    /// Resets every screen registered with [`ReloadPolicy::Reset`].
    pub fn reset_for_reload(&mut self) {
        self.nodes
            .iter_mut()
            .filter(|node| node.policy == ReloadPolicy::Reset)
            .for_each(|node| node.screen.reset());
    }

    /// Whether the current screen wants to be redrawn after every event.
    pub fn needs_redraw(&self) -> bool {
        self.current().needs_redraw()
    }

    /// The current screen.
    pub fn current(&self) -> &Screen {
        &self.nodes[self.current].screen
    }

    /// Position of the current screen, counting from the left.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Number of screens in the menu.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a menu holds at least one screen.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
