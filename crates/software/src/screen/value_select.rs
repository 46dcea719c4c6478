use super::{Interact, Neighbors, OnUpdate, Response};
use crate::display::{Lines, format_arrows};
use crate::keypad::Key;
use crate::registration::Registration;

/// A screen for choosing a bounded integer, or one entry from a list of labels.
///
/// The screen starts out *browsing*, where left and right move through the menu. Down starts *editing*, where left
/// and right move the value by one stride, and up returns to browsing. Values are clamped to the bounds rather than
/// wrapped around.
#[derive(Debug)]
pub struct ValueSelect {
    name: String,
    value: i16,
    default: i16,
    minimum: i16,
    maximum: i16,
    stride: i16,
    labels: Option<Vec<String>>,
    unit_suffix: String,
    editing: bool,
    on_update: OnUpdate,
}

impl ValueSelect {
    /// Constructs a numeric selector, starting at its default value with a stride of 1.
    pub fn new(
        name: impl Into<String>,
        default: i16,
        minimum: i16,
        maximum: i16,
        on_update: OnUpdate,
    ) -> Self {
        Self {
            name: name.into(),
            value: default,
            default,
            minimum,
            maximum,
            stride: 1,
            labels: None,
            unit_suffix: String::new(),
            editing: false,
            on_update,
        }
    }

    /// Constructs a selector over a list of labels. The value is the index of the chosen label.
    ///
    /// # Panics
    ///
    /// Panics if `labels` is empty, or holds more entries than an `i16` can index.
    pub fn enumerated(
        name: impl Into<String>,
        labels: Vec<String>,
        default: i16,
        on_update: OnUpdate,
    ) -> Self {
        assert!(!labels.is_empty(), "an enumerated selector needs labels");
        let maximum = i16::try_from(labels.len() - 1).expect("label count should fit in i16");
        Self {
            labels: Some(labels),
            ..Self::new(name, default, 0, maximum, on_update)
        }
    }

    /// Sets how far one key press moves the value.
    pub fn with_stride(mut self, stride: i16) -> Self {
        self.stride = stride;
        self
    }

    /// Sets text shown after the number, such as a unit.
    pub fn with_unit_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.unit_suffix = suffix.into();
        self
    }

    /// The current value.
    pub fn value(&self) -> i16 {
        self.value
    }

    /// Whether the value is being edited.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    fn format_value(&self) -> String {
        match self.labels.as_ref().and_then(|labels| labels.get(self.value as usize)) {
            Some(label) => label.clone(),
            None => format!("{}{}", self.value, self.unit_suffix),
        }
    }

    fn edit(&mut self, key: Key) -> Response {
        let value = match key {
            Key::Up => {
                self.editing = false;
                return Response::Redraw;
            }
            Key::Down => return Response::Unchanged,
            Key::Left => self.value.saturating_sub(self.stride).max(self.minimum),
            Key::Right => self.value.saturating_add(self.stride).min(self.maximum),
        };

        if value == self.value {
            return Response::Unchanged;
        }
        self.value = value;
        Response::Apply((self.on_update)(value))
    }
}

impl Interact for ValueSelect {
    fn process_key(&mut self, key: Key, _registration: &Registration) -> Response {
        if self.editing {
            return self.edit(key);
        }

        match key {
            Key::Left | Key::Right => Response::Navigate(key),
            Key::Down => {
                self.editing = true;
                Response::Redraw
            }
            Key::Up => Response::Unchanged,
        }
    }

    fn render(&self, neighbors: Neighbors, _registration: &Registration) -> Lines {
        let browsing = !self.editing;
        [
            format_arrows(&self.name, browsing && neighbors.left, browsing && neighbors.right),
            format_arrows(
                &self.format_value(),
                self.editing && self.value > self.minimum,
                self.editing && self.value < self.maximum,
            ),
        ]
    }

    fn reset(&mut self) {
        self.value = self.default;
    }
}
