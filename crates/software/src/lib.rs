//! This crate contains architecture-agnostic logic for the organ panel, a controller which sits between an organ
//! console's 16×2 display/keypad unit, its register-switch unit, and an organ-sound engine reachable over
//! [MIDI](https://midi.org/midi-1-0).
//!
//! Nothing in here touches a device. The executable crate owns the serial lines and MIDI ports and feeds events into
//! a [`Console`][console::Console], which talks back through the [`TextDisplay`][display::TextDisplay],
//! [`Engine`][console::Engine] and [`PistonStore`][console::PistonStore] traits.

#![deny(missing_docs)]

/// The menu of screens the console offers, with the protocol messages each one sends.
pub mod catalog;

pub mod console;
pub mod display;
pub mod keypad;
pub mod menu;
pub mod registration;
pub mod screen;
pub mod sysex;
