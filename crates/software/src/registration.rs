//! Determines which stops sound.
//!
//! Three policies overlap here. The player draws stops by hand (the *selection*), a stored combination may be
//! recalled by selecting its *piston*, and the *reed cutoff* can silence the reed stops regardless of either. The
//! sounding set is never edited directly: [`Registration::active_stops`] derives it from the inputs every time, and
//! [`stop_changes`] turns the difference between two derived sets into the minimal list of on/off messages.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use wmidi::{Channel, MidiMessage, Note, U7};

mod command;
pub use command::*;

/// Identifies one organ stop. Stops are sent to the engine as note numbers, so valid ids are 0–127.
pub type StopId = u8;

/// A set of stops, kept in ascending order.
pub type StopSet = BTreeSet<StopId>;

/// Stored combinations, keyed by piston name.
pub type PistonMemory = BTreeMap<String, StopSet>;

/// Everything that decides which stops sound.
#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    /// Stops the player has drawn by hand.
    selected: StopSet,
    /// The piston most recently selected on the register unit, if any.
    piston: Option<String>,
    /// Stored combinations.
    pistons: PistonMemory,
    /// When set, stops in `reed_stops` never sound.
    reeds_cutoff: bool,
    /// Stops silenced by the reed cutoff.
    reed_stops: StopSet,
    /// Piston meaning "no stored combination, use the selection".
    manual_piston: String,
}

impl Registration {
    /// Constructs a [`Registration`] with nothing selected, no piston, and the reed cutoff disabled.
    pub fn new(manual_piston: impl Into<String>, reed_stops: StopSet, pistons: PistonMemory) -> Self {
        Self {
            selected: StopSet::new(),
            piston: None,
            pistons,
            reeds_cutoff: false,
            reed_stops,
            manual_piston: manual_piston.into(),
        }
    }

    /// Applies a command from the register unit.
    ///
    /// Stop changes are applied left to right, so `stop on 1 off 1` leaves stop 1 off.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Stops(changes) => {
                for (switch, stops) in changes {
                    for stop in stops {
                        match switch {
                            Switch::On => self.selected.insert(stop),
                            Switch::Off => self.selected.remove(&stop),
                        };
                    }
                }
            }
            Command::Piston(name) => {
                debug!(piston = %name, "piston selected");
                self.piston = Some(name);
            }
            Command::Reeds(switch) => {
                self.reeds_cutoff = switch == Switch::On;
            }
        }
    }

    /// Derives the set of stops which should currently sound.
    ///
    /// The stored combination of the selected piston takes precedence over the selection, unless no piston is
    /// selected, the manual piston is selected, or nothing has been stored for the piston yet. The reed cutoff is
    /// applied last, so it wins over both.
    pub fn active_stops(&self) -> StopSet {
        let mut active = match self.piston.as_deref() {
            Some(piston) if piston != self.manual_piston => self
                .pistons
                .get(piston)
                .unwrap_or(&self.selected)
                .clone(),
            _ => self.selected.clone(),
        };

        if self.reeds_cutoff {
            active.retain(|stop| !self.reed_stops.contains(stop));
        }
        active
    }

    /// Determines whether the selection may be stored: a piston must be selected, and it must not be the manual one.
    pub fn can_save(&self) -> bool {
        self.piston
            .as_deref()
            .is_some_and(|piston| piston != self.manual_piston)
    }

    /// Stores a snapshot of the selection under the current piston, replacing whatever was stored before.
    ///
    /// Returns the name of the piston written to, or `None` if [`can_save`](Self::can_save) doesn't hold.
    pub fn save_combination(&mut self) -> Option<&str> {
        if !self.can_save() {
            return None;
        }
        let piston = self.piston.as_deref()?;
        self.pistons.insert(piston.to_owned(), self.selected.clone());
        Some(piston)
    }

    /// Returns `true` if the current piston's stored combination is exactly the selection.
    pub fn is_saved(&self) -> bool {
        self.piston
            .as_deref()
            .and_then(|piston| self.pistons.get(piston))
            .is_some_and(|stored| *stored == self.selected)
    }

    /// Stops the player has drawn by hand.
    pub fn selected(&self) -> &StopSet {
        &self.selected
    }

    /// The piston most recently selected, if any.
    pub fn piston(&self) -> Option<&str> {
        self.piston.as_deref()
    }

    /// Stored combinations.
    pub fn pistons(&self) -> &PistonMemory {
        &self.pistons
    }

    /// Whether the reed cutoff is enabled.
    pub fn reeds_cutoff(&self) -> bool {
        self.reeds_cutoff
    }
}

/// A stop starting or ceasing to sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopChange {
    /// The stop was silent and now sounds.
    On(StopId),
    /// The stop sounded and is now silent.
    Off(StopId),
}

impl StopChange {
    /// Builds the message sent to the engine: a Note On at full velocity for [`StopChange::On`], a Note Off at zero
    /// velocity for [`StopChange::Off`], with the stop id as the note number.
    pub fn message(self, channel: Channel) -> Vec<u8> {
        match self {
            Self::On(stop) => MidiMessage::NoteOn(channel, note(stop), U7::MAX).to_vec(),
            Self::Off(stop) => MidiMessage::NoteOff(channel, note(stop), U7::MIN).to_vec(),
        }
    }
}

fn note(stop: StopId) -> Note {
    Note::from(U7::from_u8_lossy(stop))
}

/// Lists the changes needed to go from `previous` to `next`: one entry per stop in their symmetric difference, in
/// ascending stop order. Stops present in both sets are not resent.
pub fn stop_changes<'a>(
    previous: &'a StopSet,
    next: &'a StopSet,
) -> impl Iterator<Item = StopChange> + 'a {
    previous.symmetric_difference(next).map(move |&stop| {
        if next.contains(&stop) {
            StopChange::On(stop)
        } else {
            StopChange::Off(stop)
        }
    })
}
