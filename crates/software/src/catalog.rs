use crate::menu::{Menu, ReloadPolicy};
use crate::screen::{CombinationSave, Effect, Toggle, ValueSelect};
use crate::sysex::SysexEvent;

/// Temperaments offered by the engine, in the order of their indices on the wire.
pub const TEMPERAMENTS: [&str; 9] = [
    "Original",
    "Equal",
    "1/4 Meantone",
    "1/5 Meantone",
    "1/6 Meantone",
    "2/7 Meantone",
    "Werckmeister",
    "Pythagorean",
    "Pyth. (B-F#)",
];

/// Index of equal temperament, the engine's default.
const EQUAL_TEMPERAMENT: i16 = 1;

/// Builds the console menu, with `instruments` as the labels of the instrument selector.
///
/// # Panics
///
/// Panics if `instruments` is empty.
pub fn console_menu(instruments: Vec<String>) -> Menu {
    let temperaments = TEMPERAMENTS.map(String::from).to_vec();

    Menu::new(
        ValueSelect::enumerated("Instrument", instruments, 0, |value| {
            Effect::LoadInstrument(SysexEvent::Instrument.message(value))
        }),
        ReloadPolicy::Keep,
    )
    .then(
        ValueSelect::enumerated("Temperament", temperaments, EQUAL_TEMPERAMENT, |value| {
            Effect::Send(SysexEvent::Temperament.message(value))
        }),
        ReloadPolicy::Reset,
    )
    .then(
        ValueSelect::new("Transpose", 0, -11, 11, |value| {
            Effect::Send(SysexEvent::Transpose.message(value))
        }),
        ReloadPolicy::Keep,
    )
    .then(
        Toggle::new(
            "Record audio",
            "  START REC",
            "^ STOP REC",
            SysexEvent::StartRecording.message(0),
            SysexEvent::StopRecording.message(0),
        ),
        ReloadPolicy::Keep,
    )
    .then(
        ValueSelect::new("Metron. BPM", 80, 1, 500, |value| {
            Effect::Send(SysexEvent::MetronomeBpm.message(value))
        }),
        ReloadPolicy::Reset,
    )
    .then(
        ValueSelect::new("Metron. div.", 4, 0, 32, |value| {
            Effect::Send(SysexEvent::MetronomeMeasure.message(value))
        }),
        ReloadPolicy::Reset,
    )
    .then(
        Toggle::new(
            "Metronome",
            "  START",
            "^ STOP",
            SysexEvent::StartMetronome.message(0),
            SysexEvent::StopMetronome.message(0),
        ),
        ReloadPolicy::Keep,
    )
    .then(CombinationSave::new("Save piston"), ReloadPolicy::Keep)
}
