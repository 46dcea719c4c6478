//! The controller at the center of the panel.
//!
//! A [`Console`] owns every piece of mutable state (the menu, the registration, the set of sounding stops) and
//! processes events strictly one at a time. After each event it brings the engine's stops in line with the
//! registration and refreshes the display if needed. Devices are reached only through the [`TextDisplay`],
//! [`Engine`] and [`PistonStore`] traits, so the same policy runs against real hardware and test doubles.

use crate::display::TextDisplay;
use crate::keypad::Key;
use crate::menu::Menu;
use crate::registration::{Command, PistonMemory, Registration, StopSet, stop_changes};
use crate::screen::Effect;
use crate::sysex;
use std::io;
use tracing::{debug, info, warn};
use wmidi::Channel;

/// Text shown while the engine is loading an instrument.
pub const LOADING: &str = "Loading...";

/// Something that happened on one of the console's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A navigation key was pressed.
    Key(Key),
    /// No key has been pressed for a while; the display should go dark.
    Sleep,
    /// A line was received from the register-switch unit.
    Registers(String),
}

/// Sends messages to the organ-sound engine.
pub trait Engine {
    /// Sends one complete MIDI message.
    fn send(&mut self, message: &[u8]) -> io::Result<()>;
}

/// Persists the piston memory.
pub trait PistonStore {
    /// Replaces the stored memory with `pistons`.
    fn save(&mut self, pistons: &PistonMemory) -> io::Result<()>;
}

/// What the caller should do after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Carry on with the next event.
    Continue,
    /// The engine is loading an instrument. Wait for its ready message, then call [`Console::finish_reload`].
    AwaitReady,
}

/// The console controller.
pub struct Console<D, E, S> {
    menu: Menu,
    registration: Registration,
    /// Stops the engine has been told to sound.
    sounding: StopSet,
    asleep: bool,
    stop_channel: Channel,
    display: D,
    engine: E,
    store: S,
}

impl<D: TextDisplay, E: Engine, S: PistonStore> Console<D, E, S> {
    /// Constructs a console. Nothing is written to any device until [`start`](Self::start) or
    /// [`show_loading`](Self::show_loading) is called.
    pub fn new(
        menu: Menu,
        registration: Registration,
        stop_channel: Channel,
        display: D,
        engine: E,
        store: S,
    ) -> Self {
        Self {
            menu,
            registration,
            sounding: StopSet::new(),
            asleep: false,
            stop_channel,
            display,
            engine,
            store,
        }
    }

    /// Shows the loading screen.
    pub fn show_loading(&mut self) -> io::Result<()> {
        self.display.show(&[LOADING.to_owned(), String::new()])
    }

    /// Brings the engine's stops in line with the registration and shows the current screen. Call this once the
    /// engine is ready for the first time.
    pub fn start(&mut self) -> io::Result<()> {
        self.sync_stops()?;
        self.redraw()
    }

    /// Handles one event.
    ///
    /// Malformed register commands are logged and discarded. Any error returned is a transport fault.
    pub fn handle(&mut self, event: Event) -> io::Result<Step> {
        let mut redrawn = false;

        match event {
            Event::Sleep => {
                debug!("blanking display");
                self.display.blank()?;
                self.asleep = true;
            }
            Event::Key(_) if self.asleep => {
                // the key only wakes the display
                self.asleep = false;
                self.redraw()?;
                redrawn = true;
            }
            Event::Key(key) => {
                let transition = self.menu.process_key(key, &self.registration);
                if let Some(effect) = transition.effect {
                    if self.perform(effect)? == Step::AwaitReady {
                        return Ok(Step::AwaitReady);
                    }
                }
                if transition.redraw {
                    self.redraw()?;
                    redrawn = true;
                }
            }
            Event::Registers(line) => match line.parse::<Command>() {
                Ok(command) => self.registration.apply(command),
                Err(error) => warn!("Discarding register command {:?}: {}", line, error),
            },
        }

        self.sync_stops()?;
        if !self.asleep && !redrawn && self.menu.needs_redraw() {
            self.redraw()?;
        }
        Ok(Step::Continue)
    }

    /// Completes an instrument reload once the engine reports it is ready.
    ///
    /// Reload-sensitive screens go back to their defaults, every active stop is sent again since the engine has
    /// forgotten them, and the current screen is shown.
    pub fn finish_reload(&mut self) -> io::Result<()> {
        info!("Instrument loaded");
        self.menu.reset_for_reload();
        self.sounding.clear();
        self.sync_stops()?;
        if self.asleep {
            self.display.blank()
        } else {
            self.redraw()
        }
    }

    fn perform(&mut self, effect: Effect) -> io::Result<Step> {
        match effect {
            Effect::Send(message) => self.send(&message)?,
            Effect::LoadInstrument(message) => {
                info!("Loading instrument");
                self.send(&message)?;
                self.show_loading()?;
                return Ok(Step::AwaitReady);
            }
            Effect::SaveCombination => {
                if let Some(piston) = self.registration.save_combination() {
                    let piston = piston.to_owned();
                    self.store.save(self.registration.pistons())?;
                    info!("Saved combination to piston {}", piston);
                }
            }
        }
        Ok(Step::Continue)
    }

    fn sync_stops(&mut self) -> io::Result<()> {
        let active = self.registration.active_stops();
        for change in stop_changes(&self.sounding, &active) {
            debug!(?change, "stop change");
            self.engine.send(&change.message(self.stop_channel))?;
        }
        self.sounding = active;
        Ok(())
    }

    fn send(&mut self, message: &[u8]) -> io::Result<()> {
        match sysex::decode(message) {
            Some((event, value)) => debug!(?event, value, "sending control message"),
            None => debug!(?message, "sending message"),
        }
        self.engine.send(message)
    }

    fn redraw(&mut self) -> io::Result<()> {
        let lines = self.menu.render(&self.registration);
        self.display.show(&lines)
    }

    /// The menu.
    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// The registration.
    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Stops the engine has been told to sound.
    pub fn sounding(&self) -> &StopSet {
        &self.sounding
    }

    /// Whether the display has been blanked.
    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// The display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The piston store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::console_menu;
    use crate::display::CharacterDisplay;
    use crate::sysex::SysexEvent;

    #[derive(Default)]
    struct RecordingEngine {
        sent: Vec<Vec<u8>>,
    }

    impl Engine for RecordingEngine {
        fn send(&mut self, message: &[u8]) -> io::Result<()> {
            self.sent.push(message.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Vec<PistonMemory>,
    }

    impl PistonStore for RecordingStore {
        fn save(&mut self, pistons: &PistonMemory) -> io::Result<()> {
            self.saved.push(pistons.clone());
            Ok(())
        }
    }

    struct BrokenEngine;

    impl Engine for BrokenEngine {
        fn send(&mut self, _message: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "port closed"))
        }
    }

    type TestConsole = Console<CharacterDisplay<Vec<u8>>, RecordingEngine, RecordingStore>;

    const CHANNEL: Channel = Channel::Ch1;

    fn console_with(pistons: PistonMemory) -> TestConsole {
        let menu = console_menu(vec!["Modern Organ".to_owned(), "Positif".to_owned()]);
        let registration = Registration::new("manual", StopSet::from([7]), pistons);
        let mut console = Console::new(
            menu,
            registration,
            CHANNEL,
            CharacterDisplay::new(Vec::new()),
            RecordingEngine::default(),
            RecordingStore::default(),
        );
        console.start().unwrap();
        console
    }

    fn console() -> TestConsole {
        let mut pistons = PistonMemory::new();
        pistons.insert("P1".to_owned(), StopSet::from([1, 2, 3]));
        console_with(pistons)
    }

    /// Every line written to the display so far, trailing padding removed.
    fn written(console: &TestConsole) -> Vec<String> {
        String::from_utf8(console.display().get_ref().clone())
            .unwrap()
            .lines()
            .map(|line| line.trim_end().to_owned())
            .collect()
    }

    /// The two lines currently on the display.
    fn screen(console: &TestConsole) -> Vec<String> {
        let lines = written(console);
        lines[lines.len() - 2..].to_vec()
    }

    fn feed(console: &mut TestConsole, events: impl IntoIterator<Item = Event>) {
        for event in events {
            assert_eq!(Step::Continue, console.handle(event).unwrap());
        }
    }

    fn presses(key: Key, count: usize) -> impl Iterator<Item = Event> {
        std::iter::repeat_n(Event::Key(key), count)
    }

    fn registers(line: &str) -> Event {
        Event::Registers(line.to_owned())
    }

    fn on(stop: u8) -> Vec<u8> {
        crate::registration::StopChange::On(stop).message(CHANNEL)
    }

    fn off(stop: u8) -> Vec<u8> {
        crate::registration::StopChange::Off(stop).message(CHANNEL)
    }

    fn sent(console: &TestConsole) -> &[Vec<u8>] {
        &console.engine().sent
    }

    #[test]
    fn start_shows_first_screen() {
        let console = console();
        assert_eq!(
            vec!["  Instrument   >", "  Modern Organ"],
            written(&console),
            "Expected left but got right"
        );
        assert!(sent(&console).is_empty());
    }

    #[test]
    fn loading_screen() {
        let mut console = console();
        console.show_loading().unwrap();
        assert_eq!(vec!["Loading...", ""], screen(&console));
    }

    mod stops {
        use super::*;

        #[test]
        fn only_deltas_are_sent() {
            let mut console = console();
            feed(&mut console, [registers("stop on 1,2")]);
            assert_eq!(vec![on(1), on(2)], sent(&console), "Expected left but got right");

            feed(&mut console, [registers("piston P1")]);
            assert_eq!(
                vec![on(1), on(2), on(3)],
                sent(&console),
                "Recalling the piston should only add stop 3"
            );
            assert_eq!(&StopSet::from([1, 2, 3]), console.sounding());
        }

        #[test]
        fn key_presses_keep_stops() {
            let mut console = console();
            feed(&mut console, [registers("stop on 4"), Event::Key(Key::Right)]);
            assert_eq!(vec![on(4)], sent(&console));
        }

        #[test]
        fn reed_cutoff_after_malformed_lines() {
            let mut console = console();
            feed(
                &mut console,
                [
                    registers("stop on 7,8"),
                    registers("stop on"),
                    registers("reeds perhaps"),
                    registers("coupler on"),
                    registers("reeds on"),
                ],
            );
            assert!(console.registration().reeds_cutoff());
            assert_eq!(vec![on(7), on(8), off(7)], sent(&console), "Expected left but got right");
        }

        #[test]
        fn malformed_line_changes_nothing() {
            let mut console = console();
            feed(&mut console, [registers("stop on 1")]);
            let before = console.registration().clone();

            feed(&mut console, [registers("stop on 2 off x")]);
            assert_eq!(&before, console.registration());
            assert_eq!(vec![on(1)], sent(&console));
        }
    }

    mod sleep {
        use super::*;

        #[test]
        fn blanks_and_wakes_without_navigating() {
            let mut console = console();
            feed(&mut console, [Event::Sleep]);
            assert!(console.is_asleep());
            assert_eq!(vec!["", ""], screen(&console));

            feed(&mut console, [Event::Key(Key::Right)]);
            assert!(!console.is_asleep());
            assert_eq!(0, console.menu().position(), "The waking key should not navigate");
            assert_eq!(vec!["  Instrument   >", "  Modern Organ"], screen(&console));
        }

        #[test]
        fn stops_follow_registers_while_asleep() {
            let mut console = console();
            feed(&mut console, [Event::Sleep, registers("stop on 5")]);
            assert_eq!(vec![on(5)], sent(&console));
            assert_eq!(vec!["", ""], screen(&console), "The display should stay dark");
        }

        #[test]
        fn save_screen_stays_dark() {
            let mut console = console();
            feed(&mut console, presses(Key::Right, 7));
            feed(&mut console, [Event::Sleep, registers("piston P1")]);
            assert_eq!(vec!["", ""], screen(&console));
        }
    }

    mod menu {
        use super::*;

        #[test]
        fn edits_send_control_messages() {
            let mut console = console();
            feed(
                &mut console,
                [
                    Event::Key(Key::Right),
                    Event::Key(Key::Right),
                    Event::Key(Key::Down),
                    Event::Key(Key::Right),
                ],
            );
            assert_eq!(vec![SysexEvent::Transpose.message(1)], sent(&console));
            assert_eq!(vec!["  Transpose", "< 1            >"], screen(&console));
        }

        #[test]
        fn unchanged_screen_is_not_redrawn() {
            let mut console = console();
            let before = written(&console).len();
            feed(
                &mut console,
                [Event::Key(Key::Left), Event::Key(Key::Up), registers("stop on 1")],
            );
            assert_eq!(before, written(&console).len());
        }

        #[test]
        fn toggles_send_enter_and_exit() {
            let mut console = console();
            feed(&mut console, presses(Key::Right, 6));
            feed(&mut console, [Event::Key(Key::Down), Event::Key(Key::Up)]);
            assert_eq!(
                vec![SysexEvent::StartMetronome.message(0), SysexEvent::StopMetronome.message(0)],
                sent(&console),
                "Expected left but got right"
            );
        }
    }

    mod combination_save {
        use super::*;

        fn on_save_screen() -> TestConsole {
            let mut console = console();
            feed(&mut console, presses(Key::Right, 7));
            console
        }

        #[test]
        fn redraws_on_register_events() {
            let mut console = on_save_screen();
            assert_eq!(vec!["< Save piston", ""], screen(&console));

            feed(&mut console, [registers("piston P1")]);
            assert_eq!(vec!["< Save piston", "  SAVE P1"], screen(&console));
        }

        #[test]
        fn saves_and_persists() {
            let mut console = on_save_screen();
            feed(
                &mut console,
                [registers("stop on 4"), registers("piston P1"), Event::Key(Key::Down)],
            );

            assert_eq!(1, console.store().saved.len());
            assert_eq!(
                Some(&StopSet::from([4])),
                console.store().saved[0].get("P1"),
                "Expected left but got right"
            );
            assert_eq!(vec!["< Save piston", "  SAVED P1"], screen(&console));
            assert_eq!(
                &StopSet::from([4]),
                console.sounding(),
                "The piston should now sound its new snapshot"
            );
        }

        #[test]
        fn manual_piston_cannot_save() {
            let mut console = on_save_screen();
            feed(
                &mut console,
                [registers("stop on 4"), registers("piston manual"), Event::Key(Key::Down)],
            );
            assert!(console.store().saved.is_empty());
            assert_eq!(vec!["< Save piston", ""], screen(&console));
        }
    }

    mod reload {
        use super::*;

        fn change_instrument(console: &mut TestConsole) {
            assert_eq!(Step::Continue, console.handle(Event::Key(Key::Down)).unwrap());
            assert_eq!(Step::AwaitReady, console.handle(Event::Key(Key::Right)).unwrap());
        }

        #[test]
        fn waits_for_engine() {
            let mut console = console();
            feed(&mut console, [registers("stop on 1,2")]);
            change_instrument(&mut console);

            assert_eq!(
                vec![on(1), on(2), SysexEvent::Instrument.message(1)],
                sent(&console),
                "Expected left but got right"
            );
            assert_eq!(vec!["Loading...", ""], screen(&console));
        }

        #[test]
        fn resends_all_stops_and_resets_screens() {
            let mut console = console();
            feed(
                &mut console,
                [
                    registers("stop on 1,2"),
                    Event::Key(Key::Right),
                    Event::Key(Key::Down),
                    Event::Key(Key::Left),
                    Event::Key(Key::Up),
                    Event::Key(Key::Left),
                ],
            );
            change_instrument(&mut console);
            console.finish_reload().unwrap();

            assert_eq!(&sent(&console)[sent(&console).len() - 2..], &[on(1), on(2)]);
            assert_eq!(vec!["  Instrument", "< Positif"], screen(&console));

            feed(&mut console, [Event::Key(Key::Up), Event::Key(Key::Right)]);
            assert_eq!(
                vec!["< Temperament  >", "  Equal"],
                screen(&console),
                "Temperament should be back at its default"
            );
        }
    }

    #[test]
    fn transport_faults_propagate() {
        let mut console = Console::new(
            console_menu(vec!["Modern Organ".to_owned()]),
            Registration::new("manual", StopSet::new(), PistonMemory::new()),
            CHANNEL,
            CharacterDisplay::new(Vec::new()),
            BrokenEngine,
            RecordingStore::default(),
        );
        let error = console
            .handle(Event::Registers("stop on 1".to_owned()))
            .unwrap_err();
        assert_eq!(io::ErrorKind::BrokenPipe, error.kind());
    }
}
