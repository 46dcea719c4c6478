//! Organ Panel drives the control panel of a home organ console: a 16×2 character display with a four-key keypad,
//! and a unit reporting the state of the register switches. It sits between those devices and an organ-sound engine
//! which connects to the panel's virtual MIDI ports.
//!
//! The keypad walks through a menu of engine settings (instrument, temperament, transposition, metronome and so on),
//! each change being sent to the engine as a System Exclusive control message. Register switches select stops and
//! pistons, and the panel keeps the engine's sounding stops in line with them.
//!
//! Tasks run on an [Embassy](https://embassy.dev) executor hosted in the process. Blocking device reads happen on
//! their own threads, which hand their input to the tasks through channels.

mod configuration;
mod dispatch;
mod engine;
mod error;
mod events;
mod keypad;
mod pistons;
mod registers;

use crate::{
    configuration::{Args, Settings},
    engine::{ENGINE_INBOX, MidiEngine},
    error::{PanelError, fatal},
    events::EVENTS,
    keypad::{KEYPAD, keypad_task},
    pistons::PistonFile,
};
use clap::Parser;
use embassy_executor::Spawner;
use organ_panel_lib::{
    catalog::console_menu,
    console::Console,
    display::CharacterDisplay,
    registration::Registration,
};
use std::{
    fs::OpenOptions,
    io::{self, Read, Write},
};
use tracing::{Level, info};

type PanelDisplay = CharacterDisplay<Box<dyn Write + Send>>;
type PanelConsole = Console<PanelDisplay, MidiEngine, PistonFile>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let args = Args::parse();

    // stdout may be the display, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    info!("Initializing organ panel");

    let settings = Settings::load(&args).unwrap_or_else(|error| fatal(error));
    let console = open_console(&settings).unwrap_or_else(|error| fatal(error));

    spawner
        .spawn(keypad_task(settings.blank_after()))
        .expect("keypad task should spawn");
    spawner
        .spawn(console_task(console))
        .expect("console task should spawn");
}

/// Opens every device, starts the reader threads, and assembles the console.
fn open_console(settings: &Settings) -> Result<PanelConsole, PanelError> {
    let stop_channel = settings.stop_channel()?;
    let pistons = PistonFile::new(settings.pistons.clone());
    let memory = pistons.load()?;
    info!("Loaded {} piston(s)", memory.len());

    let engine = MidiEngine::open(&settings.midi_name)?;

    let (keypad, display): (Box<dyn Read + Send>, Box<dyn Write + Send>) = match &settings.tty {
        Some(path) => {
            let device = OpenOptions::new().read(true).write(true).open(path)?;
            (Box::new(device.try_clone()?), Box::new(device))
        }
        None => (Box::new(io::stdin()), Box::new(io::stdout())),
    };
    keypad::spawn_reader(keypad)?;

    match &settings.registers {
        Some(path) => registers::spawn_reader(path)?,
        None => info!("No register-switch unit configured"),
    }

    let registration = Registration::new(
        settings.manual_piston.clone(),
        settings.reed_stops.clone(),
        memory,
    );
    Ok(Console::new(
        console_menu(settings.instruments.clone()),
        registration,
        stop_channel,
        CharacterDisplay::new(display),
        engine,
        pistons,
    ))
}

/// Task owning the console: it waits for the engine, then handles queued events one at a time.
#[embassy_executor::task]
async fn console_task(mut console: PanelConsole) -> ! {
    match dispatch::serve(&mut console, &EVENTS, &ENGINE_INBOX, &KEYPAD).await {
        Ok(never) => match never {},
        Err(error) => fatal(error),
    }
}
