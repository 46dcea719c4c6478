//! Command-line arguments and the optional settings file.
//!
//! Settings are read from a TOML file when `--config` is given, then any flag given on the command line replaces
//! the file's value. Everything has a default, so the panel runs without a settings file.

use crate::error::PanelError;
use clap::Parser;
use embassy_time::Duration;
use organ_panel_lib::registration::StopSet;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use wmidi::Channel;

/// Controller for an organ console's display/keypad unit and register switches.
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Args {
    /// TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name of the virtual MIDI port the engine connects to
    #[arg(long)]
    pub midi_name: Option<String>,

    /// Seconds without a key press before the display is blanked; 0 never blanks
    #[arg(long)]
    pub blank_after: Option<u64>,

    /// Serial device of the display/keypad unit; standard input and output are used when absent
    #[arg(long)]
    pub tty: Option<PathBuf>,

    /// Serial device of the register-switch unit
    #[arg(long)]
    pub registers: Option<PathBuf>,

    /// JSON document holding the piston memory
    #[arg(long)]
    pub pistons: Option<PathBuf>,

    /// Log debug messages
    #[arg(long)]
    pub verbose: bool,
}

/// Longest idle time accepted before blanking: one day.
pub const MAX_BLANK_AFTER: u64 = 24 * 60 * 60;

/// Everything the panel needs to know at startup. Fixed for the lifetime of the process.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name of the virtual MIDI port.
    pub midi_name: String,
    /// Idle seconds before blanking, `0` to disable.
    pub blank_after: u64,
    /// Display/keypad device.
    pub tty: Option<PathBuf>,
    /// Register-switch device.
    pub registers: Option<PathBuf>,
    /// Piston memory document.
    pub pistons: Option<PathBuf>,
    /// MIDI channel carrying stop changes, counted from 1.
    pub stop_channel: u8,
    /// Piston that means "use the selected stops".
    pub manual_piston: String,
    /// Stops silenced by the reed cutoff.
    pub reed_stops: StopSet,
    /// Labels of the instruments the engine can load, in engine order.
    pub instruments: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            midi_name: "Control Panel".to_owned(),
            blank_after: 120,
            tty: None,
            registers: None,
            pistons: None,
            stop_channel: 1,
            manual_piston: "manual".to_owned(),
            reed_stops: StopSet::new(),
            instruments: vec!["Modern Organ".to_owned(), "Positif".to_owned()],
        }
    }
}

impl Settings {
    /// Builds the settings from the settings file named in `args` (if any) and the flags in `args`.
    pub fn load(args: &Args) -> Result<Self, PanelError> {
        let mut settings = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    PanelError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        settings.merge(args);
        settings.validate()?;
        Ok(settings)
    }

    /// Parses a settings file. Missing keys take their default values.
    pub fn from_toml(text: &str) -> Result<Self, PanelError> {
        toml::from_str(text).map_err(|e| PanelError::Config(e.to_string()))
    }

    /// Replaces values with those given on the command line.
    pub fn merge(&mut self, args: &Args) {
        if let Some(midi_name) = &args.midi_name {
            self.midi_name = midi_name.clone();
        }
        if let Some(blank_after) = args.blank_after {
            self.blank_after = blank_after;
        }
        if args.tty.is_some() {
            self.tty = args.tty.clone();
        }
        if args.registers.is_some() {
            self.registers = args.registers.clone();
        }
        if args.pistons.is_some() {
            self.pistons = args.pistons.clone();
        }
    }

    /// Rejects settings the panel cannot run with.
    pub fn validate(&self) -> Result<(), PanelError> {
        self.stop_channel()?;
        if self.blank_after > MAX_BLANK_AFTER {
            return Err(PanelError::Config(format!(
                "blank_after of {} seconds exceeds the limit of {}",
                self.blank_after, MAX_BLANK_AFTER
            )));
        }
        if self.instruments.is_empty() {
            return Err(PanelError::Config("at least one instrument is required".to_owned()));
        }
        if let Some(stop) = self.reed_stops.iter().find(|&&stop| stop > 127) {
            return Err(PanelError::Config(format!("reed stop {} is not between 0 and 127", stop)));
        }
        Ok(())
    }

    /// The MIDI channel carrying stop changes.
    pub fn stop_channel(&self) -> Result<Channel, PanelError> {
        self.stop_channel
            .checked_sub(1)
            .and_then(|index| Channel::from_index(index).ok())
            .ok_or_else(|| {
                PanelError::Config(format!(
                    "stop channel {} is not between 1 and 16",
                    self.stop_channel
                ))
            })
    }

    /// How long the keypad may stay idle before the display is blanked, or `None` if it never is.
    pub fn blank_after(&self) -> Option<Duration> {
        (self.blank_after > 0).then(|| Duration::from_secs(self.blank_after))
    }
}
