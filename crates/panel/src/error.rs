use std::{fmt, io, process};
use tracing::error;

/// Faults the panel cannot recover from.
#[derive(Debug)]
pub enum PanelError {
    /// A device or file could not be read or written.
    Io(io::Error),
    /// The settings are unusable.
    Config(String),
    /// The MIDI ports could not be created.
    Midi(String),
    /// The piston memory document is unreadable.
    Pistons(String),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Io(e) => write!(f, "I/O error: {}", e),
            PanelError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PanelError::Midi(msg) => write!(f, "MIDI error: {}", msg),
            PanelError::Pistons(msg) => write!(f, "Piston memory error: {}", msg),
        }
    }
}

impl std::error::Error for PanelError {}

impl From<io::Error> for PanelError {
    fn from(e: io::Error) -> Self {
        PanelError::Io(e)
    }
}

/// Logs the error and terminates the process with status 1.
pub fn fatal(error: impl Into<PanelError>) -> ! {
    error!("{}", error.into());
    process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let error = PanelError::from(io::Error::new(io::ErrorKind::NotFound, "no such device"));
        assert!(matches!(error, PanelError::Io(_)));
        assert_eq!("I/O error: no such device", error.to_string());
    }
}
