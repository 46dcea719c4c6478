use crate::error::PanelError;
use organ_panel_lib::console::PistonStore;
use organ_panel_lib::registration::PistonMemory;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

/// Keeps the piston memory in a JSON document mapping piston names to lists of stop ids.
///
/// The document is replaced by writing a new file next to it and renaming that over the old one, so an interrupted
/// save leaves the previous document intact. Without a path, combinations last only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct PistonFile {
    path: Option<PathBuf>,
}

impl PistonFile {
    /// Uses the document at `path`, or none at all.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Reads the stored memory. A document which doesn't exist yet holds no combinations.
    pub fn load(&self) -> Result<PistonMemory, PanelError> {
        let Some(path) = &self.path else {
            return Ok(PistonMemory::new());
        };
        if !path.exists() {
            debug!("No piston memory at {}", path.display());
            return Ok(PistonMemory::new());
        }

        let data = fs::read_to_string(path)?;
        let memory: PistonMemory = serde_json::from_str(&data)
            .map_err(|e| PanelError::Pistons(format!("{}: {}", path.display(), e)))?;
        if let Some((piston, stop)) = memory
            .iter()
            .find_map(|(piston, stops)| stops.iter().find(|&&stop| stop > 127).map(|stop| (piston, stop)))
        {
            return Err(PanelError::Pistons(format!(
                "piston {} holds stop {}, which is not between 0 and 127",
                piston, stop
            )));
        }
        Ok(memory)
    }
}

impl PistonStore for PistonFile {
    fn save(&mut self, pistons: &PistonMemory) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(directory)?;
        serde_json::to_writer_pretty(&mut file, pistons)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
