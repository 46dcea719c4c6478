//! Reads command lines from the register-switch unit.

use crate::error::{PanelError, fatal};
use crate::events::{EVENTS, EventQueue};
use embassy_futures::block_on;
use organ_panel_lib::console::Event;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;

/// Opens the register-switch device and starts the thread reading it. Once started, losing the device ends the
/// process.
pub fn spawn_reader(path: &Path) -> Result<(), PanelError> {
    let device = File::open(path)?;
    thread::Builder::new()
        .name("registers".to_owned())
        .spawn(move || read_registers(BufReader::new(device)))?;
    Ok(())
}

fn read_registers(reader: impl BufRead) {
    match forward_lines(reader, &EVENTS) {
        Ok(()) => fatal(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "register-switch unit closed",
        )),
        Err(error) => fatal(error),
    }
}

/// Queues each line from `reader`, without its terminator, until the input ends.
///
/// Bytes that aren't UTF-8 are replaced rather than rejected; the command parser deals with the result.
pub fn forward_lines(mut reader: impl BufRead, queue: &EventQueue) -> io::Result<()> {
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buffer);
        let line = line.trim_end_matches(['\r', '\n']).to_owned();
        block_on(queue.send(Event::Registers(line)));
    }
}
