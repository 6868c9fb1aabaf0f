//! Line sink over the process standard output.
//!
//! On the ESP32 targets stdout is the UART0 console, so this is the sink both
//! firmware binaries print readings through. On a desktop host it is the
//! terminal.

use std::io::{self, Write};

use crate::traits::LineSink;

/// Writes each line to stdout and flushes it immediately.
#[derive(Debug, Default)]
pub struct StdoutSink {
    _private: (),
}

impl StdoutSink {
    /// Creates a stdout sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineSink for StdoutSink {
    type Error = io::Error;

    fn write_line(&mut self, line: &str) -> Result<(), io::Error> {
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}
