//! Line-oriented control plane for stream transports.
//!
//! Each input line is one raw path. Each signal is written as one JSON object
//! followed by a newline and flushed immediately, so a caller reading the
//! output stream line by line sees signals as they happen.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use super::{Command, ControlError, ControlPlane, Signal};

/// Maximum accepted command line length in bytes, terminator included.
pub const MAX_COMMAND_BYTES: usize = 64 * 1024;

/// Line control plane bound to the process's standard streams.
pub type StdioControlPlane = LineControlPlane<BufReader<Stdin>, Stdout>;

/// Control plane that reads paths from `R` and writes JSON signals to `W`.
#[derive(Debug)]
pub struct LineControlPlane<R, W> {
    reader: R,
    writer: W,
    max_line_bytes: usize,
}

impl LineControlPlane<BufReader<Stdin>, Stdout> {
    /// Binds the control plane to stdin and stdout.
    #[must_use]
    pub fn stdio() -> StdioControlPlane {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> LineControlPlane<R, W> {
    /// Wraps a reader and writer pair.
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            max_line_bytes: MAX_COMMAND_BYTES,
        }
    }

    /// Overrides the maximum accepted line length.
    #[must_use]
    pub const fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Releases the underlying reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R, W> ControlPlane for LineControlPlane<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn emit(&mut self, signal: &Signal) -> Result<(), ControlError> {
        serde_json::to_writer(&mut self.writer, signal)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn await_next_command(&mut self) -> Result<Option<Command>, ControlError> {
        let Some(mut line) = read_command_line(&mut self.reader, self.max_line_bytes)? else {
            return Err(ControlError::Closed);
        };
        strip_line_terminator(&mut line);
        let raw = String::from_utf8(line)?;
        Ok(Command::parse(raw))
    }
}

/// Reads one line, including its terminator when present.
///
/// Returns `Ok(None)` at end of input. A line longer than `max_size` is
/// consumed in full so the next read starts on the following line.
fn read_command_line<R: BufRead>(
    reader: &mut R,
    max_size: usize,
) -> Result<Option<Vec<u8>>, ControlError> {
    let mut buffer = Vec::new();

    loop {
        let (complete, used) = {
            let available = match reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            };

            if available.is_empty() {
                return Ok(if buffer.is_empty() {
                    None
                } else {
                    Some(buffer)
                });
            }

            match available.iter().position(|byte| *byte == b'\n') {
                Some(newline_pos) => {
                    let (line, _) = available.split_at(newline_pos + 1);
                    buffer.extend_from_slice(line);
                    (true, newline_pos + 1)
                }
                None => {
                    buffer.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);

        if buffer.len() > max_size {
            let skipped = if complete {
                0
            } else {
                reader.skip_until(b'\n')?
            };
            return Err(ControlError::RequestTooLarge {
                size: buffer.len() + skipped,
                max_size,
            });
        }

        if complete {
            return Ok(Some(buffer));
        }
    }
}

fn strip_line_terminator(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}
