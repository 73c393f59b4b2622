//! Serial I/O for board communication
//!
//! `SerialTransport` wraps the UART link to the board. Replies are
//! newline-delimited text; `LineReader` does the byte-to-line assembly and
//! is kept generic over `Read` so it can be exercised without hardware.

use crate::error::{Error, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// A line-oriented link to the board
///
/// The console talks to the transport only through this trait, which keeps
/// the command loop testable with a scripted stand-in.
pub trait LineTransport {
    /// Send one command line, newline-terminated
    fn send_line(&mut self, cmd: &str) -> Result<()>;

    /// Read the next reply line, or an empty string on timeout
    fn read_line(&mut self) -> Result<String>;
}

/// Serial port wrapper for UART communication
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    reader: LineReader,
}

impl SerialTransport {
    /// Open a serial port
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyACM0")
    /// * `baud_rate` - Baud rate (e.g., 115200)
    /// * `timeout` - Per-read timeout; a reply drain ends when a read
    ///   times out with no data
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|source| Error::PortUnavailable {
                path: path.to_string(),
                source,
            })?;

        log::info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(SerialTransport {
            port,
            reader: LineReader::new(),
        })
    }
}

impl LineTransport for SerialTransport {
    fn send_line(&mut self, cmd: &str) -> Result<()> {
        write_command(&mut self.port, cmd)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        self.reader.read_line(&mut self.port)
    }
}

/// Write one command line to the port: the text verbatim plus a single `\n`
pub fn write_command(writer: &mut impl Write, cmd: &str) -> std::io::Result<()> {
    writer.write_all(cmd.as_bytes())?;
    writer.write_all(b"\n")
}

/// Assembles raw bytes into newline-delimited lines
///
/// Bytes left over after a line (the start of the next reply) are carried
/// across calls. Decoding is best-effort UTF-8: invalid bytes are dropped,
/// never fatal, since firmware occasionally emits garbage during reset.
pub struct LineReader {
    buf: Vec<u8>,
}

impl LineReader {
    /// Create a new empty line reader
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(256) }
    }

    /// Read the next line from `source`, trimmed of surrounding whitespace
    ///
    /// Returns an empty string when the read times out (or the source is
    /// exhausted) before any data arrives. Partial data buffered when the
    /// timeout hits is returned as a line rather than discarded.
    pub fn read_line(&mut self, source: &mut impl Read) -> Result<String> {
        let mut chunk = [0u8; 256];
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = self.buf.drain(..=pos).collect();
                return Ok(decode_dropping_invalid(&raw).trim().to_string());
            }

            match source.read(&mut chunk) {
                Ok(0) => {
                    let raw = std::mem::take(&mut self.buf);
                    return Ok(decode_dropping_invalid(&raw).trim().to_string());
                }
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    let raw = std::mem::take(&mut self.buf);
                    return Ok(decode_dropping_invalid(&raw).trim().to_string());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode bytes as UTF-8, skipping over invalid sequences
fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(s) => {
                out.push_str(s);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                if let Ok(s) = std::str::from_utf8(valid) {
                    out.push_str(s);
                }
                match e.error_len() {
                    Some(n) => rest = &after[n..],
                    // Truncated sequence at the end of the buffer
                    None => break,
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A reader that yields its chunks in order, then times out forever
    struct ChunkedSource {
        chunks: Vec<Vec<u8>>,
        next: usize,
    }

    impl ChunkedSource {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                next: 0,
            }
        }
    }

    impl Read for ChunkedSource {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.next >= self.chunks.len() {
                return Err(std::io::Error::new(ErrorKind::TimedOut, "timed out"));
            }
            let chunk = &self.chunks[self.next];
            self.next += 1;
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_read_single_line() {
        let mut reader = LineReader::new();
        let mut source = Cursor::new(b"T=23.5\n".to_vec());
        assert_eq!(reader.read_line(&mut source).unwrap(), "T=23.5");
    }

    #[test]
    fn test_read_strips_crlf() {
        let mut reader = LineReader::new();
        let mut source = Cursor::new(b"OK\r\n".to_vec());
        assert_eq!(reader.read_line(&mut source).unwrap(), "OK");
    }

    #[test]
    fn test_leftover_carries_to_next_call() {
        let mut reader = LineReader::new();
        let mut source = Cursor::new(b"T=23.5\nH=45\n".to_vec());
        assert_eq!(reader.read_line(&mut source).unwrap(), "T=23.5");
        assert_eq!(reader.read_line(&mut source).unwrap(), "H=45");
        // Exhausted source reads as empty
        assert_eq!(reader.read_line(&mut source).unwrap(), "");
    }

    #[test]
    fn test_line_split_across_reads() {
        let mut reader = LineReader::new();
        let mut source = ChunkedSource::new(&[b"T=2", b"3.5\nOK\n"]);
        assert_eq!(reader.read_line(&mut source).unwrap(), "T=23.5");
        assert_eq!(reader.read_line(&mut source).unwrap(), "OK");
    }

    #[test]
    fn test_timeout_returns_empty() {
        let mut reader = LineReader::new();
        let mut source = ChunkedSource::new(&[]);
        assert_eq!(reader.read_line(&mut source).unwrap(), "");
    }

    #[test]
    fn test_timeout_flushes_partial_line() {
        let mut reader = LineReader::new();
        let mut source = ChunkedSource::new(&[b"P=1013"]);
        // No newline ever arrives; the partial data comes back on timeout
        assert_eq!(reader.read_line(&mut source).unwrap(), "P=1013");
        assert_eq!(reader.read_line(&mut source).unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8_dropped() {
        let mut reader = LineReader::new();
        let mut source = Cursor::new(b"T=\xFF\xFE23.5\n".to_vec());
        assert_eq!(reader.read_line(&mut source).unwrap(), "T=23.5");
    }

    #[test]
    fn test_decode_keeps_valid_multibyte() {
        assert_eq!(decode_dropping_invalid("°C=25".as_bytes()), "°C=25");
        assert_eq!(decode_dropping_invalid(b"\xC3"), ""); // truncated sequence
    }

    #[test]
    fn test_write_command_appends_single_newline() {
        let mut out = Vec::new();
        write_command(&mut out, "RELAY ON").unwrap();
        assert_eq!(out, b"RELAY ON\n");
    }
}
