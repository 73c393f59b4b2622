//! Interactive command loop
//!
//! Two-phase cycle: wait for a command at the prompt, send it, then drain
//! the board's reply lines through the router until the link goes quiet.
//! Single-threaded and blocking throughout; the shutdown flag is checked
//! whenever a blocking call returns.

use crate::error::Result;
use crate::router::Router;
use crate::serial_io::LineTransport;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The interactive console session
pub struct Console<T: LineTransport> {
    transport: T,
    router: Router,
    max_drain_lines: u32,
}

impl<T: LineTransport> Console<T> {
    /// Create a console over an open transport
    pub fn new(transport: T, router: Router, max_drain_lines: u32) -> Self {
        Self {
            transport,
            router,
            max_drain_lines,
        }
    }

    /// Run the prompt loop until interrupted or `input` is exhausted
    ///
    /// Blank input lines are ignored without touching the port. The loop
    /// also ends cleanly on EOF, so the console can be fed from a script.
    pub fn run(&mut self, input: &mut impl BufRead, running: &Arc<AtomicBool>) -> Result<()> {
        while running.load(Ordering::Relaxed) {
            print!(">>> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                log::info!("Input closed, exiting");
                break;
            }
            if !running.load(Ordering::Relaxed) {
                break;
            }

            let cmd = line.trim();
            if cmd.is_empty() {
                continue;
            }

            self.send_command(cmd)?;
        }
        Ok(())
    }

    /// Send one command to the board and drain its reply
    pub fn send_command(&mut self, cmd: &str) -> Result<()> {
        log::debug!("Sending command: {}", cmd);
        self.transport.send_line(cmd)?;
        self.drain_replies()
    }

    /// Route reply lines until a read comes back empty
    ///
    /// An empty read means either the per-line timeout elapsed or the board
    /// sent a bare newline; both hand control back to the prompt. The line
    /// cap guards against firmware that streams without end.
    fn drain_replies(&mut self) -> Result<()> {
        let mut drained = 0u32;
        loop {
            let line = self.transport.read_line()?;
            if line.is_empty() {
                break;
            }

            self.router.route(&line)?;
            drained += 1;
            if drained >= self.max_drain_lines {
                log::warn!(
                    "Reply drain hit the {}-line cap, returning to prompt",
                    self.max_drain_lines
                );
                break;
            }
        }
        log::debug!("Drained {} reply line(s)", drained);
        Ok(())
    }
}
