//! IO handling for the Synacor machine.
//!
//! The engine never touches a console: the `in` instruction consumes from a
//! buffered input queue and the `out` instruction appends to a buffered output
//! queue, both held in [`BufferedIO`]. Anything beyond queue manipulation
//! (reading a terminal, printing) is the caller's responsibility.
//!
//! This module also includes [`LinePump`], a threaded/channel reader that
//! turns blocking stdin into polled lines for the interactive shell.

use std::collections::VecDeque;
use std::thread::JoinHandle;

use crossbeam_channel as cbc;

const NEWLINE: u8 = b'\n';

/// The machine's input and output queues.
///
/// Input is written by [`BufferedIO::buffer_command`] and consumed one byte at
/// a time by the `in` instruction; output is produced by the `out` instruction
/// and removed wholesale by [`BufferedIO::drain_output`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedIO {
    input: VecDeque<u8>,
    output: VecDeque<u8>,
}

impl BufferedIO {
    /// Creates a new BufferedIO with both queues empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a BufferedIO from already-populated queues.
    ///
    /// Used by [`crate::snapshot`] to restore a persisted machine.
    pub fn from_queues(input: VecDeque<u8>, output: VecDeque<u8>) -> Self {
        Self { input, output }
    }

    /// Appends the text's bytes to the input queue,
    /// appending a trailing newline if the text does not end with one.
    pub fn buffer_command(&mut self, text: &str) {
        self.input.extend(text.bytes());
        if !text.ends_with('\n') {
            self.input.push_back(NEWLINE);
        }
    }

    /// Dequeues one byte of buffered input, or `None` if the queue is empty.
    pub fn pop_input(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    /// Enqueues one byte of output.
    pub fn push_output(&mut self, byte: u8) {
        self.output.push_back(byte);
    }

    /// Removes and returns all currently queued output, in production order.
    pub fn drain_output(&mut self) -> String {
        String::from_utf8_lossy(&self.output.drain(..).collect::<Vec<_>>()).into_owned()
    }

    /// The queued input bytes, front (next to be consumed) first.
    pub fn input(&self) -> &VecDeque<u8> {
        &self.input
    }

    /// The queued output bytes, front (oldest) first.
    pub fn output(&self) -> &VecDeque<u8> {
        &self.output
    }
}

/// A reader that pulls lines from stdin on a dedicated thread and hands them
/// over a channel.
///
/// The shell cannot read stdin directly in its own loop without committing to
/// blocking forever on a quiet terminal; pumping lines through a channel keeps
/// the receiving side free to shut down by dropping the receiver.
pub struct LinePump {
    lines: cbc::Receiver<String>,
    #[allow(unused)]
    handler: JoinHandle<()>,
}

impl LinePump {
    /// Spawns the reader thread over stdin.
    ///
    /// The thread exits when stdin closes or when this `LinePump` is dropped
    /// (the next send fails once the receiver is gone).
    pub fn stdin() -> Self {
        use std::io::BufRead;

        let (tx, rx) = cbc::bounded(1);
        let handler = std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { return };
                let Ok(()) = tx.send(line) else { return };
            }
        });

        Self { lines: rx, handler }
    }

    /// Blocks until the next line is available, returning `None` once stdin
    /// has closed.
    pub fn read_line(&self) -> Option<String> {
        self.lines.recv().ok()
    }
}

impl std::fmt::Debug for LinePump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinePump").finish_non_exhaustive()
    }
}
