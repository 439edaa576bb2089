//! Line-oriented serial transport.
//!
//! A [`ReaderThread`] owns the receive half of a link and hands complete lines
//! to a [`LineProtocol`]. The send half is a [`SharedWriter`] so the reader's
//! handshake and the command-issuing side can share it.

use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

/// Longest unterminated run kept while waiting for a `\n`. Feedback lines
/// are a few bytes; anything this long is line noise and is dropped.
pub const MAX_LINE_LEN: usize = 1024;

pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn shared_writer<W: Write + Send + 'static>(writer: W) -> SharedWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Callbacks driven by the reader thread.
pub trait LineProtocol: Send + 'static {
    /// Called once, before the first line is read.
    fn connection_made(&mut self, writer: &SharedWriter);
    /// Called for every complete line, terminator stripped.
    fn handle_line(&mut self, line: &str);
    /// Called once when reading ends. `None` means EOF or a stop request.
    fn connection_lost(&mut self, reason: Option<io::Error>);
}

pub struct ReaderThread {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ReaderThread {
    pub fn spawn<R, P>(reader: R, writer: SharedWriter, mut protocol: P) -> io::Result<Self>
    where
        R: Read + Send + 'static,
        P: LineProtocol,
    {
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let running = running.clone();
            thread::Builder::new()
                .name("shiva-reader".to_string())
                .spawn(move || {
                    protocol.connection_made(&writer);
                    let reason = read_lines(reader, &running, &mut protocol);
                    protocol.connection_lost(reason);
                })?
        };

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Ask the thread to finish and wait for it.
    ///
    /// The flag is checked between reads, so this returns after the current
    /// read completes or times out.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Reader thread panicked");
            }
        }
    }
}

impl Drop for ReaderThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_lines<R: Read, P: LineProtocol>(
    reader: R,
    running: &AtomicBool,
    protocol: &mut P,
) -> Option<io::Error> {
    let mut reader = BufReader::new(reader);
    // Survives timeouts, so a line split across reads is kept whole
    let mut buf = Vec::with_capacity(128);

    while running.load(Ordering::Relaxed) {
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return None,
            Ok(_) if buf.last() == Some(&b'\n') => {
                let line = String::from_utf8_lossy(strip_terminator(&buf)).into_owned();
                buf.clear();
                protocol.handle_line(&line);
                continue;
            }
            // No terminator means EOF hit mid-line; the next read reports it
            Ok(_) => {}
            Err(e) if is_transient(&e) => {}
            Err(e) => return Some(e),
        }

        if buf.len() > MAX_LINE_LEN {
            log::warn!("Dropping {} bytes with no line terminator", buf.len());
            buf.clear();
        }
    }
    None
}

fn strip_terminator(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}
