use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use shiva_protocol::{sounds, Channel, Command, Sound};

use crate::config::ConnectionConfig;
use crate::error::BoardError;
use crate::hub::NotificationHub;
use crate::reader::{FeedbackReader, LinkEvent};
use crate::transport::{shared_writer, ReaderThread, SharedWriter};

/// Connection to a Shiva board.
///
/// Commands are encoded in full before anything is written, so a rejected
/// command never reaches the wire half-sent.
pub struct Shiva {
    writer: Option<SharedWriter>,
    // Taken by the feedback reader thread
    reader: Option<Box<dyn Read + Send>>,
    connected: Arc<AtomicBool>,
    reader_thread: Option<ReaderThread>,
    // Lets a failed write report the loss alongside the reader
    link_events: Option<Sender<LinkEvent>>,
}

impl Shiva {
    pub fn new() -> Self {
        Self {
            writer: None,
            reader: None,
            connected: Arc::new(AtomicBool::new(false)),
            reader_thread: None,
            link_events: None,
        }
    }

    /// Open the serial port described by `config`.
    pub fn connect(&mut self, config: &ConnectionConfig) -> Result<(), BoardError> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(config.read_timeout)
            .open()?;
        let reader = port.try_clone()?;

        self.attach(reader, port);
        log::info!("Connected to {} @ {} baud", config.port, config.baud_rate);
        Ok(())
    }

    /// Use an already-open link. Any previous link is closed first.
    ///
    /// Reads from `reader` should time out now and then (as a serial port
    /// opened by [`Shiva::connect`] does); [`Shiva::close`] waits for the
    /// current read to return.
    pub fn attach<R, W>(&mut self, reader: R, writer: W)
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        self.close();
        self.writer = Some(shared_writer(writer));
        self.reader = Some(Box::new(reader));
        self.connected = Arc::new(AtomicBool::new(true));
    }

    pub fn close(&mut self) {
        if let Some(thread) = self.reader_thread.take() {
            thread.stop();
        }
        if self.writer.take().is_some() {
            log::info!("Disconnected");
        }
        self.reader = None;
        self.link_events = None;
        self.connected.store(false, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.writer.is_some() && self.connected.load(Ordering::Acquire)
    }

    /// Start the feedback reader on this link.
    ///
    /// The reader sends `S0` first, then dispatches every decoded line to
    /// `hub`. Lifecycle changes arrive on the returned channel.
    pub fn start_feedback(
        &mut self,
        hub: Arc<NotificationHub>,
    ) -> Result<Receiver<LinkEvent>, BoardError> {
        let writer = match &self.writer {
            Some(writer) if self.is_connected() => writer.clone(),
            _ => return Err(BoardError::NotConnected),
        };
        let reader = self.reader.take().ok_or(BoardError::AlreadyListening)?;

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let protocol = FeedbackReader::new(hub, self.connected.clone(), events_tx.clone());
        self.reader_thread = Some(ReaderThread::spawn(reader, writer, protocol)?);
        self.link_events = Some(events_tx);

        Ok(events_rx)
    }

    /// Send one raw protocol line. The newline is added here.
    ///
    /// A failed write takes the link down: this and every later send return
    /// `NotConnected`, and a running feedback reader's event channel gets
    /// `LinkEvent::Lost`.
    pub fn send_command(&self, command: &str) -> Result<(), BoardError> {
        let writer = match &self.writer {
            Some(writer) if self.is_connected() => writer,
            _ => return Err(BoardError::NotConnected),
        };

        let mut writer = writer.lock();
        let line = format!("{}\n", command);
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            log::warn!("Write of {:?} failed: {}", command, e);
            // Whoever clears the flag first reports the loss
            if self.connected.swap(false, Ordering::AcqRel) {
                if let Some(events) = &self.link_events {
                    let _ = events.send(LinkEvent::Lost(Some(e.to_string())));
                }
            }
            return Err(BoardError::NotConnected);
        }
        log::debug!("-> {}", command);
        Ok(())
    }

    pub fn send(&self, command: &Command) -> Result<(), BoardError> {
        self.send_lines(command.encode()?)
    }

    fn send_lines(&self, lines: Vec<String>) -> Result<(), BoardError> {
        for line in &lines {
            self.send_command(line)?;
        }
        Ok(())
    }

    pub fn enable_feedback(&self) -> Result<(), BoardError> {
        self.send(&Command::EnableFeedback)
    }

    pub fn disable_feedback(&self) -> Result<(), BoardError> {
        self.send(&Command::DisableFeedback)
    }

    /// Set the MIDI note played by `channel`.
    pub fn set_sound(&self, channel: Channel, sound: impl Into<Sound>) -> Result<(), BoardError> {
        let sound = sound.into();
        let code = sound.code()?;
        log::debug!(
            "Channel {} plays {}",
            channel,
            sounds::name_of(code).unwrap_or("a non-percussion note")
        );
        self.send(&Command::SetSound { channel, sound })
    }

    /// Set trigger and/or off thresholds. All trigger lines go out before any
    /// off line; a `None` threshold is left untouched on the board.
    pub fn set_thresholds(
        &self,
        channel: Channel,
        trigger: Option<i64>,
        off: Option<i64>,
    ) -> Result<(), BoardError> {
        let mut lines = Vec::new();
        for command in Command::thresholds(channel, trigger, off) {
            lines.extend(command.encode()?);
        }
        self.send_lines(lines)
    }
}

impl Default for Shiva {
    fn default() -> Self {
        Self::new()
    }
}
