use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use shiva_protocol::{decode, Command};

use crate::hub::NotificationHub;
use crate::transport::{LineProtocol, SharedWriter};

/// Link lifecycle, as seen by the reader thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    Established,
    Lost(Option<String>), // None: closed on request or EOF
}

/// Reads the level feedback the board streams after `S0`.
///
/// Every line goes through the decoder; successful decodes are dispatched to
/// the hub on the reader thread.
pub struct FeedbackReader {
    hub: Arc<NotificationHub>,
    connected: Arc<AtomicBool>,
    events: Sender<LinkEvent>,
}

impl FeedbackReader {
    pub fn new(
        hub: Arc<NotificationHub>,
        connected: Arc<AtomicBool>,
        events: Sender<LinkEvent>,
    ) -> Self {
        Self {
            hub,
            connected,
            events,
        }
    }
}

impl LineProtocol for FeedbackReader {
    fn connection_made(&mut self, writer: &SharedWriter) {
        // Board only streams feedback once told to
        let handshake = format!("{}\n", Command::EnableFeedback.opcode());
        let mut writer = writer.lock();
        match writer
            .write_all(handshake.as_bytes())
            .and_then(|_| writer.flush())
        {
            Ok(()) => log::debug!("-> {}", handshake.trim_end()),
            Err(e) => log::error!("Failed to enable feedback: {}", e),
        }
        drop(writer);

        let _ = self.events.send(LinkEvent::Established);
    }

    fn handle_line(&mut self, line: &str) {
        if !self.connected.load(Ordering::Acquire) {
            log::trace!("Ignoring line after disconnect: {:?}", line);
            return;
        }

        let decoded = decode(line);
        match &decoded {
            Ok(event) => log::debug!("<- {:?}", event),
            Err(_) => log::trace!("<- {:?} (not feedback)", line),
        }
        self.hub.dispatch(decoded);
    }

    fn connection_lost(&mut self, reason: Option<io::Error>) {
        let was_connected = self.connected.swap(false, Ordering::AcqRel);

        match &reason {
            Some(e) => log::warn!("Connection lost: {}", e),
            None => log::info!("Connection closed"),
        }
        // A failed write may already have reported the loss
        if was_connected {
            let _ = self
                .events
                .send(LinkEvent::Lost(reason.map(|e| e.to_string())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::ChannelListener;
    use crate::transport::shared_writer;
    use shiva_protocol::FeedbackEvent;

    fn reader() -> (
        FeedbackReader,
        crossbeam_channel::Receiver<FeedbackEvent>,
        crossbeam_channel::Receiver<LinkEvent>,
        Arc<AtomicBool>,
    ) {
        let hub = Arc::new(NotificationHub::new());
        let (listener, feedback) = ChannelListener::new();
        hub.register(Arc::new(listener));
        let connected = Arc::new(AtomicBool::new(true));
        let (tx, link) = crossbeam_channel::unbounded();
        (
            FeedbackReader::new(hub, connected.clone(), tx),
            feedback,
            link,
            connected,
        )
    }

    #[test_log::test]
    fn test_feedback_lines_reach_listeners() {
        let (mut reader, feedback, _link, _) = reader();

        reader.handle_line("S0C4V321");
        reader.handle_line("Shiva v1.0");
        reader.handle_line("S0C5V-1");

        let events: Vec<_> = feedback.try_iter().collect();
        assert_eq!(
            events,
            vec![
                FeedbackEvent {
                    command: 0,
                    channel: 4,
                    value: 321
                },
                FeedbackEvent {
                    command: 0,
                    channel: 5,
                    value: -1
                },
            ]
        );
    }

    #[test_log::test]
    fn test_handshake_enables_feedback() {
        let (mut reader, _, link, _) = reader();
        let written = Arc::new(parking_lot::Mutex::new(Vec::new()));

        struct Sink(Arc<parking_lot::Mutex<Vec<u8>>>);
        impl io::Write for Sink {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        reader.connection_made(&shared_writer(Sink(written.clone())));
        assert_eq!(*written.lock(), b"S0\n");
        assert_eq!(link.try_recv(), Ok(LinkEvent::Established));
    }

    #[test_log::test]
    fn test_failed_handshake_is_not_fatal() {
        let (mut reader, feedback, link, _) = reader();

        struct Broken;
        impl io::Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        reader.connection_made(&shared_writer(Broken));
        assert_eq!(link.try_recv(), Ok(LinkEvent::Established));
        reader.handle_line("S0C0V1");
        assert_eq!(feedback.try_iter().count(), 1);
    }

    #[test_log::test]
    fn test_lines_after_loss_are_ignored() {
        let (mut reader, feedback, link, connected) = reader();

        reader.connection_lost(Some(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "unplugged",
        )));
        reader.handle_line("S0C0V1");

        assert!(!connected.load(Ordering::Acquire));
        assert_eq!(feedback.try_iter().count(), 0);
        assert_eq!(
            link.try_recv(),
            Ok(LinkEvent::Lost(Some("unplugged".to_string())))
        );
    }

    #[test_log::test]
    fn test_loss_is_reported_once() {
        let (mut reader, _, link, connected) = reader();

        // Link already taken down by a failed write
        connected.store(false, Ordering::Release);
        reader.connection_lost(None);

        assert!(link.try_recv().is_err());
    }
}
