use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shiva_protocol::{DecodeFailure, FeedbackEvent};

// Observers are shared with the reader thread - must be Send + Sync
pub trait FeedbackListener: Send + Sync {
    fn notify(&self, command: i64, channel: i64, value: i64);
}

/// Fans decoded feedback out to registered listeners.
///
/// Listeners are never removed. Registering the same listener twice gets it
/// notified twice.
#[derive(Default)]
pub struct NotificationHub {
    listeners: Mutex<Vec<Arc<dyn FeedbackListener>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn FeedbackListener>) {
        self.listeners.lock().push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify every listener, in registration order, before returning.
    ///
    /// Decode failures are dropped silently. A listener that panics is logged
    /// and skipped; the remaining listeners still run.
    pub fn dispatch(&self, decoded: Result<FeedbackEvent, DecodeFailure>) {
        let Ok(event) = decoded else {
            return;
        };

        // Snapshot so listeners can register from inside notify
        let listeners = self.listeners.lock().clone();

        for (index, listener) in listeners.iter().enumerate() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                listener.notify(event.command, event.channel, event.value)
            }));
            if result.is_err() {
                log::error!("Feedback listener #{} panicked on {:?}", index, event);
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// Dumps every event to stdout.
pub struct ConsoleListener {
    format: OutputFormat,
}

impl ConsoleListener {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_event(&self, event: &FeedbackEvent) -> String {
        match self.format {
            OutputFormat::Plain => format!("{} {} {}", event.command, event.channel, event.value),
            OutputFormat::Json => serde_json::to_string(event).unwrap_or_else(|e| {
                log::error!("Failed to serialize {:?}: {}", event, e);
                String::new()
            }),
        }
    }
}

impl FeedbackListener for ConsoleListener {
    fn notify(&self, command: i64, channel: i64, value: i64) {
        println!(
            "{}",
            self.format_event(&FeedbackEvent {
                command,
                channel,
                value
            })
        );
    }
}

/// Forwards events into a channel, for consumers on another thread.
pub struct ChannelListener {
    sender: Sender<FeedbackEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, Receiver<FeedbackEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl FeedbackListener for ChannelListener {
    fn notify(&self, command: i64, channel: i64, value: i64) {
        // Receiver gone means nobody is interested any more
        let _ = self.sender.send(FeedbackEvent {
            command,
            channel,
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiva_protocol::decode;

    #[derive(Default)]
    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<(&'static str, i64, i64, i64)>>>,
    }

    impl FeedbackListener for Recorder {
        fn notify(&self, command: i64, channel: i64, value: i64) {
            self.log.lock().push((self.tag, command, channel, value));
        }
    }

    struct Panicker;

    impl FeedbackListener for Panicker {
        fn notify(&self, _command: i64, _channel: i64, _value: i64) {
            panic!("listener failure");
        }
    }

    #[test_log::test]
    fn test_duplicate_registration_notifies_twice() {
        let hub = NotificationHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::new(Recorder {
            tag: "a",
            log: log.clone(),
        });
        let second = Arc::new(Recorder {
            tag: "b",
            log: log.clone(),
        });

        hub.register(first.clone());
        hub.register(second);
        hub.register(first);
        hub.dispatch(decode("S2C3V49"));

        assert_eq!(
            *log.lock(),
            vec![("a", 2, 3, 49), ("b", 2, 3, 49), ("a", 2, 3, 49)]
        );
    }

    #[test_log::test]
    fn test_decode_failure_notifies_nobody() {
        let hub = NotificationHub::new();
        let recorder = Arc::new(Recorder::default());
        hub.register(recorder.clone());

        hub.dispatch(decode("garbage"));
        hub.dispatch(Err(DecodeFailure));

        assert!(recorder.log.lock().is_empty());
    }

    #[test_log::test]
    fn test_panicking_listener_is_isolated() {
        let hub = NotificationHub::new();
        let recorder = Arc::new(Recorder::default());
        hub.register(Arc::new(Panicker));
        hub.register(recorder.clone());

        hub.dispatch(decode("S3C0V512"));
        hub.dispatch(decode("S3C1V513"));

        assert_eq!(hub.len(), 2);
        assert_eq!(
            *recorder.log.lock(),
            vec![("", 3, 0, 512), ("", 3, 1, 513)]
        );
    }

    struct Registrar {
        hub: Arc<NotificationHub>,
    }

    impl FeedbackListener for Registrar {
        fn notify(&self, _command: i64, _channel: i64, _value: i64) {
            self.hub.register(Arc::new(Recorder::default()));
        }
    }

    #[test_log::test]
    fn test_register_during_dispatch() {
        let hub = Arc::new(NotificationHub::new());
        hub.register(Arc::new(Registrar { hub: hub.clone() }));

        hub.dispatch(decode("S0C0V0"));
        assert_eq!(hub.len(), 2);
    }

    #[test_log::test]
    fn test_concurrent_registration() {
        let hub = Arc::new(NotificationHub::new());
        let (listener, events) = ChannelListener::new();
        hub.register(Arc::new(listener));

        let registrar = {
            let hub = hub.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    hub.register(Arc::new(Recorder::default()));
                }
            })
        };
        for value in 0..100 {
            hub.dispatch(Ok(FeedbackEvent {
                command: 0,
                channel: 1,
                value,
            }));
        }
        registrar.join().unwrap();

        assert_eq!(hub.len(), 101);
        let values: Vec<i64> = events.try_iter().map(|e| e.value).collect();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_console_formats() {
        let event = FeedbackEvent {
            command: 0,
            channel: 5,
            value: 812,
        };
        assert_eq!(
            ConsoleListener::new(OutputFormat::Plain).format_event(&event),
            "0 5 812"
        );
        assert_eq!(
            ConsoleListener::new(OutputFormat::Json).format_event(&event),
            r#"{"command":0,"channel":5,"value":812}"#
        );
    }
}
