//! Host-side controller for the Shiva trigger board.

pub mod board;
pub mod config;
pub mod error;
pub mod hub;
pub mod ports;
pub mod reader;
pub mod transport;

pub use board::Shiva;
pub use config::ConnectionConfig;
pub use error::BoardError;
pub use hub::{ChannelListener, ConsoleListener, FeedbackListener, NotificationHub, OutputFormat};
pub use reader::{FeedbackReader, LinkEvent};
