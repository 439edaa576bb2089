//! Error types for talking to the board

use std::fmt;
use std::io;

use shiva_protocol::ProtocolError;

#[derive(Debug)]
pub enum BoardError {
    /// No open link, the link was lost, or the write itself failed
    NotConnected,
    /// Feedback reader already running on this link
    AlreadyListening,
    /// Command could not be encoded, nothing was sent
    Protocol(ProtocolError),
    /// Reader thread could not be started
    Io(io::Error),
    /// Opening or enumerating serial ports failed
    Serial(serialport::Error),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::NotConnected => write!(f, "Not connected to the board"),
            BoardError::AlreadyListening => write!(f, "Feedback reader already running"),
            BoardError::Protocol(e) => write!(f, "Protocol error: {}", e),
            BoardError::Io(e) => write!(f, "I/O error: {}", e),
            BoardError::Serial(e) => write!(f, "Serial port error: {}", e),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Protocol(e) => Some(e),
            BoardError::Io(e) => Some(e),
            BoardError::Serial(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProtocolError> for BoardError {
    fn from(e: ProtocolError) -> Self {
        BoardError::Protocol(e)
    }
}

impl From<io::Error> for BoardError {
    fn from(e: io::Error) -> Self {
        BoardError::Io(e)
    }
}

impl From<serialport::Error> for BoardError {
    fn from(e: serialport::Error) -> Self {
        BoardError::Serial(e)
    }
}
