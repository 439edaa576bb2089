use std::fmt;

/// Errors raised while turning a [`crate::Command`] into protocol lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Sound name is not in the drum table
    UnknownSound(String),
    /// Channel index outside `[0, NUM_CHANNELS)`
    InvalidChannel(usize),
    /// Text that names neither a channel index nor "all"
    BadChannel(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownSound(name) => write!(f, "Unknown sound: {}", name),
            ProtocolError::InvalidChannel(index) => write!(
                f,
                "Invalid channel {} (board has {} channels)",
                index,
                crate::NUM_CHANNELS
            ),
            ProtocolError::BadChannel(text) => {
                write!(f, "Expected a channel index or \"all\", got {:?}", text)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// An inbound line that is not a feedback notification.
///
/// The board prints other text on the same line, so this is an ordinary outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeFailure;

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("line is not a feedback notification")
    }
}

impl std::error::Error for DecodeFailure {}
