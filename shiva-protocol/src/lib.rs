//! Line protocol spoken by the Shiva trigger board.
//!
//! Outbound commands are `S<cmd>[C<channel>V<value>]`, one per line. In feedback
//! mode the board answers with lines of the same shape.

mod command;
mod error;
mod feedback;
pub mod sounds;

pub use command::{encode, Channel, Command, Sound};
pub use error::{DecodeFailure, ProtocolError};
pub use feedback::{decode, FeedbackEvent};

// Board constants, fixed by the firmware
pub const NUM_CHANNELS: usize = 8;
pub const RESOLUTION: i64 = 1024;

pub const DEFAULT_BAUD_RATE: u32 = 9600;
