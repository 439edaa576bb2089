use std::convert::Infallible;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{sounds, ProtocolError, NUM_CHANNELS};

/// Channel selector for per-channel commands.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    All,
    Index(usize),
}

impl Channel {
    /// Channel indices this selector expands to, in ascending order.
    pub fn indices(self) -> Result<Range<usize>, ProtocolError> {
        match self {
            Channel::All => Ok(0..NUM_CHANNELS),
            Channel::Index(index) if index < NUM_CHANNELS => Ok(index..index + 1),
            Channel::Index(index) => Err(ProtocolError::InvalidChannel(index)),
        }
    }
}

impl From<usize> for Channel {
    fn from(index: usize) -> Self {
        Channel::Index(index)
    }
}

impl FromStr for Channel {
    type Err = ProtocolError;

    // "all" or -1 select every channel
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s == "-1" {
            return Ok(Channel::All);
        }
        s.parse::<usize>()
            .map(Channel::Index)
            .map_err(|_| ProtocolError::BadChannel(s.to_string()))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::All => f.write_str("all"),
            Channel::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A sound given either as a MIDI note or as a drum name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Sound {
    Code(i64),
    Name(String),
}

impl Sound {
    pub fn code(&self) -> Result<i64, ProtocolError> {
        match self {
            Sound::Code(code) => Ok(*code),
            Sound::Name(name) => {
                sounds::lookup(name).ok_or_else(|| ProtocolError::UnknownSound(name.clone()))
            }
        }
    }
}

impl From<i64> for Sound {
    fn from(code: i64) -> Self {
        Sound::Code(code)
    }
}

impl From<&str> for Sound {
    fn from(name: &str) -> Self {
        Sound::Name(name.to_string())
    }
}

impl FromStr for Sound {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(code) => Sound::Code(code),
            Err(_) => Sound::Name(s.to_string()),
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    EnableFeedback,  // Board starts streaming channel levels
    DisableFeedback,
    SetSound {
        channel: Channel,
        sound: Sound,
    },
    SetTriggerThreshold {
        channel: Channel,
        value: i64,     // 0..RESOLUTION, not checked
    },
    SetOffThreshold {
        channel: Channel,
        value: i64,
    },
}

impl Command {
    /// Trigger and off threshold commands for `channel`, trigger first.
    ///
    /// A threshold left as `None` produces no command.
    pub fn thresholds(channel: Channel, trigger: Option<i64>, off: Option<i64>) -> Vec<Command> {
        let trigger = trigger.map(|value| Command::SetTriggerThreshold { channel, value });
        let off = off.map(|value| Command::SetOffThreshold { channel, value });
        trigger.into_iter().chain(off).collect()
    }

    pub fn opcode(&self) -> &'static str {
        match self {
            Command::EnableFeedback => "S0",
            Command::DisableFeedback => "S1",
            Command::SetSound { .. } => "S2",
            Command::SetTriggerThreshold { .. } => "S3",
            Command::SetOffThreshold { .. } => "S4",
        }
    }

    /// Protocol lines for this command, without line terminators.
    ///
    /// Everything is validated before the first line is built, so an error
    /// never leaves a partial batch behind.
    pub fn encode(&self) -> Result<Vec<String>, ProtocolError> {
        let (channel, value) = match self {
            Command::EnableFeedback | Command::DisableFeedback => {
                return Ok(vec![self.opcode().to_string()]);
            }
            Command::SetSound { channel, sound } => (*channel, sound.code()?),
            Command::SetTriggerThreshold { channel, value }
            | Command::SetOffThreshold { channel, value } => (*channel, *value),
        };

        let opcode = self.opcode();
        Ok(channel
            .indices()?
            .map(|index| format!("{}C{}V{}", opcode, index, value))
            .collect())
    }
}

/// Encode `command` into protocol lines. See [`Command::encode`].
pub fn encode(command: &Command) -> Result<Vec<String>, ProtocolError> {
    command.encode()
}
