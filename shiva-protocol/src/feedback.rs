use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DecodeFailure;

/// One feedback notification from the board.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub command: i64,
    pub channel: i64,
    pub value: i64,
}

impl FromStr for FeedbackEvent {
    type Err = DecodeFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Decode a single line received from the board.
///
/// The markers are located with plain first-occurrence searches: `S`, then the
/// first `C` after it, then the first `V` after that. A missing `C` or `V`
/// collapses its position onto the previous marker, which leaves an empty
/// field and fails the parse. Fields are decimal integers of any sign and any
/// number of digits, but each must fit in an `i64`; a wider value fails the
/// whole line.
pub fn decode(line: &str) -> Result<FeedbackEvent, DecodeFailure> {
    let s = line.find('S').ok_or(DecodeFailure)?;
    let c = line[s + 1..].find('C').map_or(s, |i| i + s + 1);
    let v = line[c + 1..].find('V').map_or(c, |i| i + c + 1);

    Ok(FeedbackEvent {
        command: parse_int(field(line, s + 1, c))?,
        channel: parse_int(field(line, c + 1, v))?,
        value: parse_int(&line[v + 1..])?,
    })
}

// Empty when the range is inverted. All bounds sit next to ASCII markers.
fn field(line: &str, start: usize, end: usize) -> &str {
    if start < end {
        &line[start..end]
    } else {
        ""
    }
}

// Decimal integer with optional sign. Surrounding whitespace is ignored and
// single underscores may separate digits.
fn parse_int(field: &str) -> Result<i64, DecodeFailure> {
    let field = field.trim();
    let (negative, digits) = match field.as_bytes().first() {
        Some(b'-') => (true, &field[1..]),
        Some(b'+') => (false, &field[1..]),
        _ => (false, field),
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(DecodeFailure);
    }

    let mut value: i64 = 0;
    for byte in digits.bytes() {
        let digit = match byte {
            b'_' => continue,
            b'0'..=b'9' => i64::from(byte - b'0'),
            _ => return Err(DecodeFailure),
        };
        // accumulate negatively so i64::MIN is reachable
        value = value
            .checked_mul(10)
            .and_then(|v| {
                if negative {
                    v.checked_sub(digit)
                } else {
                    v.checked_add(digit)
                }
            })
            .ok_or(DecodeFailure)?;
    }
    Ok(value)
}
