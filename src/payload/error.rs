//! Payload-level errors (§7 `PayloadMalformed`).
//!
//! In the style of libmbus's `parse::error::ParseError`: a plain,
//! `Copy`-able sum type with a `Result` alias, rather than a boxed
//! `dyn Error` or a string. Unlike libmbus's `ParseError`, decoders here
//! never actually need to return this for status frames — §7 says a short
//! payload yields the partial state it could recover, not a hard error —
//! so it's reserved for the few payloads that have no sensible partial
//! reading (encoding a command payload into too-small a buffer, or a
//! `0xB5`/`0xB1` TLV stream that runs past its own bounds).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
	/// Payload shorter than the minimum required for its declared id.
	TooShort { expected_at_least: usize, actual: usize },
	/// A `0xB5`/`0xB1` TLV record claimed a length that runs past the end
	/// of the payload.
	TruncatedRecord,
	/// First byte didn't match any payload id this decoder understands.
	UnexpectedId(u8),
}

pub type Result<T> = std::result::Result<T, PayloadError>;

impl fmt::Display for PayloadError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::TooShort { expected_at_least, actual } => {
				write!(f, "payload too short: need at least {expected_at_least} bytes, got {actual}")
			}
			Self::TruncatedRecord => write!(f, "TLV record runs past the end of the payload"),
			Self::UnexpectedId(id) => write!(f, "unexpected payload id 0x{id:02X}"),
		}
	}
}

impl std::error::Error for PayloadError {}
