//! The outer transport frame: header, length, checksum (§4.2).
//!
//! The deserializer is a byte-at-a-time state machine in the style of the
//! original firmware's `Frame::deserialize(uint8_t)` — it has to be, since
//! the byte stream arrives one byte at a time off a non-blocking
//! [`crate::transport::Transport`] and nothing in this crate is allowed to
//! block waiting for more of it. Unlike the original, the deserializer
//! clears its own buffer once a frame completes (valid or not) instead of
//! requiring the caller to call `clear()` afterwards — there is no
//! behavioural difference visible to a caller that always drains
//! [`Deserializer::push`] to completion, and it removes a footgun.

use crate::bytes::push_le;

pub const START_OF_FRAME: u8 = 0xAA;
pub const APPLIANCE_AIR_CONDITIONER: u8 = 0xAC;

/// Offset of the first payload byte; also the minimum valid `length` value
/// minus one checksum byte's worth of slack (length must be `>= 11`).
const OFFSET_DATA: usize = 10;
const MIN_LENGTH: u8 = (OFFSET_DATA as u8) + 1;

/// One-byte tag identifying the purpose of a frame (§4.2, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
	/// `0x02` — host sets device state.
	Set,
	/// `0x03` — host queries device state.
	Query,
	/// `0x04` — device reply to a host request.
	Reply,
	/// `0x05` — unsolicited device status push.
	Notify,
	/// `0x0D` — unsolicited network-status push.
	NetworkNotify,
	/// `0x63` — device asking the host for its network status.
	QueryNetwork,
	/// Anything else. Frame types are device-defined and new ones appear
	/// over time; we never want deserialization itself to fail on one.
	Other(u8),
}

impl FrameType {
	pub const fn from_u8(value: u8) -> Self {
		match value {
			0x02 => Self::Set,
			0x03 => Self::Query,
			0x04 => Self::Reply,
			0x05 => Self::Notify,
			0x0D => Self::NetworkNotify,
			0x63 => Self::QueryNetwork,
			other => Self::Other(other),
		}
	}

	pub const fn to_u8(self) -> u8 {
		match self {
			Self::Set => 0x02,
			Self::Query => 0x03,
			Self::Reply => 0x04,
			Self::Notify => 0x05,
			Self::NetworkNotify => 0x0D,
			Self::QueryNetwork => 0x63,
			Self::Other(value) => value,
		}
	}
}

/// A fully framed, checksum-valid message. Payload bytes are opaque to
/// this module — see [`crate::payload`] for their decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	appliance_kind: u8,
	protocol_id: u8,
	frame_type: FrameType,
	payload: Vec<u8>,
}

impl Frame {
	pub fn new(appliance_kind: u8, protocol_id: u8, frame_type: FrameType, payload: Vec<u8>) -> Self {
		Self { appliance_kind, protocol_id, frame_type, payload }
	}

	pub fn appliance_kind(&self) -> u8 {
		self.appliance_kind
	}

	pub fn protocol_id(&self) -> u8 {
		self.protocol_id
	}

	pub fn frame_type(&self) -> FrameType {
		self.frame_type
	}

	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	pub fn has_type(&self, frame_type: FrameType) -> bool {
		self.frame_type == frame_type
	}

	/// Serializes this frame to its wire representation (§4.2 Serializer).
	pub fn serialize(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(OFFSET_DATA + self.payload.len() + 1);
		out.push(START_OF_FRAME);
		out.push(0); // length placeholder, patched below
		out.push(self.appliance_kind);
		out.extend_from_slice(&[0, 0, 0, 0, 0]); // bytes 3..=7 reserved
		out.push(self.protocol_id);
		out.push(self.frame_type.to_u8());
		out.extend_from_slice(&self.payload);

		let length = out.len() as u8;
		out[1] = length;
		let cs = checksum(&out[1..]);
		out.push(cs);
		out
	}

	/// Hex dump akin to the original firmware's `toString()`, used for
	/// trace logging and the `frame_dump` diagnostic binary.
	pub fn to_hex_string(&self) -> String {
		let bytes = self.serialize();
		bytes.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ")
	}
}

/// `cs = (0x100 - sum(bytes)) mod 256`, computed over whatever slice the
/// caller passes — for serialization that's everything after the SOF byte;
/// for validation it's everything after the SOF byte *including* the
/// trailing checksum, which must then sum to zero (§4.2, §8 invariant 2).
fn checksum(bytes: &[u8]) -> u8 {
	let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
	0u8.wrapping_sub(sum)
}

fn is_valid(full_frame: &[u8]) -> bool {
	checksum(&full_frame[1..]) == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	AwaitSof,
	AwaitLen,
	Accumulate { length: usize },
}

/// Byte-at-a-time frame deserializer (§4.2 Deserializer).
#[derive(Debug, Clone)]
pub struct Deserializer {
	state: State,
	buffer: Vec<u8>,
}

impl Default for Deserializer {
	fn default() -> Self {
		Self::new()
	}
}

impl Deserializer {
	pub fn new() -> Self {
		Self { state: State::AwaitSof, buffer: Vec::new() }
	}

	fn reset(&mut self) {
		self.state = State::AwaitSof;
		self.buffer.clear();
	}

	/// Feeds one byte into the state machine. Returns `Some(frame)` once a
	/// complete, checksum-valid frame has been assembled. A rejected frame
	/// (bad checksum or length) yields `None` and is logged, never
	/// surfaced as an error (§7 `FrameRejected`).
	pub fn push(&mut self, byte: u8) -> Option<Frame> {
		match self.state {
			State::AwaitSof => {
				if byte == START_OF_FRAME {
					self.buffer.push(byte);
					self.state = State::AwaitLen;
				}
				None
			}
			State::AwaitLen => {
				if byte < MIN_LENGTH {
					log::debug!("rejecting frame with length {byte} < {MIN_LENGTH}");
					self.reset();
					return None;
				}
				self.buffer.push(byte);
				self.state = State::Accumulate { length: byte as usize };
				None
			}
			State::Accumulate { length } => {
				if self.buffer.len() > length {
					// Resync: treat this byte as a fresh potential SOF.
					self.reset();
					return self.push(byte);
				}
				self.buffer.push(byte);
				if self.buffer.len() < length + 1 {
					return None;
				}
				let frame = if is_valid(&self.buffer) {
					Some(parse_complete(&self.buffer, length))
				} else {
					log::debug!("rejecting frame with bad checksum: {:02X?}", self.buffer);
					None
				};
				self.reset();
				frame
			}
		}
	}
}

fn parse_complete(buffer: &[u8], length: usize) -> Frame {
	Frame {
		appliance_kind: buffer[2],
		protocol_id: buffer[8],
		frame_type: FrameType::from_u8(buffer[9]),
		payload: buffer[OFFSET_DATA..length].to_vec(),
	}
}

/// Builds the wire bytes for a frame without constructing a [`Frame`]
/// first; a small convenience for the dispatcher, which only ever needs
/// the bytes to push onto the transport.
pub fn serialize(appliance_kind: u8, protocol_id: u8, frame_type: FrameType, payload: &[u8]) -> Vec<u8> {
	Frame::new(appliance_kind, protocol_id, frame_type, payload.to_vec()).serialize()
}

/// Appends a little-endian-packed UUID/length pair the way property query
/// bodies do (§4.3.6). Exposed here since it's a pure byte-append helper,
/// not protocol decoding logic.
pub fn append_le_u16(out: &mut Vec<u8>, value: u16) {
	push_le(out, value as u32, 2);
}
