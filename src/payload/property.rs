//! `0xB1` property query/response payload (§4.3.6).
//!
//! The host side builds a query body from the UUID list
//! [`crate::payload::capability::Capabilities::b1_query_uuids`] returns; the
//! device replies with the same id but `{uuid_le, length, data[length]}`
//! triples instead of `{uuid_le, 0}` pairs.

use winnow::binary;
use winnow::combinator::repeat;
use winnow::prelude::*;
use winnow::Bytes;

use crate::payload::error::{PayloadError, Result};

pub const ID_PROPERTY: u8 = 0xB1;

/// Builds a `0xB1` query body (without the frame-level CRC-8, appended by
/// the caller the way [`crate::payload::command::encode`] does it for
/// `0x40`): `{0xB1, count, [uuid_le, 0]*count}`.
pub fn build_query(uuids: &[u16]) -> Vec<u8> {
	let mut out = Vec::with_capacity(2 + uuids.len() * 3);
	out.push(ID_PROPERTY);
	out.push(uuids.len() as u8);
	for uuid in uuids {
		out.extend_from_slice(&uuid.to_le_bytes());
		out.push(0);
	}
	let cs = out.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
	out.push(0u8.wrapping_sub(cs));
	out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
	pub uuid: u16,
	pub data: Vec<u8>,
}

fn triple(input: &mut &Bytes) -> PResult<PropertyRecord> {
	let uuid = binary::le_u16.parse_next(input)?;
	let len = binary::u8.parse_next(input)?;
	let data: Vec<u8> = repeat(len as usize, binary::u8).parse_next(input)?;
	Ok(PropertyRecord { uuid, data })
}

/// Parses a device reply: `{0xB1, count, [uuid_le, length, data[length]]*count}`
/// plus its own CRC-8 trailer. `payload` is the full body including the id
/// byte and the trailing checksum.
pub fn parse_reply(payload: &[u8]) -> Result<Vec<PropertyRecord>> {
	if payload.len() < 3 {
		return Err(PayloadError::TooShort { expected_at_least: 3, actual: payload.len() });
	}
	let count = payload[1] as usize;
	// drop the id+count header and the trailing checksum byte.
	let body = &payload[2..payload.len() - 1];
	let mut input = Bytes::new(body);

	let mut records = Vec::with_capacity(count);
	for _ in 0..count {
		match triple.parse_next(&mut input) {
			Ok(rec) => records.push(rec),
			Err(_) => return Err(PayloadError::TruncatedRecord),
		}
	}
	Ok(records)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn build_query_roundtrips_uuid_count() {
		let body = build_query(&[0x0018, 0x0039]);
		assert_eq!(body[0], ID_PROPERTY);
		assert_eq!(body[1], 2);
		let sum = body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
		assert_eq!(sum, 0);
	}

	#[test]
	fn parse_reply_reads_triples() {
		let mut payload = vec![ID_PROPERTY, 2];
		payload.extend_from_slice(&0x0018u16.to_le_bytes());
		payload.push(1);
		payload.push(0x01);
		payload.extend_from_slice(&0x0039u16.to_le_bytes());
		payload.push(1);
		payload.push(0x00);
		payload.push(0xAA); // checksum placeholder, not verified here

		let records = parse_reply(&payload).unwrap();
		assert_eq!(records.len(), 2);
		assert_eq!(records[0], PropertyRecord { uuid: 0x0018, data: vec![0x01] });
		assert_eq!(records[1], PropertyRecord { uuid: 0x0039, data: vec![0x00] });
	}

	#[test]
	fn truncated_reply_reported() {
		let payload = vec![ID_PROPERTY, 1, 0x18, 0x00, 0x05, 0x01]; // claims 5 bytes, has 1
		assert_eq!(parse_reply(&payload), Err(PayloadError::TruncatedRecord));
	}
}
