//! `0xC1` power-usage payload decoder (§4.6, §8 invariant 9).

use crate::bytes::bcd_to_u8;
use crate::payload::error::{PayloadError, Result};

pub const ID_POWER: u8 = 0xC1;

const MIN_LEN: usize = 6;

/// Each BCD byte packs two decimal digits; byte `i` (0-indexed from the
/// first of the five power bytes) contributes at weight `100^i`, and the
/// whole sum is in units of 0.1 kWh.
const WEIGHTS: [u32; 5] = [1, 100, 100 * 100, 100 * 100 * 100, 100 * 100 * 100 * 100];

/// Decodes the five BCD bytes following the payload id into kWh.
pub fn decode(payload: &[u8]) -> Result<f64> {
	if payload.len() < MIN_LEN {
		return Err(PayloadError::TooShort { expected_at_least: MIN_LEN, actual: payload.len() });
	}

	let mut total = 0u64;
	for (i, weight) in WEIGHTS.iter().enumerate() {
		let byte = payload[1 + i];
		let digits = bcd_to_u8(byte).unwrap_or(0) as u64;
		total += digits * (*weight as u64);
	}
	Ok(total as f64 / 10.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn worked_example_10000_tenths() {
		let payload = [ID_POWER, 0x00, 0x00, 0x01, 0x00, 0x00];
		assert_eq!(decode(&payload).unwrap(), 1000.0);
	}

	#[test]
	fn all_zero_is_zero() {
		let payload = [ID_POWER, 0x00, 0x00, 0x00, 0x00, 0x00];
		assert_eq!(decode(&payload).unwrap(), 0.0);
	}

	#[test]
	fn too_short_reported() {
		let payload = [ID_POWER, 0x00];
		assert_eq!(decode(&payload), Err(PayloadError::TooShort { expected_at_least: MIN_LEN, actual: 2 }));
	}
}
