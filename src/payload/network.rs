//! Network-status payload carried by `NETWORK_NOTIFY` (`0x0D`) and the
//! synchronous reply to `QUERY_NETWORK` (`0x63`) — §6, SPEC_FULL §10.
//!
//! Built from the [`crate::network::NetworkInfo`] seam each time the
//! dispatcher needs to emit one; there's no independent decode path since
//! the host never needs to parse its own outbound heartbeat.

use crate::bytes::push_le;

const LEN: usize = 7;

/// Connection flag, 1-4 signal bars, and an IPv4 address — exactly what
/// `NetworkInfo` exposes (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkNotify {
	pub connected: bool,
	pub signal_bars: u8,
	pub ipv4: [u8; 4],
}

impl NetworkNotify {
	/// Encodes the payload body: `{connected, signal_bars, ipv4[4]}` plus
	/// its own CRC-8 trailer, the same construction as every other
	/// application payload (§3).
	pub fn encode(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(LEN + 1);
		out.push(self.connected as u8);
		out.push(self.signal_bars.clamp(1, 4));
		out.extend_from_slice(&self.ipv4);
		let cs = out.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
		out.push(0u8.wrapping_sub(cs));
		out
	}
}

/// `> -63 dBm` -> 4 bars, `> -75` -> 3, `> -88` -> 2, else 1 (§6).
pub fn signal_bars_from_rssi(rssi_dbm: i32) -> u8 {
	if rssi_dbm > -63 {
		4
	} else if rssi_dbm > -75 {
		3
	} else if rssi_dbm > -88 {
		2
	} else {
		1
	}
}

pub fn push_ipv4(out: &mut Vec<u8>, ipv4: [u8; 4]) {
	for octet in ipv4 {
		push_le(out, octet as u32, 1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn encode_length_and_checksum() {
		let notify = NetworkNotify { connected: true, signal_bars: 4, ipv4: [192, 168, 1, 42] };
		let body = notify.encode();
		assert_eq!(body.len(), LEN + 1);
		let sum = body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
		assert_eq!(sum, 0);
	}

	#[rstest]
	#[case(-50, 4)]
	#[case(-70, 3)]
	#[case(-80, 2)]
	#[case(-95, 1)]
	fn rssi_thresholds(#[case] rssi: i32, #[case] expected: u8) {
		assert_eq!(signal_bars_from_rssi(rssi), expected);
	}
}
