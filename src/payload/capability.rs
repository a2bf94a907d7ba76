//! `0xB5` capability report decoder (§4.3.5).
//!
//! The body is a run of self-describing `{feature_u16_le, length_u8,
//! data[length]}` records followed by a trailing count byte — unlike the
//! fixed-layout status payloads, this is exactly the kind of
//! self-describing variable-length stream `winnow` combinators are suited
//! to (see module docs on `crate::payload`).

use winnow::binary;
use winnow::combinator::repeat;
use winnow::prelude::*;
use winnow::Bytes;

use crate::payload::error::{PayloadError, Result};

pub const ID_CAPABILITIES: u8 = 0xB5;

/// One raw `{feature, data}` record before it's folded into [`Capabilities`].
struct Record {
	feature: u16,
	data: Vec<u8>,
}

fn record(input: &mut &Bytes) -> PResult<Record> {
	let feature = binary::le_u16.parse_next(input)?;
	let len = binary::u8.parse_next(input)?;
	let data: Vec<u8> = repeat(len as usize, binary::u8).parse_next(input)?;
	Ok(Record { feature, data })
}

/// Fan-speed-combination capability (feature `0x0214`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modes {
	pub cool: bool,
	pub heat: bool,
	pub dry: bool,
	pub auto: bool,
	pub fan: bool,
}

/// Swing-axis capability (feature `0x0215`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwingCapability {
	pub left_right: bool,
	pub up_down: bool,
}

/// A per-mode temperature range, half-degree units (feature `0x0225`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TempRange {
	pub min: u8,
	pub max: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
	pub vertical_wind: bool,
	pub horizontal_wind: bool,
	pub humidity_auto: bool,
	pub humidity_hand: bool,
	pub silky: bool,
	pub smart_eye: bool,
	pub blowing_people: bool,
	pub avoid_people: bool,
	pub self_clean: bool,
	pub one_key_no_wind: bool,
	pub breeze: bool,
	pub has_wind_speed: u8,
	pub no_wind_speed: bool,
	pub eco: bool,
	pub special_eco: bool,
	pub eight_hot: bool,
	pub modes: Modes,
	pub swing: SwingCapability,
	pub power_cal: bool,
	pub power_cal_setting: bool,
	pub power_cal_bcd: bool,
	pub nest_check: bool,
	pub nest_need_change: bool,
	pub dianfure: bool,
	pub strong_hot: bool,
	pub strong_cool: bool,
	pub unit_changeable: bool,
	pub light_type: u8,
	pub temp_cool: TempRange,
	pub temp_auto: TempRange,
	pub temp_heat: TempRange,
	pub is_have_point: bool,
	pub buzzer: bool,
	pub is_twins: bool,
	pub is_four_direction: bool,
}

impl Capabilities {
	/// Whether decoding the capability set implies a follow-up `0xB1`
	/// property query is needed (§4.3.5, §4.6).
	pub fn needs_b1_query(&self) -> bool {
		self.silky
			|| self.self_clean
			|| self.one_key_no_wind
			|| self.breeze
			|| self.buzzer
			|| self.smart_eye
			|| self.humidity_auto
			|| self.humidity_hand
			|| self.vertical_wind
			|| self.horizontal_wind
			|| self.is_twins
			|| self.is_four_direction
	}

	/// UUIDs to include in the follow-up `0xB1` query this capability set
	/// calls for, in the order `isNeedB1Query`'s flags are checked.
	pub fn b1_query_uuids(&self) -> Vec<u16> {
		const SILKY_COOL: u16 = 0x0018;
		const SELF_CLEAN: u16 = 0x0039;
		const BREEZE_AWAY: u16 = 0x0042;
		const BREEZELESS: u16 = 0x0043;
		const BUZZER: u16 = 0x022C;
		const ECO_EYE: u16 = 0x0030;
		const HUMIDITY: u16 = 0x0015;
		const VWIND: u16 = 0x0009;
		const HWIND: u16 = 0x000A;
		const TWINS: u16 = 0x0232;
		const FOUR_DIRECTION: u16 = 0x0233;

		let mut out = Vec::new();
		if self.silky {
			out.push(SILKY_COOL);
		}
		if self.self_clean {
			out.push(SELF_CLEAN);
		}
		if self.one_key_no_wind {
			out.push(BREEZE_AWAY);
		}
		if self.breeze {
			out.push(BREEZELESS);
		}
		if self.buzzer {
			out.push(BUZZER);
		}
		if self.smart_eye {
			out.push(ECO_EYE);
		}
		if self.humidity_auto || self.humidity_hand {
			out.push(HUMIDITY);
		}
		if self.vertical_wind {
			out.push(VWIND);
		}
		if self.horizontal_wind {
			out.push(HWIND);
		}
		if self.is_twins {
			out.push(TWINS);
		}
		if self.is_four_direction {
			out.push(FOUR_DIRECTION);
		}
		out
	}

	fn apply(&mut self, record: &Record) {
		let b0 = record.data.first().copied().unwrap_or(0);
		match record.feature {
			0x0009 => self.vertical_wind = b0 == 1,
			0x000A => self.horizontal_wind = b0 == 1,
			0x0015 => match b0 {
				0 => {
					self.humidity_auto = false;
					self.humidity_hand = false;
				}
				1 => {
					self.humidity_auto = true;
					self.humidity_hand = false;
				}
				2 => {
					self.humidity_auto = true;
					self.humidity_hand = true;
				}
				3 => {
					self.humidity_auto = false;
					self.humidity_hand = true;
				}
				_ => {}
			},
			0x0018 => self.silky = b0 != 0,
			0x0030 => self.smart_eye = b0 == 1,
			0x0032 => self.blowing_people = b0 == 1,
			0x0033 => self.avoid_people = b0 == 1,
			0x0039 => self.self_clean = b0 == 1,
			0x0042 => self.one_key_no_wind = b0 == 1,
			0x0043 => self.breeze = b0 == 1,
			0x0210 => {
				self.has_wind_speed = b0;
				self.no_wind_speed = b0 == 1;
			}
			0x0212 => {
				self.eco = b0 == 1;
				self.special_eco = b0 == 2;
			}
			0x0213 => self.eight_hot = b0 == 1,
			0x0214 => {
				self.modes = match b0 {
					1 => Modes { cool: true, heat: true, dry: true, auto: true, fan: false },
					2 => Modes { cool: false, heat: true, dry: false, auto: true, fan: false },
					3 => Modes { cool: true, heat: false, dry: false, auto: false, fan: false },
					4 => Modes { cool: true, heat: true, dry: false, auto: false, fan: true },
					5 => Modes { cool: true, heat: false, dry: true, auto: false, fan: true },
					_ => Modes { cool: true, heat: false, dry: true, auto: true, fan: false },
				};
			}
			0x0215 => {
				self.swing = match b0 {
					0 => SwingCapability { left_right: false, up_down: true },
					1 => SwingCapability { left_right: true, up_down: true },
					2 => SwingCapability { left_right: false, up_down: false },
					3 => SwingCapability { left_right: true, up_down: false },
					_ => self.swing,
				};
			}
			0x0216 => match b0 {
				0 | 1 => {
					self.power_cal = false;
					self.power_cal_setting = false;
					self.power_cal_bcd = true;
				}
				2 => {
					self.power_cal = true;
					self.power_cal_setting = false;
					self.power_cal_bcd = true;
				}
				3 => {
					self.power_cal = true;
					self.power_cal_setting = true;
					self.power_cal_bcd = true;
				}
				4 => {
					self.power_cal = true;
					self.power_cal_setting = false;
					self.power_cal_bcd = false;
				}
				5 => {
					self.power_cal = true;
					self.power_cal_setting = true;
					self.power_cal_bcd = false;
				}
				_ => {}
			},
			0x0217 => match b0 {
				0 => {
					self.nest_check = false;
					self.nest_need_change = false;
				}
				1 | 2 => {
					self.nest_check = true;
					self.nest_need_change = false;
				}
				3 => {
					self.nest_check = false;
					self.nest_need_change = true;
				}
				4 => {
					self.nest_check = true;
					self.nest_need_change = true;
				}
				_ => {}
			},
			0x0219 => self.dianfure = b0 == 1,
			0x021A => match b0 {
				0 => {
					self.strong_hot = false;
					self.strong_cool = true;
				}
				1 => {
					self.strong_hot = true;
					self.strong_cool = true;
				}
				2 => {
					self.strong_hot = false;
					self.strong_cool = false;
				}
				3 => {
					self.strong_hot = true;
					self.strong_cool = false;
				}
				_ => {}
			},
			0x0222 => self.unit_changeable = b0 == 0,
			0x0224 => self.light_type = b0,
			0x0225 => {
				let d = &record.data;
				let at = |i: usize| d.get(i).copied().unwrap_or(0) / 2;
				self.temp_cool = TempRange { min: at(0), max: at(1) };
				self.temp_auto = TempRange { min: at(2), max: at(3) };
				self.temp_heat = TempRange { min: at(4), max: at(5) };
				self.is_have_point = d.get(6).or(d.get(2)).copied().unwrap_or(0) != 0;
			}
			0x022C => self.buzzer = b0 != 0,
			0x0232 => self.is_twins = b0 == 1,
			0x0233 => self.is_four_direction = b0 == 1,
			_ => {}
		}
	}
}

/// Builds a `0xB5` query body: a bare `{0xB5}` for the initial capability
/// request, or `{0xB5, followup_id}` when the previous page's trailing byte
/// asked for another one (§4.3.5, §8 scenario S4) — plus the CRC-8 trailer
/// every application payload carries (§3).
pub fn build_query(followup_id: Option<u8>) -> Vec<u8> {
	let mut out = vec![ID_CAPABILITIES];
	if let Some(id) = followup_id {
		out.push(id);
	}
	let cs = out.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
	out.push(0u8.wrapping_sub(cs));
	out
}

/// Decodes a `0xB5` body (payload id byte already stripped by the caller,
/// i.e. `payload` starts at the first feature record). Returns the
/// decoded set plus the trailing count byte — `0` means no follow-up,
/// nonzero is the feature id the device wants queried next (§4.3.5).
pub fn decode(payload: &[u8]) -> Result<(Capabilities, u8)> {
	if payload.is_empty() {
		return Err(PayloadError::TooShort { expected_at_least: 1, actual: 0 });
	}
	// last byte is the trailing count; everything before it is records.
	let (records_bytes, trailing) = payload.split_at(payload.len() - 1);
	let mut input = Bytes::new(records_bytes);

	let mut caps = Capabilities::default();
	loop {
		if input.is_empty() {
			break;
		}
		match record.parse_next(&mut input) {
			Ok(rec) => caps.apply(&rec),
			Err(_) => return Err(PayloadError::TruncatedRecord),
		}
	}
	Ok((caps, trailing[0]))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record_bytes(feature: u16, data: &[u8]) -> Vec<u8> {
		let mut out = feature.to_le_bytes().to_vec();
		out.push(data.len() as u8);
		out.extend_from_slice(data);
		out
	}

	#[test]
	fn scenario_s6_silky_cool_forces_b1() {
		let mut payload = record_bytes(0x0018, &[1]);
		payload.push(0x02);
		let (caps, trailing) = decode(&payload).unwrap();
		assert!(caps.silky);
		assert!(caps.needs_b1_query());
		assert_eq!(caps.b1_query_uuids(), vec![0x0018]);
		assert_eq!(trailing, 0x02);
	}

	#[test]
	fn multiple_records_and_no_followup() {
		let mut payload = record_bytes(0x0009, &[1]);
		payload.extend(record_bytes(0x000A, &[0]));
		payload.push(0);
		let (caps, trailing) = decode(&payload).unwrap();
		assert!(caps.vertical_wind);
		assert!(!caps.horizontal_wind);
		assert_eq!(trailing, 0);
	}

	#[test]
	fn modes_combo_four_adds_fan() {
		let mut payload = record_bytes(0x0214, &[4]);
		payload.push(0);
		let (caps, _) = decode(&payload).unwrap();
		assert!(caps.modes.cool && caps.modes.heat && caps.modes.fan && !caps.modes.dry);
	}

	#[test]
	fn temperatures_halve_raw_bytes() {
		let mut payload = record_bytes(0x0225, &[32, 60, 32, 60, 16, 56, 1]);
		payload.push(0);
		let (caps, _) = decode(&payload).unwrap();
		assert_eq!(caps.temp_cool, TempRange { min: 16, max: 30 });
		assert!(caps.is_have_point);
	}

	#[test]
	fn truncated_record_is_reported() {
		let payload = vec![0x09, 0x00, 0x05, 0x01]; // claims 5 bytes, only has 1
		assert_eq!(decode(&payload), Err(PayloadError::TruncatedRecord));
	}
}
