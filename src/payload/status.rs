//! Status payload decoders: `0xC0` (§4.3.1), `0xA0` (§4.3.2) and `0xA1`
//! (§4.3.3).
//!
//! Each decoder produces a [`StatusUpdate`] — every field is an
//! `Option<T>`, `None` meaning "this frame variant doesn't carry that
//! field" rather than "the device reports zero/false". The appliance
//! façade owns merging updates into its committed [`DeviceStatus`]; this
//! keeps the §7 `PayloadMalformed` policy ("decoder returns the partial
//! state it could recover; façade keeps prior values for missing fields")
//! a property of the merge step rather than something every decoder has
//! to reimplement.

use crate::bytes::{get_bit, get_bits};
use crate::payload::error::{PayloadError, Result};
use crate::payload::types::{FanSpeed, Mode, SwingMode};

pub const ID_STATUS_C0: u8 = 0xC0;
pub const ID_STATUS_A0: u8 = 0xA0;
pub const ID_AMBIENT_A1: u8 = 0xA1;

const MIN_LEN_C0: usize = 20;

/// A decoded but not-yet-merged slice of device state. See module docs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
	pub power: Option<bool>,
	pub mode: Option<Mode>,
	pub target_temp: Option<f32>,
	pub fan: Option<FanSpeed>,
	pub swing: Option<SwingMode>,
	pub timer_on_minutes: Option<u16>,
	pub timer_off_minutes: Option<u16>,
	pub indoor_temp: Option<f32>,
	pub outdoor_temp: Option<f32>,
	pub humidity: Option<u8>,
	pub filter_full: Option<bool>,
	pub error_code: Option<u8>,
	pub eco: Option<bool>,
	pub turbo: Option<bool>,
	pub sleep: Option<bool>,
	pub freeze_protection: Option<bool>,
	pub temp_unit_fahrenheit: Option<bool>,

	// Decoded for parity with the original firmware but not exposed by
	// any façade accessor (§9 Open Questions): semantics beyond the name
	// are unknown, so these are preserved rather than guessed at.
	pub double_temp: Option<bool>,
	pub pwm_mode: Option<u8>,
	pub night_light: Option<bool>,
	pub imode_resume: Option<bool>,
	pub timer_mode: Option<bool>,
	pub test2: Option<bool>,
	pub err_mark: Option<bool>,
	pub cosy_sleep: Option<u8>,
	pub save: Option<bool>,
	pub low_freq_fan: Option<bool>,
	pub feel_own: Option<bool>,
	pub child_sleep: Option<bool>,
	pub natural_fan: Option<bool>,
	pub dry_clean: Option<bool>,
	pub ptc_assis: Option<bool>,
	pub clean_up: Option<bool>,
	pub self_feel_own: Option<bool>,
	pub exchange_air: Option<bool>,
	pub catch_cold: Option<bool>,
	pub peak_elec: Option<bool>,
	pub cool_fan: Option<bool>,
	pub light: Option<u8>,
	pub silky_cool: Option<bool>,
	pub set_expand_dot: Option<bool>,
	pub set_expand: Option<u8>,
}

fn decode_timers(payload: &[u8]) -> (Option<u16>, Option<u16>) {
	let on_enabled = get_bit(payload[4], 7);
	let off_enabled = get_bit(payload[5], 7);
	let frac = payload[6];

	let on_minutes = if on_enabled {
		let quarters = get_bits(payload[4], 0x7F, 0) as u16;
		let extra = get_bits(frac, 0x0F, 4) as u16;
		Some(quarters * 15 + extra)
	} else {
		Some(0)
	};

	let off_minutes = if off_enabled {
		let quarters = get_bits(payload[5], 0x7F, 0) as u16;
		let extra = get_bits(frac, 0x0F, 0) as u16;
		Some(quarters * 15 + extra)
	} else {
		Some(0)
	};

	(on_minutes, off_minutes)
}

/// Celsius/Fahrenheit-aware ambient temperature reconstruction shared by
/// `0xC0`'s indoor/outdoor fields (§4.3.1).
fn reconstruct_temperature(raw: u8, decimal: u8, fahrenheit: bool) -> f32 {
	let integer = raw as i32 - 50;
	if !fahrenheit && decimal > 0 {
		let sign = if integer >= 0 { 1.0 } else { -1.0 };
		(integer / 2) as f32 + (decimal as f32) * sign * 0.1
	} else if decimal >= 5 {
		let sign = if integer >= 0 { 1.0 } else { -1.0 };
		(integer / 2) as f32 + sign * 0.5
	} else {
		integer as f32 * 0.5
	}
}

/// Decodes a `0xC0` status payload (device -> host, length >= 20).
pub fn decode_c0(payload: &[u8]) -> Result<StatusUpdate> {
	if payload.len() < MIN_LEN_C0 {
		return Err(PayloadError::TooShort { expected_at_least: MIN_LEN_C0, actual: payload.len() });
	}

	let power = get_bit(payload[1], 0);
	let (timer_on_minutes, timer_off_minutes) = decode_timers(payload);

	let fan_raw = get_bits(payload[3], 0x7F, 0);
	let temp_unit_fahrenheit = get_bit(payload[10], 2);

	let t1_dot = get_bits(payload[15], 0x0F, 0);
	let t4_dot = get_bits(payload[15], 0x0F, 4);
	let indoor_temp = reconstruct_temperature(payload[11], t1_dot, temp_unit_fahrenheit);
	let outdoor_temp = reconstruct_temperature(payload[12], t4_dot, temp_unit_fahrenheit);

	let mut target_temp = get_bits(payload[2], 0x0F, 0) as f32 + 16.0;
	if get_bit(payload[2], 4) {
		target_temp += 0.5;
	}
	let new_temp = get_bits(payload[13], 0x1F, 0);
	if new_temp != 0 {
		target_temp = new_temp as f32 + 12.0;
	}

	let mut update = StatusUpdate {
		power: Some(power),
		mode: Some(Mode::from_raw(get_bits(payload[2], 0x07, 5))),
		target_temp: Some(target_temp),
		fan: Some(FanSpeed::from_raw_c0(fan_raw)),
		swing: Some(SwingMode::from_raw(get_bits(payload[7], 0x0F, 0))),
		timer_on_minutes,
		timer_off_minutes,
		indoor_temp: Some(indoor_temp),
		outdoor_temp: Some(outdoor_temp),
		humidity: Some(get_bits(payload[19], 0x7F, 0)),
		filter_full: Some(get_bit(payload[13], 5)),
		error_code: Some(payload[16]),
		eco: Some(get_bit(payload[9], 4)),
		// byte 9 bit 6 is also assigned by the original firmware and then
		// immediately overwritten by byte 10 bit 0 — §9 Open Questions
		// treats the latter as authoritative, so only it is kept.
		sleep: Some(get_bit(payload[10], 0)),
		turbo: Some(get_bit(payload[8], 5) || get_bit(payload[10], 1)),
		freeze_protection: None,
		temp_unit_fahrenheit: Some(temp_unit_fahrenheit),
		double_temp: None,
		pwm_mode: Some(get_bits(payload[14], 0x0F, 0)),
		night_light: Some(get_bit(payload[10], 4)),
		imode_resume: Some(get_bit(payload[1], 2)),
		timer_mode: Some(get_bit(payload[1], 4)),
		test2: Some(get_bit(payload[1], 5)),
		err_mark: Some(get_bit(payload[1], 7)),
		cosy_sleep: Some(get_bits(payload[8], 0x03, 0)),
		save: Some(get_bit(payload[8], 3)),
		low_freq_fan: Some(get_bit(payload[8], 4)),
		feel_own: Some(get_bit(payload[8], 7)),
		child_sleep: Some(get_bit(payload[9], 0)),
		natural_fan: Some(get_bit(payload[9], 1)),
		dry_clean: Some(get_bit(payload[9], 2)),
		ptc_assis: Some(get_bit(payload[9], 3)),
		clean_up: Some(get_bit(payload[9], 5)),
		self_feel_own: Some(get_bit(payload[9], 7)),
		exchange_air: Some(get_bit(payload[10], 3)),
		catch_cold: Some(get_bit(payload[10], 5)),
		peak_elec: Some(get_bit(payload[10], 6)),
		cool_fan: Some(get_bit(payload[10], 7)),
		light: Some(get_bits(payload[14], 0x07, 4)),
		silky_cool: None,
		set_expand_dot: None,
		set_expand: None,
	};

	if payload.len() >= 23 {
		update.silky_cool = Some(get_bit(payload[22], 3));
	}
	if payload.len() >= 24 {
		update.double_temp = Some(get_bit(payload[21], 6));
		update.freeze_protection = Some(get_bit(payload[21], 7));
	}

	Ok(update)
}

const MIN_LEN_A0: usize = 15;

/// Decodes a legacy `0xA0` status payload (§4.3.2). Older field order;
/// notably `fan` is *not* remapped from `FIXED` to `Auto` here (§9 Open
/// Questions: asymmetry preserved).
pub fn decode_a0(payload: &[u8]) -> Result<StatusUpdate> {
	if payload.len() < MIN_LEN_A0 {
		return Err(PayloadError::TooShort { expected_at_least: MIN_LEN_A0, actual: payload.len() });
	}

	let power = get_bit(payload[1], 0);
	let (timer_on_minutes, timer_off_minutes) = decode_timers(payload);
	let fan_raw = get_bits(payload[3], 0x7F, 0);

	let mut target_temp = get_bits(payload[1], 0x1F, 1) as f32 + 12.0;
	if get_bit(payload[1], 6) {
		target_temp += 0.5;
	}

	Ok(StatusUpdate {
		power: Some(power),
		mode: Some(Mode::from_raw(get_bits(payload[2], 0x07, 5))),
		target_temp: Some(target_temp),
		fan: Some(FanSpeed::from_raw_a0(fan_raw)),
		swing: Some(SwingMode::from_raw(get_bits(payload[7], 0x0F, 0))),
		timer_on_minutes,
		timer_off_minutes,
		indoor_temp: None,
		outdoor_temp: None,
		humidity: Some(get_bits(payload[13], 0x7F, 0)),
		filter_full: None,
		error_code: None,
		eco: Some(get_bit(payload[9], 4)),
		sleep: Some(get_bit(payload[10], 0)),
		turbo: Some(get_bit(payload[8], 5) || get_bit(payload[10], 1)),
		freeze_protection: Some(get_bit(payload[12], 7)),
		temp_unit_fahrenheit: Some(get_bit(payload[9], 7)),
		double_temp: Some(get_bit(payload[12], 6)),
		pwm_mode: Some(get_bits(payload[11], 0x0F, 0)),
		night_light: Some(get_bit(payload[10], 4)),
		imode_resume: None,
		timer_mode: None,
		test2: None,
		err_mark: Some(get_bit(payload[1], 7)),
		cosy_sleep: Some(get_bits(payload[8], 0x03, 0)),
		save: Some(get_bit(payload[8], 3)),
		low_freq_fan: Some(get_bit(payload[8], 4)),
		feel_own: Some(get_bit(payload[8], 7)),
		child_sleep: None,
		natural_fan: Some(get_bit(payload[10], 6)),
		dry_clean: Some(get_bit(payload[9], 2)),
		ptc_assis: Some(get_bit(payload[9], 3)),
		clean_up: Some(get_bit(payload[9], 5)),
		self_feel_own: None,
		exchange_air: Some(get_bit(payload[9], 1)),
		catch_cold: Some(get_bit(payload[10], 3)),
		peak_elec: Some(get_bit(payload[10], 5)),
		cool_fan: None,
		light: Some(get_bits(payload[11], 0x07, 4)),
		silky_cool: Some(get_bit(payload[14], 3)),
		set_expand_dot: Some(get_bit(payload[12], 0)),
		set_expand: Some(get_bits(payload[12], 0x1F, 1) + 12),
	})
}

const MIN_LEN_A1: usize = 18;

/// Decodes an `0xA1` ambient-only status payload (§4.3.3).
pub fn decode_a1(payload: &[u8]) -> Result<StatusUpdate> {
	if payload.len() < MIN_LEN_A1 {
		return Err(PayloadError::TooShort { expected_at_least: MIN_LEN_A1, actual: payload.len() });
	}

	Ok(StatusUpdate {
		indoor_temp: Some((payload[13] as f32 - 50.0) * 0.5),
		outdoor_temp: Some((payload[14] as i8 as f32 - 50.0) * 0.5),
		humidity: Some(get_bits(payload[17], 0x7F, 0)),
		..Default::default()
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn make_c0(len: usize) -> Vec<u8> {
		let mut p = vec![0u8; len];
		p[0] = ID_STATUS_C0;
		p
	}

	#[test]
	fn scenario_s1_query_status_c0() {
		let mut p = make_c0(20);
		p[1] = 0b1000_0001; // power on
		p[2] = (2 << 5) | (24 - 16); // cool, target 24
		p[3] = 102; // fan auto
		p[7] = 0x0; // swing off
		p[11] = 86; // indoor raw
		p[12] = 76; // outdoor raw
		p[15] = 0x00; // no decimals
		let update = decode_c0(&p).unwrap();
		assert_eq!(update.power, Some(true));
		assert_eq!(update.mode, Some(Mode::Cool));
		assert_eq!(update.target_temp, Some(24.0));
		assert_eq!(update.fan, Some(FanSpeed::Auto));
		assert_eq!(update.swing, Some(SwingMode::Off));
		assert_eq!(update.indoor_temp, Some(18.0));
		assert_eq!(update.outdoor_temp, Some(13.0));
	}

	#[test]
	fn too_short_is_malformed_not_panic() {
		let p = vec![ID_STATUS_C0; 5];
		assert_eq!(decode_c0(&p), Err(PayloadError::TooShort { expected_at_least: MIN_LEN_C0, actual: 5 }));
	}

	#[test]
	fn timers_disabled_yield_zero() {
		let p = make_c0(20);
		let update = decode_c0(&p).unwrap();
		assert_eq!(update.timer_on_minutes, Some(0));
		assert_eq!(update.timer_off_minutes, Some(0));
	}

	#[test]
	fn timers_decode_quarter_hours_plus_minutes() {
		let mut p = make_c0(20);
		// on: enabled, 2 quarters (30 min) + 7 extra minutes = 37
		p[4] = 0x80 | 2;
		p[6] = 7 << 4;
		let update = decode_c0(&p).unwrap();
		assert_eq!(update.timer_on_minutes, Some(37));
	}

	#[test]
	fn a1_ambient_only() {
		let mut p = vec![0u8; 18];
		p[0] = ID_AMBIENT_A1;
		p[13] = 90; // (90-50)*0.5 = 20.0
		p[14] = 70; // (70-50)*0.5 = 10.0
		p[17] = 55;
		let update = decode_a1(&p).unwrap();
		assert_eq!(update.indoor_temp, Some(20.0));
		assert_eq!(update.outdoor_temp, Some(10.0));
		assert_eq!(update.humidity, Some(55));
	}

	#[test]
	fn a0_does_not_remap_fixed_fan() {
		let mut p = vec![0u8; 15];
		p[0] = ID_STATUS_A0;
		p[3] = FanSpeed::FIXED;
		let update = decode_a0(&p).unwrap();
		assert_eq!(update.fan, Some(FanSpeed::Raw(FanSpeed::FIXED)));
	}
}
