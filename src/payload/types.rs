//! Shared device-state vocabulary used by the status decoder, the command
//! encoder, and the appliance façade (§3 Data Model).

/// Device operating mode. `Off` is not a value the device transmits in the
/// mode bitfield — it's derived from the power bit, exactly as
/// `StatusData::getMode` does (`m_getPower() ? rawMode : MODE_OFF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
	Off,
	Auto,
	Cool,
	Dry,
	Heat,
	Fan,
}

impl Mode {
	/// Decodes the 3-bit raw mode field. Used only when `power` is on;
	/// callers are responsible for substituting `Off` otherwise.
	pub fn from_raw(value: u8) -> Self {
		match value {
			1 => Self::Auto,
			2 => Self::Cool,
			3 => Self::Dry,
			4 => Self::Heat,
			5 => Self::Fan,
			other => {
				log::warn!("unexpected mode code {other}, treating as auto");
				Self::Auto
			}
		}
	}

	/// Raw mode field value to send. `Off` has no raw encoding of its own
	/// (the power bit carries that); callers sending `Off` should not call
	/// this and should instead just clear the power bit.
	pub fn to_raw(self) -> u8 {
		match self {
			Self::Off | Self::Auto => 1,
			Self::Cool => 2,
			Self::Dry => 3,
			Self::Heat => 4,
			Self::Fan => 5,
		}
	}
}

/// Fan speed ladder (§3). `Raw` preserves a value the device reported that
/// doesn't correspond to a named rung — this happens for `0xA0` status
/// frames, which (unlike `0xC0`) do not remap `FIXED` to `Auto` (§9 Open
/// Questions: the asymmetry is intentional and preserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanSpeed {
	Silent,
	Low,
	Medium,
	High,
	Turbo,
	Auto,
	Raw(u8),
}

impl FanSpeed {
	pub const SILENT: u8 = 20;
	pub const LOW: u8 = 40;
	pub const MEDIUM: u8 = 60;
	pub const HIGH: u8 = 80;
	pub const TURBO: u8 = 100;
	pub const FIXED: u8 = 101;
	pub const AUTO: u8 = 102;

	/// Legacy raw values `30`/`50` are always normalized to the nearest
	/// canonical rung regardless of which status frame they came from
	/// (§4.6 policy, §8 invariant 4): the original raw byte is never kept.
	fn normalize_legacy(raw: u8) -> u8 {
		match raw {
			30 => Self::LOW,
			50 => Self::MEDIUM,
			other => other,
		}
	}

	/// Decodes a raw fan-speed byte from a `0xC0` status payload, which
	/// additionally remaps `FIXED` (101) to `Auto` (102).
	pub fn from_raw_c0(raw: u8) -> Self {
		let raw = Self::normalize_legacy(raw);
		let raw = if raw == Self::FIXED { Self::AUTO } else { raw };
		Self::from_canonical(raw)
	}

	/// Decodes a raw fan-speed byte from an `0xA0` status payload, which
	/// does *not* remap `FIXED` — it is preserved as `Raw(101)`.
	pub fn from_raw_a0(raw: u8) -> Self {
		Self::from_canonical(Self::normalize_legacy(raw))
	}

	fn from_canonical(raw: u8) -> Self {
		match raw {
			Self::SILENT => Self::Silent,
			Self::LOW => Self::Low,
			Self::MEDIUM => Self::Medium,
			Self::HIGH => Self::High,
			Self::TURBO => Self::Turbo,
			Self::AUTO => Self::Auto,
			other => Self::Raw(other),
		}
	}

	pub fn to_raw(self) -> u8 {
		match self {
			Self::Silent => Self::SILENT,
			Self::Low => Self::LOW,
			Self::Medium => Self::MEDIUM,
			Self::High => Self::HIGH,
			Self::Turbo => Self::TURBO,
			Self::Auto => Self::AUTO,
			Self::Raw(v) => v,
		}
	}
}

/// Swing axis selection (§3, §4.6 policy). The façade only ever *writes*
/// one of the four named combinations, but a device can report other bit
/// patterns, preserved as `Raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwingMode {
	Off,
	Vertical,
	Horizontal,
	Both,
	Raw(u8),
}

impl SwingMode {
	pub fn from_raw(value: u8) -> Self {
		match value & 0x0F {
			0x0 => Self::Off,
			0xC => Self::Vertical,
			0x3 => Self::Horizontal,
			0xF => Self::Both,
			other => Self::Raw(other),
		}
	}

	pub fn to_raw(self) -> u8 {
		match self {
			Self::Off => 0x0,
			Self::Vertical => 0xC,
			Self::Horizontal => 0x3,
			Self::Both => 0xF,
			Self::Raw(v) => v,
		}
	}
}

/// Mutually exclusive comfort preset (§3, §4.6 policy, §8 invariant 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
	None,
	Eco,
	Turbo,
	Sleep,
	FreezeProtection,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(30, FanSpeed::Low)]
	#[case(50, FanSpeed::Medium)]
	#[case(FanSpeed::FIXED, FanSpeed::Auto)]
	#[case(FanSpeed::AUTO, FanSpeed::Auto)]
	#[case(FanSpeed::HIGH, FanSpeed::High)]
	fn fan_speed_c0_normalization(#[case] raw: u8, #[case] expected: FanSpeed) {
		assert_eq!(FanSpeed::from_raw_c0(raw), expected);
	}

	#[rstest]
	#[case(30, FanSpeed::Low)]
	#[case(50, FanSpeed::Medium)]
	#[case(FanSpeed::FIXED, FanSpeed::Raw(FanSpeed::FIXED))]
	fn fan_speed_a0_keeps_fixed_raw(#[case] raw: u8, #[case] expected: FanSpeed) {
		assert_eq!(FanSpeed::from_raw_a0(raw), expected);
	}

	#[test]
	fn swing_round_trip() {
		for mode in [SwingMode::Off, SwingMode::Vertical, SwingMode::Horizontal, SwingMode::Both] {
			assert_eq!(SwingMode::from_raw(mode.to_raw()), mode);
		}
	}

	#[test]
	fn mode_round_trip_when_on() {
		for mode in [Mode::Auto, Mode::Cool, Mode::Dry, Mode::Heat, Mode::Fan] {
			assert_eq!(Mode::from_raw(mode.to_raw()), mode);
		}
	}
}
