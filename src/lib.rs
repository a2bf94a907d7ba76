//! Host-side driver for the Midea home-appliance serial protocol.
//!
//! The crate is organised the way the protocol itself is layered:
//!
//! - [`bytes`] — little-endian packing and bit-field helpers (§4.1)
//! - [`frame`] — the outer transport frame: header, length, checksum (§4.2)
//! - [`payload`] — device-status / capability / command payload codecs (§4.3)
//! - [`timer`] — a cooperative monotonic timer service (§4.4)
//! - [`dispatcher`] — the request queue and retry/cooldown state machine (§4.5)
//! - [`appliance`] — the public air-conditioner façade (§4.6)
//!
//! [`transport`], [`clock`] and [`network`] are the external seams the core
//! consumes but does not implement (§1, §6).

pub mod appliance;
pub mod bytes;
pub mod clock;
pub mod dispatcher;
pub mod frame;
pub mod network;
pub mod payload;
pub mod timer;
pub mod transport;

pub mod utils {
	//! Test-fixture helpers. Not part of the protocol surface.

	/// Loads a captured frame from disk. `.hex` files are whitespace
	/// separated hex bytes (`AA 20 AC ...`); anything else is read raw.
	pub fn read_test_file(filename: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
		if filename.ends_with(".hex") {
			let data = std::fs::read_to_string(filename)?;

			data.split_whitespace()
				.map(|substr| u8::from_str_radix(substr, 16))
				.collect::<Result<Vec<_>, _>>()
				.map_err(|e| e.into())
		} else {
			std::fs::read(filename).map_err(|e| e.into())
		}
	}
}
