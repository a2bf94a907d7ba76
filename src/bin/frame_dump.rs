//! Diagnostic binary: feeds a captured frame through the deserializer and
//! prints what it parsed to. Not part of the public API — in the spirit
//! of libmbus's own `test_parse.rs`, just with this protocol's framing.

use midea_ac_driver::frame::Deserializer;
use midea_ac_driver::utils::read_test_file;

fn dump_file(fname: &str) -> Result<(), Box<dyn std::error::Error>> {
	let data = read_test_file(fname)?;
	let mut deserializer = Deserializer::new();
	let mut found_any = false;

	for byte in data {
		if let Some(frame) = deserializer.push(byte) {
			found_any = true;
			println!("frame: {}", frame.to_hex_string());
			println!("  appliance_kind = {:#04X}", frame.appliance_kind());
			println!("  protocol_id    = {:#04X}", frame.protocol_id());
			println!("  frame_type     = {:?}", frame.frame_type());
			println!("  payload        = {:02X?}", frame.payload());
		}
	}

	if !found_any {
		eprintln!("no complete, checksum-valid frame found in {fname}");
	}
	Ok(())
}

fn main() {
	for fname in std::env::args().skip(1) {
		println!("Trying to load file {fname}");
		match dump_file(&fname) {
			Ok(_) => println!("done"),
			Err(e) => eprintln!("failed to read {fname}: {e}"),
		}
	}
}
