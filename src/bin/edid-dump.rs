use std::env;
use std::ffi::OsStr;
use std::fs;
use std::process;

use edid_decode::{decode, Descriptor, Edid};

const EXE_NAME: &str = "edid-dump";

fn usage() -> ! {
	eprintln!("Usage: {} <path>", EXE_NAME);
	process::exit(1);
}

fn print_summary(edid: &Edid) {
	let header = &edid.header;
	println!("EDID version: {}", header.version);
	println!("Manufacturer: {}", header.manufacturer());
	println!("Product code: {}", header.product_code());
	println!("Serial number: {}", header.serial);
	match header.week() {
		Some(week) => println!("Made in week {} of {}", week, header.year()),
		None => println!("Model year: {}", header.year()),
	}

	for (slot, descriptor) in edid.descriptors.iter().enumerate() {
		match descriptor {
			Descriptor::DetailedTiming(t) => println!(
				"Descriptor {}: {}x{} @ {} kHz",
				slot + 1,
				t.horizontal_active_pixels,
				t.vertical_active_lines,
				t.pixel_clock
			),
			Descriptor::ProductName(name) => println!("Descriptor {}: name '{}'", slot + 1, name),
			Descriptor::SerialNumber(s) => println!("Descriptor {}: serial '{}'", slot + 1, s),
			Descriptor::DataString(s) => println!("Descriptor {}: string '{}'", slot + 1, s),
			other => println!("Descriptor {}: {:?}", slot + 1, other),
		}
	}
	println!("Extension blocks: {}", edid.extension_count);
}

fn dump(path: &OsStr) {
	let data = match fs::read(path) {
		Ok(data) => data,
		Err(err) => {
			eprintln!("{}: {}", path.to_string_lossy(), err);
			process::exit(2);
		}
	};

	match decode(&data) {
		Ok(edid) => {
			print_summary(&edid);
			println!();
			println!("{:#?}", edid);
		}
		Err(err) => {
			eprintln!("{}: {}", path.to_string_lossy(), err);
			process::exit(2);
		}
	}
}

fn main() {
	let args: Vec<_> = env::args_os().collect();
	match args.len() {
		2 => dump(&args[1]),
		_ => usage(),
	}
}
