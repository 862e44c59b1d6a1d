//! Decoder for the 128-byte VESA E-EDID base block.
//!
//! [`decode`] frames the input, checks the header pattern and checksum, then
//! runs one nom parser per block region and assembles an [`Edid`]. Decoding
//! either yields a complete record or a [`DecodeError`], never a partial one.
//!
//! ```no_run
//! let data = std::fs::read("/sys/class/drm/card0-HDMI-A-1/edid").unwrap();
//! let edid = edid_decode::decode(&data).unwrap();
//! println!("{} {}", edid.header.manufacturer(), edid.header.product_code());
//! ```

use log::trace;
use nom::bytes::complete::take;
use nom::multi::count;
use nom::number::complete::le_u8;
use nom::Finish;

mod chromaticity;
mod cp437;
mod descriptor;
mod detailed_timing;
mod display;
mod error;
mod header;
mod timings;

pub use crate::chromaticity::{calculate_chromaticity, Chromaticity, ChromaticityPoint};
pub use crate::descriptor::{
	CvtAspectRatio, CvtAspectRatios, CvtSupport, Descriptor, RangeLimits, SecondaryCurve,
	SecondaryGtf,
};
pub use crate::detailed_timing::{decode_stereo_mode, DetailedTiming, StereoMode, SyncScheme};
pub use crate::display::{
	BasicDisplayParameters, ColorBitDepth, ColorEncodings, DigitalInput, DigitalVideoInterface,
	DisplayType, FeatureSupport, FrequencyMode, ScreenSize, SignalLevelStandard, VideoInput,
};
pub use crate::error::{DecodeError, ParseResult};
pub use crate::header::{Header, ManufactureDate, Version};
pub use crate::timings::{AspectRatio, EstablishedTimings, StandardTiming};

use crate::chromaticity::parse_chromaticity;
use crate::descriptor::{parse_descriptor, DESCRIPTOR_SLOTS};
use crate::display::parse_basic_display;
use crate::header::parse_header;
use crate::timings::{parse_established_timings, parse_standard_timings};

/// Size of the base block; extension blocks follow in 128-byte steps.
pub const EDID_BLOCK_LEN: usize = 128;
pub const HEADER_PATTERN: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

const EXTENSION_FLAG_OFFSET: usize = 126;

/// A fully decoded base block.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edid {
	pub header: Header,
	pub display: BasicDisplayParameters,
	pub chromaticity: Chromaticity,
	pub established_timings: EstablishedTimings,
	/// Used slots only, in slot order.
	pub standard_timings: Vec<StandardTiming>,
	/// The four descriptor slots, in slot order.
	pub descriptors: Vec<Descriptor>,
	/// Raw value of byte 126.
	pub extension_count: u8,
}

impl Edid {
	pub fn detailed_timings(&self) -> impl Iterator<Item = &DetailedTiming> {
		self.descriptors.iter().filter_map(|d| match d {
			Descriptor::DetailedTiming(timing) => Some(timing),
			_ => None,
		})
	}

	/// The first detailed timing is the preferred mode.
	pub fn preferred_timing(&self) -> Option<&DetailedTiming> {
		self.detailed_timings().next()
	}

	/// When a text descriptor appears more than once, the last one wins.
	pub fn monitor_name(&self) -> Option<&str> {
		self.descriptors.iter().rev().find_map(|d| match d {
			Descriptor::ProductName(name) => Some(name.as_str()),
			_ => None,
		})
	}

	pub fn monitor_serial_number(&self) -> Option<&str> {
		self.descriptors.iter().rev().find_map(|d| match d {
			Descriptor::SerialNumber(serial) => Some(serial.as_str()),
			_ => None,
		})
	}

	pub fn monitor_data_string(&self) -> Option<&str> {
		self.descriptors.iter().rev().find_map(|d| match d {
			Descriptor::DataString(text) => Some(text.as_str()),
			_ => None,
		})
	}

	pub fn range_limits(&self) -> Option<&RangeLimits> {
		self.descriptors.iter().rev().find_map(|d| match d {
			Descriptor::RangeLimits(limits) => Some(limits),
			_ => None,
		})
	}

	pub fn extension_flag(&self) -> bool {
		self.extension_count & 1 != 0
	}
}

/// Returns the first 128 bytes of `data`. Anything after them is ignored.
pub fn parse_binary(data: &[u8]) -> Result<&[u8; EDID_BLOCK_LEN], DecodeError> {
	data.get(..EDID_BLOCK_LEN)
		.and_then(|block| block.try_into().ok())
		.ok_or(DecodeError::TooShort { length: data.len() })
}

/// Checks the header pattern and the checksum, and returns whether the block
/// announces an extension.
pub fn validate(block: &[u8; EDID_BLOCK_LEN]) -> Result<bool, DecodeError> {
	let mut found = [0; 8];
	found.copy_from_slice(&block[..HEADER_PATTERN.len()]);
	if found != HEADER_PATTERN {
		return Err(DecodeError::InvalidHeader { found });
	}

	let sum = block.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
	if sum != 0 {
		return Err(DecodeError::InvalidChecksum { sum });
	}

	Ok(block[EXTENSION_FLAG_OFFSET] & 1 != 0)
}

fn parse_block(input: &[u8]) -> ParseResult<'_, Edid> {
	let (input, _) = take(HEADER_PATTERN.len())(input)?;
	let (input, header) = parse_header(input)?;
	trace!(
		"decoding EDID {} block from {}",
		header.version,
		header.manufacturer()
	);
	let (input, display) = parse_basic_display(input, header.version)?;
	let (input, chromaticity) = parse_chromaticity(input)?;
	let (input, established_timings) = parse_established_timings(input)?;
	let (input, standard_timings) = parse_standard_timings(input, header.version)?;
	let (input, descriptors) = count(parse_descriptor, DESCRIPTOR_SLOTS)(input)?;
	let (input, extension_count) = le_u8(input)?;
	let (input, _checksum) = le_u8(input)?;

	Ok((
		input,
		Edid {
			header,
			display,
			chromaticity,
			established_timings,
			standard_timings,
			descriptors,
			extension_count,
		},
	))
}

/// Decodes the base block at the start of `data` and returns the bytes that
/// follow it (extension blocks, left undecoded).
pub fn parse(data: &[u8]) -> ParseResult<'_, Edid> {
	let block = parse_binary(data).map_err(nom::Err::Failure)?;
	validate(block).map_err(nom::Err::Failure)?;
	let (_, edid) = parse_block(block)?;

	Ok((data.get(EDID_BLOCK_LEN..).unwrap_or(&[]), edid))
}

pub fn decode(data: &[u8]) -> Result<Edid, DecodeError> {
	parse(data).finish().map(|(_, edid)| edid)
}
