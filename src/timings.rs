//! Established timings (block bytes 35 to 37) and standard timings
//! (block bytes 38 to 53).

use log::debug;
use nom::combinator::map;
use nom::multi::count;
use nom::number::complete::le_u8;
use nom::sequence::tuple;

use crate::error::ParseResult;
use crate::header::Version;

const STANDARD_TIMING_SLOTS: usize = 8;
/// Both bytes of an unused standard timing slot hold this value.
const UNUSED_SLOT: u8 = 0x01;

/// Legacy VESA, IBM and Apple modes flagged in the established timings bitmap.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstablishedTimings {
	pub timing_720x400_70hz: bool,
	pub timing_720x400_88hz: bool,
	pub timing_640x480_60hz: bool,
	pub timing_640x480_67hz: bool,
	pub timing_640x480_72hz: bool,
	pub timing_640x480_75hz: bool,
	pub timing_800x600_56hz: bool,
	pub timing_800x600_60hz: bool,
	pub timing_800x600_72hz: bool,
	pub timing_800x600_75hz: bool,
	pub timing_832x624_75hz: bool,
	pub timing_1024x768_87hz: bool,
	pub timing_1024x768_60hz: bool,
	pub timing_1024x768_70hz: bool,
	pub timing_1024x768_75hz: bool,
	pub timing_1280x1024_75hz: bool,
	pub timing_1152x870_75hz: bool,
	/// Low 7 bits of the third byte, manufacturer specific.
	pub manufacturer_timings: u8,
}

fn bit(byte: u8, n: u8) -> bool {
	byte & (1 << n) != 0
}

pub(crate) fn parse_established_timings(input: &[u8]) -> ParseResult<'_, EstablishedTimings> {
	map(tuple((le_u8, le_u8, le_u8)), |(t1, t2, t3)| EstablishedTimings {
		timing_720x400_70hz: bit(t1, 7),
		timing_720x400_88hz: bit(t1, 6),
		timing_640x480_60hz: bit(t1, 5),
		timing_640x480_67hz: bit(t1, 4),
		timing_640x480_72hz: bit(t1, 3),
		timing_640x480_75hz: bit(t1, 2),
		timing_800x600_56hz: bit(t1, 1),
		timing_800x600_60hz: bit(t1, 0),
		timing_800x600_72hz: bit(t2, 7),
		timing_800x600_75hz: bit(t2, 6),
		timing_832x624_75hz: bit(t2, 5),
		timing_1024x768_87hz: bit(t2, 4),
		timing_1024x768_60hz: bit(t2, 3),
		timing_1024x768_70hz: bit(t2, 2),
		timing_1024x768_75hz: bit(t2, 1),
		timing_1280x1024_75hz: bit(t2, 0),
		timing_1152x870_75hz: bit(t3, 7),
		manufacturer_timings: t3 & 0x7F,
	})(input)
}

/// Image aspect ratio of a standard timing.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AspectRatio {
	Ratio1_1,
	Ratio16_10,
	Ratio4_3,
	Ratio5_4,
	Ratio16_9,
}

impl AspectRatio {
	/// Code 0b00 meant 1:1 before EDID 1.3 and 16:10 since.
	fn from_code(code: u8, version: Version) -> Self {
		match code & 0b11 {
			0b00 if version < Version::V1_3 => AspectRatio::Ratio1_1,
			0b00 => AspectRatio::Ratio16_10,
			0b01 => AspectRatio::Ratio4_3,
			0b10 => AspectRatio::Ratio5_4,
			_ => AspectRatio::Ratio16_9,
		}
	}

	/// (width, height)
	pub fn ratio(self) -> (u16, u16) {
		match self {
			AspectRatio::Ratio1_1 => (1, 1),
			AspectRatio::Ratio16_10 => (16, 10),
			AspectRatio::Ratio4_3 => (4, 3),
			AspectRatio::Ratio5_4 => (5, 4),
			AspectRatio::Ratio16_9 => (16, 9),
		}
	}
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardTiming {
	pub horizontal_active_pixels: u16,
	/// Derived from the horizontal resolution and aspect ratio, truncated.
	pub vertical_active_lines: u16,
	pub aspect_ratio: AspectRatio,
	/// Hz
	pub refresh_rate: u8,
}

impl StandardTiming {
	fn decode(resolution: u8, flags: u8, version: Version) -> Self {
		let horizontal = (u16::from(resolution) + 31) * 8;
		let aspect_ratio = AspectRatio::from_code(flags >> 6, version);
		let (width, height) = aspect_ratio.ratio();
		StandardTiming {
			horizontal_active_pixels: horizontal,
			vertical_active_lines: horizontal * height / width,
			aspect_ratio,
			refresh_rate: (flags & 0x3F) + 60,
		}
	}
}

pub(crate) fn parse_standard_timings(
	input: &[u8],
	version: Version,
) -> ParseResult<'_, Vec<StandardTiming>> {
	let (input, slots) = count(tuple((le_u8, le_u8)), STANDARD_TIMING_SLOTS)(input)?;

	let timings = slots
		.into_iter()
		.enumerate()
		.filter_map(|(slot, (resolution, flags))| {
			if resolution == UNUSED_SLOT && flags == UNUSED_SLOT {
				debug!("standard timing slot {} is unused", slot + 1);
				return None;
			}
			Some(StandardTiming::decode(resolution, flags, version))
		})
		.collect();

	Ok((input, timings))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_established_timings() {
		let (_, data) = parse_established_timings(&[0b10101010, 0b10101010, 0x00]).unwrap();

		assert!(data.timing_720x400_70hz);
		assert!(!data.timing_720x400_88hz);
		assert!(data.timing_640x480_60hz);
		assert!(!data.timing_640x480_67hz);
		assert!(data.timing_640x480_72hz);
		assert!(!data.timing_640x480_75hz);
		assert!(data.timing_800x600_56hz);
		assert!(!data.timing_800x600_60hz);

		assert!(data.timing_800x600_72hz);
		assert!(!data.timing_800x600_75hz);
		assert!(data.timing_832x624_75hz);
		assert!(!data.timing_1024x768_87hz);
		assert!(data.timing_1024x768_60hz);
		assert!(!data.timing_1024x768_70hz);
		assert!(data.timing_1024x768_75hz);
		assert!(!data.timing_1280x1024_75hz);

		assert!(!data.timing_1152x870_75hz);
		assert_eq!(data.manufacturer_timings, 0);
	}

	#[test]
	fn third_established_timing_byte() {
		let (_, data) = parse_established_timings(&[0x00, 0x00, 0x85]).unwrap();
		assert!(data.timing_1152x870_75hz);
		assert_eq!(data.manufacturer_timings, 0x05);
	}

	#[test]
	fn test_standard_timings() {
		let d = [
			0x81, 0x3C, 0x45, 0x7C, 0x81, 0x80, 0x8B, 0xC0, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
			0x01, 0x01,
		];
		let (remaining, data) = parse_standard_timings(&d, Version::V1_3).unwrap();

		assert!(remaining.is_empty());
		assert_eq!(
			data,
			vec![
				StandardTiming {
					horizontal_active_pixels: 1280,
					vertical_active_lines: 800,
					aspect_ratio: AspectRatio::Ratio16_10,
					refresh_rate: 120,
				},
				StandardTiming {
					horizontal_active_pixels: 800,
					vertical_active_lines: 600,
					aspect_ratio: AspectRatio::Ratio4_3,
					refresh_rate: 120,
				},
				StandardTiming {
					horizontal_active_pixels: 1280,
					vertical_active_lines: 1024,
					aspect_ratio: AspectRatio::Ratio5_4,
					refresh_rate: 60,
				},
				StandardTiming {
					horizontal_active_pixels: 1360,
					vertical_active_lines: 765,
					aspect_ratio: AspectRatio::Ratio16_9,
					refresh_rate: 60,
				},
			]
		);
	}

	#[test]
	fn aspect_ratio_before_1_3_is_square() {
		let d = [
			0x81, 0x3C, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
			0x01, 0x01,
		];
		let (_, data) = parse_standard_timings(&d, Version::V1_2).unwrap();

		assert_eq!(data.len(), 1);
		assert_eq!(data[0].horizontal_active_pixels, 1280);
		assert_eq!(data[0].vertical_active_lines, 1280);
		assert_eq!(data[0].aspect_ratio, AspectRatio::Ratio1_1);
		assert_eq!(data[0].refresh_rate, 120);

		for version in [Version::V1_3, Version::V1_4, Version::V2_0] {
			let (_, data) = parse_standard_timings(&d, version).unwrap();
			assert_eq!(data[0].aspect_ratio, AspectRatio::Ratio16_10);
		}
	}

	#[test]
	fn only_both_bytes_mark_a_slot_unused() {
		let d = [
			0x01, 0x40, 0x81, 0x01, 0x00, 0x00, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
			0x01, 0x01,
		];
		let (_, data) = parse_standard_timings(&d, Version::V1_3).unwrap();

		assert_eq!(data.len(), 3);
		assert_eq!(data[0].horizontal_active_pixels, 256);
		assert_eq!(data[0].aspect_ratio, AspectRatio::Ratio4_3);
		assert_eq!(data[1].refresh_rate, 61);
		assert_eq!(data[2].horizontal_active_pixels, 248);
	}
}
