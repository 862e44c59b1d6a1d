//! 18-byte detailed timing descriptors.

use nom::combinator::map;
use nom::number::complete::{le_u16, le_u8};
use nom::sequence::tuple;

use crate::error::ParseResult;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StereoMode {
	Normal,
	FieldSequentialRight,
	FieldSequentialLeft,
	Interleaved2WayRight,
	Interleaved2WayLeft,
	Interleaved4Way,
	InterleavedSideBySide,
}

/// Decodes flag bits 6, 5 and 0. Bit 0 is ignored when bits 6 and 5 are clear.
pub fn decode_stereo_mode(bit_6: bool, bit_5: bool, bit_0: bool) -> StereoMode {
	match (bit_6, bit_5, bit_0) {
		(false, false, _) => StereoMode::Normal,
		(false, true, false) => StereoMode::FieldSequentialRight,
		(true, false, false) => StereoMode::FieldSequentialLeft,
		(false, true, true) => StereoMode::Interleaved2WayRight,
		(true, false, true) => StereoMode::Interleaved2WayLeft,
		(true, true, false) => StereoMode::Interleaved4Way,
		(true, true, true) => StereoMode::InterleavedSideBySide,
	}
}

/// Sync signal scheme, with the flag bits whose meaning depends on it.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncScheme {
	AnalogComposite { serrate: bool, sync_on_rgb: bool },
	BipolarAnalogComposite { serrate: bool, sync_on_rgb: bool },
	DigitalComposite { serrate: bool, composite_polarity: bool },
	DigitalSeparate { vertical_polarity: bool, horizontal_polarity: bool },
}

impl SyncScheme {
	fn from_flags(flags: u8) -> Self {
		let bit_2 = flags & 0b100 != 0;
		let bit_1 = flags & 0b010 != 0;
		match (flags >> 3) & 0b11 {
			0b00 => SyncScheme::AnalogComposite {
				serrate: bit_2,
				sync_on_rgb: bit_1,
			},
			0b01 => SyncScheme::BipolarAnalogComposite {
				serrate: bit_2,
				sync_on_rgb: bit_1,
			},
			0b10 => SyncScheme::DigitalComposite {
				serrate: bit_2,
				composite_polarity: bit_1,
			},
			_ => SyncScheme::DigitalSeparate {
				vertical_polarity: bit_2,
				horizontal_polarity: bit_1,
			},
		}
	}

	pub fn serrate(&self) -> Option<bool> {
		match *self {
			SyncScheme::AnalogComposite { serrate, .. }
			| SyncScheme::BipolarAnalogComposite { serrate, .. }
			| SyncScheme::DigitalComposite { serrate, .. } => Some(serrate),
			SyncScheme::DigitalSeparate { .. } => None,
		}
	}

	pub fn sync_on_rgb(&self) -> Option<bool> {
		match *self {
			SyncScheme::AnalogComposite { sync_on_rgb, .. }
			| SyncScheme::BipolarAnalogComposite { sync_on_rgb, .. } => Some(sync_on_rgb),
			_ => None,
		}
	}

	pub fn composite_polarity(&self) -> Option<bool> {
		match *self {
			SyncScheme::DigitalComposite {
				composite_polarity, ..
			} => Some(composite_polarity),
			_ => None,
		}
	}

	pub fn vertical_polarity(&self) -> Option<bool> {
		match *self {
			SyncScheme::DigitalSeparate {
				vertical_polarity, ..
			} => Some(vertical_polarity),
			_ => None,
		}
	}

	pub fn horizontal_polarity(&self) -> Option<bool> {
		match *self {
			SyncScheme::DigitalSeparate {
				horizontal_polarity,
				..
			} => Some(horizontal_polarity),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetailedTiming {
	/// Pixel clock in kHz.
	pub pixel_clock: u32,
	pub horizontal_active_pixels: u16,
	pub horizontal_blanking_pixels: u16,
	pub vertical_active_lines: u16,
	pub vertical_blanking_lines: u16,
	/// Horizontal sync offset
	pub horizontal_front_porch: u16,
	pub horizontal_sync_width: u16,
	/// Vertical sync offset
	pub vertical_front_porch: u16,
	pub vertical_sync_width: u16,
	/// Horizontal size in millimeters
	pub horizontal_size: u16,
	/// Vertical size in millimeters
	pub vertical_size: u16,
	/// Border pixels on one side of screen (i.e. total number is twice this)
	pub horizontal_border_pixels: u8,
	/// Border lines on one side of screen (i.e. total number is twice this)
	pub vertical_border_pixels: u8,
	pub interlaced: bool,
	pub stereo_mode: StereoMode,
	pub sync: SyncScheme,
}

pub(crate) fn parse_detailed_timing(input: &[u8]) -> ParseResult<'_, DetailedTiming> {
	map(
		tuple((
			le_u16, // pixel_clock_10khz
			le_u8,  // horizontal_active_lo
			le_u8,  // horizontal_blanking_lo
			le_u8,  // horizontal_px_hi
			le_u8,  // vertical_active_lo
			le_u8,  // vertical_blanking_lo
			le_u8,  // vertical_px_hi
			le_u8,  // horizontal_front_porch_lo
			le_u8,  // horizontal_sync_width_lo
			le_u8,  // vertical_lo
			le_u8,  // porch_sync_hi
			le_u8,  // horizontal_size_lo
			le_u8,  // vertical_size_lo
			le_u8,  // size_hi
			le_u8,  // horizontal_border
			le_u8,  // vertical_border
			le_u8,  // flags
		)),
		|(
			pixel_clock_10khz,
			horizontal_active_lo,
			horizontal_blanking_lo,
			horizontal_px_hi,
			vertical_active_lo,
			vertical_blanking_lo,
			vertical_px_hi,
			horizontal_front_porch_lo,
			horizontal_sync_width_lo,
			vertical_lo,
			porch_sync_hi,
			horizontal_size_lo,
			vertical_size_lo,
			size_hi,
			horizontal_border,
			vertical_border,
			flags,
		)| DetailedTiming {
			pixel_clock: u32::from(pixel_clock_10khz) * 10,
			horizontal_active_pixels: (horizontal_active_lo as u16)
				| (((horizontal_px_hi >> 4) as u16) << 8),
			horizontal_blanking_pixels: (horizontal_blanking_lo as u16)
				| (((horizontal_px_hi & 0xf) as u16) << 8),
			vertical_active_lines: (vertical_active_lo as u16)
				| (((vertical_px_hi >> 4) as u16) << 8),
			vertical_blanking_lines: (vertical_blanking_lo as u16)
				| (((vertical_px_hi & 0xf) as u16) << 8),
			horizontal_front_porch: (horizontal_front_porch_lo as u16)
				| (((porch_sync_hi >> 6) as u16) << 8),
			horizontal_sync_width: (horizontal_sync_width_lo as u16)
				| ((((porch_sync_hi >> 4) & 0x3) as u16) << 8),
			// 6-bit fields: low nibble from vertical_lo, top 2 bits from porch_sync_hi
			vertical_front_porch: ((vertical_lo >> 4) as u16)
				| ((((porch_sync_hi >> 2) & 0x3) as u16) << 4),
			vertical_sync_width: ((vertical_lo & 0xf) as u16)
				| (((porch_sync_hi & 0x3) as u16) << 4),
			horizontal_size: (horizontal_size_lo as u16) | (((size_hi >> 4) as u16) << 8),
			vertical_size: (vertical_size_lo as u16) | (((size_hi & 0xf) as u16) << 8),
			horizontal_border_pixels: horizontal_border,
			vertical_border_pixels: vertical_border,
			interlaced: flags & 0x80 != 0,
			stereo_mode: decode_stereo_mode(flags & 0x40 != 0, flags & 0x20 != 0, flags & 0x01 != 0),
			sync: SyncScheme::from_flags(flags),
		},
	)(input)
}
