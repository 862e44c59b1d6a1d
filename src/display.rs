//! Basic display parameters and features (block bytes 20 to 24).

use log::warn;
use nom::combinator::map;
use nom::number::complete::le_u8;
use nom::sequence::tuple;

use crate::error::ParseResult;
use crate::header::Version;

#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasicDisplayParameters {
	pub video_input: VideoInput,
	pub screen_size: ScreenSize,
	/// `None` when the gamma byte is 0xFF (gamma defined elsewhere).
	pub gamma: Option<f64>,
	pub features: FeatureSupport,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VideoInput {
	Analog {
		signal_level_standard: SignalLevelStandard,
		blank_to_black_setup: bool,
		separate_syncs: bool,
		composite_sync: bool,
		sync_on_green: bool,
		vsync_serration: bool,
	},
	Digital(DigitalInput),
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DigitalInput {
	/// EDID 1.4 video input definition.
	Interface {
		color_bit_depth: ColorBitDepth,
		interface: DigitalVideoInterface,
		color_encodings: ColorEncodings,
	},
	/// Earlier structures only define the DFP 1.x compatibility bit.
	Legacy { dfp_1x_compatible: bool },
}

/// Video white and sync levels, relative to blank.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalLevelStandard {
	Level0700_0300,
	Level0714_0286,
	Level1000_0400,
	Level0700_0000,
}

impl SignalLevelStandard {
	fn from_bits(bits: u8) -> Self {
		match bits & 0b11 {
			0b00 => SignalLevelStandard::Level0700_0300,
			0b01 => SignalLevelStandard::Level0714_0286,
			0b10 => SignalLevelStandard::Level1000_0400,
			_ => SignalLevelStandard::Level0700_0000,
		}
	}

	/// (video, sync) levels in volts.
	pub fn levels(self) -> (f32, f32) {
		match self {
			SignalLevelStandard::Level0700_0300 => (0.700, 0.300),
			SignalLevelStandard::Level0714_0286 => (0.714, 0.286),
			SignalLevelStandard::Level1000_0400 => (1.000, 0.400),
			SignalLevelStandard::Level0700_0000 => (0.700, 0.000),
		}
	}
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorBitDepth {
	Undefined,
	Depth6,
	Depth8,
	Depth10,
	Depth12,
	Depth14,
	Depth16,
}

impl ColorBitDepth {
	fn from_bits(bits: u8) -> Self {
		match bits {
			0b000 => ColorBitDepth::Undefined,
			0b001 => ColorBitDepth::Depth6,
			0b010 => ColorBitDepth::Depth8,
			0b011 => ColorBitDepth::Depth10,
			0b100 => ColorBitDepth::Depth12,
			0b101 => ColorBitDepth::Depth14,
			0b110 => ColorBitDepth::Depth16,
			reserved => {
				warn!("reserved color bit depth code {:#05b}, treating as undefined", reserved);
				ColorBitDepth::Undefined
			}
		}
	}

	pub fn bits_per_primary(self) -> Option<u8> {
		match self {
			ColorBitDepth::Undefined => None,
			ColorBitDepth::Depth6 => Some(6),
			ColorBitDepth::Depth8 => Some(8),
			ColorBitDepth::Depth10 => Some(10),
			ColorBitDepth::Depth12 => Some(12),
			ColorBitDepth::Depth14 => Some(14),
			ColorBitDepth::Depth16 => Some(16),
		}
	}
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DigitalVideoInterface {
	Undefined,
	Dvi,
	HdmiA,
	HdmiB,
	Mddi,
	DisplayPort,
}

impl DigitalVideoInterface {
	fn from_bits(bits: u8) -> Self {
		match bits {
			0b0000 => DigitalVideoInterface::Undefined,
			0b0001 => DigitalVideoInterface::Dvi,
			0b0010 => DigitalVideoInterface::HdmiA,
			0b0011 => DigitalVideoInterface::HdmiB,
			0b0100 => DigitalVideoInterface::Mddi,
			0b0101 => DigitalVideoInterface::DisplayPort,
			reserved => {
				warn!("reserved digital interface code {:#06b}, treating as undefined", reserved);
				DigitalVideoInterface::Undefined
			}
		}
	}
}

/// Color encoding formats of an EDID 1.4 digital display.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorEncodings {
	/// Always supported.
	pub rgb444: bool,
	pub ycrcb444: bool,
	pub ycrcb422: bool,
}

#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScreenSize {
	/// EDID 1.4, both bytes zero: size unknown or variable.
	Undefined,
	/// EDID 1.4, one byte zero: width/height ratio, rounded to 2 decimals.
	AspectRatio(f64),
	/// EDID 1.4 screen size in cm.
	Size { horizontal_cm: u8, vertical_cm: u8 },
	/// Pre-1.4 maximum image size in cm. Zero means indeterminate.
	MaxImageSize { horizontal_cm: u8, vertical_cm: u8 },
}

impl ScreenSize {
	fn from_bytes(horizontal: u8, vertical: u8, version: Version) -> Self {
		if !version.is_1_4() {
			return ScreenSize::MaxImageSize {
				horizontal_cm: horizontal,
				vertical_cm: vertical,
			};
		}

		match (horizontal, vertical) {
			(0, 0) => ScreenSize::Undefined,
			// Portrait
			(0, v) => ScreenSize::AspectRatio(round_to(100.0 / (f64::from(v) + 99.0), 100.0)),
			// Landscape
			(h, 0) => ScreenSize::AspectRatio(round_to((f64::from(h) + 99.0) / 100.0, 100.0)),
			(h, v) => ScreenSize::Size {
				horizontal_cm: h,
				vertical_cm: v,
			},
		}
	}
}

fn round_to(value: f64, scale: f64) -> f64 {
	(value * scale).round() / scale
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayType {
	Monochrome,
	Rgb,
	NonRgb,
	Undefined,
}

impl DisplayType {
	fn from_bits(bits: u8) -> Self {
		match bits & 0b11 {
			0b00 => DisplayType::Monochrome,
			0b01 => DisplayType::Rgb,
			0b10 => DisplayType::NonRgb,
			_ => DisplayType::Undefined,
		}
	}
}

/// Meaning of feature bit 0, which changed in EDID 1.4.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrequencyMode {
	ContinuousFrequency(bool),
	DefaultGtf(bool),
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureSupport {
	pub standby: bool,
	pub suspend: bool,
	pub active_off: bool,
	pub standard_srgb: bool,
	pub preferred_timing_mode: bool,
	pub frequency_mode: FrequencyMode,
	/// Absent for EDID 1.4 digital inputs, where bits 4-3 are color encodings.
	pub display_type: Option<DisplayType>,
}

fn bit(byte: u8, n: u8) -> bool {
	byte & (1 << n) != 0
}

fn decode_video_input(video_input: u8, features: u8, version: Version) -> VideoInput {
	if !bit(video_input, 7) {
		return VideoInput::Analog {
			signal_level_standard: SignalLevelStandard::from_bits(video_input >> 5),
			blank_to_black_setup: bit(video_input, 4),
			separate_syncs: bit(video_input, 3),
			composite_sync: bit(video_input, 2),
			sync_on_green: bit(video_input, 1),
			vsync_serration: bit(video_input, 0),
		};
	}

	let digital = if version.is_1_4() {
		DigitalInput::Interface {
			color_bit_depth: ColorBitDepth::from_bits((video_input >> 4) & 0b111),
			interface: DigitalVideoInterface::from_bits(video_input & 0b1111),
			color_encodings: ColorEncodings {
				rgb444: true,
				ycrcb444: bit(features, 3),
				ycrcb422: bit(features, 4),
			},
		}
	} else {
		DigitalInput::Legacy {
			dfp_1x_compatible: bit(video_input, 0),
		}
	};
	VideoInput::Digital(digital)
}

fn decode_features(features: u8, analog: bool, version: Version) -> FeatureSupport {
	let frequency_mode = if version.is_1_4() {
		FrequencyMode::ContinuousFrequency(bit(features, 0))
	} else {
		FrequencyMode::DefaultGtf(bit(features, 0))
	};
	let display_type = if version < Version::V1_4 || analog {
		Some(DisplayType::from_bits(features >> 3))
	} else {
		None
	};

	FeatureSupport {
		standby: bit(features, 7),
		suspend: bit(features, 6),
		active_off: bit(features, 5),
		standard_srgb: bit(features, 2),
		preferred_timing_mode: bit(features, 1),
		frequency_mode,
		display_type,
	}
}

pub(crate) fn parse_basic_display(
	input: &[u8],
	version: Version,
) -> ParseResult<'_, BasicDisplayParameters> {
	map(
		tuple((
			le_u8, // Video input definition
			le_u8, // Horizontal size or aspect ratio
			le_u8, // Vertical size or aspect ratio
			le_u8, // Gamma
			le_u8, // Features
		)),
		|(video_input, horizontal, vertical, gamma, features)| {
			let video_input = decode_video_input(video_input, features, version);
			let analog = matches!(video_input, VideoInput::Analog { .. });
			BasicDisplayParameters {
				video_input,
				screen_size: ScreenSize::from_bytes(horizontal, vertical, version),
				gamma: match gamma {
					0xFF => None,
					g => Some(f64::from(u16::from(g) + 100) / 100.0),
				},
				features: decode_features(features, analog, version),
			}
		},
	)(input)
}
