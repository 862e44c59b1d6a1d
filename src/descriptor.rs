//! The four 18-byte descriptor slots (block bytes 54 to 125): detailed
//! timings and monitor descriptors.

use log::{debug, warn};
use nom::bytes::complete::take;
use nom::combinator::{map, peek};
use nom::number::complete::{le_u16, le_u8};
use nom::sequence::tuple;

use crate::cp437;
use crate::detailed_timing::{parse_detailed_timing, DetailedTiming};
use crate::error::ParseResult;

pub const DESCRIPTOR_SLOTS: usize = 4;
const DESCRIPTOR_TEXT_LEN: usize = 13;
const TEXT_TERMINATOR: u8 = 0x0A;

const TAG_SERIAL_NUMBER: u8 = 0xFF;
const TAG_DATA_STRING: u8 = 0xFE;
const TAG_RANGE_LIMITS: u8 = 0xFD;
const TAG_PRODUCT_NAME: u8 = 0xFC;
const TAG_COLOR_POINT: u8 = 0xFB;
const TAG_STANDARD_TIMING: u8 = 0xFA;
const TAG_DUMMY: u8 = 0x10;

const CURVE_SECONDARY_GTF: u8 = 0x02;
const CURVE_CVT: u8 = 0x04;

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Descriptor {
	DetailedTiming(DetailedTiming),
	SerialNumber(String),
	DataString(String),
	RangeLimits(RangeLimits),
	ProductName(String),
	/// Present but not decoded.
	AdditionalColorPoint,
	/// Present but not decoded.
	AdditionalStandardTiming,
	Dummy,
	Unknown { tag: u8, data: [u8; 13] },
}

#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeLimits {
	/// Hz
	pub min_vertical_rate: u8,
	/// Hz
	pub max_vertical_rate: u8,
	/// kHz
	pub min_horizontal_rate: u8,
	/// kHz
	pub max_horizontal_rate: u8,
	/// MHz, refined in 0.25 MHz steps when CVT is supported.
	pub max_pixel_clock: f64,
	pub secondary_curve: SecondaryCurve,
}

#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SecondaryCurve {
	None,
	Gtf(SecondaryGtf),
	Cvt(CvtSupport),
}

/// Secondary GTF curve coefficients.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecondaryGtf {
	/// kHz
	pub start_frequency: u16,
	pub c: f64,
	pub m: u16,
	pub k: u8,
	pub j: f64,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CvtAspectRatio {
	Ratio4_3,
	Ratio16_9,
	Ratio16_10,
	Ratio5_4,
	Ratio15_9,
}

impl CvtAspectRatio {
	fn from_bits(bits: u8) -> Option<Self> {
		match bits {
			0b000 => Some(CvtAspectRatio::Ratio4_3),
			0b001 => Some(CvtAspectRatio::Ratio16_9),
			0b010 => Some(CvtAspectRatio::Ratio16_10),
			0b011 => Some(CvtAspectRatio::Ratio5_4),
			0b100 => Some(CvtAspectRatio::Ratio15_9),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvtAspectRatios {
	pub ratio_4_3: bool,
	pub ratio_16_9: bool,
	pub ratio_16_10: bool,
	pub ratio_5_4: bool,
	pub ratio_15_9: bool,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvtSupport {
	/// (major, minor)
	pub version: (u8, u8),
	/// Zero means no limit.
	pub max_active_pixels: u16,
	pub supported_aspect_ratios: CvtAspectRatios,
	/// `None` for a reserved code.
	pub preferred_aspect_ratio: Option<CvtAspectRatio>,
	pub standard_blanking: bool,
	pub reduced_blanking: bool,
	pub horizontal_shrink: bool,
	pub horizontal_stretch: bool,
	pub vertical_shrink: bool,
	pub vertical_stretch: bool,
	/// Hz
	pub preferred_vertical_refresh: u8,
}

fn bit(byte: u8, n: u8) -> bool {
	byte & (1 << n) != 0
}

/// Reads up to 13 bytes of text, stopping at the first line feed.
fn decode_descriptor_text(b: &[u8]) -> String {
	b.iter()
		.take(DESCRIPTOR_TEXT_LEN)
		.take_while(|&&c| c != TEXT_TERMINATOR)
		.map(|&c| cp437::forward(c))
		.collect()
}

fn parse_descriptor_text(input: &[u8]) -> ParseResult<'_, String> {
	map(take(DESCRIPTOR_TEXT_LEN), decode_descriptor_text)(input)
}

fn parse_gtf(curve: [u8; 6]) -> SecondaryGtf {
	let [start, c, m_hi, m_lo, k, j] = curve;
	SecondaryGtf {
		start_frequency: u16::from(start) * 2,
		c: f64::from(c) / 2.0,
		m: (u16::from(m_hi) << 8) | u16::from(m_lo),
		k,
		j: f64::from(j) / 2.0,
	}
}

fn parse_cvt(version: u8, curve: [u8; 6]) -> (CvtSupport, f64) {
	let [precision, pixels_lo, ratios, blanking, scaling, refresh] = curve;
	let preferred_bits = blanking >> 5;
	let preferred_aspect_ratio = CvtAspectRatio::from_bits(preferred_bits);
	if preferred_aspect_ratio.is_none() {
		warn!("reserved CVT preferred aspect ratio code {:#05b}", preferred_bits);
	}

	let cvt = CvtSupport {
		version: (version >> 4, version & 0x0F),
		max_active_pixels: ((u16::from(precision & 0b11) << 8) | u16::from(pixels_lo)) * 8,
		supported_aspect_ratios: CvtAspectRatios {
			ratio_4_3: bit(ratios, 7),
			ratio_16_9: bit(ratios, 6),
			ratio_16_10: bit(ratios, 5),
			ratio_5_4: bit(ratios, 4),
			ratio_15_9: bit(ratios, 3),
		},
		preferred_aspect_ratio,
		standard_blanking: bit(blanking, 3),
		reduced_blanking: bit(blanking, 4),
		horizontal_shrink: bit(scaling, 7),
		horizontal_stretch: bit(scaling, 6),
		vertical_shrink: bit(scaling, 5),
		vertical_stretch: bit(scaling, 4),
		preferred_vertical_refresh: refresh,
	};
	(cvt, f64::from(precision >> 2) * 0.25)
}

fn parse_range_limits(input: &[u8]) -> ParseResult<'_, RangeLimits> {
	map(
		tuple((
			le_u8, // min vertical rate
			le_u8, // max vertical rate
			le_u8, // min horizontal rate
			le_u8, // max horizontal rate
			le_u8, // max pixel clock / 10 MHz
			le_u8, // secondary curve tag
			le_u8, // reserved, or CVT version
			tuple((le_u8, le_u8, le_u8, le_u8, le_u8, le_u8)),
		)),
		|(min_v, max_v, min_h, max_h, clock, curve_tag, cvt_version, (b7, b8, b9, b10, b11, b12))| {
			let curve = [b7, b8, b9, b10, b11, b12];
			let mut max_pixel_clock = f64::from(clock) * 10.0;
			let secondary_curve = match curve_tag {
				CURVE_SECONDARY_GTF => SecondaryCurve::Gtf(parse_gtf(curve)),
				CURVE_CVT => {
					let (cvt, refinement) = parse_cvt(cvt_version, curve);
					max_pixel_clock -= refinement;
					SecondaryCurve::Cvt(cvt)
				}
				_ => SecondaryCurve::None,
			};
			RangeLimits {
				min_vertical_rate: min_v,
				max_vertical_rate: max_v,
				min_horizontal_rate: min_h,
				max_horizontal_rate: max_h,
				max_pixel_clock,
				secondary_curve,
			}
		},
	)(input)
}

fn parse_monitor_descriptor(input: &[u8]) -> ParseResult<'_, Descriptor> {
	let (input, (_, tag, _)) = tuple((take(3_usize), le_u8, le_u8))(input)?;

	match tag {
		TAG_SERIAL_NUMBER => map(parse_descriptor_text, Descriptor::SerialNumber)(input),
		TAG_DATA_STRING => map(parse_descriptor_text, Descriptor::DataString)(input),
		TAG_RANGE_LIMITS => map(parse_range_limits, Descriptor::RangeLimits)(input),
		TAG_PRODUCT_NAME => map(parse_descriptor_text, Descriptor::ProductName)(input),
		TAG_COLOR_POINT | TAG_STANDARD_TIMING | TAG_DUMMY => {
			let (input, _) = take(DESCRIPTOR_TEXT_LEN)(input)?;
			let descriptor = match tag {
				TAG_COLOR_POINT => Descriptor::AdditionalColorPoint,
				TAG_STANDARD_TIMING => Descriptor::AdditionalStandardTiming,
				_ => Descriptor::Dummy,
			};
			debug!("monitor descriptor {:#04x} recorded without decoding", tag);
			Ok((input, descriptor))
		}
		_ => {
			let (input, payload) = take(DESCRIPTOR_TEXT_LEN)(input)?;
			let mut data = [0; DESCRIPTOR_TEXT_LEN];
			data.copy_from_slice(payload);
			debug!("unknown monitor descriptor tag {:#04x}", tag);
			Ok((input, Descriptor::Unknown { tag, data }))
		}
	}
}

/// A slot whose first two bytes are zero (a zero pixel clock) holds a monitor
/// descriptor; anything else is a detailed timing.
pub(crate) fn parse_descriptor(input: &[u8]) -> ParseResult<'_, Descriptor> {
	let (input, pixel_clock) = peek(le_u16)(input)?;

	match pixel_clock {
		0 => parse_monitor_descriptor(input),
		_ => map(parse_detailed_timing, Descriptor::DetailedTiming)(input),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use nom::multi::count;

	fn parse_all(d: &[u8]) -> Vec<Descriptor> {
		let (remaining, descriptors) = count(parse_descriptor, DESCRIPTOR_SLOTS)(d).unwrap();
		assert!(remaining.is_empty());
		descriptors
	}

	fn range_limits(payload: [u8; 13]) -> RangeLimits {
		let (remaining, limits) = parse_range_limits(&payload).unwrap();
		assert!(remaining.is_empty());
		limits
	}

	#[test]
	fn test_descriptors() {
		let d = [
			0x02, 0x3A, 0x80, 0x18, 0x71, 0x38, 0x2D, 0x40, 0x58, 0x2C, 0x45, 0x00, 0x76, 0xF2,
			0x31, 0x00, 0x00, 0x1E, //
			0x66, 0x21, 0x50, 0xB0, 0x51, 0x00, 0x1B, 0x30, 0x40, 0x70, 0x36, 0x00, 0x76, 0xF2,
			0x31, 0x00, 0x00, 0x1E, //
			0x00, 0x00, 0x00, 0xFC, 0x00, 0x54, 0x4F, 0x53, 0x48, 0x49, 0x42, 0x41, 0x2D, 0x54,
			0x56, 0x0A, 0x20, 0x20, //
			0x00, 0x00, 0x00, 0xFD, 0x00, 0x17, 0x3D, 0x0F, 0x44, 0x0F, 0x00, 0x0A, 0x20, 0x20,
			0x20, 0x20, 0x20, 0x20,
		];
		let descriptors = parse_all(&d);

		assert!(matches!(descriptors[0], Descriptor::DetailedTiming(_)));
		assert!(matches!(descriptors[1], Descriptor::DetailedTiming(_)));
		assert_eq!(descriptors[2], Descriptor::ProductName("TOSHIBA-TV".to_string()));
		assert!(matches!(
			descriptors[3],
			Descriptor::RangeLimits(RangeLimits {
				secondary_curve: SecondaryCurve::None,
				..
			})
		));
	}

	#[test]
	fn unsupported_descriptors_are_recorded() {
		let mut d = vec![];
		for tag in [0xFF, 0xFE, 0xFB, 0xFA] {
			d.extend_from_slice(&[0x00, 0x00, 0x00, tag, 0x00]);
			d.extend_from_slice(&[0xFF; 13]);
		}
		let descriptors = parse_all(&d);

		assert_eq!(
			descriptors,
			vec![
				Descriptor::SerialNumber("\u{A0}".repeat(13)),
				Descriptor::DataString("\u{A0}".repeat(13)),
				Descriptor::AdditionalColorPoint,
				Descriptor::AdditionalStandardTiming,
			]
		);
	}

	#[test]
	fn third_byte_does_not_make_a_timing() {
		let mut d = vec![0x00, 0x00, 0x01, 0xFC, 0x00];
		d.extend_from_slice(b"Panel\n       ");
		let (_, descriptor) = parse_descriptor(&d).unwrap();
		assert_eq!(descriptor, Descriptor::ProductName("Panel".to_string()));
	}

	#[test]
	fn dummy_and_unknown_descriptors() {
		let mut d = vec![0x00, 0x00, 0x00, 0x10, 0x00];
		d.extend_from_slice(&[0; 13]);
		d.extend_from_slice(&[0x00, 0x00, 0x00, 0x02, 0x00]);
		d.extend_from_slice(&[2, 65, 3, 40, 0, 18, 0, 0, 11, 1, 10, 32, 32]);

		let (rest, dummy) = parse_descriptor(&d).unwrap();
		let (rest, unknown) = parse_descriptor(rest).unwrap();

		assert!(rest.is_empty());
		assert_eq!(dummy, Descriptor::Dummy);
		assert_eq!(
			unknown,
			Descriptor::Unknown {
				tag: 0x02,
				data: [2, 65, 3, 40, 0, 18, 0, 0, 11, 1, 10, 32, 32],
			}
		);
	}

	#[test]
	fn test_monitor_descriptor_text() {
		let d = [
			0x54, 0x4F, 0x53, 0x48, 0x49, 0x42, 0x41, 0x2D, 0x54, 0x56, 0x0A, 0x20, 0x20,
		];
		assert_eq!(decode_descriptor_text(&d), "TOSHIBA-TV");

		// No terminator: all 13 bytes, trailing spaces included
		assert_eq!(decode_descriptor_text(b"DELL U2415   "), "DELL U2415   ");
		assert_eq!(decode_descriptor_text(b"\nignored     "), "");
	}

	#[test]
	fn range_limits_without_secondary_curve() {
		let data = range_limits([
			0x17, 0x3D, 0x0F, 0x44, 0x0F, 0x00, 0x0A, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
		]);

		assert_eq!(data.min_vertical_rate, 23);
		assert_eq!(data.max_vertical_rate, 61);
		assert_eq!(data.min_horizontal_rate, 15);
		assert_eq!(data.max_horizontal_rate, 68);
		assert_eq!(data.max_pixel_clock, 150.0);
		assert_eq!(data.secondary_curve, SecondaryCurve::None);
	}

	#[test]
	fn range_limits_secondary_gtf() {
		let data = range_limits([
			0x3D, 0x17, 0x44, 0x0F, 0x44, 0x02, 0x0A, 0x55, 0x08, 0x80, 0xCB, 0xBC, 0xAD,
		]);

		assert_eq!(data.min_vertical_rate, 61);
		assert_eq!(data.max_vertical_rate, 23);
		assert_eq!(data.min_horizontal_rate, 68);
		assert_eq!(data.max_horizontal_rate, 15);
		assert_eq!(data.max_pixel_clock, 680.0);
		assert_eq!(
			data.secondary_curve,
			SecondaryCurve::Gtf(SecondaryGtf {
				start_frequency: 170,
				c: 4.0,
				m: 32971,
				k: 188,
				j: 86.5,
			})
		);
	}

	#[test]
	fn range_limits_cvt() {
		let data = range_limits([
			0x30, 0x55, 0x1E, 0x5D, 0x11, 0x04, 0x11, 0x50, 0xD2, 0xF8, 0x58, 0xF0, 0x00,
		]);

		assert_eq!(data.min_vertical_rate, 48);
		assert_eq!(data.max_vertical_rate, 85);
		assert_eq!(data.min_horizontal_rate, 30);
		assert_eq!(data.max_horizontal_rate, 93);
		assert_eq!(data.max_pixel_clock, 165.0);
		assert_eq!(
			data.secondary_curve,
			SecondaryCurve::Cvt(CvtSupport {
				version: (1, 1),
				max_active_pixels: 1680,
				supported_aspect_ratios: CvtAspectRatios {
					ratio_4_3: true,
					ratio_16_9: true,
					ratio_16_10: true,
					ratio_5_4: true,
					ratio_15_9: true,
				},
				preferred_aspect_ratio: Some(CvtAspectRatio::Ratio16_10),
				standard_blanking: true,
				reduced_blanking: true,
				horizontal_shrink: true,
				horizontal_stretch: true,
				vertical_shrink: true,
				vertical_stretch: true,
				preferred_vertical_refresh: 0,
			})
		);
	}

	#[test]
	fn cvt_reserved_preferred_ratio() {
		let data = range_limits([
			0x30, 0x55, 0x1E, 0x5D, 0x11, 0x04, 0x11, 0x03, 0xD2, 0x00, 0b1110_0000, 0x00, 60,
		]);

		match data.secondary_curve {
			SecondaryCurve::Cvt(cvt) => {
				assert_eq!(cvt.preferred_aspect_ratio, None);
				assert_eq!(cvt.max_active_pixels, 0x3D2 * 8);
				assert!(!cvt.reduced_blanking);
				assert_eq!(cvt.preferred_vertical_refresh, 60);
			}
			other => panic!("expected CVT support, got {:?}", other),
		}
		assert_eq!(data.max_pixel_clock, 170.0);
	}
}
