//! Color characteristics (block bytes 25 to 34).

use nom::combinator::map;
use nom::number::complete::le_u8;
use nom::sequence::tuple;

use crate::error::ParseResult;

/// CIE 1931 xy coordinate.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChromaticityPoint {
	pub x: f64,
	pub y: f64,
}

#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromaticity {
	pub red: ChromaticityPoint,
	pub green: ChromaticityPoint,
	pub blue: ChromaticityPoint,
	pub white: ChromaticityPoint,
}

/// Combines the 8 high bits and 2 low bits of a coordinate into a fraction
/// of 1024, rounded to 3 decimals.
pub fn calculate_chromaticity(high: u8, low: u8) -> f64 {
	let value = (u32::from(high) << 2) + u32::from(low & 0b11);
	(f64::from(value) * 1000.0 / 1024.0).round() / 1000.0
}

fn point(high_x: u8, low_x: u8, high_y: u8, low_y: u8) -> ChromaticityPoint {
	ChromaticityPoint {
		x: calculate_chromaticity(high_x, low_x),
		y: calculate_chromaticity(high_y, low_y),
	}
}

pub(crate) fn parse_chromaticity(input: &[u8]) -> ParseResult<'_, Chromaticity> {
	map(
		tuple((
			le_u8, // red/green low bits
			le_u8, // blue/white low bits
			le_u8, le_u8, le_u8, le_u8, le_u8, le_u8, le_u8, le_u8,
		)),
		|(rg_low, bw_low, red_x, red_y, green_x, green_y, blue_x, blue_y, white_x, white_y)| {
			Chromaticity {
				red: point(red_x, rg_low >> 6, red_y, rg_low >> 4),
				green: point(green_x, rg_low >> 2, green_y, rg_low),
				blue: point(blue_x, bw_low >> 6, blue_y, bw_low >> 4),
				white: point(white_x, bw_low >> 2, white_y, bw_low),
			}
		},
	)(input)
}
