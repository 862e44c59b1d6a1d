//! Vendor and product identification plus the EDID structure version
//! (block bytes 8 to 19).

use std::fmt;

use nom::number::complete::{be_u16, le_u16, le_u32, le_u8};
use nom::sequence::tuple;

use crate::error::{DecodeError, ParseResult};

/// Week and year bytes are offsets from this year.
const YEAR_BASE: u16 = 1990;
const MODEL_YEAR_MARKER: u8 = 0xFF;
const MAX_WEEK: u8 = 54;

/// EDID structure version and revision pairs this decoder accepts.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Version {
	V1_0,
	V1_1,
	V1_2,
	V1_3,
	V1_4,
	V2_0,
}

impl Version {
	pub fn from_raw(version: u8, revision: u8) -> Option<Self> {
		match (version, revision) {
			(1, 0) => Some(Version::V1_0),
			(1, 1) => Some(Version::V1_1),
			(1, 2) => Some(Version::V1_2),
			(1, 3) => Some(Version::V1_3),
			(1, 4) => Some(Version::V1_4),
			(2, 0) => Some(Version::V2_0),
			_ => None,
		}
	}

	pub fn version(self) -> u8 {
		match self {
			Version::V2_0 => 2,
			_ => 1,
		}
	}

	pub fn revision(self) -> u8 {
		match self {
			Version::V1_0 | Version::V2_0 => 0,
			Version::V1_1 => 1,
			Version::V1_2 => 2,
			Version::V1_3 => 3,
			Version::V1_4 => 4,
		}
	}

	/// EDID 1.4 redefines several basic display fields.
	pub fn is_1_4(self) -> bool {
		self == Version::V1_4
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.version(), self.revision())
	}
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ManufactureDate {
	/// Week of manufacture (0 when unspecified) and year of manufacture.
	Week { week: u8, year: u16 },
	/// Week byte 0xFF: only the model year is given.
	ModelYear(u16),
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
	pub vendor: [char; 3],
	pub product: u16,
	pub serial: u32,
	pub date: ManufactureDate,
	pub version: Version,
}

impl Header {
	/// Three-letter PNP manufacturer ID, e.g. "TSB".
	pub fn manufacturer(&self) -> String {
		self.vendor.iter().collect()
	}

	/// Product code as four lowercase hex digits, most significant byte first.
	pub fn product_code(&self) -> String {
		format!("{:04x}", self.product)
	}

	pub fn week(&self) -> Option<u8> {
		match self.date {
			ManufactureDate::Week { week, .. } => Some(week),
			ManufactureDate::ModelYear(_) => None,
		}
	}

	pub fn year(&self) -> u16 {
		match self.date {
			ManufactureDate::Week { year, .. } | ManufactureDate::ModelYear(year) => year,
		}
	}
}

fn parse_vendor(v: u16) -> [char; 3] {
	let mask: u8 = 0x1F; // Each letter is 5 bits
	let i0 = b'A' - 1; // 0x01 = A
	[
		(((v >> 10) as u8 & mask) + i0) as char,
		(((v >> 5) as u8 & mask) + i0) as char,
		((v as u8 & mask) + i0) as char,
	]
}

fn parse_date(week: u8, year: u8) -> Result<ManufactureDate, DecodeError> {
	let year = YEAR_BASE + u16::from(year);
	match week {
		MODEL_YEAR_MARKER => Ok(ManufactureDate::ModelYear(year)),
		0..=MAX_WEEK => Ok(ManufactureDate::Week { week, year }),
		_ => Err(DecodeError::InvalidWeekOfManufacture(week)),
	}
}

pub(crate) fn parse_header(input: &[u8]) -> ParseResult<'_, Header> {
	let (input, (vendor, product, serial, week, year, version, revision)) = tuple((
		be_u16, // Big-endian u16 for vendor
		le_u16, // Little-endian u16 for product
		le_u32, // Little-endian u32 for serial
		le_u8,  // week
		le_u8,  // year
		le_u8,  // version
		le_u8,  // revision
	))(input)?;

	if vendor & 0x8000 != 0 {
		return Err(nom::Err::Failure(DecodeError::InvalidManufacturerName {
			byte: (vendor >> 8) as u8,
		}));
	}

	let date = parse_date(week, year).map_err(nom::Err::Failure)?;
	let version = Version::from_raw(version, revision).ok_or(nom::Err::Failure(
		DecodeError::InvalidVersion { version, revision },
	))?;

	Ok((
		input,
		Header {
			vendor: parse_vendor(vendor),
			product,
			serial,
			date,
			version,
		},
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	const TOSHIBA: [u8; 12] = [
		0x52, 0x62, 0x06, 0x02, 0x01, 0x01, 0x01, 0x01, 0xFF, 0x13, 0x01, 0x03,
	];

	#[test]
	fn test_header() {
		let (remaining, header) = parse_header(&TOSHIBA).unwrap();

		assert!(remaining.is_empty());
		assert_eq!(header.manufacturer(), "TSB");
		assert_eq!(header.product_code(), "0206");
		assert_eq!(header.serial, 16843009);
		assert_eq!(header.date, ManufactureDate::ModelYear(2009));
		assert_eq!(header.week(), None);
		assert_eq!(header.year(), 2009);
		assert_eq!(header.version.version(), 1);
		assert_eq!(header.version.revision(), 3);
	}

	#[test]
	fn week_and_year_of_manufacture() {
		let mut d = TOSHIBA;
		d[8] = 54;
		let (_, header) = parse_header(&d).unwrap();
		assert_eq!(header.date, ManufactureDate::Week { week: 54, year: 2009 });
		assert_eq!(header.week(), Some(54));

		d[8] = 0;
		let (_, header) = parse_header(&d).unwrap();
		assert_eq!(header.week(), Some(0));
	}

	#[test]
	fn invalid_manufacturer_name() {
		let mut d = TOSHIBA;
		d[0] = 0xD2;
		assert_eq!(
			parse_header(&d),
			Err(nom::Err::Failure(DecodeError::InvalidManufacturerName {
				byte: 0xD2
			}))
		);
	}

	#[test]
	fn invalid_week_of_manufacture() {
		let mut d = TOSHIBA;
		for week in [0x37, 0x38, 0xFE] {
			d[8] = week;
			assert_eq!(
				parse_header(&d),
				Err(nom::Err::Failure(DecodeError::InvalidWeekOfManufacture(week)))
			);
		}
	}

	#[test]
	fn invalid_version() {
		let mut d = TOSHIBA;
		d[10] = 0x02;
		assert_eq!(
			parse_header(&d),
			Err(nom::Err::Failure(DecodeError::InvalidVersion {
				version: 2,
				revision: 3
			}))
		);
	}

	#[test]
	fn supported_versions() {
		let pairs = [(1, 0), (1, 1), (1, 2), (1, 3), (1, 4), (2, 0)];
		for (version, revision) in pairs {
			let v = Version::from_raw(version, revision).unwrap();
			assert_eq!((v.version(), v.revision()), (version, revision));
		}
		assert_eq!(Version::from_raw(1, 5), None);
		assert_eq!(Version::from_raw(0, 0), None);
		assert_eq!(Version::V1_4.to_string(), "1.4");
	}
}
