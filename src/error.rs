use nom::error::{ErrorKind, ParseError};
use nom::IResult;
use thiserror::Error;

/// Output of every decoding stage: the unconsumed bytes and the decoded value.
pub type ParseResult<'a, T> = IResult<&'a [u8], T, DecodeError>;

/// Why a block could not be decoded. A failed decode never yields a partial record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
	#[error("EDID data is {length} bytes long, a base block needs 128")]
	TooShort { length: usize },
	#[error("input is not an EDID block (header {found:02X?})")]
	InvalidHeader { found: [u8; 8] },
	#[error("checksum is corrupt, block sums to {sum} mod 256")]
	InvalidChecksum { sum: u8 },
	#[error("ID manufacturer name field is corrupt (first byte 0x{byte:02X})")]
	InvalidManufacturerName { byte: u8 },
	#[error("week of manufacture ({0}) is invalid")]
	InvalidWeekOfManufacture(u8),
	#[error("EDID version and revision {version}.{revision} are invalid")]
	InvalidVersion { version: u8, revision: u8 },
	#[error("parsing EDID data failed: {0:?}")]
	Parse(ErrorKind),
}

impl<I> ParseError<I> for DecodeError {
	fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
		DecodeError::Parse(kind)
	}

	fn append(_input: I, _kind: ErrorKind, other: Self) -> Self {
		other
	}
}
