use super::schema::RawTonieHeader;
use super::{HEADER_LENGTH, LENGTH_PREFIX_SIZE, TonieHeader};
use crate::error::{HeaderDecodeError, HeaderDecodeErrorKind, Result};
use crate::macros::header_err;
use crate::util::io::SeekStreamLen;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use prost::Message;

/// Read the header region of a TAF file
///
/// This will seek to the start of the reader, and leave the reader at the end of the
/// structured metadata. It returns the header length from the length prefix, and the decoded header.
///
/// A header length other than the conforming 4092 bytes is logged, but accepted. The audio
/// region is expected at byte 4096 regardless.
///
/// # Errors
///
/// * The reader is too small to contain a length prefix
/// * The length prefix points past the end of the reader
/// * The metadata can't be decoded
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
///
/// # fn main() -> taf::error::Result<()> {
/// let mut file = File::open("story.taf")?;
/// let (header_len, header) = taf::header::read_header(&mut file)?;
///
/// println!("{header_len} byte header with {} chapters", header.chapter_count());
/// # Ok(()) }
/// ```
pub fn read_header<R>(reader: &mut R) -> Result<(u32, TonieHeader)>
where
	R: Read + Seek,
{
	reader.seek(SeekFrom::Start(0))?;
	let file_len = reader.stream_len_hack()?;

	if file_len < LENGTH_PREFIX_SIZE {
		header_err!(@BAIL FileTooSmall, 0, None, file_len);
	}

	let header_len = reader.read_u32::<BigEndian>()?;
	let available = file_len - LENGTH_PREFIX_SIZE;

	if u64::from(header_len) > available {
		header_err!(@BAIL LengthOutOfBounds, LENGTH_PREFIX_SIZE, Some(header_len), available);
	}

	if header_len != HEADER_LENGTH {
		log::warn!("TAF header: Expected a header length of {HEADER_LENGTH}, found {header_len}");
	}

	let mut metadata = vec![0; header_len as usize];
	reader.read_exact(&mut metadata)?;

	let raw = decode_metadata(&metadata).map_err(|e| {
		HeaderDecodeError::new(
			HeaderDecodeErrorKind::Malformed(e),
			LENGTH_PREFIX_SIZE,
			Some(header_len),
			available,
		)
	})?;

	Ok((header_len, TonieHeader::from(raw)))
}

fn decode_metadata(metadata: &[u8]) -> std::result::Result<RawTonieHeader, prost::DecodeError> {
	let err = match RawTonieHeader::decode(metadata) {
		Ok(raw) => return Ok(raw),
		Err(err) => err,
	};

	// Some writers zero-fill the region after the last field, which isn't valid protobuf
	let trimmed_len = metadata.len() - metadata.iter().rev().take_while(|&&b| b == 0).count();
	if trimmed_len == metadata.len() {
		return Err(err);
	}

	log::debug!(
		"TAF header: Retrying decode without up to {} trailing zero bytes",
		metadata.len() - trimmed_len
	);

	// The zero run can end inside the last field (an all-zero padding field followed by fill),
	// so every cut point within it has to be tried, shortest first
	(trimmed_len..metadata.len())
		.find_map(|len| RawTonieHeader::decode(&metadata[..len]).ok())
		.ok_or(err)
}
