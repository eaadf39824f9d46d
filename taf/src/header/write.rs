use super::schema::RawTonieHeader;
use super::{HEADER_LENGTH, HEADER_REGION_SIZE, TonieHeader};
use crate::error::Result;
use crate::macros::err;

use std::io::{Seek, SeekFrom, Write};

use byteorder::{BigEndian, WriteBytesExt};
use prost::Message;
use prost::encoding::encoded_len_varint;

/// Write a header region to the start of `writer`
///
/// Exactly 4096 bytes are written, so the header can be rewritten in place without
/// disturbing the audio region that follows it.
///
/// # Errors
///
/// * The encoded header doesn't fit in the header region, see [`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData)
/// * [`std::io::Error`]
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::OpenOptions;
///
/// # fn main() -> taf::error::Result<()> {
/// let mut file = OpenOptions::new().read(true).write(true).open("story.taf")?;
///
/// let (_, mut header) = taf::header::read_header(&mut file)?;
/// header.timestamp = 1_700_000_000;
///
/// taf::header::write_header(&mut file, &header)?;
/// # Ok(()) }
/// ```
pub fn write_header<W>(writer: &mut W, header: &TonieHeader) -> Result<()>
where
	W: Write + Seek,
{
	let region = header.as_bytes()?;

	writer.seek(SeekFrom::Start(0))?;
	writer.write_all(&region)?;

	Ok(())
}

impl TonieHeader {
	/// Encode the header region, including the length prefix
	///
	/// The result is always 4096 bytes long.
	///
	/// # Errors
	///
	/// The encoded header doesn't fit in the header region, see [`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData)
	pub fn as_bytes(&self) -> Result<Vec<u8>> {
		let metadata = encode_metadata(self)?;

		let mut region = Vec::with_capacity(HEADER_REGION_SIZE as usize);
		region.write_u32::<BigEndian>(HEADER_LENGTH)?;
		region.extend(metadata);

		debug_assert_eq!(region.len() as u64, HEADER_REGION_SIZE);
		Ok(region)
	}
}

fn encode_metadata(header: &TonieHeader) -> Result<Vec<u8>> {
	let mut raw = RawTonieHeader::from(header);

	let header_length = HEADER_LENGTH as usize;
	let unpadded_len = raw.encoded_len();
	if unpadded_len > header_length {
		err!(TooMuchData);
	}

	raw.padding = vec![0; padding_len(header_length - unpadded_len)];

	let mut metadata = raw.encode_to_vec();
	if metadata.len() < header_length {
		log::debug!(
			"TAF header: No exact padding field fits, zero-filling {} bytes",
			header_length - metadata.len()
		);
	}

	metadata.resize(header_length, 0);
	Ok(metadata)
}

// The padding field costs a 1 byte key and a varint length on top of its content
fn padding_len(available: usize) -> usize {
	let mut len = available.saturating_sub(2);
	while len > 0 && 1 + encoded_len_varint(len as u64) + len > available {
		len -= 1;
	}

	len
}
