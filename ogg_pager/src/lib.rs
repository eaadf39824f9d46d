//! A simple OGG page reader

mod crc;
mod error;
mod header;
mod reader;

use std::io::{Read, Seek};

pub use crc::crc32;
pub use error::{PageError, Result};
pub use header::{PAGE_HEADER_SIZE, PageHeader};
pub use reader::PageReader;

/// The maximum number of segments a page can contain
pub const MAX_SEGMENT_COUNT: usize = 255;
/// The packet contains the first page of the logical bitstream
pub const CONTAINS_FIRST_PAGE_OF_BITSTREAM: u8 = 0x02;
/// The packet contains the last page of the logical bitstream
pub const CONTAINS_LAST_PAGE_OF_BITSTREAM: u8 = 0x04;

/// An OGG page
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Page {
	content: Vec<u8>,
	header: PageHeader,
	/// The position in the stream the page ended
	pub end: u64,
}

impl Page {
	/// Create a new `Page`
	///
	/// The page will hold a single packet, and have the following defaults:
	///
	/// * `checksum` = 0
	/// * `start` = 0
	/// * `end` = the size of the page on disk
	///
	/// # Errors
	///
	/// See [`segment_table`]
	///
	/// # Example
	///
	/// ```rust
	/// use ogg_pager::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, Page};
	///
	/// # fn main() -> ogg_pager::Result<()> {
	/// let ident_header_packet = b"OpusHead\x01\x02\x38\x01\x80\xBB\0\0\0\0\0".to_vec();
	/// let stream_serial_number = 2784419176;
	///
	/// let mut page = Page::new(
	/// 	CONTAINS_FIRST_PAGE_OF_BITSTREAM,
	/// 	0,
	/// 	stream_serial_number,
	/// 	0,
	/// 	ident_header_packet,
	/// )?;
	/// page.gen_crc();
	///
	/// assert!(page.verify_crc());
	/// # Ok(()) }
	/// ```
	pub fn new(
		header_type_flag: u8,
		abgp: u64,
		stream_serial: u32,
		sequence_number: u32,
		content: Vec<u8>,
	) -> Result<Self> {
		let mut header = PageHeader::new(header_type_flag, abgp, stream_serial, sequence_number);
		header.segments = segment_table(content.len())?;

		let end = header.size() + content.len() as u64;

		Ok(Self {
			content,
			header,
			end,
		})
	}

	/// Convert the Page to Vec<u8> for writing
	///
	/// NOTE: This will write the checksum as is. It is likely [`Page::gen_crc`] will have
	/// to be used prior.
	pub fn as_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(self.len() as usize);

		bytes.extend(b"OggS");
		bytes.push(0); // Version
		bytes.push(self.header.header_type_flag);
		bytes.extend(self.header.abgp.to_le_bytes());
		bytes.extend(self.header.stream_serial.to_le_bytes());
		bytes.extend(self.header.sequence_number.to_le_bytes());
		bytes.extend(self.header.checksum.to_le_bytes());
		bytes.push(self.header.segments.len() as u8);
		bytes.extend(self.header.segments.iter());
		bytes.extend(self.content.iter());

		bytes
	}

	/// Attempts to get a Page from a reader
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * [`PageError`]
	pub fn read<V>(data: &mut V) -> Result<Self>
	where
		V: Read + Seek,
	{
		let header = PageHeader::read(data)?;

		let mut content = vec![0; header.content_size() as usize];
		data.read_exact(&mut content)?;

		let end = data.stream_position()?;

		Ok(Page {
			content,
			header,
			end,
		})
	}

	/// Generates the CRC checksum of the page
	pub fn gen_crc(&mut self) {
		self.header.checksum = self.compute_crc();
	}

	/// Whether the stored checksum matches the page's contents
	pub fn verify_crc(&self) -> bool {
		self.compute_crc() == self.header.checksum
	}

	/// Calculates the checksum the page *should* have
	pub fn compute_crc(&self) -> u32 {
		let mut bytes = self.as_bytes();

		// The checksum is calculated with the checksum field zeroed
		bytes[22..26].fill(0);

		crc::crc32(&bytes)
	}

	/// Returns the size of the page on disk, including the header and segment table
	pub fn len(&self) -> u64 {
		self.header.size() + self.header.content_size()
	}

	/// Returns the page's content
	pub fn content(&self) -> &[u8] {
		self.content.as_slice()
	}

	/// Consumes the page and returns its content
	pub fn take_content(self) -> Vec<u8> {
		self.content
	}

	/// Returns a reference to the page's header
	pub fn header(&self) -> &PageHeader {
		&self.header
	}

	/// Returns a mutable reference to the page's header
	///
	/// NOTE: Changes to the header will invalidate the checksum, see [`Page::gen_crc`].
	pub fn header_mut(&mut self) -> &mut PageHeader {
		&mut self.header
	}
}

/// Creates a segment table based on the length
///
/// # Errors
///
/// `length` is too large to be described by a single segment table
///
/// # Example
///
/// ```rust
/// use ogg_pager::segment_table;
///
/// # fn main() -> ogg_pager::Result<()> {
/// assert_eq!(segment_table(300)?, vec![255, 45]);
///
/// // A packet that is a multiple of 255 is terminated by an empty segment
/// assert_eq!(segment_table(255)?, vec![255, 0]);
/// # Ok(()) }
/// ```
pub fn segment_table(length: usize) -> Result<Vec<u8>> {
	let needed = (length / 255) + 1;

	if needed > MAX_SEGMENT_COUNT {
		return Err(PageError::TooMuchData);
	}

	let mut segments = vec![255; needed - 1];
	segments.push((length % 255) as u8);

	Ok(segments)
}
