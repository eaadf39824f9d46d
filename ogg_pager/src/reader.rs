use crate::error::{PageError, Result};
use crate::{Page, PageHeader};

use std::io::{Read, Seek, SeekFrom};
use std::iter::FusedIterator;

/// A forward-only reader over the pages of a stream
///
/// The reader starts at the current position of the underlying stream, and yields pages
/// until the end of the data is reached, or a page fails to parse. Failing to parse is not
/// an error of the iteration itself, see [`PageReader::stop_reason`].
///
/// # Examples
///
/// ```rust
/// use ogg_pager::{Page, PageReader};
/// use std::io::Cursor;
///
/// # fn main() -> ogg_pager::Result<()> {
/// let mut stream = Vec::new();
/// for seq in 0..3 {
/// 	let mut page = Page::new(0, 0, 1234, seq, vec![0; 10])?;
/// 	page.gen_crc();
/// 	stream.extend(page.as_bytes());
/// }
///
/// let mut reader = PageReader::new(Cursor::new(stream))?;
/// assert_eq!(reader.by_ref().count(), 3);
/// assert!(reader.stop_reason().is_none());
/// # Ok(()) }
/// ```
pub struct PageReader<R> {
	reader: R,
	skip_content: bool,
	stream_len: u64,
	pages_read: usize,
	finished: bool,
	stop_reason: Option<PageError>,
}

impl<R> PageReader<R>
where
	R: Read + Seek,
{
	/// Create a new `PageReader`, reading full pages
	///
	/// # Errors
	///
	/// The length of the stream cannot be determined
	pub fn new(reader: R) -> Result<Self> {
		Self::with_content(reader, true)
	}

	/// Create a new `PageReader` that only reads page headers
	///
	/// The yielded pages will have empty content, which makes this suitable for counting
	/// pages or inspecting header fields.
	///
	/// # Errors
	///
	/// The length of the stream cannot be determined
	pub fn headers_only(reader: R) -> Result<Self> {
		Self::with_content(reader, false)
	}

	fn with_content(mut reader: R, read_content: bool) -> Result<Self> {
		let current_pos = reader.stream_position()?;
		let stream_len = reader.seek(SeekFrom::End(0))?;
		reader.seek(SeekFrom::Start(current_pos))?;

		Ok(Self {
			reader,
			skip_content: !read_content,
			stream_len,
			pages_read: 0,
			finished: false,
			stop_reason: None,
		})
	}

	/// The number of pages yielded so far
	pub fn pages_read(&self) -> usize {
		self.pages_read
	}

	/// Why the reader stopped producing pages
	///
	/// This is `None` while the reader is still active, or if it reached the end of the data
	/// cleanly, on a page boundary.
	pub fn stop_reason(&self) -> Option<&PageError> {
		self.stop_reason.as_ref()
	}

	/// Take the stop reason out of the reader, see [`PageReader::stop_reason`]
	pub fn take_stop_reason(&mut self) -> Option<PageError> {
		self.stop_reason.take()
	}

	/// The total length of the underlying stream
	pub fn stream_len(&self) -> u64 {
		self.stream_len
	}

	/// Consumes the `PageReader`, returning the underlying reader
	pub fn into_inner(self) -> R {
		self.reader
	}

	fn read_page(&mut self) -> Result<Option<Page>> {
		let pos = self.reader.stream_position()?;
		if pos >= self.stream_len {
			return Ok(None);
		}

		if !self.skip_content {
			return Page::read(&mut self.reader).map(Some);
		}

		let header = PageHeader::read(&mut self.reader)?;
		let end = self.reader.stream_position()? + header.content_size();
		if end > self.stream_len {
			return Err(PageError::IncompleteRead);
		}

		self.reader.seek(SeekFrom::Start(end))?;

		Ok(Some(Page {
			content: Vec::new(),
			header,
			end,
		}))
	}
}

impl<R> Iterator for PageReader<R>
where
	R: Read + Seek,
{
	type Item = Page;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		match self.read_page() {
			Ok(Some(page)) => {
				self.pages_read += 1;
				Some(page)
			},
			Ok(None) => {
				self.finished = true;
				None
			},
			Err(err) => {
				self.finished = true;
				self.stop_reason = Some(err);
				None
			},
		}
	}
}

impl<R> FusedIterator for PageReader<R> where R: Read + Seek {}
