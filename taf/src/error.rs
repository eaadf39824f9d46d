//! Contains the errors that can arise within taf
//!
//! The primary error is [`TafError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.
//!
//! Errors are split by the stage that produced them, so callers can tell a file that isn't
//! a TAF file at all ([`ErrorKind::HeaderDecode`]) apart from a TAF file with damaged audio
//! ([`ErrorKind::StreamFormat`]).

use std::fmt::{Debug, Display, Formatter};

use ogg_pager::PageError;

/// Alias for `Result<T, TafError>`
pub type Result<T> = std::result::Result<T, TafError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	/// Errors that occur while decoding the header region
	HeaderDecode(HeaderDecodeError),
	/// The audio region doesn't start with a valid identification/comments page pair,
	/// or the stream failed a strict check
	StreamFormat(StreamFormatError),
	/// Attempting to write more header data than the fixed header region can hold
	TooMuchData,
	/// The audio region has no pages to split into chapters
	NothingToSplit,

	// Conversions for external errors
	/// Errors that arise while parsing OGG pages
	OggPage(PageError),
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
}

/// The types of errors that can occur while decoding a TAF header
#[derive(Debug)]
#[non_exhaustive]
pub enum HeaderDecodeErrorKind {
	/// The file is too small to hold the fixed 4096 byte header region
	FileTooSmall,
	/// The length prefix points past the end of the file
	LengthOutOfBounds,
	/// The header length is not the 4092 bytes written by conforming writers
	NonConformingLength,
	/// The structured metadata could not be decoded
	Malformed(prost::DecodeError),
	/// The declared audio length doesn't match the size of the audio region
	DataLengthMismatch {
		/// The length stored in the header
		declared: u64,
		/// The actual size of the audio region
		actual: u64,
	},
}

impl Display for HeaderDecodeErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::FileTooSmall => write!(f, "File is too small to contain a header region"),
			Self::LengthOutOfBounds => write!(f, "Header length points past the end of the file"),
			Self::NonConformingLength => write!(f, "Header length is not 4092 bytes"),
			Self::Malformed(err) => write!(f, "Failed to decode header metadata: {err}"),
			Self::DataLengthMismatch { declared, actual } => write!(
				f,
				"Header declares {declared} bytes of audio, but the audio region is {actual} \
				 bytes"
			),
		}
	}
}

/// An error that arises while decoding the header region of a file
pub struct HeaderDecodeError {
	kind: HeaderDecodeErrorKind,
	offset: u64,
	declared_length: Option<u32>,
	available: u64,
}

impl HeaderDecodeError {
	/// Create a new `HeaderDecodeError`
	///
	/// * `offset` - The position in the file the failing read started at
	/// * `declared_length` - The header length from the length prefix, if it was read
	/// * `available` - The number of bytes available from `offset`
	#[must_use]
	pub const fn new(
		kind: HeaderDecodeErrorKind,
		offset: u64,
		declared_length: Option<u32>,
		available: u64,
	) -> Self {
		Self {
			kind,
			offset,
			declared_length,
			available,
		}
	}

	/// Returns the [`HeaderDecodeErrorKind`]
	pub fn kind(&self) -> &HeaderDecodeErrorKind {
		&self.kind
	}

	/// The position in the file the failing read started at
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// The header length from the length prefix, if it was read
	pub fn declared_length(&self) -> Option<u32> {
		self.declared_length
	}

	/// The number of bytes that were available from [`HeaderDecodeError::offset`]
	pub fn available(&self) -> u64 {
		self.available
	}
}

impl Debug for HeaderDecodeError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"TAF header: {:?} (offset: {}, declared length: {:?}, available: {})",
			self.kind, self.offset, self.declared_length, self.available
		)
	}
}

impl Display for HeaderDecodeError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "TAF header: {} (offset: {}", self.kind, self.offset)?;
		if let Some(declared_length) = self.declared_length {
			write!(f, ", declared length: {declared_length}")?;
		}

		write!(f, ", available: {} bytes)", self.available)
	}
}

/// An error that arises while decoding the audio stream
///
/// This is usually caused by the identification/comments pages, see [`StreamFormatError::page`].
pub struct StreamFormatError {
	page: usize,
	description: &'static str,
	source: Option<PageError>,
}

impl StreamFormatError {
	/// Create a `StreamFormatError` for a page index and description
	#[must_use]
	pub const fn new(page: usize, description: &'static str) -> Self {
		Self {
			page,
			description,
			source: None,
		}
	}

	/// Create a `StreamFormatError` caused by a page failing to parse
	#[must_use]
	pub fn from_page_error(page: usize, description: &'static str, source: PageError) -> Self {
		Self {
			page,
			description,
			source: Some(source),
		}
	}

	/// The index of the page that failed, 0 being the identification page
	///
	/// Pages are counted from the start of the audio region.
	pub fn page(&self) -> usize {
		self.page
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}

	/// Returns the page error that caused this error, if any
	pub fn page_error(&self) -> Option<&PageError> {
		self.source.as_ref()
	}
}

impl Debug for StreamFormatError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Audio stream (page {}): {:?}", self.page, self.description)?;
		if let Some(source) = &self.source {
			write!(f, " ({source:?})")?;
		}

		Ok(())
	}
}

impl Display for StreamFormatError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Audio stream (page {}): {}", self.page, self.description)?;
		if let Some(source) = &self.source {
			write!(f, ": {source}")?;
		}

		Ok(())
	}
}

/// Errors that could occur within taf
pub struct TafError {
	pub(crate) kind: ErrorKind,
}

impl TafError {
	/// Create a `TafError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use taf::error::{ErrorKind, TafError};
	///
	/// let nothing_to_split = TafError::new(ErrorKind::NothingToSplit);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use taf::error::{ErrorKind, TafError};
	///
	/// let nothing_to_split = TafError::new(ErrorKind::NothingToSplit);
	/// if let ErrorKind::NothingToSplit = nothing_to_split.kind() {
	/// 	println!("No audio pages found");
	/// }
	/// ```
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Whether the error was caused by a missing file
	pub fn is_not_found(&self) -> bool {
		matches!(&self.kind, ErrorKind::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
	}

	/// Whether the error arose while decoding the header region
	pub fn is_header_error(&self) -> bool {
		matches!(self.kind, ErrorKind::HeaderDecode(_) | ErrorKind::TooMuchData)
	}

	/// Whether the error arose while decoding the audio stream
	pub fn is_stream_error(&self) -> bool {
		matches!(self.kind, ErrorKind::StreamFormat(_) | ErrorKind::OggPage(_))
	}
}

impl std::error::Error for TafError {}

impl Debug for TafError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<HeaderDecodeError> for TafError {
	fn from(input: HeaderDecodeError) -> Self {
		Self {
			kind: ErrorKind::HeaderDecode(input),
		}
	}
}

impl From<StreamFormatError> for TafError {
	fn from(input: StreamFormatError) -> Self {
		Self {
			kind: ErrorKind::StreamFormat(input),
		}
	}
}

impl From<PageError> for TafError {
	fn from(input: PageError) -> Self {
		Self {
			kind: ErrorKind::OggPage(input),
		}
	}
}

impl From<std::io::Error> for TafError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl Display for TafError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::OggPage(ref err) => write!(f, "{err}"),
			ErrorKind::Io(ref err) => write!(f, "{err}"),

			ErrorKind::HeaderDecode(ref err) => write!(f, "{err}"),
			ErrorKind::StreamFormat(ref err) => write!(f, "{err}"),
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to write more header data than the 4092 byte header region can hold"
			),
			ErrorKind::NothingToSplit => {
				write!(f, "The audio stream contains no pages to split into chapters")
			},
		}
	}
}
