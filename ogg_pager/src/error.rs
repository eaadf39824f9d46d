use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Alias for `Result<T, PageError>`
pub type Result<T> = std::result::Result<T, PageError>;

/// Errors that can occur while reading or building pages
#[derive(Debug)]
pub enum PageError {
	/// The stream structure version byte is not 0
	InvalidVersion,
	/// The page header declares no segments
	BadSegmentCount,
	/// The data at the current position doesn't start with the `OggS` capture pattern
	MissingMagic,
	/// The content is too large to be described by a single segment table
	TooMuchData,
	/// The stream ended before a page header or payload could be fully read
	IncompleteRead,
	/// A failure of the underlying reader
	Io(std::io::Error),
}

impl PageError {
	/// Whether the error means the stream simply stopped producing pages
	///
	/// This is the case for truncated pages and data that isn't a page at all, as opposed to
	/// a failure of the underlying reader.
	pub fn is_end_of_stream(&self) -> bool {
		!matches!(self, Self::Io(_) | Self::TooMuchData)
	}
}

impl Display for PageError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidVersion => write!(f, "Page has a stream structure version other than 0"),
			Self::BadSegmentCount => write!(f, "Page declares an empty segment table"),
			Self::MissingMagic => write!(f, "Expected a page capture pattern (`OggS`)"),
			Self::TooMuchData => write!(f, "Page content exceeds 255 segments"),
			Self::IncompleteRead => write!(f, "The stream ended in the middle of a page"),
			Self::Io(err) => write!(f, "{err}"),
		}
	}
}

impl Error for PageError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for PageError {
	fn from(err: std::io::Error) -> Self {
		// Running out of data mid-page is a property of the stream, not of the reader
		if err.kind() == std::io::ErrorKind::UnexpectedEof {
			return Self::IncompleteRead;
		}

		Self::Io(err)
	}
}
