//! The fixed size TAF header region
//!
//! ## Layout
//!
//! | Offset | Size           | Content                                              |
//! |--------|----------------|------------------------------------------------------|
//! | 0      | 4              | Big-endian header length (always 4092 when conforming) |
//! | 4      | header length  | Protobuf encoded metadata, padded to 4092 bytes      |
//! | 4096   | remainder      | OGG Opus page stream                                 |
//!
//! The header region is always 4096 bytes, no matter how much metadata is stored. This allows
//! the audio to be found without decoding the metadata, and the metadata to be rewritten in place.
mod read;
mod schema;
mod write;

use crate::util::hash::{SHA1_LEN, sha1_of};

pub use read::read_header;
pub use write::write_header;

/// The size of the header region, including the length prefix
pub const HEADER_REGION_SIZE: u64 = 4096;
/// The offset of the OGG stream within the file
pub const AUDIO_REGION_OFFSET: u64 = HEADER_REGION_SIZE;
/// The size of the big-endian length prefix
pub const LENGTH_PREFIX_SIZE: u64 = 4;
/// The length of the structured metadata written by conforming writers
pub const HEADER_LENGTH: u32 = (HEADER_REGION_SIZE - LENGTH_PREFIX_SIZE) as u32;

/// Structured metadata decoded from the header region
///
/// Unknown fields are ignored while reading, and fields missing from the file are read as their
/// defaults.
///
/// # Examples
///
/// ```rust
/// use taf::header::TonieHeader;
///
/// # fn main() -> taf::error::Result<()> {
/// let audio = vec![0; 100];
/// let header = TonieHeader::for_audio(&audio, 1_700_000_000, vec![0, 12]);
///
/// let region = header.as_bytes()?;
/// assert_eq!(region.len(), 4096);
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TonieHeader {
	/// The number of bytes in the audio region
	pub data_length: u64,
	/// The creation timestamp, also used as the audio ID
	pub timestamp: u32,
	/// The audio page indices that start each chapter, in ascending order
	pub chapter_pages: Vec<u32>,
	/// The SHA-1 digest of the audio region
	pub audio_sha1: Option<[u8; SHA1_LEN]>,
}

impl TonieHeader {
	/// Create a header describing `audio`
	///
	/// The data length and digest are calculated from `audio`, which should be the entire
	/// audio region (everything after the 4096 byte header region).
	pub fn for_audio(audio: &[u8], timestamp: u32, chapter_pages: Vec<u32>) -> Self {
		Self {
			data_length: audio.len() as u64,
			timestamp,
			chapter_pages,
			audio_sha1: Some(sha1_of(audio)),
		}
	}

	/// Whether the chapter pages are strictly increasing
	pub fn chapters_ordered(&self) -> bool {
		self.chapter_pages.windows(2).all(|w| w[0] < w[1])
	}

	/// The number of chapters described by the header
	///
	/// A header without any chapter pages describes a single chapter.
	pub fn chapter_count(&self) -> usize {
		self.chapter_pages.len().max(1)
	}
}
