//! Analysis of the OGG Opus stream in the audio region
//!
//! ## File notes
//!
//! The audio region of a TAF file is a single logical Opus stream. The first page holds the
//! identification packet (`OpusHead`), the second page the comments packet (`OpusTags`).
//! Every page after that is audio, and chapters are recorded as indices into those audio pages.
pub(crate) mod comments;
pub(crate) mod constants;
pub(crate) mod properties;
pub(crate) mod stream;

use crate::config::ParseOptions;
use crate::error::{Result, StreamFormatError, TafError};
use crate::header::AUDIO_REGION_OFFSET;
use crate::macros::stream_err;

use std::io::{Read, Seek, SeekFrom};

use ogg_pager::{Page, PageError};

// Exports

pub use comments::OpusComments;
pub use properties::AudioStreamInfo;
pub use stream::{StreamAnomaly, StreamSummary, scan_stream};

/// The number of pages preceding the audio pages (identification and comments)
pub const HEADER_PAGE_COUNT: usize = 2;

/// Analyze the audio stream of a TAF file
///
/// This reads exactly the first two pages of the audio region, which must hold the
/// identification and comments packets.
///
/// # Errors
///
/// * Either page is missing or fails to parse, see [`StreamFormatError`]
/// * Either packet is malformed, see [`StreamFormatError`]
/// * [`std::io::Error`]
///
/// # Examples
///
/// ```rust,no_run
/// use taf::config::ParseOptions;
/// use std::fs::File;
///
/// # fn main() -> taf::error::Result<()> {
/// let mut file = File::open("story.taf")?;
/// let info = taf::opus::analyze(&mut file, ParseOptions::new())?;
///
/// println!("{} channel(s) at {} Hz", info.channels(), info.sample_rate());
/// # Ok(()) }
/// ```
pub fn analyze<R>(reader: &mut R, parse_options: ParseOptions) -> Result<AudioStreamInfo>
where
	R: Read + Seek,
{
	let [identification_page, comments_page] = read_header_pages(reader)?;

	let identification_header = identification_page.header();
	if !identification_header.segments().last().is_some_and(|&s| s < 255) {
		stream_err!(@BAIL 0, "Identification packet does not end on its page");
	}

	let stream_serial = identification_header.stream_serial;
	if comments_page.header().stream_serial != stream_serial {
		log::warn!(
			"Opus: Comments page has a stream serial of {}, expected {}",
			comments_page.header().stream_serial,
			stream_serial
		);
	}

	let mut info =
		properties::read_identification(identification_page.content(), parse_options.parsing_mode)?;
	info.stream_serial = stream_serial;
	info.comments = comments::read_comments(comments_page.content(), parse_options.parsing_mode)?;

	Ok(info)
}

// Reads the identification and comments pages, leaving the reader at the first audio page
pub(crate) fn read_header_pages<R>(reader: &mut R) -> Result<[Page; HEADER_PAGE_COUNT]>
where
	R: Read + Seek,
{
	reader.seek(SeekFrom::Start(AUDIO_REGION_OFFSET))?;

	let identification_page = read_header_page(reader, 0, "Expected an identification page")?;
	let comments_page = read_header_page(reader, 1, "Expected a comments page")?;

	Ok([identification_page, comments_page])
}

fn read_header_page<R>(reader: &mut R, index: usize, description: &'static str) -> Result<Page>
where
	R: Read + Seek,
{
	match Page::read(reader) {
		Ok(page) => Ok(page),
		Err(PageError::Io(err)) => Err(err.into()),
		Err(err) => Err(TafError::from(StreamFormatError::from_page_error(
			index,
			description,
			err,
		))),
	}
}

fn verify_signature(content: &[u8], sig: &[u8], page: usize) -> Result<()> {
	let sig_len = sig.len();

	if content.len() < sig_len || &content[..sig_len] != sig {
		stream_err!(@BAIL page, "Packet missing magic signature");
	}

	Ok(())
}
