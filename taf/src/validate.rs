//! Structural validation of whole TAF files
//!
//! Validation runs in stages, stopping at the first failure:
//!
//! 1. The file exists, and is large enough to hold the 4096 byte header region
//! 2. The header decodes
//! 3. The declared audio length matches the size of the audio region
//! 4. The audio region starts with a valid Opus stream
//!
//! After that, every page of the stream is walked. Anything unusual found along the way is
//! reported as a [`ValidationWarning`], unless [`ParsingMode::Strict`] is in use.

use crate::config::{ParseOptions, ParsingMode};
use crate::error::{HeaderDecodeError, HeaderDecodeErrorKind, Result, StreamFormatError};
use crate::file::TafFile;
use crate::header::{HEADER_LENGTH, HEADER_REGION_SIZE, LENGTH_PREFIX_SIZE, TonieHeader, read_header};
use crate::macros::{header_err, parse_mode_choice};
use crate::opus::constants::OPUS_SAMPLE_RATE;
use crate::opus::{self, AudioStreamInfo, StreamAnomaly, StreamSummary};
use crate::util::hash::{SHA1_LEN, sha1_to_end, to_hex};

use std::fmt::{Display, Formatter};
use std::io::{Seek, SeekFrom};
use std::path::Path;

/// A problem that doesn't make a file invalid
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationWarning {
	/// The header length is not the 4092 bytes written by conforming writers
	NonConformingHeaderLength(u32),
	/// The declared audio length differs from the size of the audio region
	DataLengthMismatch {
		/// The length stored in the header
		declared: u64,
		/// The actual size of the audio region
		actual: u64,
	},
	/// The declared audio digest differs from the digest of the audio region
	AudioDigestMismatch {
		/// The digest stored in the header
		declared: [u8; SHA1_LEN],
		/// The digest of the audio region
		computed: [u8; SHA1_LEN],
	},
	/// The chapter pages are not strictly increasing
	ChaptersNotIncreasing,
	/// A chapter starts past the last audio page
	ChapterOutOfRange {
		/// The index of the chapter
		chapter: usize,
		/// The audio page the chapter starts at
		page: u32,
		/// The number of audio pages in the stream
		audio_page_count: usize,
	},
	/// The input sample rate isn't 48 kHz
	UnexpectedSampleRate(u32),
	/// Something unusual found while walking the stream
	Stream(StreamAnomaly),
}

impl Display for ValidationWarning {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::NonConformingHeaderLength(len) => {
				write!(f, "Header length is {len}, expected {HEADER_LENGTH}")
			},
			Self::DataLengthMismatch { declared, actual } => write!(
				f,
				"Header declares {declared} bytes of audio, but the audio region is {actual} bytes"
			),
			Self::AudioDigestMismatch { declared, computed } => write!(
				f,
				"Header declares an audio digest of {}, but the audio region hashes to {}",
				to_hex(declared),
				to_hex(computed)
			),
			Self::ChaptersNotIncreasing => write!(f, "Chapter pages are not strictly increasing"),
			Self::ChapterOutOfRange {
				chapter,
				page,
				audio_page_count,
			} => write!(
				f,
				"Chapter {chapter} starts at page {page}, but the stream only has \
				 {audio_page_count} audio pages"
			),
			Self::UnexpectedSampleRate(rate) => {
				write!(f, "Input sample rate is {rate} Hz, expected {OPUS_SAMPLE_RATE} Hz")
			},
			Self::Stream(anomaly) => write!(f, "{anomaly}"),
		}
	}
}

/// The result of validating a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
	pub(crate) header_size: u32,
	pub(crate) header: TonieHeader,
	pub(crate) file_size: u64,
	pub(crate) stream: AudioStreamInfo,
	pub(crate) summary: StreamSummary,
	pub(crate) warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
	/// The header length from the length prefix
	pub fn header_size(&self) -> u32 {
		self.header_size
	}

	/// The decoded header
	pub fn header(&self) -> &TonieHeader {
		&self.header
	}

	/// The size of the file
	pub fn file_size(&self) -> u64 {
		self.file_size
	}

	/// The stream information
	pub fn stream(&self) -> &AudioStreamInfo {
		&self.stream
	}

	/// The result of walking every page of the stream
	pub fn summary(&self) -> &StreamSummary {
		&self.summary
	}

	/// Every warning found, in the order they were found
	pub fn warnings(&self) -> &[ValidationWarning] {
		&self.warnings
	}

	/// Whether the file is valid with no warnings
	pub fn is_clean(&self) -> bool {
		self.warnings.is_empty()
	}
}

/// Check whether the file at `path` is a valid TAF file
///
/// This uses the default [`ParseOptions`], see [`check_valid_with_options`] to specify them.
///
/// # Errors
///
/// The file exists, but is malformed. The error describes which stage failed,
/// see [`TafError::is_header_error`](crate::error::TafError::is_header_error) and
/// [`TafError::is_stream_error`](crate::error::TafError::is_stream_error).
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> taf::error::Result<()> {
/// if !taf::validate::check_valid("story.taf")? {
/// 	println!("Nothing to do");
/// }
/// # Ok(()) }
/// ```
pub fn check_valid<P>(path: P) -> Result<bool>
where
	P: AsRef<Path>,
{
	check_valid_with_options(path, ParseOptions::default())
}

/// Check whether the file at `path` is a valid TAF file
///
/// A file that doesn't exist is `Ok(false)`.
///
/// # Errors
///
/// See [`check_valid`]
pub fn check_valid_with_options<P>(path: P, parse_options: ParseOptions) -> Result<bool>
where
	P: AsRef<Path>,
{
	match validate(path, parse_options) {
		Ok(_) => Ok(true),
		Err(err) if err.is_not_found() => Ok(false),
		Err(err) => Err(err),
	}
}

/// Validate the file at `path`
///
/// # Errors
///
/// * `path` does not exist
/// * The file is smaller than the header region
/// * The header can't be decoded, see [`read_header`]
/// * The declared audio length is beyond the tolerance, see [`ParseOptions::data_length_tolerance`]
/// * The audio stream is invalid, see [`opus::analyze`]
/// * In [`ParsingMode::Strict`], a page checksum doesn't match
/// * [`std::io::Error`]
///
/// # Examples
///
/// ```rust,no_run
/// use taf::config::ParseOptions;
///
/// # fn main() -> taf::error::Result<()> {
/// let report = taf::validate::validate("story.taf", ParseOptions::new())?;
/// for warning in report.warnings() {
/// 	println!("Warning: {warning}");
/// }
/// # Ok(()) }
/// ```
pub fn validate<P>(path: P, parse_options: ParseOptions) -> Result<ValidationReport>
where
	P: AsRef<Path>,
{
	let parse_mode = parse_options.parsing_mode;

	let file = TafFile::open(path)?;
	let file_size = file.total_size();

	if file_size < HEADER_REGION_SIZE {
		header_err!(@BAIL FileTooSmall, 0, None, file_size);
	}

	let mut reader = file.reader()?;
	let mut warnings = Vec::new();

	let (header_size, header) = read_header(&mut reader)?;
	let available = file_size - LENGTH_PREFIX_SIZE;

	if header_size != HEADER_LENGTH {
		parse_mode_choice!(
			parse_mode,
			STRICT: header_err!(@BAIL NonConformingLength, 0, Some(header_size), available),
			DEFAULT: warnings.push(ValidationWarning::NonConformingHeaderLength(header_size))
		);
	}

	let actual = file.audio_size();
	let declared = header.data_length;
	if declared != actual {
		let within_tolerance = declared.abs_diff(actual) <= parse_options.data_length_tolerance;
		let fail = match parse_mode {
			ParsingMode::Strict => true,
			ParsingMode::Relaxed => false,
			_ => !within_tolerance,
		};

		if fail {
			return Err(HeaderDecodeError::new(
				HeaderDecodeErrorKind::DataLengthMismatch { declared, actual },
				LENGTH_PREFIX_SIZE,
				Some(header_size),
				available,
			)
			.into());
		}

		log::warn!("Validate: Header declares {declared} bytes of audio, found {actual}");
		warnings.push(ValidationWarning::DataLengthMismatch { declared, actual });
	}

	let stream = opus::analyze(&mut reader, parse_options)?;
	if stream.sample_rate() != OPUS_SAMPLE_RATE {
		warnings.push(ValidationWarning::UnexpectedSampleRate(stream.sample_rate()));
	}

	let summary = opus::scan_stream(&mut reader, stream.pre_skip(), parse_options)?;

	if parse_mode == ParsingMode::Strict {
		let first_mismatch = summary.anomalies().iter().find_map(|anomaly| match anomaly {
			StreamAnomaly::ChecksumMismatch { page, .. } => Some(*page),
			_ => None,
		});

		if let Some(page) = first_mismatch {
			return Err(StreamFormatError::new(page, "Page checksum mismatch").into());
		}
	}

	if let Some(declared) = header.audio_sha1 {
		reader.seek(SeekFrom::Start(file.audio_region_offset()))?;
		let computed = sha1_to_end(&mut reader)?;

		if declared != computed {
			log::warn!("Validate: Declared audio digest doesn't match the audio region");
			warnings.push(ValidationWarning::AudioDigestMismatch { declared, computed });
		}
	}

	if !header.chapters_ordered() {
		log::warn!("Validate: Chapter pages are not strictly increasing");
		warnings.push(ValidationWarning::ChaptersNotIncreasing);
	}

	let audio_page_count = summary.audio_page_count();
	for (chapter, &page) in header.chapter_pages.iter().enumerate() {
		if page as usize >= audio_page_count {
			warnings.push(ValidationWarning::ChapterOutOfRange {
				chapter,
				page,
				audio_page_count,
			});
		}
	}

	warnings.extend(
		summary
			.anomalies()
			.iter()
			.cloned()
			.map(ValidationWarning::Stream),
	);

	Ok(ValidationReport {
		header_size,
		header,
		file_size,
		stream,
		summary,
		warnings,
	})
}
