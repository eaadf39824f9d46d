use super::HEADER_PAGE_COUNT;
use super::constants::OPUS_SAMPLE_RATE;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::header::AUDIO_REGION_OFFSET;
use crate::util::math::RoundedDivision;

use std::fmt::{Display, Formatter};
use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use ogg_pager::{PageError, PageReader};

// A granule position of -1 means no packet finishes on the page
const NO_GRANULE: u64 = u64::MAX;

/// Something unusual found while walking the pages of the audio region
///
/// None of these prevent the stream from being read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StreamAnomaly {
	/// A page belongs to a different logical stream than the identification page
	SerialMismatch {
		/// The index of the page in the audio region
		page: usize,
		/// The serial of the identification page
		expected: u32,
		/// The serial of this page
		found: u32,
	},
	/// A page's sequence number doesn't follow the previous page's
	SequenceGap {
		/// The index of the page in the audio region
		page: usize,
		/// The sequence number following the previous page's
		expected: u32,
		/// The sequence number of this page
		found: u32,
	},
	/// A page's stored checksum doesn't match its contents
	ChecksumMismatch {
		/// The index of the page in the audio region
		page: usize,
		/// The checksum stored in the page header
		stored: u32,
		/// The checksum computed from the page
		computed: u32,
	},
	/// The stream ends with data that isn't a complete page
	TrailingData {
		/// The offset in the file the unreadable data starts at
		offset: u64,
		/// The number of unreadable bytes
		length: u64,
	},
}

impl Display for StreamAnomaly {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::SerialMismatch {
				page,
				expected,
				found,
			} => write!(
				f,
				"Page {page} has a stream serial of {found}, expected {expected}"
			),
			Self::SequenceGap {
				page,
				expected,
				found,
			} => write!(
				f,
				"Page {page} has a sequence number of {found}, expected {expected}"
			),
			Self::ChecksumMismatch {
				page,
				stored,
				computed,
			} => write!(
				f,
				"Page {page} has a checksum of {stored:#010X}, computed {computed:#010X}"
			),
			Self::TrailingData { offset, length } => {
				write!(f, "{length} unreadable byte(s) at offset {offset}")
			},
		}
	}
}

/// Facts gathered by walking every page of the audio region
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamSummary {
	pub(crate) page_count: usize,
	pub(crate) last_granule: Option<u64>,
	pub(crate) duration: Duration,
	pub(crate) stream_size: u64,
	pub(crate) anomalies: Vec<StreamAnomaly>,
}

impl StreamSummary {
	/// The total number of pages, including the identification and comments pages
	pub fn page_count(&self) -> usize {
		self.page_count
	}

	/// The number of pages following the identification and comments pages
	///
	/// This is the range chapter page indices refer to.
	pub fn audio_page_count(&self) -> usize {
		self.page_count.saturating_sub(HEADER_PAGE_COUNT)
	}

	/// The granule position of the last page that finishes a packet
	pub fn last_granule(&self) -> Option<u64> {
		self.last_granule
	}

	/// Duration of the stream
	///
	/// This is calculated from the last granule position, minus the pre-skip.
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// The number of bytes of the audio region covered by complete pages
	pub fn stream_size(&self) -> u64 {
		self.stream_size
	}

	/// Anomalies found in the stream, in page order
	pub fn anomalies(&self) -> &[StreamAnomaly] {
		&self.anomalies
	}

	/// Whether any page has a checksum mismatch
	pub fn has_checksum_mismatch(&self) -> bool {
		self.anomalies
			.iter()
			.any(|a| matches!(a, StreamAnomaly::ChecksumMismatch { .. }))
	}
}

/// Walk every page of the audio region
///
/// `pre_skip` is taken from the identification packet (see [`AudioStreamInfo::pre_skip`](super::AudioStreamInfo::pre_skip)),
/// and is only used to calculate the duration.
///
/// Checksums are only verified if [`ParseOptions::verify_checksums`] is set, otherwise page
/// contents are skipped entirely.
///
/// # Errors
///
/// [`std::io::Error`]. Pages that fail to parse end the walk, and are reported as
/// [`StreamAnomaly::TrailingData`].
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
/// let summary = taf::opus::scan_stream(&mut file, info.pre_skip(), ParseOptions::new())?;
///
/// println!("{} audio pages, {:?}", summary.audio_page_count(), summary.duration());
/// # Ok(()) }
/// ```
pub fn scan_stream<R>(
	reader: &mut R,
	pre_skip: u16,
	parse_options: ParseOptions,
) -> Result<StreamSummary>
where
	R: Read + Seek,
{
	reader.seek(SeekFrom::Start(AUDIO_REGION_OFFSET))?;

	let verify_checksums = parse_options.verify_checksums;
	let mut pages = if verify_checksums {
		PageReader::new(reader)?
	} else {
		PageReader::headers_only(reader)?
	};

	let mut summary = StreamSummary::default();
	let mut serial = None;
	let mut previous_sequence_number = None;
	let mut last_end = AUDIO_REGION_OFFSET;

	for (index, page) in pages.by_ref().enumerate() {
		let header = page.header();

		match serial {
			None => serial = Some(header.stream_serial),
			Some(expected) if expected != header.stream_serial => {
				log::warn!(
					"Opus: Page {index} has a stream serial of {}, expected {expected}",
					header.stream_serial
				);
				summary.anomalies.push(StreamAnomaly::SerialMismatch {
					page: index,
					expected,
					found: header.stream_serial,
				});
			},
			_ => {},
		}

		if let Some(previous) = previous_sequence_number {
			let expected = u32::wrapping_add(previous, 1);
			if header.sequence_number != expected {
				log::warn!(
					"Opus: Page {index} has a sequence number of {}, expected {expected}",
					header.sequence_number
				);
				summary.anomalies.push(StreamAnomaly::SequenceGap {
					page: index,
					expected,
					found: header.sequence_number,
				});
			}
		}
		previous_sequence_number = Some(header.sequence_number);

		if verify_checksums {
			let computed = page.compute_crc();
			if computed != header.checksum() {
				log::warn!("Opus: Page {index} has an invalid checksum");
				summary.anomalies.push(StreamAnomaly::ChecksumMismatch {
					page: index,
					stored: header.checksum(),
					computed,
				});
			}
		}

		if header.abgp != NO_GRANULE {
			summary.last_granule = Some(header.abgp);
		}

		last_end = page.end;
		summary.page_count += 1;
	}

	let stream_len = pages.stream_len();
	match pages.take_stop_reason() {
		Some(PageError::Io(err)) => return Err(err.into()),
		Some(err) => {
			log::warn!("Opus: Stream stopped at offset {last_end}: {err}");
			summary.anomalies.push(StreamAnomaly::TrailingData {
				offset: last_end,
				length: stream_len.saturating_sub(last_end),
			});
		},
		None => {},
	}

	summary.stream_size = last_end - AUDIO_REGION_OFFSET;
	if let Some(granule) = summary.last_granule {
		let samples = granule.saturating_sub(u64::from(pre_skip));
		// Corrupt granules can be anywhere in the u64 range
		let millis = (u128::from(samples) * 1000).div_round(u128::from(OPUS_SAMPLE_RATE));
		summary.duration = Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX));
	}

	Ok(summary)
}
