use super::{ComparisonIssue, FieldValue, Side, Stage, ValueDiff};
use crate::config::ParseOptions;
use crate::error::Result;
use crate::header::AUDIO_REGION_OFFSET;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use ogg_pager::{Page, PageError, PageReader};

/// A page-level diff of two audio streams
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OggPagesDiff {
	pub(crate) total_pages_a: usize,
	pub(crate) total_pages_b: usize,
	pub(crate) page_differences: Vec<PageDiff>,
	pub(crate) checksum_anomalies: Vec<ChecksumAnomaly>,
}

impl OggPagesDiff {
	/// The number of pages read from file A
	pub fn total_pages_a(&self) -> usize {
		self.total_pages_a
	}

	/// The number of pages read from file B
	pub fn total_pages_b(&self) -> usize {
		self.total_pages_b
	}

	/// Every page that differs, ordered by page index
	pub fn page_differences(&self) -> &[PageDiff] {
		&self.page_differences
	}

	/// Pages whose stored checksum doesn't match their contents
	///
	/// These are not differences between the files, and are only collected when
	/// [`ParseOptions::verify_checksums`] is set.
	pub fn checksum_anomalies(&self) -> &[ChecksumAnomaly] {
		&self.checksum_anomalies
	}
}

/// A difference at a single page index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDiff {
	pub(crate) page_index: usize,
	pub(crate) only_in: Option<Side>,
	pub(crate) differing_fields: BTreeMap<&'static str, ValueDiff>,
}

impl PageDiff {
	/// The index of the page, counted from the start of the audio region
	pub fn page_index(&self) -> usize {
		self.page_index
	}

	/// The file this page exists in, if the other file has no page at this index
	pub fn only_in(&self) -> Option<Side> {
		self.only_in
	}

	/// The header fields that differ, keyed by field name
	///
	/// This is empty for pages that only exist in one file, see [`PageDiff::only_in`].
	/// The possible keys are:
	///
	/// * `sequence_number`
	/// * `granule_position`
	/// * `stream_serial`
	/// * `header_type`
	/// * `segment_count`
	/// * `page_size`
	/// * `checksum`
	pub fn differing_fields(&self) -> &BTreeMap<&'static str, ValueDiff> {
		&self.differing_fields
	}
}

/// A page whose stored checksum doesn't match its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumAnomaly {
	/// The file containing the page
	pub side: Side,
	/// The index of the page, counted from the start of the audio region
	pub page_index: usize,
	/// The checksum stored in the page header
	pub stored: u32,
	/// The checksum computed from the page
	pub computed: u32,
}

struct PageSource {
	side: Side,
	pages: Option<PageReader<BufReader<File>>>,
	verify_checksums: bool,
	count: usize,
}

impl PageSource {
	fn open(path: &Path, side: Side, parse_options: ParseOptions) -> Self {
		// Failing to open the file is already reported by the summary stage
		let pages = match open_pages(path, parse_options.verify_checksums) {
			Ok(pages) => Some(pages),
			Err(err) => {
				log::debug!("Compare: Unable to read pages of file {side}: {err}");
				None
			},
		};

		Self {
			side,
			pages,
			verify_checksums: parse_options.verify_checksums,
			count: 0,
		}
	}

	fn next_page(&mut self, checksum_anomalies: &mut Vec<ChecksumAnomaly>) -> Option<Page> {
		let page = self.pages.as_mut()?.next()?;

		if self.verify_checksums {
			let computed = page.compute_crc();
			if computed != page.header().checksum() {
				checksum_anomalies.push(ChecksumAnomaly {
					side: self.side,
					page_index: self.count,
					stored: page.header().checksum(),
					computed,
				});
			}
		}

		self.count += 1;
		Some(page)
	}

	fn finish(mut self, issues: &mut Vec<ComparisonIssue>) -> usize {
		if let Some(Some(PageError::Io(err))) = self.pages.as_mut().map(PageReader::take_stop_reason) {
			issues.push(ComparisonIssue {
				side: self.side,
				stage: Stage::Pages,
				message: format!("Failed to read page {}: {err}", self.count),
			});
		}

		self.count
	}
}

fn open_pages(path: &Path, verify_checksums: bool) -> Result<PageReader<BufReader<File>>> {
	let mut reader = BufReader::new(File::open(path)?);
	reader.seek(SeekFrom::Start(AUDIO_REGION_OFFSET))?;

	// Payloads are only needed to verify checksums
	let pages = if verify_checksums {
		PageReader::new(reader)?
	} else {
		PageReader::headers_only(reader)?
	};

	Ok(pages)
}

// Walks both streams in lock-step
pub(super) fn diff_pages(
	path_a: &Path,
	path_b: &Path,
	parse_options: ParseOptions,
	issues: &mut Vec<ComparisonIssue>,
) -> OggPagesDiff {
	let mut a = PageSource::open(path_a, Side::A, parse_options);
	let mut b = PageSource::open(path_b, Side::B, parse_options);

	let mut diff = OggPagesDiff::default();

	let mut page_index = 0;
	loop {
		let page_a = a.next_page(&mut diff.checksum_anomalies);
		let page_b = b.next_page(&mut diff.checksum_anomalies);

		let page_diff = match (page_a, page_b) {
			(None, None) => break,
			(Some(_), None) => Some(PageDiff {
				page_index,
				only_in: Some(Side::A),
				differing_fields: BTreeMap::new(),
			}),
			(None, Some(_)) => Some(PageDiff {
				page_index,
				only_in: Some(Side::B),
				differing_fields: BTreeMap::new(),
			}),
			(Some(page_a), Some(page_b)) => {
				let differing_fields = diff_page_fields(&page_a, &page_b);
				(!differing_fields.is_empty()).then_some(PageDiff {
					page_index,
					only_in: None,
					differing_fields,
				})
			},
		};

		diff.page_differences.extend(page_diff);
		page_index += 1;
	}

	diff.total_pages_a = a.finish(issues);
	diff.total_pages_b = b.finish(issues);

	diff
}

fn diff_page_fields(a: &Page, b: &Page) -> BTreeMap<&'static str, ValueDiff> {
	let (header_a, header_b) = (a.header(), b.header());

	// Granule positions are signed, -1 marks pages without a finished packet
	let fields = [
		(
			"sequence_number",
			FieldValue::from(header_a.sequence_number),
			FieldValue::from(header_b.sequence_number),
		),
		(
			"granule_position",
			FieldValue::Signed(header_a.abgp as i64),
			FieldValue::Signed(header_b.abgp as i64),
		),
		(
			"stream_serial",
			FieldValue::from(header_a.stream_serial),
			FieldValue::from(header_b.stream_serial),
		),
		(
			"header_type",
			FieldValue::from(header_a.header_type_flag()),
			FieldValue::from(header_b.header_type_flag()),
		),
		(
			"segment_count",
			FieldValue::Unsigned(header_a.segments().len() as u64),
			FieldValue::Unsigned(header_b.segments().len() as u64),
		),
		(
			"page_size",
			FieldValue::Unsigned(a.len()),
			FieldValue::Unsigned(b.len()),
		),
		(
			"checksum",
			FieldValue::from(header_a.checksum()),
			FieldValue::from(header_b.checksum()),
		),
	];

	fields
		.into_iter()
		.filter(|(_, a, b)| a != b)
		.map(|(name, a, b)| (name, ValueDiff { a, b }))
		.collect()
}

// A headers-only page count, used when the files are known to be identical
pub(super) fn count_pages(path: &Path) -> Result<usize> {
	let mut pages = open_pages(path, false)?;
	let count = pages.by_ref().count();

	if let Some(PageError::Io(err)) = pages.take_stop_reason() {
		return Err(err.into());
	}

	Ok(count)
}
