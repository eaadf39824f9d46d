//! Structural comparison of two TAF files
//!
//! Comparison never fails. Files that can't be opened or decoded are reported as
//! [`ComparisonIssue`]s in the result, so a batch of comparisons can't be stopped by a
//! single bad file.
//!
//! ## Stages
//!
//! * If both files have the same size and the same digest, they are identical and nothing
//!   else is read.
//! * The decoded headers and stream headers are compared field by field, see
//!   [`ComparisonResult::metadata_diff`] and [`ComparisonResult::audio_diff`].
//! * In detailed mode, the pages of both streams are compared in lock-step, see [`OggPagesDiff`].
//!
//! The padding in the header region is never compared.

mod pages;

use crate::config::ParseOptions;
use crate::header::{AUDIO_REGION_OFFSET, TonieHeader, read_header};
use crate::opus::{self, AudioStreamInfo, StreamSummary};
use crate::util::hash::{SHA1_LEN, sha1_to_end, to_hex};

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

pub use pages::{ChecksumAnomaly, OggPagesDiff, PageDiff};

/// One of the two compared files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
	/// The first file
	A,
	/// The second file
	B,
}

impl Display for Side {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::A => write!(f, "A"),
			Self::B => write!(f, "B"),
		}
	}
}

/// The stage of a comparison an issue arose in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Stage {
	/// Opening or hashing the file
	Open,
	/// Decoding the header region
	Header,
	/// Decoding the stream headers, or walking the stream
	Stream,
	/// Reading pages for the detailed diff
	Pages,
}

impl Display for Stage {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Open => write!(f, "open"),
			Self::Header => write!(f, "header"),
			Self::Stream => write!(f, "stream"),
			Self::Pages => write!(f, "pages"),
		}
	}
}

/// A failure to read one of the compared files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonIssue {
	/// The file the issue arose in
	pub side: Side,
	/// The stage the issue arose in
	pub stage: Stage,
	/// A description of the issue, including the path of the file
	pub message: String,
}

impl Display for ComparisonIssue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}] {}: {}", self.side, self.stage, self.message)
	}
}

/// A compared value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
	/// The value is not present in the file, or could not be read
	Absent,
	/// An unsigned integer
	Unsigned(u64),
	/// A signed integer
	Signed(i64),
	/// Text, such as a comment
	Text(String),
	/// A list of page indices
	Pages(Vec<u32>),
	/// A SHA-1 digest
	Digest([u8; SHA1_LEN]),
	/// A duration
	Duration(Duration),
}

impl Display for FieldValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Absent => write!(f, "<absent>"),
			Self::Unsigned(value) => write!(f, "{value}"),
			Self::Signed(value) => write!(f, "{value}"),
			Self::Text(value) => write!(f, "{value:?}"),
			Self::Pages(pages) => write!(f, "{pages:?}"),
			Self::Digest(digest) => write!(f, "{}", to_hex(digest)),
			Self::Duration(duration) => write!(f, "{:.3}s", duration.as_secs_f64()),
		}
	}
}

impl<T> From<Option<T>> for FieldValue
where
	T: Into<FieldValue>,
{
	fn from(input: Option<T>) -> Self {
		input.map_or(Self::Absent, Into::into)
	}
}

macro_rules! impl_from_for_field_value {
	($($ty:ty => $variant:ident),+ $(,)?) => {
		$(
			impl From<$ty> for FieldValue {
				fn from(input: $ty) -> Self {
					Self::$variant(input.into())
				}
			}
		)+
	};
}

impl_from_for_field_value!(
	u8 => Unsigned,
	u16 => Unsigned,
	u32 => Unsigned,
	u64 => Unsigned,
	i16 => Signed,
	String => Text,
	Vec<u32> => Pages,
	[u8; SHA1_LEN] => Digest,
	Duration => Duration,
);

/// A value that differs between the two files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDiff {
	/// The value in file A
	pub a: FieldValue,
	/// The value in file B
	pub b: FieldValue,
}

impl Display for ValueDiff {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} -> {}", self.a, self.b)
	}
}

/// The result of comparing two files
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparisonResult {
	pub(crate) identical: bool,
	pub(crate) file_size_diff: i64,
	pub(crate) metadata_diff: BTreeMap<String, ValueDiff>,
	pub(crate) audio_diff: BTreeMap<String, ValueDiff>,
	pub(crate) ogg_pages_diff: Option<OggPagesDiff>,
	pub(crate) issues: Vec<ComparisonIssue>,
}

impl ComparisonResult {
	/// Whether the files are equivalent
	///
	/// This is the case when the files are byte-identical, or when no difference and no
	/// issue was found.
	pub fn identical(&self) -> bool {
		self.identical
	}

	/// The size of file B minus the size of file A
	///
	/// This is 0 if the size of either file is unknown.
	pub fn file_size_diff(&self) -> i64 {
		self.file_size_diff
	}

	/// Header and comment fields that differ
	///
	/// The keys are `header_size`, `data_length`, `timestamp`, `chapter_pages`, `data_hash`,
	/// `vendor`, and `comment:<KEY>` for every comment key.
	pub fn metadata_diff(&self) -> &BTreeMap<String, ValueDiff> {
		&self.metadata_diff
	}

	/// Stream properties that differ
	///
	/// The keys are `opus_version`, `channel_count`, `sample_rate`, `stream_serial`, `pre_skip`,
	/// `output_gain`, `duration`, `page_count`, and `audio_sha1` (the digest of the audio region).
	pub fn audio_diff(&self) -> &BTreeMap<String, ValueDiff> {
		&self.audio_diff
	}

	/// The page-level diff, only present for detailed comparisons
	pub fn ogg_pages_diff(&self) -> Option<&OggPagesDiff> {
		self.ogg_pages_diff.as_ref()
	}

	/// Failures to read either file
	pub fn issues(&self) -> &[ComparisonIssue] {
		&self.issues
	}
}

/// Compare two TAF files
///
/// This uses the default [`ParseOptions`], see [`compare_with_options`] to specify them.
///
/// # Examples
///
/// ```rust,no_run
/// let result = taf::compare::compare("a.taf", "b.taf", false);
///
/// for (field, diff) in result.metadata_diff() {
/// 	println!("{field}: {diff}");
/// }
/// ```
pub fn compare<A, B>(path_a: A, path_b: B, detailed: bool) -> ComparisonResult
where
	A: AsRef<Path>,
	B: AsRef<Path>,
{
	compare_with_options(path_a, path_b, detailed, ParseOptions::default())
}

/// Compare two TAF files
///
/// When `detailed` is set, the pages of both streams are compared as well, see
/// [`ComparisonResult::ogg_pages_diff`].
///
/// # Examples
///
/// ```rust,no_run
/// use taf::config::ParseOptions;
///
/// let options = ParseOptions::new().verify_checksums(false);
/// let result = taf::compare::compare_with_options("a.taf", "b.taf", true, options);
///
/// if let Some(pages) = result.ogg_pages_diff() {
/// 	println!("{} page(s) differ", pages.page_differences().len());
/// }
/// ```
pub fn compare_with_options<A, B>(
	path_a: A,
	path_b: B,
	detailed: bool,
	parse_options: ParseOptions,
) -> ComparisonResult
where
	A: AsRef<Path>,
	B: AsRef<Path>,
{
	let (path_a, path_b) = (path_a.as_ref(), path_b.as_ref());
	let mut result = ComparisonResult::default();

	let size_a = file_size(path_a, Side::A, &mut result.issues);
	let size_b = file_size(path_b, Side::B, &mut result.issues);

	if let (Some(size_a), Some(size_b)) = (size_a, size_b) {
		result.file_size_diff = size_b as i64 - size_a as i64;

		if size_a == size_b && same_content(path_a, path_b) {
			log::debug!("Compare: Files are byte-identical");
			result.identical = true;

			if detailed {
				result.ogg_pages_diff = Some(identical_pages_diff(path_a, &mut result.issues));
				result.identical = result.issues.is_empty();
			}

			return result;
		}
	}

	let snapshot_a = Snapshot::load(path_a, Side::A, size_a, parse_options, &mut result.issues);
	let snapshot_b = Snapshot::load(path_b, Side::B, size_b, parse_options, &mut result.issues);

	result.metadata_diff = diff_metadata(&snapshot_a, &snapshot_b);
	result.audio_diff = diff_audio(&snapshot_a, &snapshot_b);

	if detailed {
		result.ogg_pages_diff = Some(pages::diff_pages(
			path_a,
			path_b,
			parse_options,
			&mut result.issues,
		));
	}

	result.identical = result.file_size_diff == 0
		&& result.metadata_diff.is_empty()
		&& result.audio_diff.is_empty()
		&& result
			.ogg_pages_diff
			.as_ref()
			.is_none_or(|pages| pages.page_differences.is_empty())
		&& result.issues.is_empty();

	result
}

fn file_size(path: &Path, side: Side, issues: &mut Vec<ComparisonIssue>) -> Option<u64> {
	match std::fs::metadata(path) {
		Ok(metadata) => Some(metadata.len()),
		Err(err) => {
			issues.push(ComparisonIssue {
				side,
				stage: Stage::Open,
				message: format!("Unable to open `{}`: {err}", path.display()),
			});
			None
		},
	}
}

fn same_content(path_a: &Path, path_b: &Path) -> bool {
	let digest = |path: &Path| -> crate::error::Result<[u8; SHA1_LEN]> {
		sha1_to_end(&mut BufReader::new(File::open(path)?))
	};

	match (digest(path_a), digest(path_b)) {
		(Ok(a), Ok(b)) => a == b,
		// Anything unreadable is picked up again by the slow path
		_ => false,
	}
}

fn identical_pages_diff(path: &Path, issues: &mut Vec<ComparisonIssue>) -> OggPagesDiff {
	let total_pages = match pages::count_pages(path) {
		Ok(count) => count,
		Err(err) => {
			issues.push(ComparisonIssue {
				side: Side::A,
				stage: Stage::Pages,
				message: format!("Unable to read pages of `{}`: {err}", path.display()),
			});
			0
		},
	};

	OggPagesDiff {
		total_pages_a: total_pages,
		total_pages_b: total_pages,
		..OggPagesDiff::default()
	}
}

// Everything read from one of the files, with anything unreadable left empty
#[derive(Default)]
struct Snapshot {
	header: Option<(u32, TonieHeader)>,
	audio_sha1: Option<[u8; SHA1_LEN]>,
	stream: Option<AudioStreamInfo>,
	summary: Option<StreamSummary>,
}

impl Snapshot {
	fn load(
		path: &Path,
		side: Side,
		size: Option<u64>,
		parse_options: ParseOptions,
		issues: &mut Vec<ComparisonIssue>,
	) -> Self {
		let mut snapshot = Self::default();

		// Already reported while checking the file size
		if size.is_none() {
			return snapshot;
		}

		let mut issue = |stage: Stage, err: &dyn Display| {
			log::debug!("Compare: File {side} failed at the {stage} stage: {err}");
			issues.push(ComparisonIssue {
				side,
				stage,
				message: format!("`{}`: {err}", path.display()),
			});
		};

		let mut reader = match File::open(path) {
			Ok(file) => BufReader::new(file),
			Err(err) => {
				issue(Stage::Open, &err);
				return snapshot;
			},
		};

		match read_header(&mut reader) {
			Ok(header) => snapshot.header = Some(header),
			Err(err) => issue(Stage::Header, &err),
		}

		let audio_sha1 = reader
			.seek(SeekFrom::Start(AUDIO_REGION_OFFSET))
			.map_err(Into::into)
			.and_then(|_| sha1_to_end(&mut reader));
		match audio_sha1 {
			Ok(digest) => snapshot.audio_sha1 = Some(digest),
			Err(err) => issue(Stage::Open, &err),
		}

		// The stream can still be compared if the header is damaged
		match opus::analyze(&mut reader, parse_options) {
			Ok(stream) => snapshot.stream = Some(stream),
			Err(err) => issue(Stage::Stream, &err),
		}

		// Checksums are checked by the page diff, if at all
		let pre_skip = snapshot.stream.as_ref().map_or(0, AudioStreamInfo::pre_skip);
		let scan_options = ParseOptions {
			verify_checksums: false,
			..parse_options
		};
		match opus::scan_stream(&mut reader, pre_skip, scan_options) {
			Ok(summary) => snapshot.summary = Some(summary),
			Err(err) => issue(Stage::Stream, &err),
		}

		snapshot
	}

	fn comments(&self) -> BTreeMap<&str, Vec<&str>> {
		let mut comments = BTreeMap::<&str, Vec<&str>>::new();

		if let Some(stream) = &self.stream {
			for (key, value) in stream.comments().items() {
				comments.entry(key).or_default().push(value);
			}
		}

		comments
	}
}

fn push_diff(
	diffs: &mut BTreeMap<String, ValueDiff>,
	key: impl Into<String>,
	a: impl Into<FieldValue>,
	b: impl Into<FieldValue>,
) {
	let (a, b) = (a.into(), b.into());
	if a != b {
		diffs.insert(key.into(), ValueDiff { a, b });
	}
}

fn diff_metadata(a: &Snapshot, b: &Snapshot) -> BTreeMap<String, ValueDiff> {
	let mut diffs = BTreeMap::new();

	let header_a = a.header.as_ref();
	let header_b = b.header.as_ref();

	push_diff(
		&mut diffs,
		"header_size",
		header_a.map(|(size, _)| *size),
		header_b.map(|(size, _)| *size),
	);
	push_diff(
		&mut diffs,
		"data_length",
		header_a.map(|(_, h)| h.data_length),
		header_b.map(|(_, h)| h.data_length),
	);
	push_diff(
		&mut diffs,
		"timestamp",
		header_a.map(|(_, h)| h.timestamp),
		header_b.map(|(_, h)| h.timestamp),
	);
	push_diff(
		&mut diffs,
		"chapter_pages",
		header_a.map(|(_, h)| h.chapter_pages.clone()),
		header_b.map(|(_, h)| h.chapter_pages.clone()),
	);
	push_diff(
		&mut diffs,
		"data_hash",
		header_a.and_then(|(_, h)| h.audio_sha1),
		header_b.and_then(|(_, h)| h.audio_sha1),
	);

	push_diff(
		&mut diffs,
		"vendor",
		a.stream.as_ref().map(|s| s.comments().vendor().to_owned()),
		b.stream.as_ref().map(|s| s.comments().vendor().to_owned()),
	);

	let comments_a = a.comments();
	let comments_b = b.comments();

	let mut keys = comments_a.keys().chain(comments_b.keys()).collect::<Vec<_>>();
	keys.sort_unstable();
	keys.dedup();

	for key in keys {
		// Repeated keys are compared as a whole
		let joined = |comments: &BTreeMap<&str, Vec<&str>>| comments.get(key).map(|v| v.join("; "));
		push_diff(
			&mut diffs,
			format!("comment:{key}"),
			joined(&comments_a),
			joined(&comments_b),
		);
	}

	diffs
}

fn diff_audio(a: &Snapshot, b: &Snapshot) -> BTreeMap<String, ValueDiff> {
	let mut diffs = BTreeMap::new();

	let stream_a = a.stream.as_ref();
	let stream_b = b.stream.as_ref();

	push_diff(
		&mut diffs,
		"opus_version",
		stream_a.map(AudioStreamInfo::version),
		stream_b.map(AudioStreamInfo::version),
	);
	push_diff(
		&mut diffs,
		"channel_count",
		stream_a.map(AudioStreamInfo::channels),
		stream_b.map(AudioStreamInfo::channels),
	);
	push_diff(
		&mut diffs,
		"sample_rate",
		stream_a.map(AudioStreamInfo::sample_rate),
		stream_b.map(AudioStreamInfo::sample_rate),
	);
	push_diff(
		&mut diffs,
		"stream_serial",
		stream_a.map(AudioStreamInfo::stream_serial),
		stream_b.map(AudioStreamInfo::stream_serial),
	);
	push_diff(
		&mut diffs,
		"pre_skip",
		stream_a.map(AudioStreamInfo::pre_skip),
		stream_b.map(AudioStreamInfo::pre_skip),
	);
	push_diff(
		&mut diffs,
		"output_gain",
		stream_a.map(AudioStreamInfo::output_gain),
		stream_b.map(AudioStreamInfo::output_gain),
	);

	let summary_a = a.summary.as_ref();
	let summary_b = b.summary.as_ref();

	push_diff(
		&mut diffs,
		"duration",
		summary_a.map(StreamSummary::duration),
		summary_b.map(StreamSummary::duration),
	);
	push_diff(
		&mut diffs,
		"page_count",
		summary_a.map(|s| s.page_count() as u64),
		summary_b.map(|s| s.page_count() as u64),
	);
	push_diff(&mut diffs, "audio_sha1", a.audio_sha1, b.audio_sha1);

	diffs
}
