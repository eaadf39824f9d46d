//! Splitting TAF files into one playable Opus file per chapter
//!
//! Every output file gets a copy of the identification and comments pages, followed by the
//! audio pages of its chapter. Pages are renumbered from 0 within each file, and the last page
//! of each file is marked as the end of the stream. Granule positions are copied as is.
//!
//! No chapter file appears in the output directory until every chapter has been read.

use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::TafFile;
use crate::header::read_header;
use crate::macros::err;
use crate::opus;

use std::io::{BufWriter, IntoInnerError, Write};
use std::path::{Path, PathBuf};

use ogg_pager::{CONTAINS_LAST_PAGE_OF_BITSTREAM, Page, PageError, PageReader};
use tempfile::{NamedTempFile, TempPath};

/// Split the TAF file at `path` into one Opus file per chapter
///
/// This uses the default [`ParseOptions`], see [`split_with_options`] to specify them.
///
/// # Errors
///
/// See [`split_with_options`]
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> taf::error::Result<()> {
/// let chapters = taf::split::split("story.taf", "chapters")?;
///
/// // "chapters/01_story.opus", "chapters/02_story.opus", ...
/// for chapter in chapters {
/// 	println!("Wrote {}", chapter.display());
/// }
/// # Ok(()) }
/// ```
pub fn split<P, D>(path: P, output_dir: D) -> Result<Vec<PathBuf>>
where
	P: AsRef<Path>,
	D: AsRef<Path>,
{
	split_with_options(path, output_dir, ParseOptions::default())
}

/// Split the TAF file at `path` into one Opus file per chapter
///
/// Chapter `n` (counting from 1) of `story.taf` is written to `<output_dir>/<nn>_story.opus`.
/// Existing files are replaced, and `output_dir` is created if needed. The paths of the written
/// files are returned in chapter order.
///
/// A header without chapter pages produces a single file. Chapters starting past the end of
/// the stream are written without audio pages.
///
/// # Errors
///
/// * `path` does not exist
/// * The header can't be decoded, see [`read_header`]
/// * The audio stream is invalid, see [`opus::analyze`]
/// * The stream has no audio pages, see [`ErrorKind::NothingToSplit`](crate::error::ErrorKind::NothingToSplit)
/// * [`std::io::Error`]
///
/// No output file is left behind on error.
pub fn split_with_options<P, D>(
	path: P,
	output_dir: D,
	parse_options: ParseOptions,
) -> Result<Vec<PathBuf>>
where
	P: AsRef<Path>,
	D: AsRef<Path>,
{
	let file = TafFile::open(path)?;
	let output_dir = output_dir.as_ref();

	let mut reader = file.reader()?;
	let (_, header) = read_header(&mut reader)?;

	opus::analyze(&mut reader, parse_options)?;
	let header_pages = opus::read_header_pages(&mut reader)?;

	let mut chapter_starts = header.chapter_pages.clone();
	if chapter_starts.is_empty() {
		chapter_starts.push(0);
	}

	if !header.chapters_ordered() {
		log::warn!("Split: Chapter pages are not strictly increasing, some chapters will be empty");
	}

	std::fs::create_dir_all(output_dir)?;

	// Only the chapter being written holds a file open, earlier ones are kept as paths
	let mut finished = Vec::with_capacity(chapter_starts.len());
	let mut current = ChapterWriter::new(output_dir, &header_pages)?;

	let mut pages = PageReader::new(&mut reader)?;
	let mut skipped = 0;
	let mut audio_page_count = 0;

	for (index, page) in pages.by_ref().enumerate() {
		audio_page_count += 1;

		if (index as u64) < u64::from(chapter_starts[0]) {
			skipped += 1;
			continue;
		}

		while let Some(&next_start) = chapter_starts.get(finished.len() + 1) {
			if (index as u64) < u64::from(next_start) {
				break;
			}

			let next = ChapterWriter::new(output_dir, &header_pages)?;
			finished.push(std::mem::replace(&mut current, next).finish()?);
		}

		current.push(page)?;
	}

	match pages.take_stop_reason() {
		Some(PageError::Io(err)) => return Err(err.into()),
		Some(err) => log::warn!("Split: Stream ended after {audio_page_count} audio pages: {err}"),
		None => {},
	}

	if audio_page_count == 0 {
		err!(NothingToSplit);
	}

	if skipped > 0 {
		log::warn!(
			"Split: Skipped {skipped} audio pages before the first chapter, which starts at page {}",
			chapter_starts[0]
		);
	}

	// Chapters that start past the end of the stream
	while finished.len() + 1 < chapter_starts.len() {
		log::warn!(
			"Split: Chapter {} starts at page {}, but the stream only has {audio_page_count} \
			 audio pages",
			finished.len() + 2,
			chapter_starts[finished.len() + 1]
		);

		let next = ChapterWriter::new(output_dir, &header_pages)?;
		finished.push(std::mem::replace(&mut current, next).finish()?);
	}

	finished.push(current.finish()?);

	let stem = file
		.path()
		.file_stem()
		.map_or_else(|| String::from("audio"), |stem| stem.to_string_lossy().into_owned());

	let mut written = Vec::with_capacity(finished.len());
	for (index, temp_path) in finished.into_iter().enumerate() {
		let output_path = output_dir.join(format!("{:02}_{stem}.opus", index + 1));

		// The remaining temporary files are deleted as they're dropped
		if let Err(e) = temp_path.persist(&output_path) {
			log::error!("Split: Unable to write `{}`: {}", output_path.display(), e.error);
			remove_outputs(&written);
			return Err(e.error.into());
		}

		log::debug!("Split: Wrote `{}`", output_path.display());
		written.push(output_path);
	}

	Ok(written)
}

fn remove_outputs(written: &[PathBuf]) {
	for path in written {
		if let Err(e) = std::fs::remove_file(path) {
			log::warn!("Split: Unable to remove `{}`: {e}", path.display());
		}
	}
}

// One output file, held back until every chapter has been written
struct ChapterWriter {
	writer: BufWriter<NamedTempFile>,
	next_sequence_number: u32,
	// The last page is held back, so it can be marked as the end of the stream
	pending: Option<Page>,
}

impl ChapterWriter {
	fn new(output_dir: &Path, header_pages: &[Page]) -> Result<Self> {
		let file = tempfile::Builder::new()
			.prefix(".taf-split-")
			.suffix(".tmp")
			.tempfile_in(output_dir)?;

		let mut writer = Self {
			writer: BufWriter::new(file),
			next_sequence_number: 0,
			pending: None,
		};

		for page in header_pages {
			writer.push(page.clone())?;
		}

		Ok(writer)
	}

	fn push(&mut self, mut page: Page) -> Result<()> {
		let sequence_number = self.next_sequence_number;
		self.next_sequence_number = self.next_sequence_number.wrapping_add(1);

		// Untouched pages keep their original checksum
		if page.header().sequence_number != sequence_number {
			page.header_mut().sequence_number = sequence_number;
			page.gen_crc();
		}

		if let Some(previous) = self.pending.replace(page) {
			self.writer.write_all(&previous.as_bytes())?;
		}

		Ok(())
	}

	// Closes the file, the returned path still deletes it when dropped
	fn finish(mut self) -> Result<TempPath> {
		if let Some(mut last) = self.pending.take() {
			let flag = last.header().header_type_flag();
			if flag & CONTAINS_LAST_PAGE_OF_BITSTREAM == 0 {
				last.header_mut()
					.set_header_type_flag(flag | CONTAINS_LAST_PAGE_OF_BITSTREAM);
				last.gen_crc();
			}

			self.writer.write_all(&last.as_bytes())?;
		}

		let file = self.writer.into_inner().map_err(IntoInnerError::into_error)?;
		Ok(file.into_temp_path())
	}
}
