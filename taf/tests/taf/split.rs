use crate::util::{PRE_SKIP, SAMPLES_PER_PAGE, TafBuilder, read_pages, write_file};

use taf::error::ErrorKind;
use taf::header::AUDIO_REGION_OFFSET;

use std::path::Path;

use ogg_pager::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, Page};

fn granule(audio_page: u64) -> u64 {
	(audio_page + 1) * SAMPLES_PER_PAGE + u64::from(PRE_SKIP)
}

fn assert_playable(pages: &[Page]) {
	for (index, page) in pages.iter().enumerate() {
		assert_eq!(page.header().sequence_number, index as u32);
		assert_eq!(page.compute_crc(), page.header().checksum(), "page {index}");

		let flag = page.header().header_type_flag();
		assert_eq!(
			flag & CONTAINS_FIRST_PAGE_OF_BITSTREAM != 0,
			index == 0,
			"page {index}"
		);
		assert_eq!(
			flag & CONTAINS_LAST_PAGE_OF_BITSTREAM != 0,
			index + 1 == pages.len(),
			"page {index}"
		);
	}

	assert!(pages[0].content().starts_with(b"OpusHead"));
	assert!(pages[1].content().starts_with(b"OpusTags"));
}

fn file_names(dir: &Path) -> Vec<String> {
	let mut names = std::fs::read_dir(dir)
		.unwrap()
		.map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
		.collect::<Vec<_>>();
	names.sort();
	names
}

#[test_log::test]
fn split_by_chapters() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(250)
		.chapters(&[0, 100, 200])
		.write(dir.path(), "story.taf");

	let out = dir.path().join("out");
	let written = taf::split(&path, &out).unwrap();

	assert_eq!(
		written,
		[
			out.join("01_story.opus"),
			out.join("02_story.opus"),
			out.join("03_story.opus"),
		]
	);
	assert_eq!(
		file_names(&out),
		["01_story.opus", "02_story.opus", "03_story.opus"]
	);

	let expected = [(0, 102), (100, 102), (200, 52)];
	for (path, (first_audio_page, page_count)) in written.iter().zip(expected) {
		let pages = read_pages(path);
		assert_eq!(pages.len(), page_count);
		assert_playable(&pages);

		// Granule positions are untouched
		for (offset, page) in pages[2..].iter().enumerate() {
			assert_eq!(page.header().abgp, granule(first_audio_page + offset as u64));
		}
	}
}

#[test_log::test]
fn no_chapters() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(20);
	let path = builder.write(dir.path(), "story.taf");

	let written = taf::split(&path, dir.path()).unwrap();
	assert_eq!(written, [dir.path().join("01_story.opus")]);

	// Nothing needs to change, the stream is copied as is
	let file = std::fs::read(&path).unwrap();
	let chapter = std::fs::read(&written[0]).unwrap();
	assert_eq!(chapter, file[AUDIO_REGION_OFFSET as usize..]);
}

#[test_log::test]
fn pages_before_first_chapter() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(10).chapters(&[3, 6]).write(dir.path(), "story.taf");

	let written = taf::split(&path, dir.path().join("out")).unwrap();
	assert_eq!(written.len(), 2);

	let first = read_pages(&written[0]);
	assert_eq!(first.len(), 5);
	assert_playable(&first);
	assert_eq!(first[2].header().abgp, granule(3));

	let second = read_pages(&written[1]);
	assert_eq!(second.len(), 6);
	assert_playable(&second);
	assert_eq!(second[5].header().abgp, granule(9));
}

#[test_log::test]
fn chapter_past_end() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(10).chapters(&[0, 50]).write(dir.path(), "story.taf");

	let written = taf::split(&path, dir.path().join("out")).unwrap();
	assert_eq!(written.len(), 2);
	assert_eq!(read_pages(&written[0]).len(), 12);

	// Only the stream headers
	let empty = read_pages(&written[1]);
	assert_eq!(empty.len(), 2);
	assert_playable(&empty);
}

#[test_log::test]
fn unordered_chapters() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(8).chapters(&[0, 5, 3]).write(dir.path(), "story.taf");

	let written = taf::split(&path, dir.path().join("out")).unwrap();
	let page_counts = written
		.iter()
		.map(|path| read_pages(path).len())
		.collect::<Vec<_>>();

	assert_eq!(page_counts, [7, 2, 5]);
}

#[test_log::test]
fn nothing_to_split() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(0).write(dir.path(), "story.taf");
	let out = dir.path().join("out");

	let err = taf::split(&path, &out).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::NothingToSplit));
	assert!(file_names(&out).is_empty());
}

#[test_log::test]
fn invalid_input() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("out");

	let garbage = write_file(dir.path(), "garbage.taf", &[0xFF; 5000]);
	assert!(taf::split(&garbage, &out).unwrap_err().is_header_error());

	let missing = taf::split(dir.path().join("missing.taf"), &out).unwrap_err();
	assert!(missing.is_not_found());

	assert!(!out.exists());
}

#[test_log::test]
fn replaces_existing_files() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("nested").join("out");
	std::fs::create_dir_all(&out).unwrap();
	write_file(&out, "01_story.opus", b"stale");

	let path = TafBuilder::new(4).write(dir.path(), "story.taf");
	let written = taf::split(&path, &out).unwrap();

	assert_eq!(file_names(&out), ["01_story.opus"]);
	assert_eq!(read_pages(&written[0]).len(), 6);
}

#[test_log::test]
fn creates_output_dir() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("a").join("b");

	let path = TafBuilder::new(4).chapters(&[0, 2]).write(dir.path(), "story.taf");
	let written = taf::split(&path, &out).unwrap();

	assert!(out.is_dir());
	assert_eq!(file_names(&out), ["01_story.opus", "02_story.opus"]);
	assert_eq!(written.len(), 2);
}

#[test_log::test]
fn blocked_output_name() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("out");

	// A directory can't be replaced by a chapter file
	std::fs::create_dir_all(out.join("02_story.opus")).unwrap();

	let path = TafBuilder::new(6).chapters(&[0, 2, 4]).write(dir.path(), "story.taf");
	let err = taf::split(&path, &out).unwrap_err();
	assert!(!err.is_header_error());

	// Neither the first chapter nor any temporary file is left behind
	assert_eq!(file_names(&out), ["02_story.opus"]);
	assert!(out.join("02_story.opus").is_dir());
}

#[test_log::test]
fn many_chapters() {
	let dir = tempfile::tempdir().unwrap();
	let chapters = (0..1000).collect::<Vec<u32>>();
	let path = TafBuilder::new(20).chapters(&chapters).write(dir.path(), "story.taf");

	let written = taf::split(&path, dir.path().join("out")).unwrap();
	assert_eq!(written.len(), 1000);
	assert_eq!(read_pages(&written[19]).len(), 3);
	assert_eq!(read_pages(&written[999]).len(), 2);
}
