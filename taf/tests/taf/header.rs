use crate::util::{PRE_SKIP, SERIAL, TafBuilder, write_file};

use taf::config::ParseOptions;
use taf::file::{TafFile, read_header_info};
use taf::header::{AUDIO_REGION_OFFSET, HEADER_LENGTH, TonieHeader, read_header, write_header};

use std::fs::OpenOptions;
use std::io::Cursor;

#[test_log::test]
fn audio_region_is_fixed() {
	let cases: [&[u32]; 4] = [&[], &[0], &[0, 1, 2, 3], &[0, 2, 4, 6, 8]];

	for chapters in cases {
		let file = TafBuilder::new(10).chapters(chapters).build();

		assert_eq!(&file[AUDIO_REGION_OFFSET as usize..][..4], b"OggS");

		let (header_len, header) = read_header(&mut Cursor::new(&file)).unwrap();
		assert_eq!(header_len, HEADER_LENGTH);
		assert_eq!(header.chapter_pages, chapters);
	}
}

#[test_log::test]
fn header_round_trip() {
	let builder = TafBuilder::new(5).chapters(&[0, 3]);
	let expected = builder.header();

	let (_, header) = read_header(&mut Cursor::new(builder.build())).unwrap();
	assert_eq!(header, expected);
	assert_eq!(header.data_length, builder.audio().len() as u64);
}

#[test_log::test]
fn rewrite_in_place() {
	let dir = tempfile::tempdir().unwrap();
	let original = TafBuilder::new(8).chapters(&[0, 4]).build();
	let path = write_file(dir.path(), "story.taf", &original);

	let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
	let (_, mut header) = read_header(&mut file).unwrap();

	header.timestamp = 42;
	header.chapter_pages = vec![0, 2, 4, 6];
	write_header(&mut file, &header).unwrap();
	drop(file);

	let rewritten = std::fs::read(&path).unwrap();
	assert_eq!(rewritten.len(), original.len());
	assert_eq!(
		rewritten[AUDIO_REGION_OFFSET as usize..],
		original[AUDIO_REGION_OFFSET as usize..]
	);

	let (header_len, reread) = TafFile::open(&path).unwrap().read_header().unwrap();
	assert_eq!(header_len, HEADER_LENGTH);
	assert_eq!(reread, header);
}

#[test_log::test]
fn missing_fields_read_as_defaults() {
	let mut file = TonieHeader::default().as_bytes().unwrap();
	file.extend(TafBuilder::new(1).audio());

	let (_, header) = read_header(&mut Cursor::new(file)).unwrap();
	assert_eq!(header, TonieHeader::default());
	assert_eq!(header.chapter_count(), 1);
}

#[test_log::test]
fn header_info() {
	let builder = TafBuilder::new(4).comment("artist", "Someone");
	let file = builder.build();

	let info = read_header_info(&mut Cursor::new(&file), ParseOptions::new()).unwrap();

	assert_eq!(info.header_size(), HEADER_LENGTH);
	assert_eq!(info.file_size(), file.len() as u64);
	assert_eq!(info.audio_size(), file.len() as u64 - AUDIO_REGION_OFFSET);
	assert_eq!(Some(info.sha1()), info.header().audio_sha1);
	assert_eq!(info.sha1_hex().len(), 40);

	assert!(info.opus_found());
	assert_eq!(info.opus_version(), Some(1));
	assert_eq!(info.channel_count(), Some(2));
	assert_eq!(info.sample_rate(), Some(48000));
	assert_eq!(info.stream_serial(), Some(SERIAL));
	assert_eq!(info.stream().unwrap().pre_skip(), PRE_SKIP);

	let comments = info.comments().unwrap();
	assert_eq!(comments.vendor(), "libopus 1.3.1");
	assert_eq!(comments.get("TITLE"), Some("A story"));
	assert_eq!(comments.get("ARTIST"), Some("Someone"));
}

#[test_log::test]
fn header_info_without_opus() {
	let audio = b"this is not an ogg stream".repeat(20);
	let mut file = TonieHeader::for_audio(&audio, 1, Vec::new()).as_bytes().unwrap();
	file.extend(&audio);

	let info = read_header_info(&mut Cursor::new(&file), ParseOptions::new()).unwrap();
	assert!(!info.opus_found());
	assert_eq!(info.channel_count(), None);
	assert_eq!(info.header().data_length, audio.len() as u64);
}

#[test_log::test]
fn header_info_from_path() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(3).write(dir.path(), "story.taf");

	let info = taf::read_header_info_from_path(&path).unwrap();
	assert!(info.opus_found());

	let missing = taf::read_header_info_from_path(dir.path().join("missing.taf")).unwrap_err();
	assert!(missing.is_not_found());
}
