use crate::util::{TafBuilder, write_file};

use taf::config::{ParseOptions, ParsingMode};
use taf::error::{ErrorKind, HeaderDecodeErrorKind};
use taf::opus::StreamAnomaly;
use taf::validate::{ValidationWarning, check_valid, check_valid_with_options, validate};

use std::time::Duration;

#[test_log::test]
fn valid_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(50).chapters(&[0, 20, 40]).write(dir.path(), "story.taf");

	assert!(check_valid(&path).unwrap());

	let report = validate(&path, ParseOptions::new()).unwrap();
	assert!(report.is_clean(), "{:?}", report.warnings());
	assert_eq!(report.header().chapter_pages, vec![0, 20, 40]);
	assert_eq!(report.stream().channels(), 2);

	let summary = report.summary();
	assert_eq!(summary.page_count(), 52);
	assert_eq!(summary.audio_page_count(), 50);
	assert_eq!(summary.duration(), Duration::from_secs(1));
	assert_eq!(summary.stream_size(), report.file_size() - 4096);
}

#[test_log::test]
fn missing_file() {
	let dir = tempfile::tempdir().unwrap();
	assert!(!check_valid(dir.path().join("missing.taf")).unwrap());

	let err = validate(dir.path().join("missing.taf"), ParseOptions::new()).unwrap_err();
	assert!(err.is_not_found());
}

#[test_log::test]
fn arbitrary_bytes() {
	let dir = tempfile::tempdir().unwrap();
	let content = (0..10_000_u32).map(|i| (i * 7 % 251) as u8).collect::<Vec<_>>();
	let path = write_file(dir.path(), "garbage.taf", &content);

	let err = check_valid(&path).unwrap_err();
	assert!(err.is_header_error() || err.is_stream_error());
}

#[test_log::test]
fn too_small() {
	let dir = tempfile::tempdir().unwrap();
	let path = write_file(dir.path(), "small.taf", &[0; 100]);

	let err = validate(&path, ParseOptions::new()).unwrap_err();
	let ErrorKind::HeaderDecode(err) = err.kind() else {
		panic!("Expected a header error, got {err:?}");
	};
	assert!(matches!(err.kind(), HeaderDecodeErrorKind::FileTooSmall));
	assert_eq!(err.available(), 100);
}

#[test_log::test]
fn valid_header_damaged_audio() {
	let dir = tempfile::tempdir().unwrap();

	let mut content = TafBuilder::new(3).build();
	// Break the capture pattern of the identification page
	content[4096] = b'X';
	let path = write_file(dir.path(), "damaged.taf", &content);

	let err = check_valid(&path).unwrap_err();
	assert!(err.is_stream_error());
	assert!(!err.is_header_error());

	let ErrorKind::StreamFormat(err) = err.kind() else {
		panic!("Expected a stream error, got {err:?}");
	};
	assert_eq!(err.page(), 0);
}

#[test_log::test]
fn data_length_tolerance() {
	let dir = tempfile::tempdir().unwrap();

	let mut content = TafBuilder::new(5).build();
	content.extend(b"0123456789");
	let path = write_file(dir.path(), "padded.taf", &content);

	// The default tolerance is 0
	let err = validate(&path, ParseOptions::new()).unwrap_err();
	let ErrorKind::HeaderDecode(err) = err.kind() else {
		panic!("Expected a header error, got {err:?}");
	};
	assert!(matches!(
		err.kind(),
		HeaderDecodeErrorKind::DataLengthMismatch { actual, declared } if actual - declared == 10
	));

	let report = validate(&path, ParseOptions::new().data_length_tolerance(10)).unwrap();
	assert!(report.warnings().iter().any(|w| matches!(w, ValidationWarning::DataLengthMismatch { .. })));
	assert!(report.warnings().iter().any(|w| matches!(w, ValidationWarning::AudioDigestMismatch { .. })));
	assert!(report.warnings().iter().any(|w| matches!(
		w,
		ValidationWarning::Stream(StreamAnomaly::TrailingData { length: 10, .. })
	)));

	let relaxed = ParseOptions::new().parsing_mode(ParsingMode::Relaxed);
	assert!(check_valid_with_options(&path, relaxed).unwrap());

	let strict = ParseOptions::new()
		.parsing_mode(ParsingMode::Strict)
		.data_length_tolerance(10);
	assert!(check_valid_with_options(&path, strict).unwrap_err().is_header_error());
}

#[test_log::test]
fn unusual_sample_rate() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(3).sample_rate(44100).write(dir.path(), "44k.taf");

	let report = validate(&path, ParseOptions::new()).unwrap();
	assert_eq!(report.stream().sample_rate(), 44100);
	assert_eq!(
		report.warnings(),
		&[ValidationWarning::UnexpectedSampleRate(44100)]
	);

	let strict = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	assert!(validate(&path, strict).unwrap_err().is_stream_error());
}

#[test_log::test]
fn checksum_mismatch() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(6).bad_checksum(3).write(dir.path(), "checksum.taf");

	let report = validate(&path, ParseOptions::new()).unwrap();
	let [ValidationWarning::Stream(StreamAnomaly::ChecksumMismatch { page, .. })] = report.warnings()
	else {
		panic!("Expected a single checksum warning, got {:?}", report.warnings());
	};
	// Pages are counted from the start of the audio region
	assert_eq!(*page, 5);

	let unchecked = ParseOptions::new().verify_checksums(false);
	assert!(validate(&path, unchecked).unwrap().is_clean());

	let strict = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	let err = validate(&path, strict).unwrap_err();
	let ErrorKind::StreamFormat(err) = err.kind() else {
		panic!("Expected a stream error, got {err:?}");
	};
	assert_eq!(err.page(), 5);
}

#[test_log::test]
fn chapter_problems() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(10).chapters(&[0, 6, 4, 50]).write(dir.path(), "chapters.taf");

	let report = validate(&path, ParseOptions::new()).unwrap();
	assert_eq!(
		report.warnings(),
		&[
			ValidationWarning::ChaptersNotIncreasing,
			ValidationWarning::ChapterOutOfRange {
				chapter: 3,
				page: 50,
				audio_page_count: 10,
			},
		]
	);
}
