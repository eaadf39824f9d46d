use crate::util::{TafBuilder, write_file};

use taf::compare::{ComparisonIssue, FieldValue, Side, Stage, ValueDiff, compare};

#[test_log::test]
fn file_is_identical_to_itself() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(12).chapters(&[0, 6]).write(dir.path(), "story.taf");

	let result = compare(&path, &path, true);
	assert!(result.identical());
	assert_eq!(result.file_size_diff(), 0);
	assert!(result.metadata_diff().is_empty());
	assert!(result.audio_diff().is_empty());
	assert!(result.issues().is_empty());

	let pages = result.ogg_pages_diff().unwrap();
	assert_eq!(pages.total_pages_a(), 14);
	assert_eq!(pages.total_pages_b(), 14);
	assert!(pages.page_differences().is_empty());
	assert!(pages.checksum_anomalies().is_empty());
}

#[test_log::test]
fn copies_are_identical() {
	let dir = tempfile::tempdir().unwrap();
	let content = TafBuilder::new(10).build_sized(10_000);

	let a = write_file(dir.path(), "a.taf", &content);
	let b = write_file(dir.path(), "b.taf", &content);

	let result = compare(&a, &b, false);
	assert!(result.identical());
	assert_eq!(result.file_size_diff(), 0);
	assert!(result.ogg_pages_diff().is_none());
}

#[test_log::test]
fn size_difference_is_signed() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(10);

	let small = write_file(dir.path(), "small.taf", &builder.build_sized(10_000));
	let large = write_file(dir.path(), "large.taf", &builder.build_sized(12_000));

	let result = compare(&small, &large, false);
	assert!(!result.identical());
	assert_eq!(result.file_size_diff(), 2000);
	assert!(result.issues().is_empty());
	assert!(result.metadata_diff().contains_key("data_length"));
	assert!(result.metadata_diff().contains_key("data_hash"));

	let reversed = compare(&large, &small, false);
	assert_eq!(reversed.file_size_diff(), -2000);
	assert!(!reversed.identical());

	// Swapping the inputs swaps every value
	for (key, diff) in result.metadata_diff() {
		let swapped = &reversed.metadata_diff()[key];
		assert_eq!(swapped.a, diff.b);
		assert_eq!(swapped.b, diff.a);
	}
}

#[test_log::test]
fn missing_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(3).write(dir.path(), "story.taf");

	let result = compare(&path, dir.path().join("missing.taf"), true);
	assert!(!result.identical());
	assert_eq!(result.issues().len(), 1);
	assert!(matches!(
		result.issues()[0],
		ComparisonIssue {
			side: Side::B,
			stage: Stage::Open,
			..
		}
	));

	assert_eq!(
		result.metadata_diff()["timestamp"],
		ValueDiff {
			a: FieldValue::Unsigned(1_700_000_000),
			b: FieldValue::Absent,
		}
	);
	assert_eq!(result.ogg_pages_diff().unwrap().total_pages_b(), 0);
}

#[test_log::test]
fn unreadable_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = TafBuilder::new(3).write(dir.path(), "story.taf");
	let garbage = write_file(dir.path(), "garbage.taf", &[0xFF; 5000]);

	let result = compare(&garbage, &path, false);
	assert!(!result.identical());
	assert!(
		result
			.issues()
			.iter()
			.any(|issue| issue.side == Side::A && issue.stage == Stage::Header)
	);
	assert!(
		result
			.issues()
			.iter()
			.any(|issue| issue.side == Side::A && issue.stage == Stage::Stream)
	);
	assert!(result.issues().iter().all(|issue| issue.side == Side::A));
}

#[test_log::test]
fn header_only_difference() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(8);

	let a = builder.clone().timestamp(1).chapters(&[0, 4]).write(dir.path(), "a.taf");
	let b = builder.timestamp(2).chapters(&[0, 2, 4]).write(dir.path(), "b.taf");

	let result = compare(&a, &b, true);
	assert!(!result.identical());
	assert_eq!(result.file_size_diff(), 0);
	assert!(result.audio_diff().is_empty());
	assert!(result.issues().is_empty());

	let metadata = result.metadata_diff();
	assert_eq!(metadata.len(), 2);
	assert_eq!(
		metadata["timestamp"],
		ValueDiff {
			a: FieldValue::Unsigned(1),
			b: FieldValue::Unsigned(2),
		}
	);
	assert_eq!(
		metadata["chapter_pages"],
		ValueDiff {
			a: FieldValue::Pages(vec![0, 4]),
			b: FieldValue::Pages(vec![0, 2, 4]),
		}
	);

	let pages = result.ogg_pages_diff().unwrap();
	assert_eq!(pages.total_pages_a(), 10);
	assert!(pages.page_differences().is_empty());
}

#[test_log::test]
fn comment_difference() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(4);

	let a = builder.write(dir.path(), "a.taf");
	let b = builder.comment("ARTIST", "Someone").write(dir.path(), "b.taf");

	let result = compare(&a, &b, false);
	assert!(!result.identical());
	assert_eq!(
		result.metadata_diff()["comment:ARTIST"],
		ValueDiff {
			a: FieldValue::Absent,
			b: FieldValue::Text(String::from("Someone")),
		}
	);
	assert!(!result.metadata_diff().contains_key("comment:TITLE"));
	assert!(!result.metadata_diff().contains_key("vendor"));
}

#[test_log::test]
fn audio_difference() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(6);

	let a = builder.write(dir.path(), "a.taf");
	let b = builder.payload_seed(1).write(dir.path(), "b.taf");

	let result = compare(&a, &b, true);
	assert!(!result.identical());
	assert_eq!(result.file_size_diff(), 0);
	assert!(result.metadata_diff().contains_key("data_hash"));
	assert_eq!(result.audio_diff().keys().collect::<Vec<_>>(), ["audio_sha1"]);

	// Only the payloads, and with them the checksums, differ
	let pages = result.ogg_pages_diff().unwrap();
	assert_eq!(pages.page_differences().len(), 6);
	for (index, page) in pages.page_differences().iter().enumerate() {
		assert_eq!(page.page_index(), index + 2);
		assert_eq!(page.only_in(), None);
		assert_eq!(
			page.differing_fields().keys().copied().collect::<Vec<_>>(),
			["checksum"]
		);
	}
	assert!(pages.checksum_anomalies().is_empty());
}

#[test_log::test]
fn extra_pages() {
	let dir = tempfile::tempdir().unwrap();

	let a = TafBuilder::new(5).write(dir.path(), "a.taf");
	let b = TafBuilder::new(7).write(dir.path(), "b.taf");

	let result = compare(&a, &b, true);
	assert!(!result.identical());
	assert!(result.file_size_diff() > 0);
	assert!(result.audio_diff().contains_key("page_count"));
	assert!(result.audio_diff().contains_key("duration"));

	let pages = result.ogg_pages_diff().unwrap();
	assert_eq!(pages.total_pages_a(), 7);
	assert_eq!(pages.total_pages_b(), 9);

	let only_in_b = pages
		.page_differences()
		.iter()
		.filter(|page| page.only_in() == Some(Side::B))
		.map(|page| page.page_index())
		.collect::<Vec<_>>();
	assert_eq!(only_in_b, [7, 8]);

	// The last page of `a` ends the stream, the same page of `b` doesn't
	let last_a = pages
		.page_differences()
		.iter()
		.find(|page| page.page_index() == 6)
		.unwrap();
	assert!(last_a.differing_fields().contains_key("header_type"));
}

#[test_log::test]
fn checksum_anomalies() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(5);

	let a = builder.write(dir.path(), "a.taf");
	let b = builder.bad_checksum(2).write(dir.path(), "b.taf");

	let result = compare(&a, &b, true);
	assert!(!result.identical());

	let pages = result.ogg_pages_diff().unwrap();
	let [anomaly] = pages.checksum_anomalies() else {
		panic!("Expected a single anomaly, got {:?}", pages.checksum_anomalies());
	};
	assert_eq!(anomaly.side, Side::B);
	assert_eq!(anomaly.page_index, 4);
	assert_ne!(anomaly.stored, anomaly.computed);

	let [page] = pages.page_differences() else {
		panic!("Expected a single page difference, got {:?}", pages.page_differences());
	};
	assert_eq!(page.page_index(), 4);
	assert!(page.differing_fields().contains_key("checksum"));
}

#[test_log::test]
fn stream_serial_difference() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(3);

	let a = builder.write(dir.path(), "a.taf");
	let b = builder.serial(0xCAFE).write(dir.path(), "b.taf");

	let result = compare(&a, &b, true);
	assert!(!result.identical());
	assert_eq!(
		result.audio_diff()["stream_serial"],
		ValueDiff {
			a: FieldValue::Unsigned(0x1234_5678),
			b: FieldValue::Unsigned(0xCAFE),
		}
	);

	// Every page carries the serial
	let pages = result.ogg_pages_diff().unwrap();
	assert_eq!(pages.page_differences().len(), 5);
	assert!(
		pages
			.page_differences()
			.iter()
			.all(|page| page.differing_fields().contains_key("stream_serial"))
	);
}

#[test_log::test]
fn header_slack_is_not_a_difference() {
	let dir = tempfile::tempdir().unwrap();
	let builder = TafBuilder::new(6).chapters(&[0, 3]);

	let padded = builder.build();

	// Replace the padding field with a plain zero fill, leaving the fields untouched
	let mut zero_filled = padded.clone();
	let header = &mut zero_filled[4..4096];
	let length_end = header.iter().rposition(|&b| b != 0).unwrap();
	let mut key = length_end - 1;
	while header[key] & 0x80 != 0 {
		key -= 1;
	}
	assert_eq!(header[key], 0x2A, "expected a padding field key");
	header[key..=length_end].fill(0);
	assert_ne!(zero_filled, padded);

	let a = write_file(dir.path(), "a.taf", &padded);
	let b = write_file(dir.path(), "b.taf", &zero_filled);

	let result = compare(&a, &b, true);
	assert!(result.identical(), "{:?}", result.metadata_diff());
	assert_eq!(result.file_size_diff(), 0);
	assert!(result.metadata_diff().is_empty());
	assert!(result.issues().is_empty());
}
