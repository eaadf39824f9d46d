#![allow(missing_docs)]

use taf::compare::compare;

use structopt::StructOpt;

use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(name = "taf_compare", about = "Compare two TAF files")]
struct Opt {
	/// Compare the streams page by page
	#[structopt(short, long)]
	detailed: bool,

	#[structopt(parse(from_os_str))]
	a: PathBuf,

	#[structopt(parse(from_os_str))]
	b: PathBuf,
}

fn main() {
	env_logger::init();

	let opt = Opt::from_args();

	let result = compare(&opt.a, &opt.b, opt.detailed);

	if result.identical() {
		println!("Files are identical");
		return;
	}

	println!("Size difference: {:+} bytes", result.file_size_diff());

	for issue in result.issues() {
		println!("ERROR: {issue}");
	}

	if !result.metadata_diff().is_empty() {
		println!("--- Metadata ---");
		for (field, diff) in result.metadata_diff() {
			println!("{field}: {diff}");
		}
	}

	if !result.audio_diff().is_empty() {
		println!("--- Audio ---");
		for (field, diff) in result.audio_diff() {
			println!("{field}: {diff}");
		}
	}

	let Some(pages) = result.ogg_pages_diff() else {
		return;
	};

	println!("--- Pages ---");
	println!("Pages: {} -> {}", pages.total_pages_a(), pages.total_pages_b());

	for page in pages.page_differences() {
		if let Some(side) = page.only_in() {
			println!("Page {}: Only in {side}", page.page_index());
			continue;
		}

		for (field, diff) in page.differing_fields() {
			println!("Page {}: {field}: {diff}", page.page_index());
		}
	}

	for anomaly in pages.checksum_anomalies() {
		println!(
			"WARN: Page {} of file {} has checksum {:#010x}, expected {:#010x}",
			anomaly.page_index, anomaly.side, anomaly.stored, anomaly.computed
		);
	}
}
