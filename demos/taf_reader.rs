#![allow(missing_docs)]

use taf::config::{ParseOptions, ParsingMode};
use taf::file::TafFile;

use structopt::StructOpt;

use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(name = "taf_reader", about = "A simple TAF reader example")]
struct Opt {
	/// Fail on anything that doesn't strictly conform to the format
	#[structopt(short, long)]
	strict: bool,

	/// Walk the whole stream and report any problems
	#[structopt(short, long)]
	validate: bool,

	#[structopt(parse(from_os_str))]
	path: PathBuf,
}

fn main() {
	env_logger::init();

	let opt = Opt::from_args();

	let parsing_mode = if opt.strict {
		ParsingMode::Strict
	} else {
		ParsingMode::BestAttempt
	};
	let parse_options = ParseOptions::new().parsing_mode(parsing_mode);

	let info = TafFile::open(&opt.path)
		.expect("ERROR: Bad path provided!")
		.read_info(parse_options)
		.expect("ERROR: Failed to read file!");

	let header = info.header();

	println!("--- Header ---");
	println!("Header size: {}", info.header_size());
	println!("Timestamp: {}", header.timestamp);
	println!("Declared audio length: {}", header.data_length);
	println!("Audio length: {}", info.audio_size());
	println!("Audio SHA1: {}", info.sha1_hex());
	println!("Chapters: {:?}", header.chapter_pages);

	println!("--- Audio Stream ---");
	match info.stream() {
		Some(stream) => {
			println!("Opus version: {}", stream.version());
			println!("Channels: {}", stream.channels());
			println!("Sample Rate: {}", stream.sample_rate());
			println!("Pre-skip: {}", stream.pre_skip());
			println!("Serial: {:#010x}", stream.stream_serial());

			let comments = stream.comments();
			println!("Vendor: {}", comments.vendor());
			for (key, value) in comments.items() {
				println!("{key}: {value}");
			}
		},
		None => println!("No Opus stream found"),
	}

	if !opt.validate {
		return;
	}

	println!("--- Validation ---");
	match taf::validate::validate(&opt.path, parse_options) {
		Ok(report) => {
			let duration = report.summary().duration();
			let seconds = duration.as_secs() % 60;

			println!("Pages: {}", report.summary().page_count());
			println!(
				"Duration: {:02}:{:02}",
				(duration.as_secs() - seconds) / 60,
				seconds
			);

			if report.is_clean() {
				println!("No problems found");
			}

			for warning in report.warnings() {
				println!("WARN: {warning}");
			}
		},
		Err(e) => println!("ERROR: {e}"),
	}
}
