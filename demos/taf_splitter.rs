#![allow(missing_docs)]

use structopt::StructOpt;

use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(name = "taf_splitter", about = "Split a TAF file into one Opus file per chapter")]
struct Opt {
	/// Where to write the chapters, defaults to the current directory
	#[structopt(short, long, parse(from_os_str), default_value = ".")]
	output: PathBuf,

	#[structopt(parse(from_os_str))]
	path: PathBuf,
}

fn main() {
	env_logger::init();

	let opt = Opt::from_args();

	let chapters = taf::split(&opt.path, &opt.output).expect("ERROR: Failed to split file!");

	for chapter in chapters {
		println!("Wrote {}", chapter.display());
	}
}
