#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use taf::config::ParseOptions;

fuzz_target!(|data: Vec<u8>| {
	let _ = taf::file::read_header_info(&mut Cursor::new(data), ParseOptions::new());
});
