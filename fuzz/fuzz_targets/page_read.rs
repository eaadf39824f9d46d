#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<u8>| {
	if let Ok(reader) = ogg_pager::PageReader::new(Cursor::new(data)) {
		for _ in reader {}
	}
});
