//! Read, validate, compare, and split TAF audio containers.
//!
//! A TAF file is a fixed 4096 byte header region followed by a single OGG Opus stream:
//!
//! | Offset | Size          | Content                                                  |
//! |--------|---------------|----------------------------------------------------------|
//! | 0      | 4             | Big-endian header length (4092 for conforming writers)   |
//! | 4      | header length | Protobuf encoded [`TonieHeader`](header::TonieHeader)    |
//! | 4096   | remainder     | OGG Opus pages, split into chapters by the header        |
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```rust,no_run
//! # fn main() -> taf::error::Result<()> {
//! let info = taf::read_header_info_from_path("story.taf")?;
//!
//! println!("Chapters: {:?}", info.header().chapter_pages);
//! println!("Opus stream found: {}", info.opus_found());
//! # Ok(()) }
//! ```
//!
//! ## Validating a file
//!
//! A missing file is not an error, but a malformed one is:
//!
//! ```rust,no_run
//! # fn main() -> taf::error::Result<()> {
//! match taf::check_valid("story.taf") {
//! 	Ok(true) => println!("Valid"),
//! 	Ok(false) => println!("No such file"),
//! 	Err(e) if e.is_header_error() => println!("Not a TAF file: {e}"),
//! 	Err(e) => println!("Damaged TAF file: {e}"),
//! }
//! # Ok(()) }
//! ```
//!
//! ## Comparing files
//!
//! Comparison never fails, problems reading either file are part of the result:
//!
//! ```rust,no_run
//! let result = taf::compare("a.taf", "b.taf", true);
//!
//! if !result.identical() {
//! 	println!("Files differ by {} bytes", result.file_size_diff());
//! 	for issue in result.issues() {
//! 		println!("{issue}");
//! 	}
//! }
//! ```
//!
//! ## Splitting chapters
//!
//! ```rust,no_run
//! # fn main() -> taf::error::Result<()> {
//! // Writes "out/01_story.opus", "out/02_story.opus", ...
//! let chapters = taf::split("story.taf", "out")?;
//! # Ok(()) }
//! ```
//!
//! # Concurrency
//!
//! Nothing is shared between calls. Every operation opens its own file handles and closes
//! them before returning, so different files can be processed from different threads.

pub mod compare;
pub mod config;
pub mod error;
pub mod file;
pub mod header;
pub(crate) mod macros;
pub mod opus;
pub mod split;
pub mod validate;
mod util;

pub use crate::compare::compare;
pub use crate::file::read_header_info_from_path;
pub use crate::split::split;
pub use crate::validate::check_valid;

pub mod prelude {
	//! A prelude for commonly used items in the library.
	//!
	//! This module is intended to be wildcard imported.
	//!
	//! ```rust
	//! use taf::prelude::*;
	//! ```

	pub use crate::config::{ParseOptions, ParsingMode};
	pub use crate::error::{ErrorKind, TafError};
	pub use crate::file::{TafFile, TafInfo};
	pub use crate::header::TonieHeader;
}
