//! Various configuration options to control taf

mod parse_options;

pub use parse_options::{ParseOptions, ParsingMode};
