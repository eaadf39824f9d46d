/// Options to control how taf parses a file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) verify_checksums: bool,
	pub(crate) data_length_tolerance: u64,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	parsing_mode: ParsingMode::BestAttempt,
	/// 	verify_checksums: true,
	/// 	data_length_tolerance: 0,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Default allowed difference between the declared and actual audio length
	pub const DEFAULT_DATA_LENGTH_TOLERANCE: u64 = 0;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use taf::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			verify_checksums: true,
			data_length_tolerance: Self::DEFAULT_DATA_LENGTH_TOLERANCE,
		}
	}

	/// The parsing mode to use, see [`ParsingMode`] for details
	///
	/// # Examples
	///
	/// ```rust
	/// use taf::config::{ParseOptions, ParsingMode};
	///
	/// // By default, `parsing_mode` is ParsingMode::BestAttempt. Here, we need absolute correctness.
	/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	/// ```
	pub fn parsing_mode(&mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		*self
	}

	/// Whether or not to recompute and compare page checksums
	///
	/// Checksums are never checked while simply reading pages. When enabled, validation and
	/// comparison recompute the checksum of every page and report mismatches.
	///
	/// # Examples
	///
	/// ```rust
	/// use taf::config::ParseOptions;
	///
	/// // Checksumming every page is expensive, and I trust my files!
	/// let parsing_options = ParseOptions::new().verify_checksums(false);
	/// ```
	pub fn verify_checksums(&mut self, verify_checksums: bool) -> Self {
		self.verify_checksums = verify_checksums;
		*self
	}

	/// The allowed difference (in bytes) between the audio length declared in the header
	/// and the actual size of the audio region
	///
	/// Differences within the tolerance are reported as warnings. Differences beyond it fail
	/// validation, unless the parsing mode is [`ParsingMode::Relaxed`].
	///
	/// # Examples
	///
	/// ```rust
	/// use taf::config::ParseOptions;
	///
	/// // Some of my files were produced by a writer that miscounts the last page
	/// let parsing_options = ParseOptions::new().data_length_tolerance(4096);
	/// ```
	pub fn data_length_tolerance(&mut self, data_length_tolerance: u64) -> Self {
		self.data_length_tolerance = data_length_tolerance;
		*self
	}
}

/// The parsing strictness mode
///
/// This can be set with [`ParseOptions::parsing_mode`].
///
/// # Examples
///
/// ```rust,no_run
/// use taf::config::{ParseOptions, ParsingMode};
///
/// # fn main() -> taf::error::Result<()> {
/// // We only want to accept fully conforming files
/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
/// let report = taf::validate::validate("story.taf", parsing_options)?;
/// # Ok(()) }
/// ```
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Will eagerly error on invalid input
	///
	/// ## Examples of behavior
	///
	/// * Declared audio length differs from the audio region - Validation fails
	/// * A page checksum doesn't match - Validation fails
	/// * The sample rate isn't 48 kHz - Analysis fails
	Strict,
	/// Default mode, less eager to error on recoverably malformed input
	///
	/// ## Examples of behavior
	///
	/// * Declared audio length differs from the audio region - A warning within the
	///   tolerance, an error beyond it
	/// * A page checksum doesn't match - A warning is reported
	/// * The sample rate isn't 48 kHz - The sample rate is reported as is
	#[default]
	BestAttempt,
	/// Least eager to error
	///
	/// ## Examples of behavior
	///
	/// * Declared audio length differs from the audio region - A warning is reported
	/// * A page checksum doesn't match - A warning is reported
	/// * The sample rate isn't 48 kHz - The sample rate is reported as is
	Relaxed,
}
