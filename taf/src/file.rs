//! Whole-file access to TAF containers

use crate::config::ParseOptions;
use crate::error::{ErrorKind, Result};
use crate::header::{AUDIO_REGION_OFFSET, HEADER_REGION_SIZE, TonieHeader, read_header};
use crate::opus::{self, AudioStreamInfo, OpusComments};
use crate::util::hash::{SHA1_LEN, sha1_to_end, to_hex};
use crate::util::io::SeekStreamLen;

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A TAF container on disk
///
/// This holds nothing but the path and size of the file. Every operation opens its own
/// handle, and closes it before returning.
///
/// # Examples
///
/// ```rust,no_run
/// use taf::config::ParseOptions;
/// use taf::file::TafFile;
///
/// # fn main() -> taf::error::Result<()> {
/// let file = TafFile::open("story.taf")?;
/// let info = file.read_info(ParseOptions::new())?;
///
/// println!("{} bytes of audio", info.audio_size());
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TafFile {
	path: PathBuf,
	total_size: u64,
}

impl TafFile {
	/// Open a TAF file
	///
	/// This only checks that the file exists, nothing is read.
	///
	/// # Errors
	///
	/// * `path` does not exist
	/// * The file's metadata can't be read
	pub fn open<P>(path: P) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();
		log::debug!("TafFile: Opening `{}`", path.display());

		let total_size = std::fs::metadata(path)?.len();

		Ok(Self {
			path: path.to_path_buf(),
			total_size,
		})
	}

	/// The path of the file
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The size of the file at the time it was opened
	pub fn total_size(&self) -> u64 {
		self.total_size
	}

	/// The size of the header region, always 4096
	pub fn header_region_size(&self) -> u64 {
		HEADER_REGION_SIZE
	}

	/// The offset of the audio region, always 4096
	pub fn audio_region_offset(&self) -> u64 {
		AUDIO_REGION_OFFSET
	}

	/// The size of the audio region
	pub fn audio_size(&self) -> u64 {
		self.total_size.saturating_sub(AUDIO_REGION_OFFSET)
	}

	/// Open a new buffered handle to the file
	///
	/// # Errors
	///
	/// The file can no longer be opened
	pub fn reader(&self) -> Result<BufReader<File>> {
		Ok(BufReader::new(File::open(&self.path)?))
	}

	/// Read the header region, see [`read_header`]
	///
	/// # Errors
	///
	/// See [`read_header`]
	pub fn read_header(&self) -> Result<(u32, TonieHeader)> {
		read_header(&mut self.reader()?)
	}

	/// Analyze the audio stream, see [`opus::analyze`]
	///
	/// # Errors
	///
	/// See [`opus::analyze`]
	pub fn analyze(&self, parse_options: ParseOptions) -> Result<AudioStreamInfo> {
		opus::analyze(&mut self.reader()?, parse_options)
	}

	/// Read the header and stream information, see [`read_header_info`]
	///
	/// # Errors
	///
	/// See [`read_header_info`]
	pub fn read_info(&self, parse_options: ParseOptions) -> Result<TafInfo> {
		read_header_info(&mut self.reader()?, parse_options)
	}
}

/// Everything known about a TAF file after reading its header and stream headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TafInfo {
	pub(crate) header_size: u32,
	pub(crate) header: TonieHeader,
	pub(crate) file_size: u64,
	pub(crate) audio_size: u64,
	pub(crate) sha1: [u8; SHA1_LEN],
	pub(crate) stream: Option<AudioStreamInfo>,
}

impl TafInfo {
	/// The header length from the length prefix
	pub fn header_size(&self) -> u32 {
		self.header_size
	}

	/// The decoded header
	pub fn header(&self) -> &TonieHeader {
		&self.header
	}

	/// The size of the file
	pub fn file_size(&self) -> u64 {
		self.file_size
	}

	/// The size of the audio region
	pub fn audio_size(&self) -> u64 {
		self.audio_size
	}

	/// The SHA-1 digest of the audio region, as computed from the file
	///
	/// Compare with [`TonieHeader::audio_sha1`] to check the declared digest.
	pub fn sha1(&self) -> [u8; SHA1_LEN] {
		self.sha1
	}

	/// [`TafInfo::sha1`] as a lowercase hex string
	pub fn sha1_hex(&self) -> String {
		to_hex(&self.sha1)
	}

	/// The stream information, if the audio region starts with a valid Opus stream
	pub fn stream(&self) -> Option<&AudioStreamInfo> {
		self.stream.as_ref()
	}

	/// Whether the audio region starts with a valid Opus stream
	pub fn opus_found(&self) -> bool {
		self.stream.is_some()
	}

	/// The Opus version, see [`AudioStreamInfo::version`]
	pub fn opus_version(&self) -> Option<u8> {
		self.stream.as_ref().map(AudioStreamInfo::version)
	}

	/// The channel count, see [`AudioStreamInfo::channels`]
	pub fn channel_count(&self) -> Option<u8> {
		self.stream.as_ref().map(AudioStreamInfo::channels)
	}

	/// The input sample rate, see [`AudioStreamInfo::sample_rate`]
	pub fn sample_rate(&self) -> Option<u32> {
		self.stream.as_ref().map(AudioStreamInfo::sample_rate)
	}

	/// The stream serial, see [`AudioStreamInfo::stream_serial`]
	pub fn stream_serial(&self) -> Option<u32> {
		self.stream.as_ref().map(AudioStreamInfo::stream_serial)
	}

	/// The stream comments, see [`AudioStreamInfo::comments`]
	pub fn comments(&self) -> Option<&OpusComments> {
		self.stream.as_ref().map(AudioStreamInfo::comments)
	}
}

/// Read the header and stream information of a TAF file
///
/// An audio region that doesn't start with a valid Opus stream is not an error, see
/// [`TafInfo::opus_found`].
///
/// # Errors
///
/// * The header can't be decoded, see [`read_header`]
/// * [`std::io::Error`]
///
/// # Examples
///
/// ```rust,no_run
/// use taf::config::ParseOptions;
/// use std::fs::File;
///
/// # fn main() -> taf::error::Result<()> {
/// let mut file = File::open("story.taf")?;
/// let info = taf::file::read_header_info(&mut file, ParseOptions::new())?;
///
/// if let Some(channels) = info.channel_count() {
/// 	println!("{channels} channel(s)");
/// }
/// # Ok(()) }
/// ```
pub fn read_header_info<R>(reader: &mut R, parse_options: ParseOptions) -> Result<TafInfo>
where
	R: Read + Seek,
{
	let (header_size, header) = read_header(reader)?;

	let file_size = reader.stream_len_hack()?;
	let audio_size = file_size.saturating_sub(AUDIO_REGION_OFFSET);

	reader.seek(SeekFrom::Start(AUDIO_REGION_OFFSET))?;
	let sha1 = sha1_to_end(reader)?;

	let stream = match opus::analyze(reader, parse_options) {
		Ok(stream) => Some(stream),
		Err(err) if matches!(err.kind(), ErrorKind::StreamFormat(_)) => {
			log::debug!("TafInfo: No Opus stream found: {err}");
			None
		},
		Err(err) => return Err(err),
	};

	Ok(TafInfo {
		header_size,
		header,
		file_size,
		audio_size,
		sha1,
		stream,
	})
}

/// Read the header and stream information of the TAF file at `path`
///
/// This uses the default [`ParseOptions`], see [`TafFile::read_info`] to specify them.
///
/// # Errors
///
/// * `path` does not exist
/// * See [`read_header_info`]
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> taf::error::Result<()> {
/// let info = taf::file::read_header_info_from_path("story.taf")?;
/// println!("Audio SHA-1: {}", info.sha1_hex());
/// # Ok(()) }
/// ```
pub fn read_header_info_from_path<P>(path: P) -> Result<TafInfo>
where
	P: AsRef<Path>,
{
	TafFile::open(path)?.read_info(ParseOptions::default())
}
