use super::comments::OpusComments;
use super::constants::{IDENTIFICATION_PACKET_MIN_SIZE, OPUS_SAMPLE_RATE, OPUSHEAD};
use super::verify_signature;
use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{parse_mode_choice, stream_err};

use byteorder::{LittleEndian, ReadBytesExt};

/// Facts about the Opus stream embedded in a TAF file
///
/// This is only available if the first two pages of the audio region decode as an
/// identification packet followed by a comments packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct AudioStreamInfo {
	pub(crate) version: u8,
	pub(crate) channels: u8,
	pub(crate) pre_skip: u16,
	pub(crate) sample_rate: u32,
	pub(crate) output_gain: i16,
	pub(crate) channel_mapping_family: u8,
	pub(crate) stream_serial: u32,
	pub(crate) comments: OpusComments,
}

impl AudioStreamInfo {
	/// Opus version
	pub fn version(&self) -> u8 {
		self.version
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// Number of samples to discard from the start of the decoded stream
	pub fn pre_skip(&self) -> u16 {
		self.pre_skip
	}

	/// Input sample rate
	///
	/// This is expected to be 48000, other values are reported as is.
	pub fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	/// Output gain, in Q7.8 dB
	pub fn output_gain(&self) -> i16 {
		self.output_gain
	}

	/// Channel mapping family
	pub fn channel_mapping_family(&self) -> u8 {
		self.channel_mapping_family
	}

	/// The serial number of the logical stream, taken from the identification page
	pub fn stream_serial(&self) -> u32 {
		self.stream_serial
	}

	/// The contents of the comments packet
	pub fn comments(&self) -> &OpusComments {
		&self.comments
	}
}

pub(super) fn read_identification(
	identification_packet: &[u8],
	parse_mode: ParsingMode,
) -> Result<AudioStreamInfo> {
	verify_signature(identification_packet, OPUSHEAD, 0)?;

	if identification_packet.len() < IDENTIFICATION_PACKET_MIN_SIZE {
		stream_err!(@BAIL 0, "Identification packet is too short");
	}

	let mut info = AudioStreamInfo::default();

	// Skip identification header
	let identification_packet_reader = &mut &identification_packet[OPUSHEAD.len()..];

	info.version = identification_packet_reader.read_u8()?;
	info.channels = identification_packet_reader.read_u8()?;
	info.pre_skip = identification_packet_reader.read_u16::<LittleEndian>()?;
	info.sample_rate = identification_packet_reader.read_u32::<LittleEndian>()?;
	info.output_gain = identification_packet_reader.read_i16::<LittleEndian>()?;
	info.channel_mapping_family = identification_packet_reader.read_u8()?;

	if info.channels == 0 {
		stream_err!(@BAIL 0, "Identification packet has a channel count of 0");
	}

	// https://datatracker.ietf.org/doc/html/rfc7845.html#section-5.1.1
	if (info.channel_mapping_family == 0 && info.channels > 2)
		|| (info.channel_mapping_family == 1 && info.channels > 8)
	{
		stream_err!(@BAIL 0, "Invalid channel count for mapping family");
	}

	if info.sample_rate != OPUS_SAMPLE_RATE {
		parse_mode_choice!(
			parse_mode,
			STRICT: stream_err!(@BAIL 0, "Input sample rate is not 48 kHz"),
			DEFAULT: log::warn!(
				"Opus: Input sample rate is {} Hz, expected {OPUS_SAMPLE_RATE} Hz",
				info.sample_rate
			)
		);
	}

	Ok(info)
}
