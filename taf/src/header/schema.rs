use super::TonieHeader;
use crate::util::hash::SHA1_LEN;

// Version 1 of the header schema, field numbers are shared with every other TAF tool:
//
// message TonieHeader {
//     bytes  dataHash              = 1;
//     uint64 dataLength            = 2;
//     uint32 timestamp             = 3;
//     repeated uint32 chapterPages = 4 [packed = true];
//     bytes  padding               = 5;
// }
#[derive(Clone, PartialEq, prost::Message)]
pub(super) struct RawTonieHeader {
	#[prost(bytes = "vec", tag = "1")]
	pub(super) data_hash: Vec<u8>,
	#[prost(uint64, tag = "2")]
	pub(super) data_length: u64,
	#[prost(uint32, tag = "3")]
	pub(super) timestamp: u32,
	#[prost(uint32, repeated, packed = "true", tag = "4")]
	pub(super) chapter_pages: Vec<u32>,
	#[prost(bytes = "vec", tag = "5")]
	pub(super) padding: Vec<u8>,
}

impl From<&TonieHeader> for RawTonieHeader {
	fn from(input: &TonieHeader) -> Self {
		Self {
			data_hash: input.audio_sha1.map(Vec::from).unwrap_or_default(),
			data_length: input.data_length,
			timestamp: input.timestamp,
			chapter_pages: input.chapter_pages.clone(),
			padding: Vec::new(),
		}
	}
}

impl From<RawTonieHeader> for TonieHeader {
	fn from(input: RawTonieHeader) -> Self {
		let audio_sha1 = match <[u8; SHA1_LEN]>::try_from(input.data_hash.as_slice()) {
			Ok(digest) => Some(digest),
			Err(_) if input.data_hash.is_empty() => None,
			Err(_) => {
				log::warn!(
					"TAF header: Expected a {SHA1_LEN} byte audio digest, found {} bytes, \
					 discarding",
					input.data_hash.len()
				);
				None
			},
		};

		Self {
			data_length: input.data_length,
			timestamp: input.timestamp,
			chapter_pages: input.chapter_pages,
			audio_sha1,
		}
	}
}
