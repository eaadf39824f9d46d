use super::constants::OPUSTAGS;
use super::verify_signature;
use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{parse_mode_choice, stream_err};

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

/// The contents of an Opus comments packet
///
/// Keys are stored upper-cased, in the order they appear in the packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpusComments {
	pub(crate) vendor: String,
	pub(crate) items: Vec<(String, String)>,
}

impl OpusComments {
	/// The vendor string
	pub fn vendor(&self) -> &str {
		&self.vendor
	}

	/// All `KEY=value` entries, in file order
	pub fn items(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + Clone {
		self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Gets the first value for a key
	///
	/// The key is matched case-insensitively.
	///
	/// # Examples
	///
	/// ```rust,no_run
	/// use taf::config::ParseOptions;
	/// use std::fs::File;
	///
	/// # fn main() -> taf::error::Result<()> {
	/// let mut file = File::open("story.taf")?;
	/// let info = taf::opus::analyze(&mut file, ParseOptions::new())?;
	///
	/// if let Some(title) = info.comments().get("title") {
	/// 	println!("Title: {title}");
	/// }
	/// # Ok(()) }
	/// ```
	pub fn get(&self, key: &str) -> Option<&str> {
		self.items
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(key))
			.map(|(_, v)| v.as_str())
	}

	/// The number of entries, not counting the vendor string
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether there are no entries
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

pub(super) fn read_comments(comments_packet: &[u8], parse_mode: ParsingMode) -> Result<OpusComments> {
	verify_signature(comments_packet, OPUSTAGS, 1)?;

	let data = &mut &comments_packet[OPUSTAGS.len()..];
	let mut len = data.len() as u64;

	let Ok(vendor_len) = data.read_u32::<LittleEndian>() else {
		stream_err!(@BAIL 1, "Comments packet is missing a vendor string");
	};
	len = len.saturating_sub(4);

	if u64::from(vendor_len) > len {
		stream_err!(@BAIL 1, "Vendor string is larger than the comments packet");
	}

	let mut vendor_bytes = vec![0; vendor_len as usize];
	data.read_exact(&mut vendor_bytes)?;
	len -= u64::from(vendor_len);

	let vendor = decode_text(vendor_bytes, parse_mode)?;

	let Ok(number_of_items) = data.read_u32::<LittleEndian>() else {
		// Some writers stop after the vendor string
		log::warn!("Opus: Comments packet has no item count, assuming 0");
		return Ok(OpusComments {
			vendor,
			items: Vec::new(),
		});
	};
	len = len.saturating_sub(4);

	// Every item needs at least a 4 byte length
	if u64::from(number_of_items) > (len >> 2) {
		stream_err!(@BAIL 1, "Comment count is larger than the comments packet");
	}

	let mut comments = OpusComments {
		vendor,
		items: Vec::with_capacity(number_of_items as usize),
	};

	for _ in 0..number_of_items {
		let comment_len = data.read_u32::<LittleEndian>()?;
		len = len.saturating_sub(4);

		if u64::from(comment_len) > len {
			stream_err!(@BAIL 1, "Comment is larger than the comments packet");
		}

		let mut comment_bytes = vec![0; comment_len as usize];
		data.read_exact(&mut comment_bytes)?;
		len -= u64::from(comment_len);

		// KEY=VALUE
		let mut comment_split = comment_bytes.splitn(2, |b| *b == b'=');

		let Some(key) = comment_split.next() else {
			continue;
		};

		// Make sure there was a separator present, otherwise just move on
		let Some(value) = comment_split.next() else {
			log::warn!("Opus: No separator found in comment, discarding");
			continue;
		};

		let key = decode_text(key.to_vec(), parse_mode)?.to_ascii_uppercase();
		let value = decode_text(value.to_vec(), parse_mode)?;

		comments.items.push((key, value));
	}

	Ok(comments)
}

fn decode_text(bytes: Vec<u8>, parse_mode: ParsingMode) -> Result<String> {
	match String::from_utf8(bytes) {
		Ok(text) => Ok(text),
		Err(e) => {
			parse_mode_choice!(
				parse_mode,
				STRICT: stream_err!(@BAIL 1, "Comments packet contains invalid UTF-8"),
				DEFAULT: log::warn!("Opus: Comment contains invalid UTF-8, replacing invalid characters")
			);

			Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
		},
	}
}
