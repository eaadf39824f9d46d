use crate::error::Result;

use std::io::Read;

use data_encoding::HEXLOWER;
use sha1::{Digest, Sha1};

/// The size of a SHA-1 digest
pub(crate) const SHA1_LEN: usize = 20;

/// Hash everything from the reader's current position to the end of the stream
pub(crate) fn sha1_to_end<R>(reader: &mut R) -> Result<[u8; SHA1_LEN]>
where
	R: Read,
{
	let mut hasher = Sha1::new();
	std::io::copy(reader, &mut hasher)?;

	Ok(hasher.finalize().into())
}

pub(crate) fn sha1_of(data: &[u8]) -> [u8; SHA1_LEN] {
	Sha1::digest(data).into()
}

pub(crate) fn to_hex(digest: &[u8]) -> String {
	HEXLOWER.encode(digest)
}
