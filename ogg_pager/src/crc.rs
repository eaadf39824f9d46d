// https://xiph.org/ogg/doc/framing.html#crc
//
// Direct, unreflected CRC-32 with the generator polynomial 0x04c11db7,
// an initial value of 0 and no final XOR.
const POLYNOMIAL: u32 = 0x04C1_1DB7;

static CRC_LOOKUP_ARRAY: [u32; 256] = lookup_table();

const fn lookup_table() -> [u32; 256] {
	let mut table = [0_u32; 256];

	let mut i = 0;
	while i < 256 {
		let mut r = (i as u32) << 24;

		let mut j = 0;
		while j < 8 {
			r = if r & 0x8000_0000 == 0 {
				r << 1
			} else {
				(r << 1) ^ POLYNOMIAL
			};
			j += 1;
		}

		table[i] = r;
		i += 1;
	}

	table
}

/// Calculates the CRC checksum of a page
///
/// The checksum field of the page must be zeroed beforehand.
pub fn crc32(page: &[u8]) -> u32 {
	let mut crc: u32 = 0;

	for &byte in page {
		let idx = ((crc >> 24) as u8 ^ byte) as usize;
		crc = (crc << 8) ^ CRC_LOOKUP_ARRAY[idx];
	}

	crc
}
