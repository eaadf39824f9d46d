// https://datatracker.ietf.org/doc/pdf/rfc7845.pdf#section-5.1
pub const OPUSHEAD: &[u8] = &[79, 112, 117, 115, 72, 101, 97, 100];
pub const OPUSTAGS: &[u8] = &[79, 112, 117, 115, 84, 97, 103, 115];

/// Opus always decodes at 48 kHz, granule positions are counted in 48 kHz samples
pub const OPUS_SAMPLE_RATE: u32 = 48000;

// Identification packet: magic, version, channels, pre-skip, sample rate, gain, mapping family
pub const IDENTIFICATION_PACKET_MIN_SIZE: usize = 19;
