//! Canonical WAV encoding.
//!
//! The byte layout produced here is the one compatibility-sensitive wire
//! format of the crate: a 44-byte RIFF header followed by mono 16-bit
//! little-endian PCM. The header is written directly rather than through a
//! container library so that the output is bit-exact and fully deterministic.

/// Size of the RIFF/fmt/data header preamble in bytes.
pub const HEADER_LEN: usize = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Encode f32 samples as a single-channel 16-bit PCM WAV file.
///
/// Samples are clamped to `[-1.0, 1.0]`, scaled by `32767` and truncated to
/// `i16`. Both boundary directions use the same scale factor, so `-1.0`
/// quantizes to `-32767` rather than `-32768`; the full negative range of
/// `i16` is deliberately unused.
#[must_use]
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let data_size = (samples.len() * 2) as u32;
    let byte_rate = sample_rate * u32::from(CHANNELS) * u32::from(BITS_PER_SAMPLE / 8);
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);

    let mut out = Vec::with_capacity(HEADER_LEN + samples.len() * 2);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // uncompressed PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        out.extend_from_slice(&quantize(sample).to_le_bytes());
    }

    out
}

/// Quantize one sample: clamp to `[-1, 1]`, scale by `32767`, truncate.
fn quantize(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn i16_sample(bytes: &[u8], index: usize) -> i16 {
        let offset = HEADER_LEN + index * 2;
        i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn header_layout_matches_contract() {
        let samples = vec![0.0f32; 5];
        let bytes = encode_wav(&samples, 24_000);

        assert_eq!(bytes.len(), HEADER_LEN + 2 * samples.len());
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + 10); // file size minus 8
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16); // fmt chunk size
        assert_eq!(u16_at(&bytes, 20), 1); // PCM
        assert_eq!(u16_at(&bytes, 22), 1); // mono
        assert_eq!(u32_at(&bytes, 24), 24_000); // sample rate
        assert_eq!(u32_at(&bytes, 28), 48_000); // byte rate
        assert_eq!(u16_at(&bytes, 32), 2); // block align
        assert_eq!(u16_at(&bytes, 34), 16); // bits per sample
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 10); // data size
    }

    #[test]
    fn empty_input_is_header_only() {
        let bytes = encode_wav(&[], 24_000);
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(u32_at(&bytes, 4), 36);
        assert_eq!(u32_at(&bytes, 40), 0);
    }

    #[test]
    fn boundary_samples_quantize_to_plus_minus_32767() {
        let bytes = encode_wav(&[1.0, -1.0], 24_000);
        assert_eq!(i16_sample(&bytes, 0), 32_767);
        assert_eq!(i16_sample(&bytes, 1), -32_767);
    }

    #[test]
    fn out_of_range_samples_are_clamped_before_scaling() {
        let bytes = encode_wav(&[2.5, -7.0], 24_000);
        assert_eq!(i16_sample(&bytes, 0), 32_767);
        assert_eq!(i16_sample(&bytes, 1), -32_767);
    }

    #[test]
    fn quantization_truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5 -> 16383, and symmetrically for negatives.
        let bytes = encode_wav(&[0.5, -0.5], 24_000);
        assert_eq!(i16_sample(&bytes, 0), 16_383);
        assert_eq!(i16_sample(&bytes, 1), -16_383);
    }

    #[test]
    fn identical_input_yields_identical_bytes() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 500.0) - 1.0).collect();
        assert_eq!(encode_wav(&samples, 24_000), encode_wav(&samples, 24_000));
    }

    #[test]
    fn hound_reads_back_the_container() {
        let samples = [0.25f32, -0.25, 0.75, -0.75];
        let bytes = encode_wav(&samples, 24_000);
        let mut reader =
            hound::WavReader::new(std::io::Cursor::new(bytes)).expect("parse WAV in test");
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        let decoded: Vec<i16> = reader
            .samples::<i16>()
            .map(|s| s.expect("sample in test"))
            .collect();
        assert_eq!(decoded.len(), samples.len());
        assert_eq!(decoded[0], (0.25f32 * 32767.0) as i16);
    }
}
