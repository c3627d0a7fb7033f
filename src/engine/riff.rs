//! RIFF/WAVE container reader and writer
//!
//! The reader walks the chunk list of any [`Read`] stream until it has seen
//! both a `fmt ` and a `data` chunk, skipping anything else by its declared
//! length. The writer always emits the plain 44-byte canonical header
//! followed by the payload.
//!
//! ```text
//! offset size field
//! 0      4    "RIFF"
//! 4      4    36 + data size
//! 8      4    "WAVE"
//! 12     4    "fmt "
//! 16     4    16
//! 20     16   format descriptor
//! 36     4    "data"
//! 40     4    data size
//! 44     N    payload
//! ```

use std::io::{self, Read, Write};

use tracing::debug;

use crate::config::SaveMode;
use crate::engine::buffer::{DataChunk, WaveBuffer};
use crate::engine::diagnostics::{DiagnosticKind, Diagnostics};
use crate::engine::format::{FormatDescriptor, FMT_CHUNK_SIZE};
use crate::error::{Result, WavError};

pub const RIFF_MAGIC: [u8; 4] = *b"RIFF";
pub const WAVE_MAGIC: [u8; 4] = *b"WAVE";
pub const FMT_TAG: [u8; 4] = *b"fmt ";
pub const DATA_TAG: [u8; 4] = *b"data";

/// Length of the header emitted by [`write_wave`]
pub const HEADER_LEN: usize = 44;

// ============================================================================
// Reader
// ============================================================================

/// Read a RIFF/WAVE stream into a raw, unnormalized buffer
///
/// Chunks after the first `fmt ` + `data` pair are never read.
///
/// # Errors
/// * `MalformedContainer` - bad magic, or the stream ended inside a field
/// * `StreamIo` - the underlying reader failed
pub fn read_wave<R: Read>(mut reader: R) -> Result<WaveBuffer> {
    let magic = read_tag(&mut reader, "RIFF magic")?;
    expect_magic(magic, RIFF_MAGIC, "RIFF magic")?;

    // Declared total size; not trusted for anything
    let _riff_size = read_u32(&mut reader, "RIFF size")?;

    let magic = read_tag(&mut reader, "WAVE magic")?;
    expect_magic(magic, WAVE_MAGIC, "WAVE magic")?;

    let mut format: Option<FormatDescriptor> = None;
    let mut data: Option<DataChunk> = None;

    loop {
        let tag = read_tag(&mut reader, "chunk tag")?;

        match tag {
            FMT_TAG => format = Some(read_fmt_chunk(&mut reader)?),
            DATA_TAG => data = Some(read_data_chunk(&mut reader)?),
            _ => skip_chunk(&mut reader, tag)?,
        }

        match (format, data) {
            (Some(format), Some(data)) => return Ok(WaveBuffer::from_parts(format, data)),
            (f, d) => {
                format = f;
                data = d;
            }
        }
    }
}

fn read_fmt_chunk<R: Read>(reader: &mut R) -> Result<FormatDescriptor> {
    let size = read_u32(reader, "'fmt ' chunk size")?;
    if size < FMT_CHUNK_SIZE {
        return Err(WavError::malformed(
            "'fmt ' chunk size",
            format!("declared {} bytes, need at least {}", size, FMT_CHUNK_SIZE),
        ));
    }

    let mut body = [0u8; FMT_CHUNK_SIZE as usize];
    read_field(reader, &mut body, "'fmt ' chunk")?;

    // Extension bytes (cbSize and friends) carry nothing for plain PCM
    if size > FMT_CHUNK_SIZE {
        discard(reader, u64::from(size - FMT_CHUNK_SIZE), "'fmt ' chunk")?;
    }

    Ok(FormatDescriptor {
        audio_format: u16::from_le_bytes([body[0], body[1]]),
        channels: u16::from_le_bytes([body[2], body[3]]),
        sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
        byte_rate: u32::from_le_bytes([body[8], body[9], body[10], body[11]]),
        block_align: u16::from_le_bytes([body[12], body[13]]),
        bits_per_sample: u16::from_le_bytes([body[14], body[15]]),
    })
}

fn read_data_chunk<R: Read>(reader: &mut R) -> Result<DataChunk> {
    let size = read_u32(reader, "'data' chunk size")?;

    // Grow with what actually arrives rather than trusting the declared size
    let mut payload = Vec::new();
    let read = reader
        .take(u64::from(size))
        .read_to_end(&mut payload)
        .map_err(|e| WavError::stream("reading 'data' chunk", e))?;

    if read != size as usize {
        return Err(WavError::malformed(
            "'data' chunk",
            format!("declared {} bytes but stream ended after {}", size, read),
        ));
    }

    Ok(DataChunk::from_payload(payload))
}

fn skip_chunk<R: Read>(reader: &mut R, tag: [u8; 4]) -> Result<()> {
    let name = tag_name(&tag);
    let size = read_u32(reader, &format!("'{}' chunk size", name))?;
    debug!(chunk = %name, size, "Skipping chunk");
    discard(reader, u64::from(size), &format!("'{}' chunk", name))
}

fn discard<R: Read>(reader: &mut R, len: u64, field: &str) -> Result<()> {
    let skipped = io::copy(&mut reader.take(len), &mut io::sink())
        .map_err(|e| WavError::stream(format!("skipping {}", field), e))?;

    if skipped != len {
        return Err(WavError::malformed(
            field,
            format!("declared {} bytes but stream ended after {}", len, skipped),
        ));
    }
    Ok(())
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            WavError::malformed(field, "stream ended before the field was complete")
        } else {
            WavError::stream(format!("reading {}", field), e)
        }
    })
}

fn read_tag<R: Read>(reader: &mut R, field: &str) -> Result<[u8; 4]> {
    let mut tag = [0u8; 4];
    read_field(reader, &mut tag, field)?;
    Ok(tag)
}

fn read_u32<R: Read>(reader: &mut R, field: &str) -> Result<u32> {
    Ok(u32::from_le_bytes(read_tag(reader, field)?))
}

fn expect_magic(found: [u8; 4], expected: [u8; 4], field: &str) -> Result<()> {
    if found != expected {
        return Err(WavError::malformed(
            field,
            format!(
                "expected \"{}\", found \"{}\"",
                tag_name(&expected),
                tag_name(&found)
            ),
        ));
    }
    Ok(())
}

fn tag_name(tag: &[u8; 4]) -> String {
    tag.iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            }
        })
        .collect()
}

// ============================================================================
// Writer
// ============================================================================

/// Encode the 44-byte header for `buffer`
pub fn encode_header(buffer: &WaveBuffer) -> Vec<u8> {
    let fmt = buffer.format();
    let data_size = buffer.data().size();

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(&RIFF_MAGIC);
    header.extend_from_slice(&36u32.saturating_add(data_size).to_le_bytes());
    header.extend_from_slice(&WAVE_MAGIC);
    header.extend_from_slice(&FMT_TAG);
    header.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    header.extend_from_slice(&fmt.audio_format.to_le_bytes());
    header.extend_from_slice(&fmt.channels.to_le_bytes());
    header.extend_from_slice(&fmt.sample_rate.to_le_bytes());
    header.extend_from_slice(&fmt.byte_rate.to_le_bytes());
    header.extend_from_slice(&fmt.block_align.to_le_bytes());
    header.extend_from_slice(&fmt.bits_per_sample.to_le_bytes());
    header.extend_from_slice(&DATA_TAG);
    header.extend_from_slice(&data_size.to_le_bytes());
    header
}

/// Serialize `buffer` as RIFF/WAVE
///
/// In [`SaveMode::BestEffort`] the bytes are always written and a buffer
/// that is not canonical only produces a `SaveInvariant` diagnostic. In
/// [`SaveMode::Strict`] such a buffer is rejected before anything is
/// written.
pub fn write_wave<W: Write>(
    buffer: &WaveBuffer,
    mut writer: W,
    mode: SaveMode,
    diagnostics: &Diagnostics,
) -> Result<()> {
    if mode == SaveMode::Strict {
        buffer.validate_canonical()?;
    }

    writer
        .write_all(&encode_header(buffer))
        .map_err(|e| WavError::stream("writing header", e))?;
    writer
        .write_all(buffer.payload())
        .map_err(|e| WavError::stream("writing 'data' chunk", e))?;
    writer
        .flush()
        .map_err(|e| WavError::stream("flushing output", e))?;

    if let Err(err) = buffer.validate_canonical() {
        diagnostics.report(DiagnosticKind::SaveInvariant, || {
            format!("sanity check failed while saving: {}", err)
        });
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a RIFF/WAVE byte stream from raw chunks
    fn riff(chunks: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(b"WAVE");
        for (tag, contents) in chunks {
            body.extend_from_slice(*tag);
            body.extend_from_slice(&(contents.len() as u32).to_le_bytes());
            body.extend_from_slice(contents);
        }
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);
        bytes
    }

    fn fmt_body(fmt: &FormatDescriptor) -> Vec<u8> {
        let header = encode_header(&WaveBuffer::from_payload(*fmt, Vec::new()));
        header[20..36].to_vec()
    }

    fn field_of(err: WavError) -> String {
        match err {
            WavError::MalformedContainer { field, .. } => field,
            other => panic!("Expected MalformedContainer, got: {:?}", other),
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_header_layout() {
        let mut buffer = WaveBuffer::silence(2);
        buffer.set_frame(0, 1, -1);

        let mut out = Vec::new();
        write_wave(&buffer, &mut out, SaveMode::BestEffort, &Diagnostics::new()).unwrap();

        assert_eq!(out.len(), HEADER_LEN + 8);
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(out[4..8].try_into().unwrap()), 36 + 8);
        assert_eq!(&out[8..12], b"WAVE");
        assert_eq!(&out[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(out[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes([out[20], out[21]]), 1);
        assert_eq!(u16::from_le_bytes([out[22], out[23]]), 2);
        assert_eq!(u32::from_le_bytes(out[24..28].try_into().unwrap()), 44100);
        assert_eq!(u32::from_le_bytes(out[28..32].try_into().unwrap()), 176_400);
        assert_eq!(u16::from_le_bytes([out[32], out[33]]), 4);
        assert_eq!(u16::from_le_bytes([out[34], out[35]]), 16);
        assert_eq!(&out[36..40], b"data");
        assert_eq!(u32::from_le_bytes(out[40..44].try_into().unwrap()), 8);
        assert_eq!(&out[44..], &[1, 0, 0xFF, 0xFF, 0, 0, 0, 0]);
    }

    #[test]
    fn test_canonical_round_trip_is_byte_identical() {
        let mut buffer = WaveBuffer::silence(16);
        for i in 0..16 {
            buffer.set_frame(i, (i as i16) * 1000 - 8000, -(i as i16) * 7);
        }

        let mut first = Vec::new();
        write_wave(&buffer, &mut first, SaveMode::Strict, &Diagnostics::new()).unwrap();

        let loaded = read_wave(first.as_slice()).unwrap();
        assert_eq!(loaded, buffer);

        let mut second = Vec::new();
        write_wave(&loaded, &mut second, SaveMode::Strict, &Diagnostics::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_skips_unknown_chunks() {
        let fmt = FormatDescriptor::canonical();
        let bytes = riff(&[
            (b"LIST", vec![1, 2, 3, 4, 5]),
            (b"fmt ", fmt_body(&fmt)),
            (b"fact", vec![0; 4]),
            (b"data", vec![1, 0, 2, 0]),
        ]);

        let buffer = read_wave(bytes.as_slice()).unwrap();
        assert_eq!(*buffer.format(), fmt);
        assert_eq!(buffer.get(0), (1, 2));
    }

    #[test]
    fn test_data_before_fmt() {
        let fmt = FormatDescriptor::pcm(1, 8000, 8);
        let bytes = riff(&[(b"data", vec![10, 20, 30]), (b"fmt ", fmt_body(&fmt))]);

        let buffer = read_wave(bytes.as_slice()).unwrap();
        assert_eq!(*buffer.format(), fmt);
        assert_eq!(buffer.payload(), &[10, 20, 30]);
    }

    #[test]
    fn test_stops_after_fmt_and_data() {
        let fmt = FormatDescriptor::canonical();
        let mut bytes = riff(&[(b"fmt ", fmt_body(&fmt)), (b"data", vec![0; 4])]);
        // A chunk header promising far more than is present
        bytes.extend_from_slice(b"JUNK");
        bytes.extend_from_slice(&1000u32.to_le_bytes());

        let buffer = read_wave(bytes.as_slice()).unwrap();
        assert_eq!(buffer.frame_count(), 1);
    }

    #[test]
    fn test_reader_does_not_normalize() {
        let fmt = FormatDescriptor::pcm(1, 22050, 8);
        let bytes = riff(&[(b"fmt ", fmt_body(&fmt)), (b"data", vec![128; 10])]);

        let buffer = read_wave(bytes.as_slice()).unwrap();
        assert_eq!(buffer.format().bits_per_sample, 8);
        assert_eq!(buffer.frame_count(), 10);
    }

    #[test]
    fn test_bad_riff_magic() {
        let mut bytes = riff(&[]);
        bytes[0..4].copy_from_slice(b"RIFX");

        let err = read_wave(bytes.as_slice()).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_CONTAINER");
        assert_eq!(field_of(err), "RIFF magic");
    }

    #[test]
    fn test_bad_wave_magic() {
        let mut bytes = riff(&[]);
        bytes[8..12].copy_from_slice(b"AVI ");

        let err = read_wave(bytes.as_slice()).unwrap_err();
        assert!(err.to_string().contains("AVI "));
        assert_eq!(field_of(err), "WAVE magic");
    }

    #[test]
    fn test_empty_stream() {
        let err = read_wave(io::empty()).unwrap_err();
        assert_eq!(field_of(err), "RIFF magic");
    }

    #[test]
    fn test_missing_data_chunk() {
        let bytes = riff(&[(b"fmt ", fmt_body(&FormatDescriptor::canonical()))]);
        let err = read_wave(bytes.as_slice()).unwrap_err();
        assert_eq!(field_of(err), "chunk tag");
    }

    #[test]
    fn test_truncated_data_chunk() {
        let mut bytes = riff(&[
            (b"fmt ", fmt_body(&FormatDescriptor::canonical())),
            (b"data", vec![0; 16]),
        ]);
        bytes.truncate(bytes.len() - 3);

        let err = read_wave(bytes.as_slice()).unwrap_err();
        assert_eq!(field_of(err), "'data' chunk");
    }

    #[test]
    fn test_truncated_fmt_chunk() {
        let mut bytes = riff(&[(b"fmt ", fmt_body(&FormatDescriptor::canonical()))]);
        bytes.truncate(bytes.len() - 6);

        let err = read_wave(bytes.as_slice()).unwrap_err();
        assert_eq!(field_of(err), "'fmt ' chunk");
    }

    #[test]
    fn test_truncated_unknown_chunk() {
        let mut bytes = riff(&[(b"LIST", vec![0; 32])]);
        bytes.truncate(bytes.len() - 1);

        let err = read_wave(bytes.as_slice()).unwrap_err();
        assert_eq!(field_of(err), "'LIST' chunk");
    }

    #[test]
    fn test_extended_fmt_chunk_is_accepted() {
        let fmt = FormatDescriptor::canonical();
        let mut body = fmt_body(&fmt);
        body.extend_from_slice(&0u16.to_le_bytes());
        let bytes = riff(&[(b"fmt ", body), (b"data", vec![0; 4])]);

        let buffer = read_wave(bytes.as_slice()).unwrap();
        assert_eq!(*buffer.format(), fmt);
        assert_eq!(buffer.frame_count(), 1);
    }

    #[test]
    fn test_short_fmt_chunk_is_rejected() {
        let bytes = riff(&[(b"fmt ", vec![0; 12])]);
        let err = read_wave(bytes.as_slice()).unwrap_err();
        assert_eq!(field_of(err), "'fmt ' chunk size");
    }

    #[test]
    fn test_stream_failure_is_io_error() {
        let err = read_wave(FailingReader).unwrap_err();
        assert_eq!(err.error_code(), "STREAM_IO");
    }

    #[test]
    fn test_best_effort_writes_non_canonical() {
        let diag = Diagnostics::new();
        let buffer = WaveBuffer::from_payload(FormatDescriptor::pcm(1, 8000, 8), vec![128; 4]);

        let mut out = Vec::new();
        write_wave(&buffer, &mut out, SaveMode::BestEffort, &diag).unwrap();

        assert_eq!(out.len(), HEADER_LEN + 4);
        assert_eq!(diag.occurrences(DiagnosticKind::SaveInvariant), 1);
        assert_eq!(diag.emitted(DiagnosticKind::SaveInvariant), 1);
    }

    #[test]
    fn test_strict_rejects_non_canonical() {
        let diag = Diagnostics::new();
        let buffer = WaveBuffer::from_payload(FormatDescriptor::pcm(1, 8000, 8), vec![128; 4]);

        let mut out = Vec::new();
        let err = write_wave(&buffer, &mut out, SaveMode::Strict, &diag).unwrap_err();

        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert!(out.is_empty());
        assert_eq!(diag.occurrences(DiagnosticKind::SaveInvariant), 0);
    }

    #[test]
    fn test_canonical_save_reports_nothing() {
        let diag = Diagnostics::new();
        let mut out = Vec::new();
        write_wave(&WaveBuffer::silence(3), &mut out, SaveMode::BestEffort, &diag).unwrap();
        assert_eq!(diag.occurrences(DiagnosticKind::SaveInvariant), 0);
    }
}
