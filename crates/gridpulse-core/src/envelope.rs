//! Container envelope wrapped around every domain payload.
//!
//! Layout: tag length (`u8`), UTF-8 tag bytes, version (`u16` or `u32`
//! depending on the domain), payload length (`u32`), payload.

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::version::{FormatVersion, VersionWidth};

/// A decoded envelope borrowing its payload from the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub tag: &'a str,
    pub version: FormatVersion,
    pub payload: &'a [u8],
}

/// Wrap `payload` in an envelope.
pub fn encode_envelope(
    tag: &str,
    width: VersionWidth,
    version: FormatVersion,
    payload: &[u8],
) -> Vec<u8> {
    let tag = &tag.as_bytes()[..tag.len().min(usize::from(u8::MAX))];
    let mut out = ByteWriter::with_capacity(1 + tag.len() + 4 + 4 + payload.len());
    out.write_u8(tag.len() as u8);
    out.write_bytes(tag);
    match width {
        VersionWidth::U16 => out.write_u16(u16::try_from(version.0).unwrap_or(u16::MAX)),
        VersionWidth::U32 => out.write_u32(version.0),
    }
    out.write_u32(payload.len() as u32);
    out.write_bytes(payload);
    out.into_vec()
}

/// Parse an envelope without checking its tag.
pub fn decode_envelope(data: &[u8], width: VersionWidth) -> Result<Envelope<'_>, DecodeError> {
    let mut input = ByteReader::new(data);
    let tag_len = usize::from(input.read_u8()?);
    let tag = std::str::from_utf8(input.read_bytes(tag_len)?).map_err(|_| DecodeError::InvalidTag)?;
    let version = match width {
        VersionWidth::U16 => u32::from(input.read_u16()?),
        VersionWidth::U32 => input.read_u32()?,
    };
    let declared = input.read_u32()? as usize;
    if declared > input.remaining() {
        return Err(DecodeError::LengthMismatch {
            declared,
            available: input.remaining(),
        });
    }
    let payload = input.read_bytes(declared)?;
    Ok(Envelope {
        tag,
        version: FormatVersion(version),
        payload,
    })
}

/// Parse an envelope and require its tag to be `expected`.
pub fn open_envelope<'a>(
    data: &'a [u8],
    expected: &'static str,
    width: VersionWidth,
) -> Result<Envelope<'a>, DecodeError> {
    let envelope = decode_envelope(data, width)?;
    if envelope.tag != expected {
        return Err(DecodeError::TagMismatch {
            expected,
            found: envelope.tag.to_string(),
        });
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_envelope_layout() {
        let data = encode_envelope("Areas", VersionWidth::U16, FormatVersion(2), &[9, 8]);
        assert_eq!(data[0], 5);
        assert_eq!(&data[1..6], b"Areas");
        assert_eq!(&data[6..8], &[2, 0]);
        assert_eq!(&data[8..12], &[2, 0, 0, 0]);
        assert_eq!(&data[12..], &[9, 8]);
    }

    #[test]
    fn round_trip_u32() {
        let data = encode_envelope("Electricity", VersionWidth::U32, FormatVersion(1), &[1, 2, 3]);
        let env = open_envelope(&data, "Electricity", VersionWidth::U32).unwrap();
        assert_eq!(env.version, FormatVersion(1));
        assert_eq!(env.payload, &[1, 2, 3]);
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let data = encode_envelope("Water", VersionWidth::U32, FormatVersion(2), &[]);
        let err = open_envelope(&data, "Electricity", VersionWidth::U32).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TagMismatch {
                expected: "Electricity",
                found: "Water".into()
            }
        );
    }

    #[test]
    fn short_payload_is_length_mismatch() {
        let data = encode_envelope("Areas", VersionWidth::U16, FormatVersion(2), &[1, 2, 3, 4]);
        let err = decode_envelope(&data[..data.len() - 2], VersionWidth::U16).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch {
                declared: 4,
                available: 2
            }
        );
        assert!(err.is_truncation());
    }

    #[test]
    fn invalid_utf8_tag() {
        let data = [2u8, 0xFF, 0xFE, 1, 0, 0, 0, 0, 0];
        assert_eq!(
            decode_envelope(&data, VersionWidth::U16).unwrap_err(),
            DecodeError::InvalidTag
        );
    }

    #[test]
    fn empty_buffer_is_truncation() {
        assert!(decode_envelope(&[], VersionWidth::U16).unwrap_err().is_truncation());
    }
}
