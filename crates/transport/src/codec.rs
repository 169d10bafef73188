//! Length-prefixed JSON framing

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::TransportError;

/// Frame delimiter between the length header and the body
const DELIMITER: u8 = b'#';

/// `usize::MAX` has 20 decimal digits
const MAX_HEADER_LEN: usize = 20;

pub const DEFAULT_MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// Codec for `<byte length>#<json>` frames
///
/// Decoding yields the raw JSON body so that a malformed packet can be
/// rejected without tearing down the connection. Header errors and oversized
/// frames are fatal because the stream can no longer be re-synchronised.
#[derive(Debug, Clone)]
pub struct JsonSocketCodec {
    max_frame_length: usize,
}

impl JsonSocketCodec {
    pub fn new(max_frame_length: usize) -> Self {
        Self { max_frame_length }
    }

    pub fn max_frame_length(&self) -> usize {
        self.max_frame_length
    }
}

impl Default for JsonSocketCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LENGTH)
    }
}

fn invalid_header(header: &[u8]) -> TransportError {
    TransportError::InvalidHeader(String::from_utf8_lossy(header).into_owned())
}

impl Decoder for JsonSocketCodec {
    type Item = Bytes;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, TransportError> {
        let Some(delimiter) = src.iter().position(|b| *b == DELIMITER) else {
            // Header still incomplete; reject early if it can no longer be valid
            if src.len() > MAX_HEADER_LEN || !src.iter().all(u8::is_ascii_digit) {
                return Err(invalid_header(src));
            }
            return Ok(None);
        };

        let header = &src[..delimiter];
        if header.is_empty()
            || header.len() > MAX_HEADER_LEN
            || !header.iter().all(u8::is_ascii_digit)
        {
            return Err(invalid_header(header));
        }

        let length: usize = std::str::from_utf8(header)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| invalid_header(header))?;

        if length > self.max_frame_length {
            return Err(TransportError::FrameTooLarge {
                length,
                max: self.max_frame_length,
            });
        }

        let frame_end = delimiter + 1 + length;
        if src.len() < frame_end {
            src.reserve(frame_end - src.len());
            return Ok(None);
        }

        src.advance(delimiter + 1);
        Ok(Some(src.split_to(length).freeze()))
    }
}

impl<T: Serialize> Encoder<T> for JsonSocketCodec {
    type Error = TransportError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), TransportError> {
        let body = serde_json::to_vec(&item)?;
        if body.len() > self.max_frame_length {
            return Err(TransportError::FrameTooLarge {
                length: body.len(),
                max: self.max_frame_length,
            });
        }

        let header = body.len().to_string();
        dst.reserve(header.len() + 1 + body.len());
        dst.put_slice(header.as_bytes());
        dst.put_u8(DELIMITER);
        dst.put_slice(&body);
        Ok(())
    }
}
