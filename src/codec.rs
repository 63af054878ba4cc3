use std::io::Cursor;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::resp::{RespError, RespValue, DEFAULT_MAX_NESTING_DEPTH};

/// Largest partial frame the codec buffers before giving up on the peer.
///
/// A frame is parsed from its first byte every time more data arrives for it,
/// unless the codec already knows the frame needs more bytes than are buffered.
/// A huge bulk string therefore costs one parse, while an array of many small
/// elements trickling in is re-scanned once per read, up to this size.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Frames a byte stream into [`RespValue`]s.
///
/// Wrapping a socket in `Framed<_, RespCodec>` turns it into a stream of decoded
/// values and a sink of values to encode.
#[derive(Debug, Clone)]
pub struct RespCodec {
    max_frame_size: usize,
    max_nesting_depth: usize,
    /// Buffer length below which the pending frame cannot be complete.
    needed: usize,
}

impl RespCodec {
    pub fn new(max_frame_size: usize) -> Self {
        RespCodec {
            max_frame_size,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            needed: 0,
        }
    }

    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    fn incomplete(&self, src: &BytesMut) -> Result<Option<RespValue>, RespError> {
        if src.len() > self.max_frame_size {
            return Err(RespError::FrameTooLarge(src.len(), self.max_frame_size));
        }

        Ok(None)
    }
}

impl Default for RespCodec {
    fn default() -> Self {
        RespCodec::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for RespCodec {
    type Item = RespValue;
    type Error = RespError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < self.needed {
            return self.incomplete(src);
        }

        let mut cursor = Cursor::new(&src[..]);

        match RespValue::parse(&mut cursor, self.max_nesting_depth) {
            Ok(value) => {
                let position = cursor.position() as usize;
                src.advance(position);
                self.needed = 0;

                Ok(Some(value))
            }
            Err(RespError::Incomplete) => {
                self.needed = (cursor.position() as usize).max(src.len() + 1);
                self.incomplete(src)
            }
            Err(e) => {
                self.needed = 0;
                Err(e)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(value) => Ok(Some(value)),
            None if src.is_empty() => Ok(None),
            None => Err(RespError::UnexpectedEof),
        }
    }
}

impl Encoder<RespValue> for RespCodec {
    type Error = RespError;

    fn encode(&mut self, item: RespValue, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(item.encode().as_bytes());
        Ok(())
    }
}
