//! Redis Serialization Protocol (RESP) values.
//!
//! This module knows nothing about commands. It turns bytes into [`RespValue`]s
//! and back again. Decoding is cursor based so that a partially received frame
//! can be retried once more bytes arrive without losing anything from the buffer.

use std::io::Cursor;

use bytes::{Buf, BytesMut};
use thiserror::Error;

const CRLF: &[u8; 2] = b"\r\n";

/// How many arrays may be nested inside one another in a single frame.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Errors produced while decoding RESP frames.
///
/// Every variant except [`RespError::Incomplete`] is fatal for the connection
/// that produced the bytes.
#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("not enough data is available to decode an entire value")]
    Incomplete,
    #[error("connection closed in the middle of a frame")]
    UnexpectedEof,
    #[error("invalid length prefix '{0}'")]
    InvalidLength(String),
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),
    #[error("bulk string length does not match its terminator")]
    BulkLengthMismatch,
    #[error("unknown RESP type marker '{}'", char::from(*.0))]
    UnknownMarker(u8),
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("arrays nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("frame of {0} bytes exceeds the limit of {1} bytes")]
    FrameTooLarge(usize, usize),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RespError {
    fn from(err: std::io::Error) -> Self {
        RespError::Io(err.to_string())
    }
}

impl RespError {
    /// Error reply sent to a client right before its connection is dropped.
    pub fn as_resp(&self) -> RespValue {
        RespValue::Error(format!("ERR Protocol error: {}", self))
    }
}

/// A single RESP value.
///
/// RESP2 has two distinct null encodings, one for bulk strings (`$-1`) and one
/// for arrays (`*-1`). Both are kept so that a decoded value encodes back to the
/// exact same bytes.
#[derive(Debug, PartialEq, Clone)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    NullBulkString,
    Array(Vec<RespValue>),
    NullArray,
}

impl RespValue {
    /// Decodes one value from the front of `buffer`, allowing arrays to nest up
    /// to [`DEFAULT_MAX_NESTING_DEPTH`] levels.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - A whole value was decoded and its bytes were removed from `buffer`
    /// * `Ok(None)` - The buffer holds only part of a value; nothing was consumed
    /// * `Err(RespError)` - The bytes are not valid RESP
    pub fn decode(buffer: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        let mut cursor = Cursor::new(&buffer[..]);

        match Self::parse(&mut cursor, DEFAULT_MAX_NESTING_DEPTH) {
            Ok(value) => {
                let position = cursor.position() as usize;
                buffer.advance(position);
                Ok(Some(value))
            }
            Err(RespError::Incomplete) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parses one value starting at the cursor position.
    ///
    /// Arrays are assembled on an explicit stack, so the call depth does not
    /// grow with the input. Opening more than `max_depth` nested arrays fails
    /// with [`RespError::NestingTooDeep`].
    ///
    /// On [`RespError::Incomplete`] the cursor position is a lower bound on the
    /// number of bytes the whole value needs. It may point past the end of the
    /// buffer when a bulk string announced a longer payload than has arrived.
    pub fn parse(src: &mut Cursor<&[u8]>, max_depth: usize) -> Result<RespValue, RespError> {
        // Arrays still being filled, innermost last, with their announced length.
        let mut open_arrays: Vec<(Vec<RespValue>, usize)> = Vec::new();

        'values: loop {
            let mut value = match get_byte(src)? {
                // *<number-of-elements>\r\n<element-1>...<element-n>
                b'*' => match get_length(src)? {
                    None => RespValue::NullArray,
                    Some(0) => RespValue::Array(Vec::new()),
                    Some(length) => {
                        if open_arrays.len() >= max_depth {
                            return Err(RespError::NestingTooDeep(max_depth));
                        }

                        open_arrays.push((Vec::with_capacity(length.min(1024)), length));
                        continue 'values;
                    }
                },
                marker => parse_scalar(marker, src)?,
            };

            while let Some((mut elements, length)) = open_arrays.pop() {
                elements.push(value);

                if elements.len() < length {
                    open_arrays.push((elements, length));
                    continue 'values;
                }

                value = RespValue::Array(elements);
            }

            return Ok(value);
        }
    }

    /// Encodes the value into its wire form.
    ///
    /// # Examples
    ///
    /// ```
    /// use redis_kv::resp::RespValue;
    ///
    /// assert_eq!(RespValue::SimpleString("OK".to_string()).encode(), "+OK\r\n");
    /// assert_eq!(RespValue::BulkString("hey".to_string()).encode(), "$3\r\nhey\r\n");
    /// assert_eq!(RespValue::NullBulkString.encode(), "$-1\r\n");
    /// ```
    pub fn encode(&self) -> String {
        match self {
            RespValue::SimpleString(s) => format!("+{}\r\n", s),
            RespValue::Error(s) => format!("-{}\r\n", s),
            RespValue::Integer(i) => format!(":{}\r\n", i),
            RespValue::BulkString(s) => format!("${}\r\n{}\r\n", s.len(), s),
            RespValue::NullBulkString => "$-1\r\n".to_string(),
            RespValue::Array(elements) => {
                let mut encoded = format!("*{}\r\n", elements.len());

                for element in elements {
                    encoded.push_str(&element.encode());
                }

                encoded
            }
            RespValue::NullArray => "*-1\r\n".to_string(),
        }
    }

    /// Builds an array of bulk strings.
    pub fn bulk_string_array<I, S>(items: I) -> RespValue
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RespValue::Array(
            items
                .into_iter()
                .map(|item| RespValue::BulkString(item.into()))
                .collect(),
        )
    }
}

fn parse_scalar(marker: u8, src: &mut Cursor<&[u8]>) -> Result<RespValue, RespError> {
    match marker {
        b'+' => Ok(RespValue::SimpleString(get_line_string(src)?)),
        b'-' => Ok(RespValue::Error(get_line_string(src)?)),
        b':' => {
            let line = get_line_string(src)?;
            let integer = line
                .parse::<i64>()
                .map_err(|_| RespError::InvalidInteger(line))?;

            Ok(RespValue::Integer(integer))
        }
        // $<length>\r\n<data>\r\n
        b'$' => {
            let Some(length) = get_length(src)? else {
                return Ok(RespValue::NullBulkString);
            };

            let start = src.position() as usize;
            let end = start.saturating_add(length).saturating_add(CRLF.len());

            if src.get_ref().len() < end {
                src.set_position(end as u64);
                return Err(RespError::Incomplete);
            }

            let data = &src.get_ref()[start..start + length];

            if &src.get_ref()[start + length..end] != CRLF {
                return Err(RespError::BulkLengthMismatch);
            }

            let content = std::str::from_utf8(data)
                .map_err(|_| RespError::InvalidUtf8)?
                .to_string();
            src.set_position(end as u64);

            Ok(RespValue::BulkString(content))
        }
        other => Err(RespError::UnknownMarker(other)),
    }
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, RespError> {
    if !src.has_remaining() {
        return Err(RespError::Incomplete);
    }

    Ok(src.get_u8())
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], RespError> {
    let start = src.position() as usize;
    let buffer: &'a [u8] = *src.get_ref();

    let end = buffer[start..]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(RespError::Incomplete)?;

    src.set_position((end + CRLF.len()) as u64);

    Ok(&buffer[start..end])
}

fn get_line_string(src: &mut Cursor<&[u8]>) -> Result<String, RespError> {
    let line = get_line(src)?;

    std::str::from_utf8(line)
        .map(str::to_string)
        .map_err(|_| RespError::InvalidUtf8)
}

/// Reads a length prefix. `-1` is the null marker and yields `None`.
fn get_length(src: &mut Cursor<&[u8]>) -> Result<Option<usize>, RespError> {
    let line = get_line_string(src)?;

    match line.parse::<i64>() {
        Ok(-1) => Ok(None),
        Ok(length) if length >= 0 => Ok(Some(length as usize)),
        _ => Err(RespError::InvalidLength(line)),
    }
}
