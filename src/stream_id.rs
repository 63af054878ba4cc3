//! Stream entry identifiers.
//!
//! A stream id is a `(milliseconds, sequence)` pair written as `"<ms>-<seq>"`.
//! Ids are totally ordered by milliseconds first and sequence second, which is
//! exactly the order derived from the field declaration order of [`StreamId`].

use std::{
    fmt,
    str::FromStr,
    time::{SystemTime, SystemTimeError},
};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum StreamIdError {
    #[error("invalid stream id format")]
    InvalidFormat,
    #[error("stream id is equal or smaller than the last stream entry")]
    NotIncreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    /// The id denoted by the `-` range sentinel.
    pub const MIN: StreamId = StreamId { ms: 0, seq: 0 };
    /// The id denoted by the `+` range sentinel.
    pub const MAX: StreamId = StreamId {
        ms: u64::MAX,
        seq: u64::MAX,
    };

    pub fn new(ms: u64, seq: u64) -> Self {
        StreamId { ms, seq }
    }

    /// Parses a complete `"<ms>-<seq>"` id.
    ///
    /// # Examples
    ///
    /// ```
    /// use redis_kv::stream_id::StreamId;
    ///
    /// assert_eq!(StreamId::parse("1526919030474-3"), Ok(StreamId::new(1526919030474, 3)));
    /// assert!(StreamId::parse("1526919030474").is_err());
    /// assert!(StreamId::parse("-").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, StreamIdError> {
        let (ms, seq) = input.split_once('-').ok_or(StreamIdError::InvalidFormat)?;

        Ok(StreamId {
            ms: parse_part(ms)?,
            seq: parse_part(seq)?,
        })
    }

    pub fn is_valid_format(input: &str) -> bool {
        StreamId::parse(input).is_ok()
    }

    /// Parses the start of a range: `-`, a bare `<ms>` (sequence 0) or a full id.
    pub fn parse_range_start(input: &str) -> Result<Self, StreamIdError> {
        match input {
            "-" => Ok(StreamId::MIN),
            _ if !input.contains('-') => Ok(StreamId::new(parse_part(input)?, 0)),
            _ => StreamId::parse(input),
        }
    }

    /// Parses the end of a range: `+`, a bare `<ms>` (any sequence) or a full id.
    pub fn parse_range_end(input: &str) -> Result<Self, StreamIdError> {
        match input {
            "+" => Ok(StreamId::MAX),
            _ if !input.contains('-') => Ok(StreamId::new(parse_part(input)?, u64::MAX)),
            _ => StreamId::parse(input),
        }
    }

    /// Mints the id for a fully auto-generated (`*`) entry.
    ///
    /// Returns `(now_ms, 0)` unless the last entry already uses `now_ms` or a
    /// later millisecond, in which case the sequence of the last entry is bumped.
    /// `None` means the id space after `last` is exhausted.
    pub fn next_after(last: Option<StreamId>, now_ms: u64) -> Option<StreamId> {
        match last {
            Some(last) if last.ms >= now_ms => last.successor(),
            _ => Some(StreamId::new(now_ms, 0)),
        }
    }

    /// The smallest id strictly greater than `self`.
    pub fn successor(&self) -> Option<StreamId> {
        match self.seq.checked_add(1) {
            Some(seq) => Some(StreamId::new(self.ms, seq)),
            None => self.ms.checked_add(1).map(|ms| StreamId::new(ms, 0)),
        }
    }
}

impl FromStr for StreamId {
    type Err = StreamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamId::parse(s)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

/// The id argument given to XADD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IdSpec {
    /// `*`
    Auto,
    /// `<ms>-*`
    AutoSequence(u64),
    /// `<ms>-<seq>`
    Explicit(StreamId),
}

impl IdSpec {
    pub fn parse(input: &str) -> Result<Self, StreamIdError> {
        if input == "*" {
            return Ok(IdSpec::Auto);
        }

        match input.split_once('-') {
            Some((ms, "*")) => Ok(IdSpec::AutoSequence(parse_part(ms)?)),
            _ => Ok(IdSpec::Explicit(StreamId::parse(input)?)),
        }
    }

    /// Resolves the requested id against the last id of the target stream.
    ///
    /// The resolved id is always strictly greater than `last`; an empty stream
    /// (`last == None`) accepts any explicit id.
    pub fn resolve(self, last: Option<StreamId>, now_ms: u64) -> Result<StreamId, StreamIdError> {
        let id = match self {
            IdSpec::Auto => StreamId::next_after(last, now_ms).ok_or(StreamIdError::NotIncreasing)?,
            IdSpec::AutoSequence(ms) => match last {
                Some(last) if last.ms == ms => {
                    last.successor().ok_or(StreamIdError::NotIncreasing)?
                }
                _ => StreamId::new(ms, 0),
            },
            IdSpec::Explicit(id) => id,
        };

        match last {
            Some(last) if id <= last => Err(StreamIdError::NotIncreasing),
            _ => Ok(id),
        }
    }
}

pub fn get_timestamp_in_milliseconds() -> Result<u64, SystemTimeError> {
    let duration_since_epoch = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;

    Ok(duration_since_epoch.as_millis() as u64)
}

fn parse_part(part: &str) -> Result<u64, StreamIdError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamIdError::InvalidFormat);
    }

    part.parse::<u64>().map_err(|_| StreamIdError::InvalidFormat)
}
