use std::collections::{HashMap, VecDeque};

use thiserror::Error;
use tokio::{sync::RwLock, time::Instant};

use crate::stream_id::{get_timestamp_in_milliseconds, IdSpec, StreamId, StreamIdError};

/// Errors returned by store operations.
///
/// The display text of each variant is the exact error reply sent to clients.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum StoreError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR Invalid stream ID specified as stream command argument")]
    InvalidStreamId,
    #[error("ERR The ID specified in XADD is equal or smaller than the target stream top item")]
    StreamIdNotIncreasing,
}

impl From<StreamIdError> for StoreError {
    fn from(err: StreamIdError) -> Self {
        match err {
            StreamIdError::InvalidFormat => StoreError::InvalidStreamId,
            StreamIdError::NotIncreasing => StoreError::StreamIdNotIncreasing,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct StreamRecord {
    pub id: StreamId,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum DataType {
    String(String),
    List(VecDeque<String>),
    Stream(Vec<StreamRecord>),
}

impl DataType {
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::String(_) => "string",
            DataType::List(_) => "list",
            DataType::Stream(_) => "stream",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Entry {
    pub data: DataType,
    pub expiration: Option<Instant>,
}

impl Entry {
    pub fn new(data: DataType) -> Self {
        Entry {
            data,
            expiration: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expiration, Some(expiration) if Instant::now() >= expiration)
    }
}

/// The keyspace shared by every connection.
///
/// All operations lock the map for exactly their own duration. Reads share the
/// lock; anything that mutates an entry, including lazy removal of an expired
/// key, takes it exclusively.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        KeyValueStore::default()
    }

    /// Replaces whatever `key` holds with a string value.
    pub async fn set(&self, key: &str, value: String, expiration: Option<Instant>) {
        let mut entries = self.entries.write().await;

        entries.insert(
            key.to_string(),
            Entry {
                data: DataType::String(value),
                expiration,
            },
        );
    }

    /// Returns the value of a live string key.
    ///
    /// Lists and streams are reported as absent rather than as a type error.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.read_entry(key, |entry| match entry {
            Some(Entry {
                data: DataType::String(value),
                ..
            }) => Some(value.clone()),
            _ => None,
        })
        .await
    }

    /// Increments the integer stored at `key` by one.
    ///
    /// # Returns
    ///
    /// * `Ok(i64)` - The value after the increment, `1` for an absent key
    /// * `Err(StoreError::NotAnInteger)` - The value is not a base-10 `i64`, or the increment overflows
    /// * `Err(StoreError::WrongType)` - The key holds a list or a stream
    pub async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.entries.write().await;
        purge_if_expired(&mut entries, key);

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(DataType::String("0".to_string())));

        let DataType::String(ref mut value) = entry.data else {
            return Err(StoreError::WrongType);
        };

        let incremented = value
            .parse::<i64>()
            .ok()
            .and_then(|number| number.checked_add(1))
            .ok_or(StoreError::NotAnInteger)?;
        *value = incremented.to_string();

        Ok(incremented)
    }

    /// Pushes `elements` to the head of the list at `key`, one at a time.
    ///
    /// A key holding anything other than a list is replaced by an empty list
    /// first. Its expiration is left as it was.
    ///
    /// # Returns
    ///
    /// The length of the list after the push.
    pub async fn lpush(&self, key: &str, elements: &[String]) -> usize {
        let mut entries = self.entries.write().await;
        purge_if_expired(&mut entries, key);

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(DataType::List(VecDeque::new())));

        let mut list = match std::mem::replace(&mut entry.data, DataType::List(VecDeque::new())) {
            DataType::List(list) => list,
            _ => VecDeque::new(),
        };

        for element in elements {
            list.push_front(element.clone());
        }

        let length = list.len();
        entry.data = DataType::List(list);

        length
    }

    /// Returns the elements between `start` and `end`, both inclusive.
    ///
    /// Negative indices count from the tail. Indices out of bounds are clamped.
    pub async fn lrange(&self, key: &str, start: i64, end: i64) -> Vec<String> {
        self.read_entry(key, |entry| {
            let Some(Entry {
                data: DataType::List(list),
                ..
            }) = entry
            else {
                return Vec::new();
            };

            let length = list.len() as i64;
            let start = if start < 0 { (length + start).max(0) } else { start };
            let end = if end < 0 { length + end } else { end.min(length - 1) };

            if start > end || start >= length {
                return Vec::new();
            }

            list.iter()
                .skip(start as usize)
                .take((end - start + 1) as usize)
                .cloned()
                .collect()
        })
        .await
    }

    pub async fn llen(&self, key: &str) -> usize {
        self.read_entry(key, |entry| match entry {
            Some(Entry {
                data: DataType::List(list),
                ..
            }) => list.len(),
            _ => 0,
        })
        .await
    }

    pub async fn lpop(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.write().await;
        purge_if_expired(&mut entries, key);

        match entries.get_mut(key) {
            Some(Entry {
                data: DataType::List(list),
                ..
            }) => list.pop_front(),
            _ => None,
        }
    }

    /// Pops the head of the first non-empty list among `keys`, in the given order.
    ///
    /// This is a single scan; waiting for data is handled by the BLPOP command.
    pub async fn blpop(&self, keys: &[String]) -> Option<(String, String)> {
        let mut entries = self.entries.write().await;

        for key in keys {
            purge_if_expired(&mut entries, key);

            if let Some(Entry {
                data: DataType::List(list),
                ..
            }) = entries.get_mut(key)
            {
                if let Some(value) = list.pop_front() {
                    return Some((key.clone(), value));
                }
            }
        }

        None
    }

    pub async fn type_of(&self, key: &str) -> &'static str {
        self.read_entry(key, |entry| match entry {
            Some(entry) => entry.data.type_name(),
            None => "none",
        })
        .await
    }

    /// Appends a record to the stream at `key`, creating the stream if needed.
    ///
    /// # Arguments
    ///
    /// * `key` - The stream key
    /// * `id` - `*`, `<ms>-*` or an explicit `<ms>-<seq>` id
    /// * `fields` - Field/value pairs; a repeated field keeps its first position and its last value
    ///
    /// # Returns
    ///
    /// * `Ok(StreamId)` - The id assigned to the new record
    /// * `Err(StoreError::InvalidStreamId)` - `id` is malformed
    /// * `Err(StoreError::StreamIdNotIncreasing)` - `id` is not greater than the last record's id
    /// * `Err(StoreError::WrongType)` - The key holds a string or a list
    pub async fn xadd(
        &self,
        key: &str,
        id: &str,
        fields: Vec<(String, String)>,
    ) -> Result<StreamId, StoreError> {
        let id_spec = IdSpec::parse(id)?;

        let mut entries = self.entries.write().await;
        purge_if_expired(&mut entries, key);

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(DataType::Stream(Vec::new())));

        let DataType::Stream(ref mut stream) = entry.data else {
            return Err(StoreError::WrongType);
        };

        let last_id = stream.last().map(|record| record.id);
        let now_ms = get_timestamp_in_milliseconds().unwrap_or_default();
        let id = id_spec.resolve(last_id, now_ms)?;

        stream.push(StreamRecord {
            id,
            fields: merge_fields(fields),
        });

        Ok(id)
    }

    /// Returns the records whose ids fall within `[start, end]`, in stream order.
    pub async fn xrange(
        &self,
        key: &str,
        start: StreamId,
        end: StreamId,
        count: Option<usize>,
    ) -> Result<Vec<StreamRecord>, StoreError> {
        self.read_entry(key, |entry| {
            let stream = match entry {
                Some(Entry {
                    data: DataType::Stream(stream),
                    ..
                }) => stream,
                Some(_) => return Err(StoreError::WrongType),
                None => return Ok(Vec::new()),
            };

            Ok(stream
                .iter()
                .skip_while(|record| record.id < start)
                .take_while(|record| record.id <= end)
                .take(count.unwrap_or(usize::MAX))
                .cloned()
                .collect())
        })
        .await
    }

    /// Reads every named stream from its starting id onwards.
    ///
    /// A record qualifies when its id is greater than or equal to the requested
    /// id. Streams without qualifying records are left out, and the others are
    /// returned in the order they were requested.
    pub async fn xread(
        &self,
        streams: &[(String, StreamId)],
        count: Option<usize>,
    ) -> Result<Vec<(String, Vec<StreamRecord>)>, StoreError> {
        let mut expired_keys = Vec::new();

        let result = {
            let entries = self.entries.read().await;
            let mut result = Vec::new();

            for (key, from) in streams {
                let stream = match entries.get(key) {
                    Some(entry) if entry.is_expired() => {
                        expired_keys.push(key.clone());
                        continue;
                    }
                    Some(Entry {
                        data: DataType::Stream(stream),
                        ..
                    }) => stream,
                    Some(_) => return Err(StoreError::WrongType),
                    None => continue,
                };

                let records: Vec<StreamRecord> = stream
                    .iter()
                    .skip_while(|record| record.id < *from)
                    .take(count.unwrap_or(usize::MAX))
                    .cloned()
                    .collect();

                if !records.is_empty() {
                    result.push((key.clone(), records));
                }
            }

            result
        };

        for key in expired_keys {
            self.remove_if_expired(&key).await;
        }

        Ok(result)
    }

    /// The id of the last record of the stream at `key`, if it has any.
    pub async fn last_stream_id(&self, key: &str) -> Result<Option<StreamId>, StoreError> {
        self.read_entry(key, |entry| match entry {
            Some(Entry {
                data: DataType::Stream(stream),
                ..
            }) => Ok(stream.last().map(|record| record.id)),
            Some(_) => Err(StoreError::WrongType),
            None => Ok(None),
        })
        .await
    }

    /// Runs `f` against the live entry for `key` under the read lock.
    ///
    /// An expired entry is passed to `f` as absent and removed afterwards under
    /// the write lock.
    async fn read_entry<T>(&self, key: &str, f: impl FnOnce(Option<&Entry>) -> T) -> T {
        {
            let entries = self.entries.read().await;

            match entries.get(key) {
                Some(entry) if entry.is_expired() => {}
                entry => return f(entry),
            }
        }

        self.remove_if_expired(key).await;
        f(None)
    }

    async fn remove_if_expired(&self, key: &str) {
        let mut entries = self.entries.write().await;

        // Another connection may have rewritten the key between the two locks.
        purge_if_expired(&mut entries, key);
    }
}

fn purge_if_expired(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries.get(key).is_some_and(Entry::is_expired) {
        entries.remove(key);
    }
}

fn merge_fields(fields: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::with_capacity(fields.len());

    for (name, value) in fields {
        match merged.iter_mut().find(|(existing, _)| *existing == name) {
            Some(field) => field.1 = value,
            None => merged.push((name, value)),
        }
    }

    merged
}
