use crate::{
    commands::command_error::CommandError, key_value_store::StreamRecord, resp::RespValue,
};

/// Converts stream records to the RESP shape used by XRANGE and XREAD.
///
/// Each record becomes a 2-element array: `[id, [field1, value1, field2, value2, ...]]`.
///
/// # Examples
///
/// ```ignore
/// let records = vec![StreamRecord {
///     id: StreamId::new(1234, 0),
///     fields: vec![("temp".to_string(), "25".to_string())],
/// }];
/// let result = parse_stream_entries_to_resp(&records);
/// // Encodes as: "*1\r\n*2\r\n$6\r\n1234-0\r\n*2\r\n$4\r\ntemp\r\n$2\r\n25\r\n"
/// ```
pub fn parse_stream_entries_to_resp(records: &[StreamRecord]) -> RespValue {
    RespValue::Array(
        records
            .iter()
            .map(|record| {
                let fields = record
                    .fields
                    .iter()
                    .flat_map(|(field, value)| [field.clone(), value.clone()]);

                RespValue::Array(vec![
                    RespValue::BulkString(record.id.to_string()),
                    RespValue::bulk_string_array(fields),
                ])
            })
            .collect(),
    )
}

/// Parses the value following a `COUNT` option.
///
/// A count of zero or less means "no limit" and yields `None`.
pub fn parse_count(value: &str) -> Result<Option<usize>, CommandError> {
    let count = value
        .parse::<i64>()
        .map_err(|_| CommandError::NotAnInteger)?;

    Ok(usize::try_from(count).ok().filter(|count| *count > 0))
}
