use serde::ser::{Serialize, SerializeMap, Serializer};
use time::OffsetDateTime;

use crate::value::format_time;
use crate::{Fields, Level, Value};

/// Key of the level entry in structured output.
pub const LEVEL_KEY: &str = "level";
/// Key of the timestamp entry in structured output.
pub const TIME_KEY: &str = "time";
/// Key of the primary message in structured output.
pub const MESSAGE_KEY: &str = "message";
/// Key used for opaque errors attached with [`Event::err`](crate::Event::err).
pub const ERROR_KEY: &str = "error";

/// A finalized log record, handed to a [`RecordWriter`](crate::RecordWriter).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: Level,
    pub time: Option<OffsetDateTime>,
    pub message: Option<String>,
    pub fields: Fields,
}

impl Record {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            time: None,
            message: None,
            fields: Fields::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Shorthand for `self.fields().get(key)`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Number of entries recorded under `key`.
    pub fn count(&self, key: &str) -> usize {
        self.fields.get_all(key).count()
    }
}

// `level`, `time`, fields in insertion order, then `message`.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(LEVEL_KEY, self.level.as_str())?;
        if let Some(time) = &self.time {
            map.serialize_entry(TIME_KEY, &format_time(time))?;
        }
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some(message) = &self.message {
            map.serialize_entry(MESSAGE_KEY, message)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_record_json_key_order() {
        let mut record = Record::new(Level::Info);
        record.time = Some(datetime!(2024-01-02 03:04:05 UTC));
        record.fields.push("user", "alice");
        record.fields.push("attempt", 2i32);
        record.message = Some("logged in".to_string());

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"level":"info","time":"2024-01-02T03:04:05Z","user":"alice","attempt":2,"message":"logged in"}"#
        );
    }

    #[test]
    fn test_record_without_time_or_message() {
        let mut record = Record::new(Level::Warn);
        record.fields.push("k", true);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"level":"warn","k":true}"#
        );
    }

    #[test]
    fn test_record_accessors() {
        let mut record = Record::new(Level::Error);
        record.fields.push("k", 1i32);
        record.fields.push("k", 2i32);
        assert_eq!(record.level(), Level::Error);
        assert_eq!(record.message(), None);
        assert_eq!(record.get("k"), Some(&Value::I64(2)));
        assert_eq!(record.count("k"), 2);
    }
}
