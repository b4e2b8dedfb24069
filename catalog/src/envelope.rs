use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

const RETRIEVED_AT_FORMAT: &str = "%a %b %e %H:%M:%S %Y UTC";

/// Formats a retrieval time, e.g. `Tue Mar  5 09:07:01 2024 UTC`.
pub fn format_retrieved_at(time: DateTime<Utc>) -> String {
    time.format(RETRIEVED_AT_FORMAT).to_string()
}

/// A fetched payload stamped with the time the fetch completed.
///
/// Serializes as `{"<key>": <payload>, "retrieved_at": "<time>"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<P> {
    pub key: &'static str,
    pub payload: P,
    pub retrieved_at: String,
}

impl<P> Envelope<P> {
    pub fn build(key: &'static str, payload: P) -> Self {
        Self::at(key, payload, Utc::now())
    }

    pub fn at(key: &'static str, payload: P, time: DateTime<Utc>) -> Self {
        Envelope {
            key,
            payload,
            retrieved_at: format_retrieved_at(time),
        }
    }
}

impl<P: Serialize> Serialize for Envelope<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key, &self.payload)?;
        map.serialize_entry("retrieved_at", &self.retrieved_at)?;
        map.end()
    }
}
