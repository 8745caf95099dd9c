//! Encoding of [`VideoSummary`] values in the Confluent Avro wire format.
//!
//! Each encoded value is laid out as:
//!
//! | bytes | content                                  |
//! |-------|------------------------------------------|
//! | 0     | magic byte `0`                           |
//! | 1..5  | schema id, big-endian `u32`              |
//! | 5..   | Avro binary datum (no container framing) |

use crate::error::WatcherError;
use crate::schema_registry::RegisteredSchema;
use crate::summary::VideoSummary;
use apache_avro::{Schema, to_avro_datum};

const MAGIC_BYTE: u8 = 0;

/// Serializes record values against one registered schema.
#[derive(Debug, Clone)]
pub struct AvroValueSerializer {
    schema_id: u32,
    schema: Schema,
}

impl From<RegisteredSchema> for AvroValueSerializer {
    fn from(registered: RegisteredSchema) -> Self {
        Self::new(registered.id, registered.schema)
    }
}

impl AvroValueSerializer {
    pub fn new(schema_id: u32, schema: Schema) -> Self {
        Self { schema_id, schema }
    }

    pub fn schema_id(&self) -> u32 {
        self.schema_id
    }

    /// Encodes the stream value of `summary`.
    ///
    /// The value is resolved against the schema before writing, so nullable unions and
    /// `int`/`long` differences in the registered schema are handled.
    pub fn serialize(&self, summary: &VideoSummary) -> Result<Vec<u8>, WatcherError> {
        let fail = |source: apache_avro::Error| WatcherError::Serialization {
            video_id: summary.video_id.clone(),
            source,
        };

        let value = apache_avro::to_value(summary.value())
            .and_then(|value| value.resolve(&self.schema))
            .map_err(fail)?;
        let datum = to_avro_datum(&self.schema, value).map_err(fail)?;

        let mut payload = Vec::with_capacity(5 + datum.len());
        payload.push(MAGIC_BYTE);
        payload.extend_from_slice(&self.schema_id.to_be_bytes());
        payload.extend_from_slice(&datum);
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_registry::tests::YOUTUBE_VIDEOS_VALUE_SCHEMA;
    use apache_avro::{from_avro_datum, types::Value};

    fn summary() -> VideoSummary {
        VideoSummary {
            video_id: "a".to_string(),
            title: "T".to_string(),
            views: 5,
            likes: 0,
            comments: 0,
        }
    }

    fn decode(schema: &Schema, payload: &[u8]) -> Vec<(String, Value)> {
        let mut datum = &payload[5..];
        match from_avro_datum(schema, &mut datum, None).unwrap() {
            Value::Record(fields) => fields,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn frames_with_magic_byte_and_schema_id() {
        let schema = Schema::parse_str(YOUTUBE_VIDEOS_VALUE_SCHEMA).unwrap();
        let serializer = AvroValueSerializer::new(100042, schema.clone());

        let payload = serializer.serialize(&summary()).unwrap();

        assert_eq!(payload[0], 0);
        assert_eq!(&payload[1..5], &100042u32.to_be_bytes());
        let fields = decode(&schema, &payload);
        assert_eq!(
            fields,
            vec![
                (
                    "TITLE".to_string(),
                    Value::Union(1, Box::new(Value::String("T".to_string())))
                ),
                ("VIEWS".to_string(), Value::Union(1, Box::new(Value::Long(5)))),
                ("LIKES".to_string(), Value::Union(1, Box::new(Value::Long(0)))),
                ("COMMENTS".to_string(), Value::Union(1, Box::new(Value::Long(0)))),
            ]
        );
    }

    #[test]
    fn non_nullable_schema() {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "video",
                "fields": [
                    {"name": "TITLE", "type": "string"},
                    {"name": "VIEWS", "type": "long"},
                    {"name": "LIKES", "type": "long"},
                    {"name": "COMMENTS", "type": "long"}
                ]
            }"#,
        )
        .unwrap();
        let serializer = AvroValueSerializer::new(7, schema.clone());

        let payload = serializer.serialize(&summary()).unwrap();

        let fields = decode(&schema, &payload);
        assert_eq!(fields[0], ("TITLE".to_string(), Value::String("T".to_string())));
        assert_eq!(fields[1], ("VIEWS".to_string(), Value::Long(5)));
    }

    #[test]
    fn incompatible_schema_is_a_serialization_error() {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "video",
                "fields": [
                    {"name": "TITLE", "type": "string"},
                    {"name": "DURATION", "type": "string"}
                ]
            }"#,
        )
        .unwrap();
        let serializer = AvroValueSerializer::new(7, schema);

        let err = serializer.serialize(&summary()).unwrap_err();
        match err {
            WatcherError::Serialization { video_id, .. } => assert_eq!(video_id, "a"),
            other => panic!("wrong error {other:?}"),
        }
    }
}
