//! Error types shared by every stage of the watcher pipeline.

use thiserror::Error;

/// Everything that can go wrong while walking a playlist and publishing its videos.
///
/// [`WatcherError::Transport`], [`WatcherError::HttpStatus`] and
/// [`WatcherError::MalformedResponse`] come from the YouTube Data API and are fatal to a run.
/// [`WatcherError::Delivery`] is only ever returned when the sink was configured to abort on
/// delivery failures; under the default policy failed deliveries are logged and counted.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The request never produced a usable HTTP response.
    #[error("send request to {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a success status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The body was not JSON, or was missing a field we cannot do without.
    #[error("malformed response from {endpoint}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema registry lookup for subject {subject} failed: {reason}")]
    SchemaRegistry { subject: String, reason: String },

    /// The summary could not be encoded against the registered schema.
    #[error("serialize record for video {video_id}")]
    Serialization {
        video_id: String,
        #[source]
        source: apache_avro::Error,
    },

    #[error("kafka client error")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("{failed} record(s) failed delivery ({delivered} delivered)")]
    Delivery { delivered: u64, failed: u64 },
}

impl WatcherError {
    /// Whether this error means we never got a well-formed answer out of the remote endpoint.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}
