//! Walks a YouTube playlist, looks up each video's statistics, and publishes a per-video summary
//! to Kafka (or to the log, for dry runs).
//!
//! The pipeline is three lazy stages: [`YouTubeClient::list_playlist_items`],
//! [`pipeline::resolve_videos`], and a [`VideoSink`]. [`run`] wires them together.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod schema_registry;
pub mod serialization;
pub mod sinks;
pub mod summary;
pub mod youtube_api;

pub use error::WatcherError;
pub use pipeline::run;
pub use sinks::{DeliveryFailurePolicy, DeliveryReport, KafkaSink, PrintSink, VideoSink};
pub use summary::VideoSummary;
pub use youtube_api::YouTubeClient;
