//! Wiring of the three stages: playlist walk, video lookup, publish.
//!
//! Each stage consumes the lazy output of the one before it, one item at a time, so at most
//! one page per stage is in memory and nothing is fetched ahead of what the publisher takes.

use async_stream::try_stream;
use tokio_stream::{Stream, StreamExt};

use crate::error::WatcherError;
use crate::sinks::{DeliveryReport, VideoSink};
use crate::summary::VideoSummary;
use crate::youtube_api::{PlaylistItem, Video, YouTubeClient};

/// Looks up the video behind each playlist item.
///
/// `items` may come from [`YouTubeClient::list_playlist_items`] or from anywhere else. The first
/// error, from upstream or from a lookup, is yielded and ends the stream.
pub fn resolve_videos<'a, S>(
    client: &'a YouTubeClient,
    items: S,
) -> impl Stream<Item = Result<Video, WatcherError>> + use<'a, S>
where
    S: Stream<Item = Result<PlaylistItem, WatcherError>> + 'a,
{
    try_stream! {
        let mut items = std::pin::pin!(items);
        while let Some(item) = items.next().await {
            let item = item?;
            tracing::debug!(video_id = item.video_id(), "resolving playlist item");

            let videos = client.list_videos(item.video_id());
            let mut videos = std::pin::pin!(videos);
            while let Some(video) = videos.next().await {
                yield video?;
            }
        }
    }
}

/// Summarises and publishes every video, then flushes the sink.
///
/// Nothing is flushed if the stream fails: the error is returned as soon as it is seen, and
/// whatever was already enqueued is left to the producer.
pub async fn publish_videos<S, K>(videos: S, mut sink: K) -> Result<DeliveryReport, WatcherError>
where
    S: Stream<Item = Result<Video, WatcherError>>,
    K: VideoSink,
{
    let mut videos = std::pin::pin!(videos);
    let mut published = 0u64;
    while let Some(video) = videos.next().await {
        let summary = VideoSummary::from(video?);
        tracing::info!(
            video_id = summary.video_id,
            title = summary.title,
            views = summary.views,
            likes = summary.likes,
            comments = summary.comments,
            "got video"
        );
        sink.publish(&summary)?;
        published += 1;
    }

    tracing::info!(published, "playlist walk complete, flushing");
    sink.flush().await
}

/// Runs the whole pipeline for one playlist.
#[tracing::instrument(skip(client, sink))]
pub async fn run<K: VideoSink>(
    client: &YouTubeClient,
    playlist_id: &str,
    sink: K,
) -> Result<DeliveryReport, WatcherError> {
    let items = client.list_playlist_items(playlist_id);
    let videos = resolve_videos(client, items);
    publish_videos(videos, sink).await
}
