//! YouTube Videos API types and functionality.

use crate::youtube_api::types::{count, non_empty};
use serde::{Deserialize, Serialize};

/// A `video` resource represents a YouTube video.
///
/// Requested with `part=snippet,statistics`. A non-empty `id` and `snippet.title` are required: a video
/// without them cannot be summarised, so their absence fails deserialization rather than being
/// papered over.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    #[serde(deserialize_with = "non_empty")]
    pub id: String,
    /// Basic details about the video, such as its title.
    pub snippet: VideoSnippet,
    /// Statistics about the video.
    ///
    /// Missing entirely for some videos (e.g. when the owner hides them), which reads as all
    /// zeroes.
    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// See: <https://developers.google.com/youtube/v3/docs/videos#snippet>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSnippet {
    /// The video's title.
    pub title: String,
    /// The ID of the channel that the video was uploaded to.
    #[serde(
        rename = "channelId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_id: Option<String>,
}

/// Statistics about the video.
///
/// The API sends these as decimal strings and leaves out counters that are unavailable. Both
/// cases are folded into plain integers here, with absent counters reading as `0`.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#statistics>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStatistics {
    /// The number of times the video has been viewed.
    #[serde(rename = "viewCount", default, deserialize_with = "count")]
    pub view_count: u64,
    /// The number of users who have indicated that they liked the video.
    #[serde(rename = "likeCount", default, deserialize_with = "count")]
    pub like_count: u64,
    /// The number of comments for the video.
    #[serde(rename = "commentCount", default, deserialize_with = "count")]
    pub comment_count: u64,
}
