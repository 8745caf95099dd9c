//! The record we publish for each video.

use crate::youtube_api::Video;
use serde::{Deserialize, Serialize};

/// The minimal projection of a [`Video`] that goes downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl From<Video> for VideoSummary {
    fn from(video: Video) -> Self {
        Self {
            video_id: video.id,
            title: video.snippet.title,
            views: video.statistics.view_count,
            likes: video.statistics.like_count,
            comments: video.statistics.comment_count,
        }
    }
}

impl VideoSummary {
    /// The key records are published under.
    pub fn key(&self) -> &str {
        &self.video_id
    }

    /// The record value in the shape the `youtube_videos` stream expects.
    pub fn value(&self) -> VideoValue {
        VideoValue {
            title: self.title.clone(),
            views: saturating_long(self.views),
            likes: saturating_long(self.likes),
            comments: saturating_long(self.comments),
        }
    }
}

/// Value half of a `youtube_videos` record.
///
/// Avro has no unsigned integers, so counts are carried as `long`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoValue {
    #[serde(rename = "TITLE")]
    pub title: String,
    #[serde(rename = "VIEWS")]
    pub views: i64,
    #[serde(rename = "LIKES")]
    pub likes: i64,
    #[serde(rename = "COMMENTS")]
    pub comments: i64,
}

fn saturating_long(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
