//! YouTube PlaylistItems API types.

use crate::youtube_api::types::non_empty;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A `playlistItem` resource identifies another resource, such as a video, that is included in a
/// playlist.
///
/// We only request the `contentDetails` part, which is enough to find the video each entry
/// points at.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// The ID that YouTube uses to uniquely identify the playlist item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "contentDetails")]
    pub content_details: PlaylistItemContentDetails,
}

/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#contentDetails>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemContentDetails {
    /// The ID that YouTube uses to uniquely identify a video.
    #[serde(rename = "videoId", deserialize_with = "non_empty")]
    pub video_id: String,
    /// When the video was published to YouTube.
    ///
    /// Absent for private and deleted videos.
    #[serde(
        rename = "videoPublishedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub video_published_at: Option<Timestamp>,
}

impl PlaylistItem {
    pub fn video_id(&self) -> &str {
        &self.content_details.video_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube_api::types::Page;

    #[test]
    fn parses_playlist_items_page() {
        let page: Page<PlaylistItem> = serde_json::from_str(
            r#"{
                "kind": "youtube#playlistItemListResponse",
                "etag": "abc",
                "nextPageToken": "CAUQAA",
                "items": [
                    {
                        "kind": "youtube#playlistItem",
                        "id": "UExfM",
                        "contentDetails": {
                            "videoId": "dQw4w9WgXcQ",
                            "videoPublishedAt": "2009-10-25T06:57:33Z"
                        }
                    },
                    {
                        "kind": "youtube#playlistItem",
                        "id": "UExfN",
                        "contentDetails": { "videoId": "private1" }
                    }
                ],
                "pageInfo": { "totalResults": 12, "resultsPerPage": 2 }
            }"#,
        )
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].video_id(), "dQw4w9WgXcQ");
        assert!(page.items[0].content_details.video_published_at.is_some());
        assert_eq!(page.items[1].video_id(), "private1");
        assert!(page.items[1].content_details.video_published_at.is_none());
        assert_eq!(page.page_info.unwrap().total_results, 12);
    }

    #[test]
    fn missing_items_is_rejected() {
        let res = serde_json::from_str::<Page<PlaylistItem>>(
            r#"{"kind": "youtube#playlistItemListResponse", "nextPageToken": "X"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn missing_video_id_is_rejected() {
        let res = serde_json::from_str::<Page<PlaylistItem>>(
            r#"{"items": [{"contentDetails": {}}]}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn empty_video_id_is_rejected() {
        let res = serde_json::from_str::<Page<PlaylistItem>>(
            r#"{"items": [{"contentDetails": {"videoId": ""}}]}"#,
        );
        assert!(res.is_err());
    }
}
