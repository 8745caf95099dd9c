//! Core YouTube API client functionality.

use crate::error::WatcherError;
use crate::youtube_api::{
    playlist_items::PlaylistItem,
    types::{Page, PagedStream},
    videos::Video,
};
use http::Method;
use serde::de::DeserializeOwned;
use tokio_stream::Stream;
use tracing::instrument;

/// Where the YouTube Data API v3 lives.
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The largest page size the list endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Client for the public, API-key authenticated parts of the YouTube Data API v3.
///
/// Every request carries the API key as the `key` query parameter. The client is cheap to clone
/// since the underlying [`reqwest::Client`] is reference counted.
#[derive(Clone)]
pub struct YouTubeClient {
    api_key: String,
    /// Base URL that endpoint names are appended to, without a trailing slash.
    base_url: String,
    /// Value for `maxResults` on list calls.
    page_size: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the key
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a client that talks to the public YouTube API.
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            client,
        }
    }

    /// Points the client at a different API root, such as a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets `maxResults` for list calls, clamped to what the API allows.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Makes an API-key authenticated request and decodes the JSON body.
    ///
    /// Failures are split by where they happen: anything before a complete response body is in
    /// hand is a transport failure, a non-success status is [`WatcherError::HttpStatus`], and a
    /// body that does not decode into `T` is [`WatcherError::MalformedResponse`].
    #[instrument(skip(self, query_params), level = tracing::Level::TRACE)]
    pub(crate) async fn make_request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<T, WatcherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .request(method, &url)
            .query(&[("key", self.api_key.as_str())])
            .query(query_params)
            .send()
            .await
            .map_err(|source| WatcherError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(WatcherError::HttpStatus {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| WatcherError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        tracing::trace!(endpoint, body = %body, "got response");

        serde_json::from_str(&body).map_err(|source| WatcherError::MalformedResponse {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Fetches a single page of a playlist's items.
    ///
    /// Starts from the first page when `page_token` is `None`.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    #[instrument(skip(self))]
    pub async fn fetch_playlist_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<PlaylistItem>, WatcherError> {
        let max_results = self.page_size.to_string();
        let mut query_params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query_params.push(("pageToken", token));
        }

        let page: Page<PlaylistItem> = self
            .make_request(Method::GET, "playlistItems", &query_params)
            .await?;

        tracing::debug!(
            returned_items = page.items.len(),
            next_page_token = ?page.next_page_token,
            "fetched playlist items page"
        );

        Ok(page)
    }

    /// Returns every item in the playlist, following `nextPageToken` until the last page.
    ///
    /// Each call starts a fresh walk from the first page. The first failed page fetch is yielded
    /// as an error and ends the stream.
    pub fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> impl Stream<Item = Result<PlaylistItem, WatcherError>> + use<'_> {
        let playlist_id = playlist_id.to_string();
        PagedStream::new(move |page_token: Option<String>| {
            let playlist_id = playlist_id.clone();
            async move {
                self.fetch_playlist_items_page(&playlist_id, page_token.as_deref())
                    .await
            }
        })
    }

    /// Fetches a single page of `videos.list` for the given id(s).
    ///
    /// `video_id` may be a comma-separated list for batched lookups.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self))]
    pub async fn fetch_videos_page(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page<Video>, WatcherError> {
        let mut query_params = vec![("part", "snippet,statistics"), ("id", video_id)];
        if let Some(token) = page_token {
            query_params.push(("pageToken", token));
        }

        let page: Page<Video> = self
            .make_request(Method::GET, "videos", &query_params)
            .await?;

        tracing::debug!(
            video_id,
            returned_items = page.items.len(),
            "fetched video details"
        );

        Ok(page)
    }

    /// Returns the full details of the given video(s).
    ///
    /// A plain id lookup normally fits on one page, but the endpoint is paginated like any
    /// other list call so continuation tokens are followed on `videos.list` itself.
    pub fn list_videos(
        &self,
        video_id: &str,
    ) -> impl Stream<Item = Result<Video, WatcherError>> + use<'_> {
        let video_id = video_id.to_string();
        PagedStream::new(move |page_token: Option<String>| {
            let video_id = video_id.clone();
            async move { self.fetch_videos_page(&video_id, page_token.as_deref()).await }
        })
    }
}
