//! Shared types and streaming infrastructure for the YouTube API client.

use crate::error::WatcherError;
use serde::{Deserialize, Deserializer};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = Result<(F, Page<T>), WatcherError>> + 'a + Send>>;

/// One response from a YouTube `*.list` endpoint.
///
/// All list endpoints share this envelope: an ordered batch of `items` and, if more results
/// are available, a `nextPageToken` to pass back as `pageToken` on the next call.
///
/// `items` is the one field we insist on; a body without it is treated as malformed.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    /// Identifies the API resource's type, e.g. `youtube#playlistItemListResponse`.
    #[serde(default)]
    pub kind: Option<String>,
    pub items: VecDeque<T>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: Option<PageInfo>,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page in the result set.
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// A paginated stream that automatically fetches subsequent pages from a YouTube API list endpoint.
///
/// This stream yields items one by one, automatically fetching the next page when the current
/// page is exhausted. Only supports forward pagination (no previous page support).
///
/// The cursor lives inside the stream: the fetcher is called with `None` for the first page and
/// with each page's `nextPageToken` after that. Nothing is fetched until the stream is first
/// polled, and a page without a token ends the stream without any further request.
pub struct PagedStream<'a, T, F> {
    /// Current batch of items from the most recent API response
    current_items: VecDeque<T>,
    /// Future representing the currently pending API request, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    /// Whether we've reached the end of all available data
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    /// Create a new PagedStream that will start from the first page of results.
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<String>) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = Result<Page<T>, WatcherError>> + Send + 'a,
    {
        let first_page = async move {
            let page = fetcher(None).await?;
            Ok((fetcher, page))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            is_done: false,
        }
    }
}

impl<'a, T: Unpin, F> Unpin for PagedStream<'a, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = Result<Page<T>, WatcherError>> + Send + 'a,
{
    type Item = Result<T, WatcherError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if self.is_done {
                return Poll::Ready(None);
            }

            let Some(pending) = self.pending_request.as_mut() else {
                self.is_done = true;
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((fetcher, page))) => {
                    self.current_items.extend(page.items);

                    if let Some(next_token) = page.next_page_token {
                        // Set up the future for the next page (but don't poll it yet)
                        self.pending_request = Some(Box::pin(async move {
                            let page = fetcher(Some(next_token)).await?;
                            Ok((fetcher, page))
                        }));
                    } else {
                        self.is_done = true;
                        self.pending_request = None;
                    }
                }
                Poll::Ready(Err(e)) => {
                    // A failed page ends the walk; the error is surfaced exactly once.
                    self.pending_request = None;
                    self.is_done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Paging details for lists of resources.
///
/// Includes the total number of items available and the number of resources
/// returned in a single page response.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults")]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
}

/// Deserializes a YouTube statistics counter.
///
/// The API reports counts as decimal strings (`"viewCount": "1234"`) and omits counters the
/// owner has hidden. Missing or `null` becomes 0; anything that is not a non-negative integer
/// is an error.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Text(String),
        Number(u64),
    }

    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawCount::Number(n)) => Ok(n),
        Some(RawCount::Text(s)) => s.parse().map_err(|_| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(&s),
                &"a non-negative integer count",
            )
        }),
    }
}

/// Deserializes an identifier that must not be empty.
///
/// Identifiers end up as record keys, so `""` is rejected like a missing field.
pub(crate) fn non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(&s),
            &"a non-empty identifier",
        ));
    }
    Ok(s)
}
