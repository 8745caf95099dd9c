//! YouTube Data API v3 client library.
//!
//! Only the two read-only list endpoints the watcher needs are covered:
//!
//! - `playlistItems.list`, which yields [`PlaylistItem`]s pointing at videos, and
//! - `videos.list`, which yields the [`Video`] details (title and statistics) behind each one.
//!
//! Both are cursor paginated. [`PagedStream`] turns a "fetch one page for this cursor" function
//! into a lazy stream of items that keeps fetching until a page comes back without a
//! `nextPageToken`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tokio_stream::StreamExt;
//! use youtube_watcher::youtube_api::YouTubeClient;
//!
//! # async fn example() -> Result<(), youtube_watcher::WatcherError> {
//! let client = YouTubeClient::new("my-api-key", reqwest::Client::new());
//!
//! let items = client.list_playlist_items("PLxyz");
//! let mut items = std::pin::pin!(items);
//! while let Some(item) = items.next().await {
//!     let item = item?;
//!     println!("video: {}", item.video_id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod playlist_items;
pub mod types;
pub mod videos;

// Re-export main types for convenience
pub use client::{DEFAULT_API_URL, YouTubeClient};
pub use types::{Page, PageInfo, PagedStream};

pub use playlist_items::{PlaylistItem, PlaylistItemContentDetails};
pub use videos::{Video, VideoSnippet, VideoStatistics};
