//! Web Module
//!
//! Page fetching and the access-counting, TTL-bounded page cache.

mod fetcher;
mod page_cache;

pub use fetcher::{Fetcher, HttpFetcher};
pub use page_cache::{cached_key, count_key, WebCache, DEFAULT_PAGE_TTL};
