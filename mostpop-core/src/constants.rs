//! Constants for the Most Popular feed client.
//!
//! Paths and defaults match the public NYT Most Popular v2 API.

// ═══════════════════════════════════════════════════════════════════════════════
// API LAYOUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Base path of the Most Popular v2 service.
pub const MOST_POPULAR_BASE_PATH: &str = "/svc/mostpopular/v2";

/// Extension appended to every feed path.
pub const RESPONSE_EXTENSION: &str = "json";

/// Query parameter carrying the API key.
pub const API_KEY_QUERY_PARAM: &str = "api-key";

/// Default scheme of the API host.
pub const DEFAULT_API_SCHEME: &str = "https";

/// Default API host.
///
/// Development and production currently point at the same public server.
pub const DEFAULT_API_HOST: &str = "api.nytimes.com";

// ═══════════════════════════════════════════════════════════════════════════════
// FILTER DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Section used when the caller does not narrow the feed.
pub const DEFAULT_SECTION: &str = "all-sections";

/// Separator between the fields of a cache key.
pub const CACHE_KEY_SEPARATOR: char = '-';

/// Token standing in for an absent share kind in a cache key.
pub const CACHE_KEY_NO_SHARE: &str = "none";

// ═══════════════════════════════════════════════════════════════════════════════
// CACHING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default freshness threshold for cached responses (15 minutes).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 15 * 60;

/// Default capacity of the response cache.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// PRESENTATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Media rendition used for article detail images.
pub const DETAIL_IMAGE_FORMAT: &str = "mediumThreeByTwo440";

/// Prefix rendered in front of an article byline.
pub const BYLINE_PREFIX: &str = "By ";

/// Message shown when a feed returns no articles.
pub const NO_ARTICLES_MESSAGE: &str = "No articles found.";

// ═══════════════════════════════════════════════════════════════════════════════
// NETWORK
// ═══════════════════════════════════════════════════════════════════════════════

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
