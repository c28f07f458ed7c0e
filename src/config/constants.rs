//! Configuration constants.
//!
//! Defaults for the HTTP server, pagination, the Google Places integration and
//! retry behaviour of outbound HTTP calls.

use std::time::Duration;

/// Default SQLite database path
pub const DB_PATH: &str = "./visa_directory.db";
/// Default bind address for the API server
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default port for the API server
pub const DEFAULT_PORT: u16 = 8080;

// Pagination
/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 12;
/// Upper bound on the page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Currency recorded on scam reports that do not name one
pub const DEFAULT_CURRENCY: &str = "AED";

/// Maximum number of SQLite/Postgres connections in the pool
pub const DB_MAX_CONNECTIONS: u32 = 5;
/// How long to wait for a pooled connection before giving up
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

// Google Places
/// Base URL of the Places web service (details endpoint lives under it)
pub const PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
/// Fields requested from the details endpoint. Every field is billed, so keep this tight.
pub const PLACES_DETAIL_FIELDS: &str = "place_id,name,formatted_address,international_phone_number,website,rating,user_ratings_total,reviews,photos,geometry";
/// Age after which a cached place is refreshed when live calls are allowed (7 days)
pub const PLACES_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Lifetime of an admin bearer token (12 hours)
pub const ADMIN_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);
/// Most admin tokens held at once; the oldest is evicted past this
pub const ADMIN_MAX_SESSIONS: usize = 32;
/// Per-request timeout for Places and Supabase calls
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// Retry policy for outbound HTTP
/// Initial delay between retries in milliseconds
pub const RETRY_INITIAL_DELAY_MS: u64 = 2;
/// Backoff multiplier
pub const RETRY_FACTOR: u64 = 50;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
/// Maximum number of retries after the first attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;

/// Environment variable names for backend credentials
pub const ENV_STORAGE_BACKEND: &str = "STORAGE_BACKEND";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_KEY";
pub const ENV_GOOGLE_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";
