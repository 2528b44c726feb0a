//! Shared constants for end-to-end tests
//!
//! When test data changes (credentials, record names, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Login used by user tests
pub const TEST_LOGIN: &str = "testuser";

/// Password the test user is created with
pub const TEST_PASS: &str = "testpass123";

/// Password the test user is moved to
pub const TEST_NEW_PASS: &str = "newpass456";

// ============================================================================
// Test Library Records
// ============================================================================

pub const ARTIST_NAME: &str = "The Test Band";

pub const ALBUM_NAME: &str = "First Album";

pub const ALBUM_YEAR: i32 = 1999;

pub const TRACK_NAME: &str = "Opening Track";

pub const TRACK_DURATION: i64 = 215;

/// A well formed id that no record will ever have
pub const MISSING_ID: &str = "00000000-0000-4000-8000-000000000000";

// ============================================================================
// Timeouts and Test Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Timeout for HTTP requests in tests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
