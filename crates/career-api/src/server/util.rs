use super::*;

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::HeaderMap;

pub(super) fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-max-age"),
        HeaderValue::from_static("3600"),
    );
}

/// `CAREER_SQLITE_PATH`, or `career_profiles.sqlite` in the working directory.
pub fn default_sqlite_path() -> PathBuf {
    std::env::var("CAREER_SQLITE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH))
}

/// Wall clock in epoch milliseconds. A clock set before 1970 reads as zero.
pub(super) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

pub(super) fn page_size(requested: Option<usize>) -> Result<usize, HttpApiError> {
    match requested {
        Some(0) => Err(HttpApiError::bad_request(
            "page_size must be at least 1",
            Some("page_size"),
        )),
        Some(size) => Ok(size.min(MAX_PAGE_SIZE)),
        None => Ok(DEFAULT_PAGE_SIZE),
    }
}
