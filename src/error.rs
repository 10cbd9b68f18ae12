// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy and HTTP outcome classification.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LOCATION};
use url::Url;

/// `CalDAV` client errors.
///
/// Transport failures (connection, timeout, DNS) pass through unmodified as
/// [`CalDavError::Transport`]; this layer never retries.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CalDavError {
    /// Malformed XML anywhere in the pipeline; keeps the offending document.
    #[error("failed to parse XML response: {source}")]
    Parsing {
        /// The document that failed to parse, verbatim.
        xml: String,
        /// The underlying parser failure.
        #[source]
        source: quick_xml::Error,
    },

    /// Generic non-2xx response.
    #[error("request failed with status {status}")]
    Request {
        /// The HTTP status returned by the server.
        status: StatusCode,
        /// The raw response body, kept for diagnostics.
        body: String,
    },

    /// A conditional write or delete lost the optimistic-concurrency race:
    /// the stored resource no longer matches the supplied `ETag` (412).
    ///
    /// Update and delete operations catch this locally and turn it into a
    /// `None`/`false` result; it is an expected outcome, not a failure.
    #[error("precondition failed: stored resource no longer matches the supplied ETag")]
    Precondition {
        /// Always [`StatusCode::PRECONDITION_FAILED`].
        status: StatusCode,
    },

    /// The server answered with a redirect; some servers relocate newly
    /// created resources this way. Callers may choose to follow `location`.
    #[error("server redirected the request (status {status})")]
    Redirect {
        /// The 3xx status returned by the server.
        status: StatusCode,
        /// The `Location` header, when present.
        location: Option<String>,
    },

    /// An entity accessor needed calendar data that was never fetched.
    #[error("calendar data not loaded for {0}")]
    Unloaded(Url),

    /// The external iCalendar parser rejected a payload.
    #[error("failed to parse iCalendar payload: {0}")]
    Ical(String),

    /// A well-formed response with an unexpected structure.
    #[error("invalid server response: {0}")]
    InvalidResponse(String),

    /// Client-side configuration problem, raised before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying transport failure, passed through unmodified.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or resolution failure.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// XML writer failure while building a request body.
    #[error("failed to build XML request: {0}")]
    XmlWrite(#[from] std::io::Error),

    /// XML reader/writer failure outside response parsing.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Classifies a terminal (non-2xx) transport outcome.
///
/// Never returns a non-error: 412 becomes [`CalDavError::Precondition`], any
/// 3xx becomes [`CalDavError::Redirect`] carrying the `Location` header, and
/// everything else becomes a generic [`CalDavError::Request`].
pub(crate) fn classify(status: StatusCode, headers: &HeaderMap, body: String) -> CalDavError {
    if status == StatusCode::PRECONDITION_FAILED {
        CalDavError::Precondition { status }
    } else if status.is_redirection() {
        let location = headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        CalDavError::Redirect { status, location }
    } else {
        CalDavError::Request { status, body }
    }
}
