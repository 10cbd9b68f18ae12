// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Verb-level dispatch of `CalDAV` operations over the HTTP transport.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, ETAG, HeaderMap, HeaderName, IF_MATCH, LOCATION};
use reqwest::{Method, StatusCode, redirect};
use url::Url;

use crate::config::{AuthMethod, Credentials};
use crate::error::{CalDavError, classify};
use crate::response::{Document, Multistatus, XmlDocument};
use crate::types::ETag;

/// Depth header values used by `WebDAV` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// The target resource only.
    Zero,
    /// The target resource and its direct children.
    One,
}

impl Depth {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
        }
    }
}

/// Request body content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `application/xml; charset=utf-8`.
    Xml,
    /// `text/calendar`.
    Ics,
}

impl ContentType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "application/xml; charset=utf-8",
            Self::Ics => "text/calendar",
        }
    }
}

/// A successful response the caller consumes as-is: an empty body, or a
/// `text/calendar` payload left unparsed for the external iCalendar parser.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The 2xx status.
    pub status: StatusCode,
    /// `ETag` header, when present.
    pub etag: Option<String>,
    /// `Location` header, when present.
    pub location: Option<String>,
    /// `DAV` capability header, when present.
    pub dav: Option<String>,
    /// Raw body; empty for header-only responses.
    pub body: String,
}

/// A classified successful response.
#[derive(Debug, Clone)]
pub enum DavResponse {
    /// Empty or `text/calendar` body, returned raw.
    Raw(RawResponse),
    /// A well-formed XML document that was not a multistatus.
    Xml(XmlDocument),
    /// A 207 multistatus body.
    MultiStatus(Multistatus),
}

#[derive(Debug, Default)]
struct RequestOptions<'a> {
    depth: Option<Depth>,
    etag: Option<&'a ETag>,
    content_type: Option<ContentType>,
}

/// Executes protocol operations against one server with one credential set.
#[derive(Debug, Clone)]
pub struct Endpoint {
    http: reqwest::Client,
    credentials: Credentials,
}

impl Endpoint {
    /// Creates an endpoint.
    ///
    /// Redirect following is disabled: 3xx outcomes must surface as
    /// [`CalDavError::Redirect`] so callers can decide what to do with the
    /// relocated resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(credentials: Credentials) -> Result<Self, CalDavError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(credentials.timeout_secs))
            .user_agent(&credentials.user_agent)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { http, credentials })
    }

    /// Issues a PROPFIND with an XML body and the given depth.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome.
    pub async fn propfind(
        &self,
        url: &Url,
        body: String,
        depth: Depth,
    ) -> Result<DavResponse, CalDavError> {
        let options = RequestOptions {
            depth: Some(depth),
            content_type: Some(ContentType::Xml),
            ..RequestOptions::default()
        };
        self.request(dav_method("PROPFIND")?, url, Some(body), options)
            .await
    }

    /// Issues a PROPPATCH with an XML body.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome.
    pub async fn proppatch(&self, url: &Url, body: String) -> Result<DavResponse, CalDavError> {
        let options = RequestOptions {
            content_type: Some(ContentType::Xml),
            ..RequestOptions::default()
        };
        self.request(dav_method("PROPPATCH")?, url, Some(body), options)
            .await
    }

    /// Issues a MKCALENDAR with an XML body.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome.
    pub async fn mkcalendar(&self, url: &Url, body: String) -> Result<DavResponse, CalDavError> {
        let options = RequestOptions {
            content_type: Some(ContentType::Xml),
            ..RequestOptions::default()
        };
        self.request(dav_method("MKCALENDAR")?, url, Some(body), options)
            .await
    }

    /// Issues a REPORT with an XML body.
    ///
    /// `depth` is omitted entirely when `None`; sync-collection REPORTs must
    /// not cap their depth.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome.
    pub async fn report(
        &self,
        url: &Url,
        body: String,
        depth: Option<Depth>,
    ) -> Result<DavResponse, CalDavError> {
        let options = RequestOptions {
            depth,
            content_type: Some(ContentType::Xml),
            ..RequestOptions::default()
        };
        self.request(dav_method("REPORT")?, url, Some(body), options)
            .await
    }

    /// Issues a GET.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome.
    pub async fn get(&self, url: &Url) -> Result<DavResponse, CalDavError> {
        self.request(Method::GET, url, None, RequestOptions::default())
            .await
    }

    /// Issues a PUT, conditionally when an etag is supplied.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome; a stale etag
    /// surfaces as [`CalDavError::Precondition`].
    pub async fn put(
        &self,
        url: &Url,
        body: String,
        content_type: ContentType,
        etag: Option<&ETag>,
    ) -> Result<DavResponse, CalDavError> {
        let options = RequestOptions {
            etag,
            content_type: Some(content_type),
            ..RequestOptions::default()
        };
        self.request(Method::PUT, url, Some(body), options).await
    }

    /// Issues a DELETE, conditionally when an etag is supplied.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome; a stale etag
    /// surfaces as [`CalDavError::Precondition`].
    pub async fn delete(&self, url: &Url, etag: Option<&ETag>) -> Result<DavResponse, CalDavError> {
        let options = RequestOptions {
            etag,
            ..RequestOptions::default()
        };
        self.request(Method::DELETE, url, None, options).await
    }

    /// Issues an OPTIONS, used for capability discovery.
    ///
    /// # Errors
    ///
    /// Returns a classified error on any non-2xx outcome.
    pub async fn options(&self, url: &Url) -> Result<DavResponse, CalDavError> {
        self.request(Method::OPTIONS, url, None, RequestOptions::default())
            .await
    }

    async fn request(
        &self,
        method: Method,
        url: &Url,
        body: Option<String>,
        options: RequestOptions<'_>,
    ) -> Result<DavResponse, CalDavError> {
        let mut request = self.http.request(method.clone(), url.clone());

        request = match &self.credentials.auth {
            AuthMethod::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            AuthMethod::Bearer { token } => request.bearer_auth(token),
        };

        if let Some(depth) = options.depth {
            request = request.header("Depth", depth.as_str());
        }
        if let Some(etag) = options.etag {
            request = request.header(IF_MATCH, etag.as_str());
        }
        if let Some(content_type) = options.content_type {
            request = request.header(CONTENT_TYPE, content_type.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        tracing::debug!(%method, %url, "dispatching request");
        let response = request.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if status.is_success() {
            parse_success(status, &headers, body)
        } else {
            tracing::debug!(%status, "request rejected by server");
            Err(classify(status, &headers, body))
        }
    }
}

fn dav_method(name: &'static str) -> Result<Method, CalDavError> {
    Method::from_bytes(name.as_bytes())
        .map_err(|e| CalDavError::Config(format!("invalid HTTP method {name}: {e}")))
}

fn parse_success(
    status: StatusCode,
    headers: &HeaderMap,
    body: String,
) -> Result<DavResponse, CalDavError> {
    let content_type = header_value(headers, &CONTENT_TYPE).unwrap_or_default();
    if body.is_empty() || content_type.starts_with("text/calendar") {
        return Ok(DavResponse::Raw(RawResponse {
            status,
            etag: header_value(headers, &ETAG),
            location: header_value(headers, &LOCATION),
            dav: headers
                .get("DAV")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            body,
        }));
    }

    match Document::parse(&body)? {
        Document::MultiStatus(multistatus) => Ok(DavResponse::MultiStatus(multistatus)),
        Document::Other(document) => Ok(DavResponse::Xml(document)),
    }
}

fn header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
