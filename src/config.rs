// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Server credentials and provider presets.

use url::Url;

use crate::error::CalDavError;

const APPLE_HOST: &str = "https://caldav.icloud.com";
const FASTMAIL_HOST: &str = "https://caldav.fastmail.com/dav/";
const GOOGLE_HOST: &str = "https://apidata.googleusercontent.com/caldav/v2/";

/// `CalDAV` authentication method.
///
/// Determines the `Authorization` header strategy used by every request.
/// The variant is fixed at construction time; there is no runtime fallback.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// Basic authentication (username/password).
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Bearer token authentication (OAuth).
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// Resolved `CalDAV` server credentials.
///
/// Immutable once constructed; one `Credentials` value backs one client
/// instance.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Credentials {
    /// Base host of the `CalDAV` server.
    pub host: Url,
    /// Authentication method.
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("calendav/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Credentials {
    /// Creates credentials from an already-parsed host URL.
    #[must_use]
    pub fn new(host: Url, auth: AuthMethod) -> Self {
        Self {
            host,
            auth,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }

    /// Credentials for a generic or self-hosted server using basic auth.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not a valid absolute URL.
    pub fn standard(
        host: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CalDavError> {
        Ok(Self::new(
            Url::parse(host)?,
            AuthMethod::Basic {
                username: username.into(),
                password: password.into(),
            },
        ))
    }

    /// Credentials for Apple iCloud calendars (basic auth with an
    /// app-specific password).
    ///
    /// # Errors
    ///
    /// Returns an error if the preset host fails to parse.
    pub fn apple(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CalDavError> {
        Self::standard(APPLE_HOST, username, password)
    }

    /// Credentials for Fastmail calendars (basic auth with an app password).
    ///
    /// # Errors
    ///
    /// Returns an error if the preset host fails to parse.
    pub fn fastmail(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CalDavError> {
        Self::standard(FASTMAIL_HOST, username, password)
    }

    /// Credentials for Google calendars (OAuth bearer token).
    ///
    /// # Errors
    ///
    /// Returns an error if the preset host fails to parse.
    pub fn google(token: impl Into<String>) -> Result<Self, CalDavError> {
        Ok(Self::new(
            Url::parse(GOOGLE_HOST)?,
            AuthMethod::Bearer {
                token: token.into(),
            },
        ))
    }
}
