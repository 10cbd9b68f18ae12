// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Resolution of server-supplied paths against a base host.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::error::CalDavError;

/// Characters escaped within each path segment. They are syntactically legal
/// in a URL path, but calendar resource identifiers must carry them
/// percent-encoded.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'#')
    .add(b'$')
    .add(b'&')
    .add(b'\'')
    .add(b'*')
    .add(b'+')
    .add(b'-')
    .add(b'=')
    .add(b'?')
    .add(b'^')
    .add(b'_')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'~');

/// Resolves a possibly-relative resource path against a base host.
///
/// - Absent or empty input yields `base` itself.
/// - Input starting with `/` is treated as an absolute path on `base`; each
///   path segment is percent-encoded, and a trailing slash survives because
///   the empty final segment does.
/// - Anything else must already be an absolute URL and is returned
///   normalized (parsed and re-serialized) without reinterpretation.
///
/// Deterministic: the same `(base, path)` pair always yields the same URL,
/// so resource identity can be compared by string equality. Re-resolving an
/// output is a no-op, since it takes the absolute-URL branch.
///
/// # Errors
///
/// Returns an error if the input is neither an absolute path nor a valid
/// absolute URL.
pub fn resolve(base: &Url, path_or_url: Option<&str>) -> Result<Url, CalDavError> {
    match path_or_url {
        None | Some("") => Ok(base.clone()),
        Some(path) if path.starts_with('/') => {
            let encoded = path
                .split('/')
                .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
                .collect::<Vec<_>>()
                .join("/");
            let mut url = base.clone();
            url.set_path(&encoded);
            Ok(url)
        }
        Some(absolute) => Ok(Url::parse(absolute)?),
    }
}
