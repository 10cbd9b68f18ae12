// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV` client for accessing and managing calendars, events and to-dos
//! on `CalDAV` servers (RFC 4791), with incremental synchronization via
//! `WebDAV`-Sync (RFC 6578).
//!
//! The crate covers the protocol transport and translation layer: building
//! protocol-correct XML request bodies, dispatching them with the right
//! method and headers, parsing multistatus responses, resolving
//! server-supplied resource paths, running the sync algorithm, and mapping
//! outcomes to a small error taxonomy with optimistic-concurrency (`ETag`)
//! semantics. Calendar payloads are treated as opaque `ics` blobs;
//! interpreting them is delegated to the `icalendar` crate at the edges.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod client;
mod config;
mod contextual_url;
mod endpoint;
mod error;
mod request;
mod response;
mod sync;
mod types;
mod xml;

pub use url::Url;

pub use crate::client::CalDavClient;
pub use crate::config::{AuthMethod, Credentials};
pub use crate::contextual_url::resolve;
pub use crate::error::CalDavError;
pub use crate::request::{
    CalendarAttributes, CalendarHomeSetRequest, CalendarPatch, CalendarProp,
    CalendarQueryRequest, ComponentKind, CurrentUserPrincipalRequest, FreeBusyQueryRequest,
    ListCalendarsRequest, MakeCalendarRequest, SyncCollectionRequest, TimeRange,
    UpdateCalendarRequest,
};
pub use crate::response::{Document, Multistatus, PropStat, Properties, ResponseRow, XmlDocument};
pub use crate::sync::SyncCollection;
pub use crate::types::{Calendar, ETag, Event, FreeBusy, Todo};
