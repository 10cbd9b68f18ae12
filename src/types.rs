// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Entities mapped out of multistatus rows.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::sync::OnceLock;

use icalendar::{CalendarComponent, Component};
use url::Url;

use crate::contextual_url::resolve;
use crate::error::CalDavError;
use crate::response::ResponseRow;

/// Entity tag for change detection.
///
/// An `ETag` is an opaque version identifier returned by the server, used
/// for optimistic concurrency via `If-Match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ETag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ETag {
    fn from(etag: String) -> Self {
        Self(etag)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        Self(etag.to_string())
    }
}

/// A calendar collection.
///
/// All attributes except `url` are optional; each is independently requested
/// and independently absent when the server omits it. Values are fixed at
/// construction; property changes go through a PROPPATCH round trip and a
/// re-fetch.
#[derive(Debug, Clone)]
pub struct Calendar {
    /// Absolute URL of the collection.
    pub url: Url,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// CalendarServer collection tag.
    pub ctag: Option<String>,
    /// Entity tag.
    pub etag: Option<ETag>,
    /// Time zone as an iCalendar VTIMEZONE payload.
    pub time_zone: Option<String>,
    /// Apple calendar color.
    pub color: Option<String>,
    /// Supported component names, e.g. `VEVENT`, `VTODO`.
    pub components: BTreeSet<String>,
    /// Supported report names, e.g. `sync-collection`.
    pub reports: BTreeSet<String>,
    /// `WebDAV`-Sync token of the collection.
    pub sync_token: Option<String>,
}

impl Calendar {
    /// Maps a multistatus row to a calendar, resolving its href against
    /// `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row href cannot be resolved.
    pub fn from_row(base: &Url, row: &ResponseRow) -> Result<Self, CalDavError> {
        let props = row.ok_props();
        Ok(Self {
            url: resolve(base, Some(&row.href))?,
            display_name: props.display_name,
            description: props.description,
            ctag: props.ctag,
            etag: props.etag.map(ETag::from),
            time_zone: props.time_zone,
            color: props.color,
            components: props.supported_components.unwrap_or_default().into_iter().collect(),
            reports: props.supported_reports.unwrap_or_default().into_iter().collect(),
            sync_token: props.sync_token,
        })
    }
}

/// A calendar object resource holding a VEVENT payload.
///
/// The payload is opaque to this crate. It may be absent ("unloaded") when
/// the entity was built from a listing that omitted bodies; accessors that
/// need it fail with [`CalDavError::Unloaded`] until the resource is
/// fetched. Parsed payloads are cached for the entity's lifetime.
#[derive(Debug)]
pub struct Event {
    url: Url,
    calendar_data: Option<String>,
    etag: Option<ETag>,
    parsed: OnceLock<icalendar::Calendar>,
}

impl Event {
    /// Creates an event resource.
    #[must_use]
    pub const fn new(url: Url, calendar_data: Option<String>, etag: Option<ETag>) -> Self {
        Self {
            url,
            calendar_data,
            etag,
            parsed: OnceLock::new(),
        }
    }

    /// Maps a multistatus row to an event, resolving its href against
    /// `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row href cannot be resolved.
    pub fn from_row(base: &Url, row: &ResponseRow) -> Result<Self, CalDavError> {
        let props = row.ok_props();
        Ok(Self::new(
            resolve(base, Some(&row.href))?,
            props.calendar_data,
            props.etag.map(ETag::from),
        ))
    }

    /// Absolute URL of the resource.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The raw iCalendar payload, when loaded.
    #[must_use]
    pub fn calendar_data(&self) -> Option<&str> {
        self.calendar_data.as_deref()
    }

    /// Entity tag of the resource, when the server reported one.
    #[must_use]
    pub fn etag(&self) -> Option<&ETag> {
        self.etag.as_ref()
    }

    /// Whether the payload is absent and must be fetched before use.
    #[must_use]
    pub fn is_unloaded(&self) -> bool {
        self.calendar_data.is_none()
    }

    /// The `SUMMARY` of the first VEVENT in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Unloaded`] when the payload is absent and
    /// [`CalDavError::Ical`] when it cannot be parsed.
    pub fn summary(&self) -> Result<Option<String>, CalDavError> {
        self.vevent_property("SUMMARY")
    }

    /// The raw `DTSTART` of the first VEVENT in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Unloaded`] when the payload is absent and
    /// [`CalDavError::Ical`] when it cannot be parsed.
    pub fn dtstart(&self) -> Result<Option<String>, CalDavError> {
        self.vevent_property("DTSTART")
    }

    /// The raw `DTEND` of the first VEVENT in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Unloaded`] when the payload is absent and
    /// [`CalDavError::Ical`] when it cannot be parsed.
    pub fn dtend(&self) -> Result<Option<String>, CalDavError> {
        self.vevent_property("DTEND")
    }

    fn vevent_property(&self, name: &str) -> Result<Option<String>, CalDavError> {
        let calendar = self.parsed()?;
        Ok(calendar.components.iter().find_map(|component| match component {
            CalendarComponent::Event(event) => {
                event.property_value(name).map(ToOwned::to_owned)
            }
            _ => None,
        }))
    }

    fn parsed(&self) -> Result<&icalendar::Calendar, CalDavError> {
        if let Some(calendar) = self.parsed.get() {
            return Ok(calendar);
        }
        let data = self
            .calendar_data
            .as_deref()
            .ok_or_else(|| CalDavError::Unloaded(self.url.clone()))?;
        let calendar = data
            .parse::<icalendar::Calendar>()
            .map_err(CalDavError::Ical)?;
        Ok(self.parsed.get_or_init(|| calendar))
    }
}

impl Clone for Event {
    fn clone(&self) -> Self {
        Self::new(
            self.url.clone(),
            self.calendar_data.clone(),
            self.etag.clone(),
        )
    }
}

/// A calendar object resource holding a VTODO payload.
///
/// Shares the [`Event`] shape; only the lazy accessors differ.
#[derive(Debug)]
pub struct Todo {
    url: Url,
    calendar_data: Option<String>,
    etag: Option<ETag>,
    parsed: OnceLock<icalendar::Calendar>,
}

impl Todo {
    /// Creates a todo resource.
    #[must_use]
    pub const fn new(url: Url, calendar_data: Option<String>, etag: Option<ETag>) -> Self {
        Self {
            url,
            calendar_data,
            etag,
            parsed: OnceLock::new(),
        }
    }

    /// Maps a multistatus row to a todo, resolving its href against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row href cannot be resolved.
    pub fn from_row(base: &Url, row: &ResponseRow) -> Result<Self, CalDavError> {
        let props = row.ok_props();
        Ok(Self::new(
            resolve(base, Some(&row.href))?,
            props.calendar_data,
            props.etag.map(ETag::from),
        ))
    }

    /// Absolute URL of the resource.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The raw iCalendar payload, when loaded.
    #[must_use]
    pub fn calendar_data(&self) -> Option<&str> {
        self.calendar_data.as_deref()
    }

    /// Entity tag of the resource, when the server reported one.
    #[must_use]
    pub fn etag(&self) -> Option<&ETag> {
        self.etag.as_ref()
    }

    /// Whether the payload is absent and must be fetched before use.
    #[must_use]
    pub fn is_unloaded(&self) -> bool {
        self.calendar_data.is_none()
    }

    /// The `SUMMARY` of the first VTODO in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Unloaded`] when the payload is absent and
    /// [`CalDavError::Ical`] when it cannot be parsed.
    pub fn summary(&self) -> Result<Option<String>, CalDavError> {
        self.vtodo_property("SUMMARY")
    }

    /// The raw `DUE` of the first VTODO in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Unloaded`] when the payload is absent and
    /// [`CalDavError::Ical`] when it cannot be parsed.
    pub fn due(&self) -> Result<Option<String>, CalDavError> {
        self.vtodo_property("DUE")
    }

    /// The `STATUS` of the first VTODO in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Unloaded`] when the payload is absent and
    /// [`CalDavError::Ical`] when it cannot be parsed.
    pub fn status(&self) -> Result<Option<String>, CalDavError> {
        self.vtodo_property("STATUS")
    }

    fn vtodo_property(&self, name: &str) -> Result<Option<String>, CalDavError> {
        let calendar = self.parsed()?;
        Ok(calendar.components.iter().find_map(|component| match component {
            CalendarComponent::Todo(todo) => todo.property_value(name).map(ToOwned::to_owned),
            _ => None,
        }))
    }

    fn parsed(&self) -> Result<&icalendar::Calendar, CalDavError> {
        if let Some(calendar) = self.parsed.get() {
            return Ok(calendar);
        }
        let data = self
            .calendar_data
            .as_deref()
            .ok_or_else(|| CalDavError::Unloaded(self.url.clone()))?;
        let calendar = data
            .parse::<icalendar::Calendar>()
            .map_err(CalDavError::Ical)?;
        Ok(self.parsed.get_or_init(|| calendar))
    }
}

impl Clone for Todo {
    fn clone(&self) -> Self {
        Self::new(
            self.url.clone(),
            self.calendar_data.clone(),
            self.etag.clone(),
        )
    }
}

impl From<Event> for Todo {
    fn from(event: Event) -> Self {
        Self::new(event.url, event.calendar_data, event.etag)
    }
}

impl From<Todo> for Event {
    fn from(todo: Todo) -> Self {
        Self::new(todo.url, todo.calendar_data, todo.etag)
    }
}

/// Free/busy information for a calendar over a queried range.
///
/// The payload is the raw `text/calendar` VFREEBUSY document; interpreting
/// it is the caller's concern.
#[derive(Debug, Clone)]
pub struct FreeBusy {
    /// The queried calendar URL.
    pub url: Url,
    /// Raw VFREEBUSY payload returned by the server.
    pub calendar_data: String,
}

impl FreeBusy {
    /// Creates a free/busy result.
    #[must_use]
    pub const fn new(url: Url, calendar_data: String) -> Self {
        Self { url, calendar_data }
    }
}
