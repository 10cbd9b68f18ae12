// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Request body builders, one per `CalDAV` operation.
//!
//! Every builder is pure: it turns its parameters into a namespaced XML
//! document and nothing else. Time values are accepted as [`jiff::Timestamp`]
//! (UTC by construction) and formatted as basic ISO-8601
//! (`YYYYMMDDTHHMMSSZ`) on the way out.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::CalDavError;
use crate::xml;

fn format_utc(timestamp: Timestamp) -> String {
    timestamp
        .to_zoned(TimeZone::UTC)
        .strftime("%Y%m%dT%H%M%SZ")
        .to_string()
}

/// PROPFIND body requesting `current-user-principal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentUserPrincipalRequest;

impl CurrentUserPrincipalRequest {
    /// Creates the request.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("D:propfind")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        xml::empty_element(&mut writer, "D:current-user-principal")?;
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

        Ok(xml::into_string(writer))
    }
}

/// PROPFIND body requesting `calendar-home-set`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarHomeSetRequest;

impl CalendarHomeSetRequest {
    /// Creates the request.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("D:propfind")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        xml::empty_element(&mut writer, "C:calendar-home-set")?;
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

        Ok(xml::into_string(writer))
    }
}

/// Calendar properties a caller can request when listing or describing
/// calendar collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarProp {
    /// Display name.
    DisplayName,
    /// Resource type.
    ResourceType,
    /// `ETag`.
    Etag,
    /// CalendarServer collection tag.
    Ctag,
    /// Apple calendar color.
    Color,
    /// `WebDAV`-Sync token.
    SyncToken,
    /// Supported REPORT set.
    SupportedReports,
    /// Supported calendar component set.
    SupportedComponents,
}

impl CalendarProp {
    /// Every property, in the order they are emitted by [`ListCalendarsRequest::all`].
    pub const ALL: [Self; 8] = [
        Self::DisplayName,
        Self::ResourceType,
        Self::Etag,
        Self::Ctag,
        Self::Color,
        Self::SyncToken,
        Self::SupportedReports,
        Self::SupportedComponents,
    ];

    const fn qualified_name(self) -> &'static str {
        match self {
            Self::DisplayName => "D:displayname",
            Self::ResourceType => "D:resourcetype",
            Self::Etag => "D:getetag",
            Self::Ctag => "CS:getctag",
            Self::Color => "A:calendar-color",
            Self::SyncToken => "D:sync-token",
            Self::SupportedReports => "D:supported-report-set",
            Self::SupportedComponents => "C:supported-calendar-component-set",
        }
    }
}

/// PROPFIND body for listing or describing calendar collections.
///
/// Only the requested properties are emitted, so servers that reject
/// unsupported property requests are never asked for them.
#[derive(Debug, Clone)]
pub struct ListCalendarsRequest {
    props: Vec<CalendarProp>,
}

impl ListCalendarsRequest {
    /// Creates an empty request; add properties with [`add_property`](Self::add_property).
    #[must_use]
    pub const fn new() -> Self {
        Self { props: Vec::new() }
    }

    /// Creates a request for the full property set.
    #[must_use]
    pub fn all() -> Self {
        Self {
            props: CalendarProp::ALL.to_vec(),
        }
    }

    /// Adds a property to the request.
    pub fn add_property(&mut self, prop: CalendarProp) -> &mut Self {
        self.props.push(prop);
        self
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("D:propfind")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        for prop in &self.props {
            xml::empty_element(&mut writer, prop.qualified_name())?;
        }
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

        Ok(xml::into_string(writer))
    }
}

impl Default for ListCalendarsRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Attributes for creating a calendar collection.
#[derive(Debug, Clone)]
pub struct CalendarAttributes {
    /// Display name, required by MKCALENDAR.
    pub display_name: String,
    /// Calendar description.
    pub description: Option<String>,
    /// Calendar time zone as an iCalendar VTIMEZONE payload.
    pub time_zone: Option<String>,
    /// Apple calendar color, e.g. `#00FF00`.
    pub color: Option<String>,
}

impl CalendarAttributes {
    /// Creates attributes with only a display name set.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            description: None,
            time_zone: None,
            color: None,
        }
    }
}

/// MKCALENDAR body for creating a calendar collection.
///
/// The supported component set is fixed to `VEVENT`.
#[derive(Debug, Clone)]
pub struct MakeCalendarRequest {
    attributes: CalendarAttributes,
}

impl MakeCalendarRequest {
    /// Creates the request.
    #[must_use]
    pub const fn new(attributes: CalendarAttributes) -> Self {
        Self { attributes }
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("C:mkcalendar")))?;
        writer.write_event(Event::Start(BytesStart::new("D:set")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

        xml::text_element(&mut writer, "D:displayname", &self.attributes.display_name)?;
        if let Some(description) = &self.attributes.description {
            xml::text_element(&mut writer, "C:calendar-description", description)?;
        }
        if let Some(time_zone) = &self.attributes.time_zone {
            xml::text_element(&mut writer, "C:calendar-timezone", time_zone)?;
        }
        if let Some(color) = &self.attributes.color {
            xml::text_element(&mut writer, "A:calendar-color", color)?;
        }

        writer.write_event(Event::Start(BytesStart::new(
            "C:supported-calendar-component-set",
        )))?;
        let mut comp = BytesStart::new("C:comp");
        comp.push_attribute(("name", "VEVENT"));
        writer.write_event(Event::Empty(comp))?;
        writer.write_event(Event::End(BytesEnd::new(
            "C:supported-calendar-component-set",
        )))?;

        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:set")))?;
        writer.write_event(Event::End(BytesEnd::new("C:mkcalendar")))?;

        Ok(xml::into_string(writer))
    }
}

/// Attributes to change on an existing calendar collection.
///
/// Only the supplied attributes appear in the PROPPATCH body.
#[derive(Debug, Clone, Default)]
pub struct CalendarPatch {
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New time zone as an iCalendar VTIMEZONE payload.
    pub time_zone: Option<String>,
    /// New Apple calendar color.
    pub color: Option<String>,
}

/// PROPPATCH body for updating calendar collection properties.
#[derive(Debug, Clone)]
pub struct UpdateCalendarRequest {
    patch: CalendarPatch,
}

impl UpdateCalendarRequest {
    /// Creates the request.
    #[must_use]
    pub const fn new(patch: CalendarPatch) -> Self {
        Self { patch }
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("D:propertyupdate")))?;
        writer.write_event(Event::Start(BytesStart::new("D:set")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

        if let Some(display_name) = &self.patch.display_name {
            xml::text_element(&mut writer, "D:displayname", display_name)?;
        }
        if let Some(description) = &self.patch.description {
            xml::text_element(&mut writer, "C:calendar-description", description)?;
        }
        if let Some(time_zone) = &self.patch.time_zone {
            xml::text_element(&mut writer, "C:calendar-timezone", time_zone)?;
        }
        if let Some(color) = &self.patch.color {
            xml::text_element(&mut writer, "A:calendar-color", color)?;
        }

        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:set")))?;
        writer.write_event(Event::End(BytesEnd::new("D:propertyupdate")))?;

        Ok(xml::into_string(writer))
    }
}

/// Calendar component kind targeted by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// VEVENT components.
    Event,
    /// VTODO components.
    Todo,
}

impl ComponentKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
        }
    }
}

/// UTC time range filter for calendar queries.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    /// Start of the range (inclusive).
    pub start: Option<Timestamp>,
    /// End of the range (exclusive).
    pub end: Option<Timestamp>,
}

/// REPORT calendar-query body listing events or todos.
///
/// Requests `getetag` and `calendar-data` for every match. When recurrence
/// expansion is enabled and a time range is present, the calendar-data
/// request is wrapped in an `expand` directive bounded by that range.
#[derive(Debug, Clone)]
pub struct CalendarQueryRequest {
    component: ComponentKind,
    time_range: Option<TimeRange>,
    expand: bool,
}

impl CalendarQueryRequest {
    /// Creates a query for the given component kind.
    #[must_use]
    pub const fn new(component: ComponentKind) -> Self {
        Self {
            component,
            time_range: None,
            expand: false,
        }
    }

    /// Sets the time range filter; a fully-absent range is ignored.
    #[must_use]
    pub fn time_range(mut self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        if start.is_some() || end.is_some() {
            self.time_range = Some(TimeRange { start, end });
        }
        self
    }

    /// Requests server-side recurrence expansion over the time range.
    #[must_use]
    pub fn expand_recurrences(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("C:calendar-query")))?;

        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        xml::empty_element(&mut writer, "D:getetag")?;
        match self.time_range {
            Some(range) if self.expand => {
                writer.write_event(Event::Start(BytesStart::new("C:calendar-data")))?;
                let mut expand = BytesStart::new("C:expand");
                if let Some(start) = range.start {
                    expand.push_attribute(("start", format_utc(start).as_str()));
                }
                if let Some(end) = range.end {
                    expand.push_attribute(("end", format_utc(end).as_str()));
                }
                writer.write_event(Event::Empty(expand))?;
                writer.write_event(Event::End(BytesEnd::new("C:calendar-data")))?;
            }
            _ => xml::empty_element(&mut writer, "C:calendar-data")?,
        }
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;

        writer.write_event(Event::Start(BytesStart::new("C:filter")))?;
        let mut vcalendar = BytesStart::new("C:comp-filter");
        vcalendar.push_attribute(("name", "VCALENDAR"));
        writer.write_event(Event::Start(vcalendar))?;

        let mut component = BytesStart::new("C:comp-filter");
        component.push_attribute(("name", self.component.name()));
        match self.time_range {
            Some(range) => {
                writer.write_event(Event::Start(component))?;
                let mut time_range = BytesStart::new("C:time-range");
                if let Some(start) = range.start {
                    time_range.push_attribute(("start", format_utc(start).as_str()));
                }
                if let Some(end) = range.end {
                    time_range.push_attribute(("end", format_utc(end).as_str()));
                }
                writer.write_event(Event::Empty(time_range))?;
                writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;
            }
            None => writer.write_event(Event::Empty(component))?,
        }

        writer.write_event(Event::End(BytesEnd::new("C:comp-filter")))?;
        writer.write_event(Event::End(BytesEnd::new("C:filter")))?;
        writer.write_event(Event::End(BytesEnd::new("C:calendar-query")))?;

        Ok(xml::into_string(writer))
    }
}

/// REPORT sync-collection body for incremental synchronization.
#[derive(Debug, Clone)]
pub struct SyncCollectionRequest {
    sync_token: String,
}

impl SyncCollectionRequest {
    /// Creates the request; an empty token means an initial sync.
    #[must_use]
    pub fn new(sync_token: impl Into<String>) -> Self {
        Self {
            sync_token: sync_token.into(),
        }
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("D:sync-collection")))?;
        xml::text_element(&mut writer, "D:sync-token", &self.sync_token)?;
        xml::text_element(&mut writer, "D:sync-level", "1")?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
        xml::empty_element(&mut writer, "D:getetag")?;
        xml::empty_element(&mut writer, "C:calendar-data")?;
        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        writer.write_event(Event::End(BytesEnd::new("D:sync-collection")))?;

        Ok(xml::into_string(writer))
    }
}

/// REPORT free-busy-query body over a UTC time range.
#[derive(Debug, Clone, Copy)]
pub struct FreeBusyQueryRequest {
    start: Timestamp,
    end: Timestamp,
}

impl FreeBusyQueryRequest {
    /// Creates the request.
    #[must_use]
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CalDavError> {
        let mut writer = xml::writer();

        writer.write_event(Event::Start(xml::dav_root("C:free-busy-query")))?;
        let mut time_range = BytesStart::new("C:time-range");
        time_range.push_attribute(("start", format_utc(self.start).as_str()));
        time_range.push_attribute(("end", format_utc(self.end).as_str()));
        writer.write_event(Event::Empty(time_range))?;
        writer.write_event(Event::End(BytesEnd::new("C:free-busy-query")))?;

        Ok(xml::into_string(writer))
    }
}
