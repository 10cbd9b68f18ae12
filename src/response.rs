// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsing and the multistatus model.
//!
//! Property recognition matches on local element names, never on prefixes.
//! Several servers return multistatus documents that use `cs:`/`apple:`
//! prefixes without declaring them; those documents parse the same as
//! fully-declared ones.

use std::io::Cursor;

use quick_xml::{Reader, Writer};
use quick_xml::events::Event;

use crate::error::CalDavError;

/// Outcome of parsing one WebDAV response body.
#[derive(Debug, Clone)]
pub enum Document {
    /// A 207 multistatus body.
    MultiStatus(Multistatus),
    /// Any other well-formed XML document.
    Other(XmlDocument),
}

/// A well-formed, non-multistatus XML document, kept verbatim.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    raw: String,
}

impl XmlDocument {
    /// The document text, exactly as received.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// A parsed `WebDAV` multistatus document.
///
/// Rows appear in document order; the sync engine relies on that being the
/// only ordering guarantee.
#[derive(Debug, Clone)]
pub struct Multistatus {
    /// Per-resource response rows, in document order.
    pub responses: Vec<ResponseRow>,
    /// Document-level `sync-token`, present on sync-collection responses.
    pub sync_token: Option<String>,
}

/// One per-resource `response` fragment of a multistatus document.
#[derive(Debug, Clone)]
pub struct ResponseRow {
    /// Target resource URL or path, as sent by the server.
    pub href: String,
    /// Row-level status, e.g. `HTTP/1.1 404 Not Found` on sync deletions.
    pub status: Option<String>,
    /// Property blocks grouped by status.
    pub prop_stats: Vec<PropStat>,
}

/// A `propstat` block: properties sharing one status.
#[derive(Debug, Clone)]
pub struct PropStat {
    /// The status line for this block.
    pub status: Option<String>,
    /// The properties reported under this status.
    pub props: Properties,
}

/// WebDAV/CalDAV properties of one resource.
///
/// Each attribute is independently requested and independently absent when
/// the server omits it.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    /// `displayname`.
    pub display_name: Option<String>,
    /// Local names of `resourcetype` children, e.g. `collection`, `calendar`.
    pub resource_type: Vec<String>,
    /// `getetag`.
    pub etag: Option<String>,
    /// CalendarServer `getctag`.
    pub ctag: Option<String>,
    /// Apple `calendar-color`.
    pub color: Option<String>,
    /// `calendar-description`.
    pub description: Option<String>,
    /// `calendar-timezone`.
    pub time_zone: Option<String>,
    /// Per-collection `sync-token`.
    pub sync_token: Option<String>,
    /// Opaque `calendar-data` payload.
    pub calendar_data: Option<String>,
    /// Href inside `current-user-principal`.
    pub current_user_principal: Option<String>,
    /// Href inside `calendar-home-set`.
    pub calendar_home_set: Option<String>,
    /// `comp` names inside `supported-calendar-component-set`.
    pub supported_components: Option<Vec<String>>,
    /// Report names inside `supported-report-set`.
    pub supported_reports: Option<Vec<String>>,
}

impl Properties {
    fn merge(&mut self, other: &Self) {
        if self.display_name.is_none() {
            self.display_name = other.display_name.clone();
        }
        if self.resource_type.is_empty() {
            self.resource_type = other.resource_type.clone();
        }
        if self.etag.is_none() {
            self.etag = other.etag.clone();
        }
        if self.ctag.is_none() {
            self.ctag = other.ctag.clone();
        }
        if self.color.is_none() {
            self.color = other.color.clone();
        }
        if self.description.is_none() {
            self.description = other.description.clone();
        }
        if self.time_zone.is_none() {
            self.time_zone = other.time_zone.clone();
        }
        if self.sync_token.is_none() {
            self.sync_token = other.sync_token.clone();
        }
        if self.calendar_data.is_none() {
            self.calendar_data = other.calendar_data.clone();
        }
        if self.current_user_principal.is_none() {
            self.current_user_principal = other.current_user_principal.clone();
        }
        if self.calendar_home_set.is_none() {
            self.calendar_home_set = other.calendar_home_set.clone();
        }
        if self.supported_components.is_none() {
            self.supported_components = other.supported_components.clone();
        }
        if self.supported_reports.is_none() {
            self.supported_reports = other.supported_reports.clone();
        }
    }
}

impl PropStat {
    fn is_ok(&self) -> bool {
        self.status
            .as_deref()
            .is_none_or(|status| status.contains("200") || status.contains("207"))
    }
}

impl ResponseRow {
    /// Merges the properties of every successful `propstat` block.
    #[must_use]
    pub fn ok_props(&self) -> Properties {
        let mut merged = Properties::default();
        for prop_stat in &self.prop_stats {
            if prop_stat.is_ok() {
                merged.merge(&prop_stat.props);
            }
        }
        merged
    }

    /// Whether the row-level status or any property status contains `needle`.
    #[must_use]
    pub fn status_contains(&self, needle: &str) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.contains(needle))
            || self.prop_stats.iter().any(|prop_stat| {
                prop_stat
                    .status
                    .as_deref()
                    .is_some_and(|status| status.contains(needle))
            })
    }
}

impl Multistatus {
    /// Parses a multistatus document.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Parsing`] on malformed XML and
    /// [`CalDavError::InvalidResponse`] when the document root is not
    /// `multistatus`.
    pub fn from_xml(xml: &str) -> Result<Self, CalDavError> {
        match Document::parse(xml)? {
            Document::MultiStatus(multistatus) => Ok(multistatus),
            Document::Other(_) => Err(CalDavError::InvalidResponse(
                "expected a multistatus document".to_string(),
            )),
        }
    }
}

impl Document {
    /// Parses a raw response body into a navigable document.
    ///
    /// # Errors
    ///
    /// Returns [`CalDavError::Parsing`] carrying the original text and the
    /// underlying parse failure when the document is malformed.
    pub fn parse(xml: &str) -> Result<Self, CalDavError> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = true;

        let mut buf = Vec::new();
        loop {
            let event = read(&mut reader, &mut buf, xml)?;
            match event {
                Event::Start(e) => {
                    let is_multistatus = e.name().local_name().into_inner() == b"multistatus";
                    if is_multistatus {
                        let multistatus = parse_multistatus(&mut reader, &mut buf, xml)?;
                        return Ok(Self::MultiStatus(multistatus));
                    }
                    drain(&mut reader, &mut buf, xml)?;
                    return Ok(Self::Other(XmlDocument {
                        raw: xml.to_string(),
                    }));
                }
                Event::Empty(e) => {
                    let is_multistatus = e.name().local_name().into_inner() == b"multistatus";
                    if is_multistatus {
                        return Ok(Self::MultiStatus(Multistatus {
                            responses: Vec::new(),
                            sync_token: None,
                        }));
                    }
                    drain(&mut reader, &mut buf, xml)?;
                    return Ok(Self::Other(XmlDocument {
                        raw: xml.to_string(),
                    }));
                }
                Event::Eof => {
                    return Err(CalDavError::InvalidResponse(
                        "empty XML document".to_string(),
                    ));
                }
                _ => {}
            }
            buf.clear();
        }
    }
}

fn read<'b>(
    reader: &mut Reader<&[u8]>,
    buf: &'b mut Vec<u8>,
    xml: &str,
) -> Result<Event<'b>, CalDavError> {
    reader
        .read_event_into(buf)
        .map_err(|source| parse_error(xml, source))
}

fn parse_error(xml: &str, source: quick_xml::Error) -> CalDavError {
    CalDavError::Parsing {
        xml: xml.to_string(),
        source,
    }
}

fn truncated() -> CalDavError {
    CalDavError::InvalidResponse("unexpected end of multistatus document".to_string())
}

/// Consumes the remainder of the document, surfacing any parse failure.
fn drain(reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>, xml: &str) -> Result<(), CalDavError> {
    loop {
        if matches!(read(reader, buf, xml)?, Event::Eof) {
            return Ok(());
        }
        buf.clear();
    }
}

/// Skips the content of the element whose `Start` was just read.
fn skip_element(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<(), CalDavError> {
    let mut depth = 0usize;
    loop {
        match read(reader, buf, xml)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }
}

fn parse_multistatus(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<Multistatus, CalDavError> {
    let mut responses = Vec::new();
    let mut sync_token = None;

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                match name.as_slice() {
                    b"response" => responses.push(parse_row(reader, buf, xml)?),
                    b"sync-token" => sync_token = read_value(reader, buf, xml)?,
                    _ => skip_element(reader, buf, xml)?,
                }
            }
            Event::End(e) => {
                if e.name().local_name().into_inner() == b"multistatus" {
                    break;
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(Multistatus {
        responses,
        sync_token,
    })
}

fn parse_row(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<ResponseRow, CalDavError> {
    let mut row = ResponseRow {
        href: String::new(),
        status: None,
        prop_stats: Vec::new(),
    };

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                match name.as_slice() {
                    b"href" => row.href = read_value(reader, buf, xml)?.unwrap_or_default(),
                    b"status" => row.status = read_value(reader, buf, xml)?,
                    b"propstat" => row.prop_stats.push(parse_propstat(reader, buf, xml)?),
                    _ => skip_element(reader, buf, xml)?,
                }
            }
            Event::End(e) => {
                if e.name().local_name().into_inner() == b"response" {
                    break;
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(row)
}

fn parse_propstat(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<PropStat, CalDavError> {
    let mut props = Properties::default();
    let mut status = None;

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                match name.as_slice() {
                    b"prop" => props = parse_props(reader, buf, xml)?,
                    b"status" => status = read_value(reader, buf, xml)?,
                    _ => skip_element(reader, buf, xml)?,
                }
            }
            Event::End(e) => {
                if e.name().local_name().into_inner() == b"propstat" {
                    break;
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(PropStat { status, props })
}

fn parse_props(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<Properties, CalDavError> {
    let mut props = Properties::default();

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                match name.as_slice() {
                    b"displayname" => props.display_name = read_value(reader, buf, xml)?,
                    b"getetag" => props.etag = read_value(reader, buf, xml)?,
                    b"getctag" => props.ctag = read_value(reader, buf, xml)?,
                    b"calendar-color" => props.color = read_value(reader, buf, xml)?,
                    b"calendar-description" => props.description = read_value(reader, buf, xml)?,
                    b"calendar-timezone" => props.time_zone = read_value(reader, buf, xml)?,
                    b"sync-token" => props.sync_token = read_value(reader, buf, xml)?,
                    b"calendar-data" => props.calendar_data = read_value(reader, buf, xml)?,
                    b"resourcetype" => {
                        props.resource_type = read_names(reader, buf, xml, b"resourcetype")?;
                    }
                    b"current-user-principal" => {
                        props.current_user_principal =
                            read_nested_href(reader, buf, xml, b"current-user-principal")?;
                    }
                    b"calendar-home-set" => {
                        props.calendar_home_set =
                            read_nested_href(reader, buf, xml, b"calendar-home-set")?;
                    }
                    b"supported-calendar-component-set" => {
                        props.supported_components = Some(read_component_names(reader, buf, xml)?);
                    }
                    b"supported-report-set" => {
                        props.supported_reports = Some(read_report_names(reader, buf, xml)?);
                    }
                    _ => skip_element(reader, buf, xml)?,
                }
            }
            Event::Empty(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                match name.as_slice() {
                    // An empty set still marks the property as present.
                    b"supported-calendar-component-set" => {
                        props.supported_components = Some(Vec::new());
                    }
                    b"supported-report-set" => props.supported_reports = Some(Vec::new()),
                    // Empty scalar properties stay absent.
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.name().local_name().into_inner() == b"prop" {
                    break;
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(props)
}

/// Reads a property value: text content when the element holds text, the
/// serialized concatenation of child elements when it holds structure, and
/// `None` when it holds nothing.
fn read_value(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<Option<String>, CalDavError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut text = String::new();
    let mut saw_element = false;
    let mut depth = 0usize;

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                saw_element = true;
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                saw_element = true;
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                writer.write_event(Event::End(e))?;
            }
            Event::Text(t) => {
                if depth > 0 {
                    writer.write_event(Event::Text(t))?;
                } else {
                    let decoded = t
                        .decode()
                        .map_err(|source| parse_error(xml, source.into()))?;
                    let unescaped = quick_xml::escape::unescape(&decoded)
                        .map_err(|source| parse_error(xml, source.into()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(t) => {
                if depth > 0 {
                    writer.write_event(Event::CData(t))?;
                } else {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    if saw_element {
        let bytes = writer.into_inner().into_inner();
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    } else if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// Reads the href inside a wrapper element such as `calendar-home-set`.
fn read_nested_href(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
    end: &[u8],
) -> Result<Option<String>, CalDavError> {
    let mut href = None;

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                if name.as_slice() == b"href" {
                    let value = read_value(reader, buf, xml)?;
                    if href.is_none() {
                        href = value;
                    }
                } else {
                    skip_element(reader, buf, xml)?;
                }
            }
            Event::End(e) => {
                if e.name().local_name().into_inner() == end {
                    break;
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(href)
}

/// Collects the local names of an element's children, e.g. `resourcetype`.
fn read_names(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
    end: &[u8],
) -> Result<Vec<String>, CalDavError> {
    let mut names = Vec::new();

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                names.push(String::from_utf8_lossy(&name).into_owned());
                skip_element(reader, buf, xml)?;
            }
            Event::Empty(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                names.push(String::from_utf8_lossy(&name).into_owned());
            }
            Event::End(e) => {
                if e.name().local_name().into_inner() == end {
                    break;
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}

/// Collects `comp` name attributes of a `supported-calendar-component-set`.
fn read_component_names(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<Vec<String>, CalDavError> {
    let mut components = Vec::new();

    loop {
        match read(reader, buf, xml)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.name().local_name().into_inner() == b"comp" =>
            {
                if let Ok(Some(attr)) = e.try_get_attribute("name") {
                    components.push(String::from_utf8_lossy(&attr.value).into_owned());
                }
            }
            Event::End(ref e)
                if e.name().local_name().into_inner() == b"supported-calendar-component-set" =>
            {
                break;
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(components)
}

/// Collects report names under `supported-report-set/supported-report/report`.
fn read_report_names(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    xml: &str,
) -> Result<Vec<String>, CalDavError> {
    let mut names = Vec::new();
    let mut in_report = false;

    loop {
        let event = read(reader, buf, xml)?;
        match event {
            Event::Start(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                match name.as_slice() {
                    b"report" => in_report = true,
                    b"supported-report" => {}
                    other => {
                        if in_report {
                            names.push(String::from_utf8_lossy(other).into_owned());
                        }
                    }
                }
            }
            Event::Empty(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                if in_report && name.as_slice() != b"report" {
                    names.push(String::from_utf8_lossy(&name).into_owned());
                }
            }
            Event::End(e) => {
                let name = e.name().local_name().into_inner().to_vec();
                match name.as_slice() {
                    b"report" => in_report = false,
                    b"supported-report-set" => break,
                    _ => {}
                }
            }
            Event::Eof => return Err(truncated()),
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}
