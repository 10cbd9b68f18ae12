// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! XML utilities shared by request builders and response parsing.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::CalDavError;

/// XML namespaces used in `CalDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CalDAV` namespace.
    pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

    /// CalendarServer extensions namespace (getctag).
    pub const CALENDARSERVER: &str = "http://calendarserver.org/ns/";

    /// Apple iCal extensions namespace (calendar-color).
    pub const APPLE_ICAL: &str = "http://apple.com/ns/ical/";
}

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Creates an indented writer for a request body.
pub fn writer() -> XmlWriter {
    Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
}

/// Creates a request document root carrying all four namespace declarations.
///
/// Every request declares the full set, even when only some prefixes are
/// used; several servers reject documents whose prefixes they cannot bind.
pub fn dav_root(name: &str) -> BytesStart<'_> {
    let mut root = BytesStart::new(name);
    root.push_attribute(("xmlns:D", ns::DAV));
    root.push_attribute(("xmlns:C", ns::CALDAV));
    root.push_attribute(("xmlns:CS", ns::CALENDARSERVER));
    root.push_attribute(("xmlns:A", ns::APPLE_ICAL));
    root
}

/// Writes `<name>text</name>`, omitting the text event when it is empty.
pub fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), CalDavError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Writes a self-closing `<name/>` element.
pub fn empty_element(writer: &mut XmlWriter, name: &str) -> Result<(), CalDavError> {
    writer.write_event(Event::Empty(BytesStart::new(name)))?;
    Ok(())
}

/// Finishes a writer and returns the serialized document.
pub fn into_string(writer: XmlWriter) -> String {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8_lossy(&bytes).into_owned()
}
