// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsing tests.

use calendav::{CalDavError, Document, Multistatus};

#[test]
fn response_parse_rows_in_document_order() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/me/a.ics</D:href>
  </D:response>
  <D:response>
    <D:href>/calendars/me/b.ics</D:href>
  </D:response>
  <D:response>
    <D:href>/calendars/me/c.ics</D:href>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");

    let hrefs: Vec<&str> = multistatus
        .responses
        .iter()
        .map(|row| row.href.as_str())
        .collect();
    assert_eq!(
        hrefs,
        vec![
            "/calendars/me/a.ics",
            "/calendars/me/b.ics",
            "/calendars/me/c.ics"
        ]
    );
}

#[test]
fn response_parse_propstat_properties() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/me/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Personal</D:displayname>
        <D:resourcetype>
          <D:collection/>
          <C:calendar/>
        </D:resourcetype>
        <D:getetag>"etag-1"</D:getetag>
        <C:calendar-description>Home things</C:calendar-description>
        <D:sync-token>http://example.com/sync/5</D:sync-token>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let props = multistatus.responses[0].ok_props();

    assert_eq!(props.display_name.as_deref(), Some("Personal"));
    assert_eq!(props.etag.as_deref(), Some("\"etag-1\""));
    assert_eq!(props.description.as_deref(), Some("Home things"));
    assert_eq!(props.sync_token.as_deref(), Some("http://example.com/sync/5"));
    assert_eq!(
        props.resource_type,
        vec!["collection".to_string(), "calendar".to_string()]
    );
}

#[test]
fn response_parse_tolerates_undeclared_prefixes() {
    // Some servers use cs:/apple: prefixes without declaring the namespaces.
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/me/personal/</D:href>
    <D:propstat>
      <D:prop>
        <cs:getctag>"ctag-7"</cs:getctag>
        <apple:calendar-color>#FF0000</apple:calendar-color>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let props = multistatus.responses[0].ok_props();

    assert_eq!(props.ctag.as_deref(), Some("\"ctag-7\""));
    assert_eq!(props.color.as_deref(), Some("#FF0000"));
}

#[test]
fn response_parse_component_and_report_sets() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/me/personal/</D:href>
    <D:propstat>
      <D:prop>
        <C:supported-calendar-component-set>
          <C:comp name="VEVENT"/>
          <C:comp name="VTODO"/>
        </C:supported-calendar-component-set>
        <D:supported-report-set>
          <D:supported-report>
            <D:report><D:sync-collection/></D:report>
          </D:supported-report>
          <D:supported-report>
            <D:report><C:calendar-query/></D:report>
          </D:supported-report>
        </D:supported-report-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let props = multistatus.responses[0].ok_props();

    assert_eq!(
        props.supported_components,
        Some(vec!["VEVENT".to_string(), "VTODO".to_string()])
    );
    assert_eq!(
        props.supported_reports,
        Some(vec!["sync-collection".to_string(), "calendar-query".to_string()])
    );
}

#[test]
fn response_parse_nested_hrefs() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/</D:href>
    <D:propstat>
      <D:prop>
        <D:current-user-principal>
          <D:href>/principals/me/</D:href>
        </D:current-user-principal>
        <C:calendar-home-set>
          <D:href>/calendars/me/</D:href>
        </C:calendar-home-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let props = multistatus.responses[0].ok_props();

    assert_eq!(props.current_user_principal.as_deref(), Some("/principals/me/"));
    assert_eq!(props.calendar_home_set.as_deref(), Some("/calendars/me/"));
}

#[test]
fn response_parse_row_level_status() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/me/personal/gone.ics</D:href>
    <D:status>HTTP/1.1 404 Not Found</D:status>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let row = &multistatus.responses[0];

    assert_eq!(row.status.as_deref(), Some("HTTP/1.1 404 Not Found"));
    assert!(row.status_contains("404 Not Found"));
}

#[test]
fn response_parse_propstat_status_is_searchable() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/me/personal/</D:href>
    <D:propstat>
      <D:prop/>
      <D:status>HTTP/1.1 507 Insufficient Storage</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");

    assert!(multistatus.responses[0].status_contains("507"));
    assert!(!multistatus.responses[0].status_contains("404"));
}

#[test]
fn response_parse_document_level_sync_token() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/me/personal/a.ics</D:href>
  </D:response>
  <D:sync-token>http://example.com/sync/99</D:sync-token>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(
        multistatus.sync_token.as_deref(),
        Some("http://example.com/sync/99")
    );
}

#[test]
fn response_parse_failed_propstat_is_ignored() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/me/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Personal</D:displayname>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
    <D:propstat>
      <D:prop>
        <D:getetag/>
      </D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let props = multistatus.responses[0].ok_props();

    assert_eq!(props.display_name.as_deref(), Some("Personal"));
    assert_eq!(props.etag, None);
}

#[test]
fn response_parse_empty_property_is_absent() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/calendars/me/personal/</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag/>
        <D:displayname></D:displayname>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let props = multistatus.responses[0].ok_props();

    assert_eq!(props.etag, None);
    assert_eq!(props.display_name, None);
}

#[test]
fn response_parse_malformed_xml_keeps_input() {
    let xml = "<D:multistatus xmlns:D=\"DAV:\"><oops";

    let error = Multistatus::from_xml(xml).expect_err("Parse should fail");

    match error {
        CalDavError::Parsing { xml: kept, .. } => assert!(kept.contains("oops")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn response_parse_non_multistatus_document() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:prop xmlns:D="DAV:">
  <D:displayname>Not a multistatus</D:displayname>
</D:prop>"#;

    let document = Document::parse(xml).expect("Failed to parse document");

    match document {
        Document::Other(doc) => assert!(doc.raw().contains("Not a multistatus")),
        Document::MultiStatus(_) => panic!("should not be a multistatus"),
    }
}

#[test]
fn response_parse_calendar_data_payload() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/calendars/me/personal/brunch.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"etag-1"</D:getetag>
        <C:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
END:VCALENDAR</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let multistatus = Multistatus::from_xml(xml).expect("Failed to parse multistatus");
    let props = multistatus.responses[0].ok_props();

    let data = props.calendar_data.expect("calendar-data should be present");
    assert!(data.starts_with("BEGIN:VCALENDAR"));
    assert!(data.ends_with("END:VCALENDAR"));
}
