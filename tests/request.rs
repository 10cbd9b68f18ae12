// SPDX-FileCopyrightText: 2026 the calendav authors
//
// SPDX-License-Identifier: Apache-2.0

//! Request building tests.

use calendav::{
    CalendarAttributes, CalendarHomeSetRequest, CalendarPatch, CalendarProp,
    CalendarQueryRequest, ComponentKind, CurrentUserPrincipalRequest, FreeBusyQueryRequest,
    ListCalendarsRequest, MakeCalendarRequest, SyncCollectionRequest, UpdateCalendarRequest,
};
use jiff::Timestamp;

fn ts(s: &str) -> Timestamp {
    s.parse().expect("Failed to parse timestamp")
}

#[test]
fn request_roots_declare_all_namespaces() {
    let xml = CurrentUserPrincipalRequest::new()
        .build()
        .expect("Failed to build PROPFIND XML");

    assert!(xml.contains("xmlns:D=\"DAV:\""));
    assert!(xml.contains("xmlns:C=\"urn:ietf:params:xml:ns:caldav\""));
    assert!(xml.contains("xmlns:CS=\"http://calendarserver.org/ns/\""));
    assert!(xml.contains("xmlns:A=\"http://apple.com/ns/ical/\""));
}

#[test]
fn request_current_user_principal_builds_xml() {
    let xml = CurrentUserPrincipalRequest::new()
        .build()
        .expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<D:propfind"));
    assert!(xml.contains("<D:prop>"));
    assert!(xml.contains("<D:current-user-principal/>"));
    assert!(xml.contains("</D:propfind>"));
}

#[test]
fn request_calendar_home_set_builds_xml() {
    let xml = CalendarHomeSetRequest::new()
        .build()
        .expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<D:propfind"));
    assert!(xml.contains("<C:calendar-home-set/>"));
}

#[test]
fn request_list_calendars_emits_only_requested_properties() {
    let mut request = ListCalendarsRequest::new();
    request.add_property(CalendarProp::DisplayName);
    request.add_property(CalendarProp::Ctag);

    let xml = request.build().expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<D:displayname/>"));
    assert!(xml.contains("<CS:getctag/>"));
    assert!(!xml.contains("sync-token"));
    assert!(!xml.contains("calendar-color"));
    assert!(!xml.contains("supported-report-set"));
}

#[test]
fn request_list_calendars_all_emits_full_set() {
    let xml = ListCalendarsRequest::all()
        .build()
        .expect("Failed to build PROPFIND XML");

    assert!(xml.contains("<D:displayname/>"));
    assert!(xml.contains("<D:resourcetype/>"));
    assert!(xml.contains("<D:getetag/>"));
    assert!(xml.contains("<CS:getctag/>"));
    assert!(xml.contains("<A:calendar-color/>"));
    assert!(xml.contains("<D:sync-token/>"));
    assert!(xml.contains("<D:supported-report-set/>"));
    assert!(xml.contains("<C:supported-calendar-component-set/>"));
}

#[test]
fn request_make_calendar_builds_xml() {
    let mut attributes = CalendarAttributes::new("Personal");
    attributes.description = Some("My calendar".to_string());
    attributes.color = Some("#00FF00".to_string());

    let xml = MakeCalendarRequest::new(attributes)
        .build()
        .expect("Failed to build MKCALENDAR XML");

    assert!(xml.contains("<C:mkcalendar"));
    assert!(xml.contains("<D:set>"));
    assert!(xml.contains("<D:prop>"));
    assert!(xml.contains("<D:displayname>Personal</D:displayname>"));
    assert!(xml.contains("<C:calendar-description>My calendar</C:calendar-description>"));
    assert!(xml.contains("<A:calendar-color>#00FF00</A:calendar-color>"));
    assert!(xml.contains("<C:supported-calendar-component-set>"));
    assert!(xml.contains("<C:comp name=\"VEVENT\"/>"));
    assert!(!xml.contains("calendar-timezone"));
}

#[test]
fn request_update_calendar_emits_only_supplied_attributes() {
    let patch = CalendarPatch {
        display_name: Some("Renamed".to_string()),
        ..CalendarPatch::default()
    };

    let xml = UpdateCalendarRequest::new(patch)
        .build()
        .expect("Failed to build PROPPATCH XML");

    assert!(xml.contains("<D:propertyupdate"));
    assert!(xml.contains("<D:displayname>Renamed</D:displayname>"));
    assert!(!xml.contains("calendar-description"));
    assert!(!xml.contains("calendar-timezone"));
    assert!(!xml.contains("calendar-color"));
}

#[test]
fn request_calendar_query_builds_xml() {
    let request = CalendarQueryRequest::new(ComponentKind::Event).time_range(
        Some(ts("2026-01-01T00:00:00Z")),
        Some(ts("2026-01-31T23:59:59Z")),
    );

    let xml = request.build().expect("Failed to build calendar-query XML");

    assert!(xml.contains("<C:calendar-query"));
    assert!(xml.contains("<D:getetag/>"));
    assert!(xml.contains("<C:calendar-data/>"));
    assert!(xml.contains("<C:filter>"));
    assert!(xml.contains("<C:comp-filter name=\"VCALENDAR\">"));
    assert!(xml.contains("<C:comp-filter name=\"VEVENT\">"));
    assert!(xml.contains("<C:time-range"));
    assert!(xml.contains("start=\"20260101T000000Z\""));
    assert!(xml.contains("end=\"20260131T235959Z\""));
}

#[test]
fn request_calendar_query_without_range_builds_xml() {
    let request = CalendarQueryRequest::new(ComponentKind::Todo);

    let xml = request.build().expect("Failed to build calendar-query XML");

    assert!(xml.contains("<C:comp-filter name=\"VCALENDAR\">"));
    assert!(xml.contains("<C:comp-filter name=\"VTODO\"/>"));
    assert!(!xml.contains("<C:time-range"));
}

#[test]
fn request_calendar_query_expand_wraps_calendar_data() {
    let request = CalendarQueryRequest::new(ComponentKind::Event)
        .time_range(
            Some(ts("2026-01-01T00:00:00Z")),
            Some(ts("2026-01-31T23:59:59Z")),
        )
        .expand_recurrences(true);

    let xml = request.build().expect("Failed to build calendar-query XML");

    assert!(xml.contains("<C:calendar-data>"));
    assert!(xml.contains("<C:expand start=\"20260101T000000Z\" end=\"20260131T235959Z\"/>"));
    assert!(xml.contains("</C:calendar-data>"));
}

#[test]
fn request_calendar_query_expand_without_range_stays_flat() {
    let request = CalendarQueryRequest::new(ComponentKind::Event).expand_recurrences(true);

    let xml = request.build().expect("Failed to build calendar-query XML");

    assert!(xml.contains("<C:calendar-data/>"));
    assert!(!xml.contains("<C:expand"));
}

#[test]
fn request_sync_collection_builds_xml() {
    let request = SyncCollectionRequest::new("http://example.com/sync/42");

    let xml = request.build().expect("Failed to build sync-collection XML");

    assert!(xml.contains("<D:sync-collection"));
    assert!(xml.contains("<D:sync-token>http://example.com/sync/42</D:sync-token>"));
    assert!(xml.contains("<D:sync-level>1</D:sync-level>"));
    assert!(xml.contains("<D:getetag/>"));
    assert!(xml.contains("<C:calendar-data/>"));
}

#[test]
fn request_sync_collection_initial_builds_empty_token() {
    let request = SyncCollectionRequest::new("");

    let xml = request.build().expect("Failed to build sync-collection XML");

    assert!(xml.contains("<D:sync-token>"));
    assert!(xml.contains("<D:sync-level>1</D:sync-level>"));
}

#[test]
fn request_free_busy_query_builds_xml() {
    let request = FreeBusyQueryRequest::new(
        ts("2026-01-01T00:00:00Z"),
        ts("2026-01-31T23:59:59Z"),
    );

    let xml = request.build().expect("Failed to build free-busy-query XML");

    assert!(xml.contains("<C:free-busy-query"));
    assert!(xml.contains("<C:time-range start=\"20260101T000000Z\" end=\"20260131T235959Z\"/>"));
    assert!(xml.contains("</C:free-busy-query>"));
}
